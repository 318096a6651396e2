#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, TimeZone, Utc};
use tempfile::TempDir;

use taskboard::store::StoreDocument;
use taskboard::task::{MemberRole, Priority, ProjectMember, Task, TaskId, TaskStatus};

pub const PROJECT: &str = "apollo";
pub const OWNER: &str = "olivia";
pub const ASSIGNEE: &str = "ana";
pub const VERIFIER: &str = "victor";
pub const OUTSIDER: &str = "oscar";

/// A scratch working root with a JSON store file.
pub struct TestBoard {
    dir: TempDir,
}

impl TestBoard {
    pub fn init() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("taskboard.json")
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        self.write_file(".taskboard.toml", contents)
    }

    pub fn write_store(&self, document: &StoreDocument) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(document)?;
        fs::write(self.store_path(), json)?;
        Ok(())
    }

    pub fn read_store(&self) -> Result<StoreDocument, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(self.store_path())?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn stored_task(&self, id: &str) -> Result<Task, Box<dyn std::error::Error>> {
        self.read_store()?
            .tasks
            .into_iter()
            .find(|task| task.id.as_str() == id)
            .ok_or_else(|| format!("task {id} missing from store").into())
    }
}

pub fn taskboard_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("taskboard").expect("binary");
    cmd.env_remove("TASKBOARD_ACTOR")
        .env_remove("TASKBOARD_ROOT")
        .env_remove("TASKBOARD_STORE")
        .env_remove("RUST_LOG");
    cmd
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// An in-progress task assigned to [`ASSIGNEE`], created `minute` minutes
/// into the project's first day.
pub fn task(id: &str, minute: u32) -> Task {
    Task {
        id: TaskId::new(id),
        project_id: PROJECT.to_string(),
        title: format!("Task {id}"),
        status: TaskStatus::InProgress,
        assigned_to: Some(ASSIGNEE.to_string()),
        priority: Priority::Medium,
        start_date: Some(date(2024, 3, 1)),
        due_date: Some(date(2024, 3, 5)),
        created_at: Utc
            .with_ymd_and_hms(2024, 1, 15, 9, minute, 0)
            .single()
            .expect("timestamp"),
    }
}

pub fn member(user: &str, role: MemberRole, can_verify_tasks: bool) -> ProjectMember {
    ProjectMember {
        user_id: user.to_string(),
        project_id: PROJECT.to_string(),
        role,
        can_verify_tasks,
    }
}

/// Owner, plain assignee and a verifier; `oscar` is not a member.
pub fn members() -> Vec<ProjectMember> {
    vec![
        member(OWNER, MemberRole::Owner, false),
        member(ASSIGNEE, MemberRole::Member, false),
        member(VERIFIER, MemberRole::Member, true),
    ]
}

pub fn document(tasks: Vec<Task>) -> StoreDocument {
    StoreDocument {
        tasks,
        members: members(),
    }
}
