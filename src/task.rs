//! Task data model shared by the kanban and timeline views.
//!
//! Tasks are owned by the external store; this crate treats them as values
//! and only ever changes `status`, `start_date` and `due_date`.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Opaque, stable task identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Completed,
    /// Soft-delete marker. Never set by this crate.
    Deleted,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not_started",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Deleted => "deleted",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub project_id: String,
    pub title: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// The date range the timeline draws for this task.
    ///
    /// A task with only one of the two dates is a single-day bar on that date.
    pub fn schedule(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start_date, self.due_date) {
            (Some(start), Some(due)) => Some((start, due)),
            (Some(date), None) | (None, Some(date)) => Some((date, date)),
            (None, None) => None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.status == TaskStatus::Deleted
    }

    /// Write every field present in `patch` onto this task.
    pub fn apply_patch(&mut self, patch: &TaskPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(start) = patch.start_date {
            self.start_date = Some(start);
        }
        if let Some(due) = patch.due_date {
            self.due_date = Some(due);
        }
    }

    /// Capture the current values of the fields `patch` touches, so the
    /// change can be undone by applying the result.
    pub fn snapshot_fields(&self, patch: &TaskPatch) -> PriorFields {
        PriorFields {
            status: patch.status.map(|_| self.status),
            start_date: patch.start_date.map(|_| self.start_date),
            due_date: patch.due_date.map(|_| self.due_date),
        }
    }

    /// Restore fields captured by [`Task::snapshot_fields`].
    pub fn restore_fields(&mut self, prior: &PriorFields) {
        if let Some(status) = prior.status {
            self.status = status;
        }
        if let Some(start) = prior.start_date {
            self.start_date = start;
        }
        if let Some(due) = prior.due_date {
            self.due_date = due;
        }
    }
}

/// Partial update sent to the store. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn dates(start: NaiveDate, due: NaiveDate) -> Self {
        Self {
            status: None,
            start_date: Some(start),
            due_date: Some(due),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.start_date.is_none() && self.due_date.is_none()
    }
}

/// Pre-mutation values of the fields a patch touched.
///
/// The outer `Option` marks whether the field was touched; the inner one for
/// dates is the prior value, which may itself have been absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorFields {
    pub status: Option<TaskStatus>,
    pub start_date: Option<Option<NaiveDate>>,
    pub due_date: Option<Option<NaiveDate>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Owner,
    Member,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMember {
    pub user_id: String,
    pub project_id: String,
    pub role: MemberRole,
    #[serde(default)]
    pub can_verify_tasks: bool,
}

impl ProjectMember {
    pub fn is_owner(&self) -> bool {
        self.role == MemberRole::Owner
    }
}
