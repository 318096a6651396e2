//! JSON file-backed task store.
//!
//! The whole project dataset lives in one document. Every write is a
//! read-modify-write under `<file>.lock`, finished with an atomic rename.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::TaskStoreClient;
use crate::error::{Error, Result};
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};
use crate::task::{ProjectMember, Task, TaskId, TaskPatch};

/// On-disk shape of the store file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub members: Vec<ProjectMember>,
}

#[derive(Debug, Clone)]
pub struct JsonTaskStore {
    path: PathBuf,
}

impl JsonTaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document; a missing file is an empty store.
    pub fn load(&self) -> Result<StoreDocument> {
        let _lock = FileLock::acquire(lock::lock_path_for(&self.path), DEFAULT_LOCK_TIMEOUT_MS)?;
        read_document(&self.path)
    }

    /// Replace the document wholesale.
    pub fn save(&self, document: &StoreDocument) -> Result<()> {
        let _lock = FileLock::acquire(lock::lock_path_for(&self.path), DEFAULT_LOCK_TIMEOUT_MS)?;
        write_document(&self.path, document)
    }

    fn update_blocking(&self, id: &TaskId, patch: &TaskPatch) -> Result<()> {
        let _lock = FileLock::acquire(lock::lock_path_for(&self.path), DEFAULT_LOCK_TIMEOUT_MS)?;
        let mut document = read_document(&self.path)?;
        let task = document
            .tasks
            .iter_mut()
            .find(|task| &task.id == id)
            .ok_or_else(|| Error::TaskNotFound(id.clone()))?;
        task.apply_patch(patch);
        write_document(&self.path, &document)?;
        tracing::debug!(task = %id, path = %self.path.display(), "stored task patch");
        Ok(())
    }
}

fn read_document(path: &Path) -> Result<StoreDocument> {
    if !path.exists() {
        return Ok(StoreDocument::default());
    }
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(StoreDocument::default());
    }
    Ok(serde_json::from_str(&content)?)
}

fn write_document(path: &Path, document: &StoreDocument) -> Result<()> {
    let json = serde_json::to_vec_pretty(document)?;
    lock::write_atomic(path, &json)
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| Error::Store(format!("store worker failed: {err}")))?
}

#[async_trait]
impl TaskStoreClient for JsonTaskStore {
    async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<()> {
        let store = self.clone();
        let id = id.clone();
        let patch = patch.clone();
        run_blocking(move || store.update_blocking(&id, &patch)).await
    }

    async fn list_tasks(&self, project_id: &str) -> Result<Vec<Task>> {
        let store = self.clone();
        let project_id = project_id.to_string();
        run_blocking(move || {
            let document = store.load()?;
            Ok(document
                .tasks
                .into_iter()
                .filter(|task| task.project_id == project_id)
                .collect())
        })
        .await
    }

    async fn list_members(&self, project_id: &str) -> Result<Vec<ProjectMember>> {
        let store = self.clone();
        let project_id = project_id.to_string();
        run_blocking(move || {
            let document = store.load()?;
            Ok(document
                .members
                .into_iter()
                .filter(|member| member.project_id == project_id)
                .collect())
        })
        .await
    }
}
