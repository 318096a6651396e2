//! Task store client with pluggable backends.
//!
//! The store is an opaque record service: it persists patches and lists
//! tasks, and all scheduling logic stays on the client side.
//!
//! Supports:
//! - `memory`: In-memory store with failure injection (tests, demos)
//! - `json`: JSON document on disk guarded by a file lock

mod json;
mod memory;

pub use json::{JsonTaskStore, StoreDocument};
pub use memory::InMemoryTaskStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::task::{ProjectMember, Task, TaskId, TaskPatch};

/// Task store trait - implemented by all storage backends.
#[async_trait]
pub trait TaskStoreClient: Send + Sync {
    /// Persist a partial update for one task.
    async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<()>;

    /// List every task in a project, soft-deleted ones included.
    async fn list_tasks(&self, project_id: &str) -> Result<Vec<Task>>;

    /// List the members of a project with their roles.
    async fn list_members(&self, project_id: &str) -> Result<Vec<ProjectMember>>;
}
