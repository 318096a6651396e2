//! In-memory task store (non-persistent).

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::TaskStoreClient;
use crate::error::{Error, Result};
use crate::task::{ProjectMember, Task, TaskId, TaskPatch};

#[derive(Debug, Default)]
struct State {
    tasks: Vec<Task>,
    members: Vec<ProjectMember>,
    requests: Vec<(TaskId, TaskPatch)>,
    fail_next: usize,
    offline: bool,
}

#[derive(Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(tasks: Vec<Task>, members: Vec<ProjectMember>) -> Self {
        Self {
            state: Arc::new(RwLock::new(State {
                tasks,
                members,
                ..State::default()
            })),
        }
    }

    pub async fn insert_task(&self, task: Task) {
        let mut state = self.state.write().await;
        state.tasks.retain(|existing| existing.id != task.id);
        state.tasks.push(task);
    }

    /// Make the next `count` update requests fail.
    pub async fn fail_next_update(&self, count: usize) {
        self.state.write().await.fail_next = count;
    }

    /// While offline every update fails.
    pub async fn set_offline(&self, offline: bool) {
        self.state.write().await.offline = offline;
    }

    /// Every update request received, including failed ones, in arrival order.
    pub async fn update_requests(&self) -> Vec<(TaskId, TaskPatch)> {
        self.state.read().await.requests.clone()
    }

    pub async fn task(&self, id: &TaskId) -> Option<Task> {
        self.state
            .read()
            .await
            .tasks
            .iter()
            .find(|task| &task.id == id)
            .cloned()
    }
}

#[async_trait]
impl TaskStoreClient for InMemoryTaskStore {
    async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<()> {
        let mut state = self.state.write().await;
        state.requests.push((id.clone(), patch.clone()));

        if state.offline {
            return Err(Error::Store("store unreachable".to_string()));
        }
        if state.fail_next > 0 {
            state.fail_next -= 1;
            return Err(Error::Store("update rejected".to_string()));
        }

        let task = state
            .tasks
            .iter_mut()
            .find(|task| &task.id == id)
            .ok_or_else(|| Error::TaskNotFound(id.clone()))?;
        task.apply_patch(patch);
        Ok(())
    }

    async fn list_tasks(&self, project_id: &str) -> Result<Vec<Task>> {
        Ok(self
            .state
            .read()
            .await
            .tasks
            .iter()
            .filter(|task| task.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn list_members(&self, project_id: &str) -> Result<Vec<ProjectMember>> {
        Ok(self
            .state
            .read()
            .await
            .members
            .iter()
            .filter(|member| member.project_id == project_id)
            .cloned()
            .collect())
    }
}
