//! Optimistic overlay over the canonical task collection.
//!
//! Every gesture that changes a task goes through an append-only log of
//! mutation entries. The rendered collection is always the canonical
//! snapshot plus the patches of entries that are still pending:
//!
//! ```text
//! apply ──► Pending ──► Committed   (store accepted; folded into canonical)
//!              │
//!              ├──────► Failed      (store rejected; prior values restored)
//!              └──────► Reverted    (caller withdrew it before committing)
//! ```
//!
//! Only one entry per task may be pending at a time, so two views can never
//! stack conflicting patches on the same task.

use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::notice::{Notice, Notices};
use crate::task::{PriorFields, Task, TaskId, TaskPatch};

/// Handle returned by [`Overlay::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct OverlayId(u64);

impl OverlayId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationState {
    Pending,
    Committed,
    Failed,
    Reverted,
}

#[derive(Debug, Clone)]
pub struct MutationEntry {
    pub id: OverlayId,
    pub task_id: TaskId,
    pub patch: TaskPatch,
    /// Values the patched fields had underneath this entry.
    pub prior: PriorFields,
    pub state: MutationState,
}

/// The request a pending entry asks the store to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    pub overlay_id: OverlayId,
    pub task_id: TaskId,
    pub patch: TaskPatch,
}

#[derive(Debug, Clone, Default)]
pub struct Overlay {
    canonical: Vec<Task>,
    rendered: Vec<Task>,
    log: Vec<MutationEntry>,
    next_id: u64,
    notices: Notices,
}

impl Overlay {
    pub fn new(canonical: Vec<Task>) -> Self {
        Self {
            rendered: canonical.clone(),
            canonical,
            ..Self::default()
        }
    }

    /// The collection the views draw: canonical state plus pending patches.
    pub fn tasks(&self) -> &[Task] {
        &self.rendered
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.rendered.iter().find(|task| &task.id == id)
    }

    /// The last snapshot confirmed by the store.
    pub fn canonical(&self) -> &[Task] {
        &self.canonical
    }

    pub fn log(&self) -> &[MutationEntry] {
        &self.log
    }

    pub fn entry(&self, id: OverlayId) -> Option<&MutationEntry> {
        self.log.iter().find(|entry| entry.id == id)
    }

    pub fn is_pending(&self, task_id: &TaskId) -> bool {
        self.pending_for(task_id).is_some()
    }

    pub fn pending_count(&self) -> usize {
        self.log
            .iter()
            .filter(|entry| entry.state == MutationState::Pending)
            .count()
    }

    pub fn notices(&self) -> &[Notice] {
        self.notices.as_slice()
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    /// Apply `patch` to the rendered task immediately.
    ///
    /// Fails without touching anything when the task is unknown, soft-deleted,
    /// or already has a pending change.
    pub fn apply(&mut self, task_id: &TaskId, patch: TaskPatch) -> Result<OverlayId> {
        if patch.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "empty patch for task {task_id}"
            )));
        }
        if self.is_pending(task_id) {
            return Err(Error::MutationInFlight(task_id.clone()));
        }

        let task = self
            .rendered
            .iter_mut()
            .find(|task| &task.id == task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.clone()))?;
        if task.is_deleted() {
            return Err(Error::InvalidArgument(format!(
                "task {task_id} is deleted"
            )));
        }

        let prior = task.snapshot_fields(&patch);
        task.apply_patch(&patch);

        self.next_id += 1;
        let id = OverlayId(self.next_id);
        tracing::debug!(overlay = %id, task = %task_id, ?patch, "applied optimistic patch");
        self.log.push(MutationEntry {
            id,
            task_id: task_id.clone(),
            patch,
            prior,
            state: MutationState::Pending,
        });
        Ok(id)
    }

    /// The store request for a pending entry.
    pub fn commit_request(&self, id: OverlayId) -> Result<CommitRequest> {
        let entry = self.entry(id).ok_or(Error::OverlayEntryNotFound(id.get()))?;
        if entry.state != MutationState::Pending {
            return Err(Error::InvalidArgument(format!(
                "overlay entry {id} is not pending"
            )));
        }
        Ok(CommitRequest {
            overlay_id: id,
            task_id: entry.task_id.clone(),
            patch: entry.patch.clone(),
        })
    }

    /// Record the store's answer for a pending entry.
    ///
    /// Success folds the patch into the canonical snapshot. Failure restores
    /// the prior values, raises a notice and returns `CommitFailed`.
    pub fn resolve(&mut self, id: OverlayId, outcome: Result<()>) -> Result<()> {
        let index = self.pending_index(id)?;
        match outcome {
            Ok(()) => {
                let entry = &mut self.log[index];
                entry.state = MutationState::Committed;
                if let Some(task) = self
                    .canonical
                    .iter_mut()
                    .find(|task| task.id == entry.task_id)
                {
                    task.apply_patch(&entry.patch);
                }
                tracing::debug!(overlay = %id, task = %entry.task_id, "commit acknowledged");
                Ok(())
            }
            Err(err) => {
                let reason = err.to_string();
                self.roll_back(index, MutationState::Failed);
                let task_id = self.log[index].task_id.clone();
                tracing::warn!(overlay = %id, task = %task_id, error = %reason, "commit failed; reverted");
                self.notices.push(Notice::error(
                    &task_id,
                    format!("Could not save changes to {task_id}: {reason}"),
                ));
                Err(Error::CommitFailed {
                    task: task_id,
                    reason,
                })
            }
        }
    }

    /// Withdraw a pending entry, restoring the task's prior values.
    ///
    /// Reverting an entry that already failed or was reverted is a no-op.
    pub fn revert(&mut self, id: OverlayId) -> Result<()> {
        let index = self
            .log
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(Error::OverlayEntryNotFound(id.get()))?;
        match self.log[index].state {
            MutationState::Pending => {
                self.roll_back(index, MutationState::Reverted);
                tracing::debug!(overlay = %id, "reverted optimistic patch");
                Ok(())
            }
            MutationState::Failed | MutationState::Reverted => Ok(()),
            MutationState::Committed => Err(Error::InvalidArgument(format!(
                "overlay entry {id} is already committed"
            ))),
        }
    }

    /// Replace the canonical snapshot with a fresh one from upstream.
    ///
    /// Pending entries are re-applied on top of the new snapshot (and their
    /// prior values rebased onto it); settled entries are dropped from the log.
    pub fn refresh(&mut self, canonical: Vec<Task>) {
        self.log
            .retain(|entry| entry.state == MutationState::Pending);

        let mut rendered = canonical.clone();
        for entry in &mut self.log {
            if let Some(task) = rendered.iter_mut().find(|task| task.id == entry.task_id) {
                entry.prior = task.snapshot_fields(&entry.patch);
                task.apply_patch(&entry.patch);
            }
        }

        tracing::debug!(
            tasks = canonical.len(),
            pending = self.log.len(),
            "overlay resynchronized"
        );
        self.canonical = canonical;
        self.rendered = rendered;
    }

    fn pending_for(&self, task_id: &TaskId) -> Option<&MutationEntry> {
        self.log
            .iter()
            .find(|entry| &entry.task_id == task_id && entry.state == MutationState::Pending)
    }

    fn pending_index(&self, id: OverlayId) -> Result<usize> {
        let index = self
            .log
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(Error::OverlayEntryNotFound(id.get()))?;
        if self.log[index].state != MutationState::Pending {
            return Err(Error::InvalidArgument(format!(
                "overlay entry {id} is not pending"
            )));
        }
        Ok(index)
    }

    fn roll_back(&mut self, index: usize, state: MutationState) {
        let entry = &mut self.log[index];
        entry.state = state;
        if let Some(task) = self
            .rendered
            .iter_mut()
            .find(|task| task.id == entry.task_id)
        {
            task.restore_fields(&entry.prior);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeKind;
    use crate::task::{Priority, TaskStatus};
    use chrono::{NaiveDate, Utc};

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).expect("date")
    }

    fn task(id: &str) -> Task {
        Task {
            id: TaskId::new(id),
            project_id: "p".to_string(),
            title: id.to_string(),
            status: TaskStatus::NotStarted,
            assigned_to: None,
            priority: Priority::Medium,
            start_date: Some(date(3, 1)),
            due_date: Some(date(3, 5)),
            created_at: Utc::now(),
        }
    }

    fn id(value: &str) -> TaskId {
        TaskId::new(value)
    }

    #[test]
    fn apply_is_visible_before_commit() {
        let mut overlay = Overlay::new(vec![task("a")]);
        let handle = overlay
            .apply(&id("a"), TaskPatch::status(TaskStatus::InProgress))
            .expect("apply");

        assert_eq!(overlay.task(&id("a")).map(|t| t.status), Some(TaskStatus::InProgress));
        assert_eq!(overlay.canonical()[0].status, TaskStatus::NotStarted);
        assert_eq!(
            overlay.commit_request(handle).expect("request").patch,
            TaskPatch::status(TaskStatus::InProgress)
        );
    }

    #[test]
    fn successful_commit_folds_into_canonical() {
        let mut overlay = Overlay::new(vec![task("a")]);
        let handle = overlay
            .apply(&id("a"), TaskPatch::status(TaskStatus::Completed))
            .expect("apply");
        overlay.resolve(handle, Ok(())).expect("resolve");

        assert_eq!(overlay.canonical()[0].status, TaskStatus::Completed);
        assert!(!overlay.is_pending(&id("a")));
        assert_eq!(overlay.entry(handle).map(|e| e.state), Some(MutationState::Committed));
    }

    #[test]
    fn failed_commit_restores_prior_and_notifies() {
        let mut overlay = Overlay::new(vec![task("a")]);
        let handle = overlay
            .apply(&id("a"), TaskPatch::dates(date(3, 3), date(3, 7)))
            .expect("apply");

        let err = overlay
            .resolve(handle, Err(Error::Store("offline".to_string())))
            .expect_err("failure surfaces");
        assert!(matches!(err, Error::CommitFailed { .. }));
        assert_eq!(overlay.tasks(), overlay.canonical());
        assert_eq!(overlay.notices().len(), 1);
        assert_eq!(overlay.notices()[0].kind, NoticeKind::Error);
        assert_eq!(overlay.entry(handle).map(|e| e.state), Some(MutationState::Failed));
    }

    #[test]
    fn rollback_of_one_task_leaves_others_alone() {
        let mut overlay = Overlay::new(vec![task("a"), task("b"), task("c")]);
        let first = overlay
            .apply(&id("a"), TaskPatch::status(TaskStatus::InProgress))
            .expect("apply a");
        let second = overlay
            .apply(&id("b"), TaskPatch::dates(date(3, 10), date(3, 12)))
            .expect("apply b");
        let third = overlay
            .apply(&id("c"), TaskPatch::status(TaskStatus::Completed))
            .expect("apply c");

        overlay.resolve(second, Ok(())).expect("b commits");
        let _ = overlay.resolve(first, Err(Error::Store("boom".to_string())));

        assert_eq!(overlay.task(&id("a")), Some(&canonical_task(&overlay, "a")));
        let b = overlay.task(&id("b")).expect("b");
        assert_eq!(b.start_date, Some(date(3, 10)));
        let c = overlay.task(&id("c")).expect("c");
        assert_eq!(c.status, TaskStatus::Completed);
        assert!(overlay.is_pending(&id("c")));

        overlay.revert(third).expect("revert c");
        assert_eq!(overlay.task(&id("c")).map(|t| t.status), Some(TaskStatus::NotStarted));
    }

    fn canonical_task(overlay: &Overlay, value: &str) -> Task {
        overlay
            .canonical()
            .iter()
            .find(|task| task.id.as_str() == value)
            .cloned()
            .expect("canonical task")
    }

    #[test]
    fn second_apply_on_pending_task_is_rejected() {
        let mut overlay = Overlay::new(vec![task("a")]);
        overlay
            .apply(&id("a"), TaskPatch::status(TaskStatus::InProgress))
            .expect("apply");

        let err = overlay
            .apply(&id("a"), TaskPatch::dates(date(4, 1), date(4, 2)))
            .expect_err("in flight");
        assert!(matches!(err, Error::MutationInFlight(_)));
        assert_eq!(overlay.task(&id("a")).and_then(|t| t.start_date), Some(date(3, 1)));
    }

    #[test]
    fn refresh_keeps_pending_values() {
        let mut overlay = Overlay::new(vec![task("a"), task("b")]);
        overlay
            .apply(&id("a"), TaskPatch::status(TaskStatus::InProgress))
            .expect("apply");

        let mut upstream = vec![task("a"), task("b")];
        upstream[1].status = TaskStatus::Completed;
        upstream[0].title = "renamed".to_string();
        overlay.refresh(upstream);

        let a = overlay.task(&id("a")).expect("a");
        assert_eq!(a.status, TaskStatus::InProgress);
        assert_eq!(a.title, "renamed");
        assert_eq!(overlay.task(&id("b")).map(|t| t.status), Some(TaskStatus::Completed));
    }

    #[test]
    fn revert_after_refresh_restores_latest_canonical() {
        let mut overlay = Overlay::new(vec![task("a")]);
        let handle = overlay
            .apply(&id("a"), TaskPatch::status(TaskStatus::Completed))
            .expect("apply");

        let mut upstream = vec![task("a")];
        upstream[0].status = TaskStatus::InProgress;
        overlay.refresh(upstream);

        let _ = overlay.resolve(handle, Err(Error::Store("rejected".to_string())));
        assert_eq!(overlay.task(&id("a")).map(|t| t.status), Some(TaskStatus::InProgress));
    }

    #[test]
    fn refresh_compacts_settled_entries() {
        let mut overlay = Overlay::new(vec![task("a"), task("b")]);
        let done = overlay
            .apply(&id("a"), TaskPatch::status(TaskStatus::InProgress))
            .expect("apply a");
        overlay.resolve(done, Ok(())).expect("commit a");
        overlay
            .apply(&id("b"), TaskPatch::status(TaskStatus::InProgress))
            .expect("apply b");

        overlay.refresh(vec![task("a"), task("b")]);
        assert_eq!(overlay.log().len(), 1);
        assert_eq!(overlay.pending_count(), 1);
        // Upstream did not see the committed change yet: last refresh wins.
        assert_eq!(overlay.task(&id("a")).map(|t| t.status), Some(TaskStatus::NotStarted));
    }

    #[test]
    fn revert_is_idempotent_but_not_after_commit() {
        let mut overlay = Overlay::new(vec![task("a")]);
        let handle = overlay
            .apply(&id("a"), TaskPatch::status(TaskStatus::InProgress))
            .expect("apply");
        overlay.revert(handle).expect("revert");
        overlay.revert(handle).expect("revert again");
        assert_eq!(overlay.tasks(), overlay.canonical());

        let handle = overlay
            .apply(&id("a"), TaskPatch::status(TaskStatus::InProgress))
            .expect("apply after revert");
        overlay.resolve(handle, Ok(())).expect("commit");
        assert!(matches!(
            overlay.revert(handle),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn deleted_and_unknown_tasks_are_rejected() {
        let mut gone = task("gone");
        gone.status = TaskStatus::Deleted;
        let mut overlay = Overlay::new(vec![gone]);

        assert!(matches!(
            overlay.apply(&id("gone"), TaskPatch::status(TaskStatus::InProgress)),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            overlay.apply(&id("nope"), TaskPatch::status(TaskStatus::InProgress)),
            Err(Error::TaskNotFound(_))
        ));
        assert!(overlay.log().is_empty());
    }
}
