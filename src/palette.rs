//! Deterministic palette slots for task identity across views.
//!
//! Tasks are ordered by creation time and take slot `position % palette_size`.
//! Adding or removing a task created earlier shifts the slots of every task
//! created after it; re-rendering an unchanged set never does.

use std::collections::{BTreeSet, HashMap};

use crate::task::{Task, TaskId};

/// Map every task to its palette slot.
///
/// Ties on `created_at` fall back to the task id so the order is total.
pub fn assign_colors(tasks: &[Task], palette_size: usize) -> HashMap<TaskId, usize> {
    let palette_size = palette_size.max(1);
    let mut ordered: Vec<&Task> = tasks.iter().collect();
    ordered.sort_by(|left, right| {
        left.created_at
            .cmp(&right.created_at)
            .then_with(|| left.id.cmp(&right.id))
    });
    ordered
        .into_iter()
        .enumerate()
        .map(|(position, task)| (task.id.clone(), position % palette_size))
        .collect()
}

/// Slot assignment cached against the task set's membership.
#[derive(Debug, Clone)]
pub struct ColorMap {
    palette_size: usize,
    members: Option<BTreeSet<TaskId>>,
    slots: HashMap<TaskId, usize>,
}

impl ColorMap {
    pub fn new(palette_size: usize) -> Self {
        Self {
            palette_size: palette_size.max(1),
            members: None,
            slots: HashMap::new(),
        }
    }

    /// Recompute slots if the set of task ids changed. Returns whether it did.
    pub fn sync(&mut self, tasks: &[Task]) -> bool {
        let members: BTreeSet<TaskId> = tasks.iter().map(|task| task.id.clone()).collect();
        if self.members.as_ref() == Some(&members) {
            return false;
        }
        self.slots = assign_colors(tasks, self.palette_size);
        tracing::debug!(tasks = members.len(), "recomputed palette slots");
        self.members = Some(members);
        true
    }

    pub fn slot(&self, id: &TaskId) -> Option<usize> {
        self.slots.get(id).copied()
    }

    pub fn slots(&self) -> &HashMap<TaskId, usize> {
        &self.slots
    }

    pub fn palette_size(&self) -> usize {
        self.palette_size
    }
}
