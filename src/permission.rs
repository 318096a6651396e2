//! Who may move a task between statuses.
//!
//! A task may only change status when the actor owns the project or is the
//! task's assignee. Completing a task additionally needs verification rights
//! (project owner or `can_verify_tasks`); an assignee without them is sent to
//! the proof-of-work flow instead.

use serde::Serialize;

use crate::task::{ProjectMember, Task, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allow,
    RequireProof,
    Deny,
}

/// Decide whether `actor_id` may move `task` to `target`.
///
/// Keeping the current status is not a status change and is always allowed.
pub fn decide(
    actor_id: &str,
    task: &Task,
    target: TaskStatus,
    members: &[ProjectMember],
) -> Decision {
    if target == task.status {
        return Decision::Allow;
    }

    let membership = members
        .iter()
        .find(|member| member.user_id == actor_id && member.project_id == task.project_id);
    let is_owner = membership.map(ProjectMember::is_owner).unwrap_or(false);
    let is_assignee = task.assigned_to.as_deref() == Some(actor_id);

    if !is_owner && !is_assignee {
        return Decision::Deny;
    }

    let can_verify = is_owner || membership.map(|m| m.can_verify_tasks).unwrap_or(false);
    if target == TaskStatus::Completed && !can_verify {
        return Decision::RequireProof;
    }

    Decision::Allow
}
