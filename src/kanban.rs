//! Kanban lanes and the cross-lane drag gesture.
//!
//! A drag goes `Idle -> Dragging -> Idle`. Dropping turns into one of:
//! no target, same lane, denied, redirected to the proof flow, or an
//! optimistic status patch on the overlay (committed by the caller).

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::notice::Notice;
use crate::overlay::{Overlay, OverlayId};
use crate::permission::{self, Decision};
use crate::proof::ProofGate;
use crate::task::{ProjectMember, Task, TaskId, TaskPatch, TaskStatus};

/// Board columns. Soft-deleted tasks have no lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    NotStarted,
    InProgress,
    Completed,
}

impl Lane {
    pub const ALL: [Lane; 3] = [Lane::NotStarted, Lane::InProgress, Lane::Completed];

    pub fn status(self) -> TaskStatus {
        match self {
            Lane::NotStarted => TaskStatus::NotStarted,
            Lane::InProgress => TaskStatus::InProgress,
            Lane::Completed => TaskStatus::Completed,
        }
    }

    pub fn for_status(status: TaskStatus) -> Option<Lane> {
        match status {
            TaskStatus::NotStarted => Some(Lane::NotStarted),
            TaskStatus::InProgress => Some(Lane::InProgress),
            TaskStatus::Completed => Some(Lane::Completed),
            TaskStatus::Deleted => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Lane::NotStarted => "To do",
            Lane::InProgress => "In progress",
            Lane::Completed => "Done",
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status().as_str())
    }
}

impl FromStr for Lane {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "not_started" | "todo" => Ok(Lane::NotStarted),
            "in_progress" | "doing" => Ok(Lane::InProgress),
            "completed" | "done" => Ok(Lane::Completed),
            other => Err(Error::InvalidArgument(format!(
                "unknown lane '{other}' (expected not_started|in_progress|completed)"
            ))),
        }
    }
}

/// Group tasks into lanes: high priority first, then oldest first.
pub fn lanes(tasks: &[Task]) -> Vec<(Lane, Vec<&Task>)> {
    Lane::ALL
        .iter()
        .map(|lane| {
            let mut members: Vec<&Task> = tasks
                .iter()
                .filter(|task| Lane::for_status(task.status) == Some(*lane))
                .collect();
            members.sort_by(|left, right| {
                right
                    .priority
                    .cmp(&left.priority)
                    .then_with(|| left.created_at.cmp(&right.created_at))
                    .then_with(|| left.id.cmp(&right.id))
            });
            (*lane, members)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Released outside any lane.
    NoTarget,
    /// Released on the lane it started in.
    SameLane,
    /// Actor is neither project owner nor assignee.
    Denied,
    /// Completion needs approval; the proof flow was opened for this task.
    ProofRequired(Task),
    /// The task already has a change in flight.
    InFlight,
    /// Optimistic status patch applied; commit it next.
    Applied(OverlayId),
}

impl DropOutcome {
    pub fn overlay_id(&self) -> Option<OverlayId> {
        match self {
            DropOutcome::Applied(id) => Some(*id),
            _ => None,
        }
    }
}

/// Everything a drop needs besides the gesture itself.
pub struct DropContext<'a> {
    pub actor_id: &'a str,
    pub members: &'a [ProjectMember],
    pub overlay: &'a mut Overlay,
    pub proof_gate: &'a dyn ProofGate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum KanbanDrag {
    #[default]
    Idle,
    Dragging { task_id: TaskId, origin: Lane },
}

impl KanbanDrag {
    pub fn is_dragging(&self) -> bool {
        matches!(self, KanbanDrag::Dragging { .. })
    }

    /// Pick a task up from its current lane.
    pub fn begin(&mut self, task: &Task) -> Result<()> {
        let origin = Lane::for_status(task.status).ok_or_else(|| {
            Error::InvalidArgument(format!("task {} is deleted", task.id))
        })?;
        *self = KanbanDrag::Dragging {
            task_id: task.id.clone(),
            origin,
        };
        Ok(())
    }

    pub fn cancel(&mut self) {
        *self = KanbanDrag::Idle;
    }

    /// Release the dragged task over `target` (None: outside any lane).
    pub fn drop_on(&mut self, target: Option<Lane>, ctx: DropContext<'_>) -> Result<DropOutcome> {
        let task_id = match std::mem::take(self) {
            KanbanDrag::Dragging { task_id, .. } => task_id,
            KanbanDrag::Idle => {
                return Err(Error::InvalidArgument("no drag in progress".to_string()));
            }
        };

        let Some(target) = target else {
            return Ok(DropOutcome::NoTarget);
        };
        let task = ctx
            .overlay
            .task(&task_id)
            .cloned()
            .ok_or_else(|| Error::TaskNotFound(task_id.clone()))?;
        // The task may have changed lanes under the drag; compare against
        // where it sits now.
        if target.status() == task.status {
            return Ok(DropOutcome::SameLane);
        }

        match permission::decide(ctx.actor_id, &task, target.status(), ctx.members) {
            Decision::Deny => {
                tracing::info!(actor = ctx.actor_id, task = %task_id, lane = %target, "status change denied");
                ctx.overlay.push_notice(Notice::warning(
                    &task_id,
                    "Only the project owner or the assignee can move this task",
                ));
                Ok(DropOutcome::Denied)
            }
            Decision::RequireProof => {
                ctx.proof_gate.open_proof_flow(&task);
                ctx.overlay.push_notice(Notice::info(
                    &task_id,
                    "Submit proof of work to have this task marked as done",
                ));
                Ok(DropOutcome::ProofRequired(task))
            }
            Decision::Allow => {
                match ctx
                    .overlay
                    .apply(&task_id, TaskPatch::status(target.status()))
                {
                    Ok(id) => Ok(DropOutcome::Applied(id)),
                    Err(Error::MutationInFlight(_)) => {
                        ctx.overlay.push_notice(Notice::warning(
                            &task_id,
                            "This task is still saving; try again in a moment",
                        ));
                        Ok(DropOutcome::InFlight)
                    }
                    Err(err) => Err(err),
                }
            }
        }
    }
}
