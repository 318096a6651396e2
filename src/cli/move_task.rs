//! taskboard move command implementation
//!
//! One kanban drag: pick the task up and drop it on a lane.

use serde::Serialize;

use super::Session;
use crate::error::{Error, Result};
use crate::kanban::{DropOutcome, Lane};
use crate::output::{emit_success, HumanOutput};
use crate::task::{TaskId, TaskStatus};

#[derive(Serialize)]
struct MoveReport {
    task: TaskId,
    lane: Lane,
    result: &'static str,
    status: TaskStatus,
}

pub async fn run(mut session: Session, task_id: TaskId, lane: Lane) -> Result<()> {
    session.board.begin_kanban_drag(&task_id)?;
    let outcome = session.board.drop_and_commit(Some(lane)).await?;

    let result = match outcome {
        DropOutcome::Applied(_) => "moved",
        DropOutcome::SameLane | DropOutcome::NoTarget => "unchanged",
        DropOutcome::ProofRequired(_) => "proof_required",
        DropOutcome::Denied => {
            return Err(Error::PermissionDenied {
                actor: session.board.actor_id().to_string(),
                task: task_id,
            });
        }
        DropOutcome::InFlight => return Err(Error::MutationInFlight(task_id)),
    };

    let status = session
        .board
        .task(&task_id)
        .map(|task| task.status)
        .ok_or_else(|| Error::TaskNotFound(task_id.clone()))?;

    let report = MoveReport {
        task: task_id,
        lane,
        result,
        status,
    };

    let mut human = HumanOutput::new(format!("taskboard move: {}", report.task));
    human.push_summary("result", result);
    human.push_summary("status", status.to_string());
    session.collect_notices(&mut human);

    emit_success(session.options, "move", &report, Some(&human))
}
