//! taskboard shift command implementation
//!
//! Replays a timeline gesture as pointer-down at 0, a move, then release at `px`.

use chrono::NaiveDate;
use serde::Serialize;

use super::Session;
use crate::board::ReleaseOutcome;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::task::TaskId;
use crate::timeline::Manipulation;

#[derive(Serialize)]
struct ShiftReport {
    task: TaskId,
    mode: Manipulation,
    px: f64,
    outcome: ReleaseOutcome,
    start_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
}

pub async fn run(mut session: Session, task_id: TaskId, mode: Manipulation, px: f64) -> Result<()> {
    if !px.is_finite() {
        return Err(Error::InvalidArgument(format!("--px must be finite, got {px}")));
    }

    session.board.begin_timeline_drag(&task_id, mode, 0.0)?;
    session.board.timeline_pointer_move(px);
    let outcome = session.board.release_and_commit(px).await?;
    if matches!(outcome, ReleaseOutcome::InFlight { .. }) {
        return Err(Error::MutationInFlight(task_id));
    }

    let task = session
        .board
        .task(&task_id)
        .ok_or_else(|| Error::TaskNotFound(task_id.clone()))?;
    let report = ShiftReport {
        task: task_id.clone(),
        mode,
        px,
        start_date: task.start_date,
        due_date: task.due_date,
        outcome,
    };

    let mut human = HumanOutput::new(format!("taskboard shift: {task_id}"));
    match &report.outcome {
        ReleaseOutcome::Applied { start, end, .. } => {
            human.push_summary("result", "rescheduled");
            human.push_summary("dates", format!("{start} .. {end}"));
        }
        _ => human.push_summary("result", "unchanged"),
    }
    session.collect_notices(&mut human);

    emit_success(session.options, "shift", &report, Some(&human))
}
