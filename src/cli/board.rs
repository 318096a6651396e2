//! taskboard board command implementation
//!
//! Lists a project's lanes with each card's palette slot.

use serde::Serialize;

use super::Session;
use crate::error::Result;
use crate::kanban::Lane;
use crate::output::{emit_success, HumanOutput};
use crate::task::{Priority, TaskId};

#[derive(Serialize)]
struct BoardReport {
    project: String,
    actor: String,
    lanes: Vec<LaneReport>,
}

#[derive(Serialize)]
struct LaneReport {
    lane: Lane,
    title: &'static str,
    tasks: Vec<CardReport>,
}

#[derive(Serialize)]
struct CardReport {
    id: TaskId,
    title: String,
    priority: Priority,
    assigned_to: Option<String>,
    color_slot: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<String>,
}

pub fn run(mut session: Session) -> Result<()> {
    let board = &session.board;
    let config = board.config();

    let lanes: Vec<LaneReport> = board
        .lanes()
        .into_iter()
        .map(|(lane, tasks)| LaneReport {
            lane,
            title: lane.title(),
            tasks: tasks
                .into_iter()
                .map(|task| {
                    let color_slot = board.color_slot(&task.id);
                    CardReport {
                        id: task.id.clone(),
                        title: task.title.clone(),
                        priority: task.priority,
                        assigned_to: task.assigned_to.clone(),
                        color_slot,
                        color: color_slot
                            .and_then(|slot| config.color(slot))
                            .map(str::to_string),
                    }
                })
                .collect(),
        })
        .collect();

    let report = BoardReport {
        project: board.project_id().to_string(),
        actor: board.actor_id().to_string(),
        lanes,
    };

    let mut human = HumanOutput::new(format!("taskboard board: {}", report.project));
    for lane in &report.lanes {
        human.push_summary(lane.title, lane.tasks.len().to_string());
    }
    for lane in &report.lanes {
        for card in &lane.tasks {
            let slot = card
                .color_slot
                .map(|slot| slot.to_string())
                .unwrap_or_else(|| "-".to_string());
            let assignee = card.assigned_to.as_deref().unwrap_or("unassigned");
            human.push_detail(format!(
                "[{}] {} {} ({:?}, {assignee}) color {slot}",
                lane.lane, card.id, card.title, card.priority
            ));
        }
    }
    session.collect_notices(&mut human);

    emit_success(session.options, "board", &report, Some(&human))
}
