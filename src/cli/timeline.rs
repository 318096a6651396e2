//! taskboard timeline command implementation

use chrono::NaiveDate;
use serde::Serialize;

use super::Session;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::timeline::{BarGeometry, TimelineWindow};

#[derive(Serialize)]
struct TimelineReport {
    project: String,
    window: TimelineWindow,
    end: NaiveDate,
    day_column_width_px: u32,
    bars: Vec<BarReport>,
}

#[derive(Serialize)]
struct BarReport {
    #[serde(flatten)]
    geometry: BarGeometry,
    color_slot: Option<usize>,
}

pub fn run(mut session: Session, from: Option<NaiveDate>, days: Option<u32>) -> Result<()> {
    let board = &session.board;
    let days = days.unwrap_or(board.config().default_visible_days);
    if days == 0 {
        return Err(Error::InvalidArgument("--days must be >= 1".to_string()));
    }
    let window = match from {
        Some(start) => TimelineWindow::new(start, days),
        None => TimelineWindow::centered_on(chrono::Local::now().date_naive(), days),
    };

    let bars: Vec<BarReport> = board
        .timeline_bars(&window)
        .into_iter()
        .map(|geometry| BarReport {
            color_slot: board.color_slot(&geometry.task_id),
            geometry,
        })
        .collect();

    let report = TimelineReport {
        project: board.project_id().to_string(),
        end: window.end(),
        window,
        day_column_width_px: board.config().day_column_width_px,
        bars,
    };

    let mut human = HumanOutput::new(format!("taskboard timeline: {}", report.project));
    human.push_summary("window", format!("{} .. {}", report.window.start, report.end));
    human.push_summary("bars", report.bars.len().to_string());
    for bar in &report.bars {
        let geometry = &bar.geometry;
        let mut line = format!(
            "{} {} .. {} at column {} for {} day(s)",
            geometry.task_id,
            geometry.start,
            geometry.end,
            geometry.start_offset,
            geometry.duration_days
        );
        if geometry.clipped_left || geometry.clipped_right {
            line.push_str(" (clipped)");
        }
        human.push_detail(line);
    }
    session.collect_notices(&mut human);

    emit_success(session.options, "timeline", &report, Some(&human))
}
