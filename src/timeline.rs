//! Timeline (Gantt) geometry and the drag/resize gesture.
//!
//! Pixels map to days through a fixed column width: a pointer moved `dx`
//! pixels means `round(dx / W)` days. Bars only ever land on whole days.
//! Date ranges are inclusive, so a task starting and ending on the same day
//! is one column wide.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::task::{Task, TaskId};

/// How a pointer-down on a bar manipulates the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Manipulation {
    /// Dragging the body: both dates shift.
    Move,
    /// Dragging the left handle: only the start shifts.
    ResizeStart,
    /// Dragging the right handle: only the due date shifts.
    ResizeEnd,
}

impl std::str::FromStr for Manipulation {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "move" => Ok(Manipulation::Move),
            "resize-start" | "start" => Ok(Manipulation::ResizeStart),
            "resize-end" | "end" => Ok(Manipulation::ResizeEnd),
            other => Err(Error::InvalidArgument(format!(
                "unknown mode '{other}' (expected move|resize-start|resize-end)"
            ))),
        }
    }
}

/// Quantize a pointer delta into whole days (half a column rounds away from zero).
pub fn day_delta(pixel_delta: f64, day_width_px: u32) -> i64 {
    if day_width_px == 0 || !pixel_delta.is_finite() {
        return 0;
    }
    (pixel_delta / f64::from(day_width_px)).round() as i64
}

fn checked_shift(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    Duration::try_days(days).and_then(|delta| date.checked_add_signed(delta))
}

/// Shift a date by whole days; out-of-range results leave it unchanged.
pub fn shift_date(date: NaiveDate, days: i64) -> NaiveDate {
    checked_shift(date, days).unwrap_or(date)
}

/// Apply `delta` days to `(start, end)` under `mode`.
///
/// The result always satisfies `start <= end`: resizing past the opposite
/// edge collapses the bar to a single day instead of inverting it, and an
/// already inverted input range is repaired by pulling `end` up to `start`.
/// A move that would push either edge past the representable calendar
/// leaves the bar where it was.
pub fn transform(
    mode: Manipulation,
    start: NaiveDate,
    end: NaiveDate,
    delta: i64,
) -> (NaiveDate, NaiveDate) {
    let end = end.max(start);
    let (start, end) = match mode {
        Manipulation::Move => match (checked_shift(start, delta), checked_shift(end, delta)) {
            (Some(start), Some(end)) => (start, end),
            _ => (start, end),
        },
        Manipulation::ResizeStart => (shift_date(start, delta).min(end), end),
        Manipulation::ResizeEnd => (start, shift_date(end, delta).max(start)),
    };
    (start, end.max(start))
}

/// Which part of a bar the pointer went down on, if any.
pub fn hit_test(pointer_x: f64, bar_left: f64, bar_width: f64, handle_px: f64) -> Option<Manipulation> {
    let bar_right = bar_left + bar_width;
    if pointer_x < bar_left || pointer_x > bar_right {
        return None;
    }
    if pointer_x < bar_left + handle_px {
        Some(Manipulation::ResizeStart)
    } else if pointer_x >= bar_right - handle_px {
        Some(Manipulation::ResizeEnd)
    } else {
        Some(Manipulation::Move)
    }
}

/// Whether a bar intersects the visible columns `[0, visible_columns)`.
pub fn is_visible(start_offset_days: i64, duration_days: i64, visible_columns: u32) -> bool {
    if duration_days <= 0 || visible_columns == 0 {
        return false;
    }
    let end_offset = start_offset_days + duration_days - 1;
    end_offset >= 0 && start_offset_days < i64::from(visible_columns)
}

/// Inclusive day count of a range.
pub fn duration_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days().max(0) + 1
}

/// The run of dates the timeline currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelineWindow {
    pub start: NaiveDate,
    pub days: u32,
}

impl TimelineWindow {
    pub fn new(start: NaiveDate, days: u32) -> Self {
        Self {
            start,
            days: days.max(1),
        }
    }

    /// A window of `days` columns with `date` in the middle column.
    pub fn centered_on(date: NaiveDate, days: u32) -> Self {
        let days = days.max(1);
        Self::new(shift_date(date, -i64::from(days / 2)), days)
    }

    /// Last visible date (inclusive).
    pub fn end(&self) -> NaiveDate {
        shift_date(self.start, i64::from(self.days) - 1)
    }

    pub fn offset_of(&self, date: NaiveDate) -> i64 {
        (date - self.start).num_days()
    }

    pub fn scroll(&mut self, days: i64) {
        self.start = shift_date(self.start, days);
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..i64::from(self.days)).map(move |offset| shift_date(self.start, offset))
    }
}

/// Where a task's bar sits relative to a window, in columns and pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarGeometry {
    pub task_id: TaskId,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub start_offset: i64,
    pub duration_days: i64,
    pub left_px: i64,
    pub width_px: i64,
    pub clipped_left: bool,
    pub clipped_right: bool,
}

/// Geometry for a task's bar, or `None` when unscheduled or off-screen.
pub fn bar_geometry(task: &Task, window: &TimelineWindow, day_width_px: u32) -> Option<BarGeometry> {
    let (start, end) = task.schedule()?;
    let end = end.max(start);
    let start_offset = window.offset_of(start);
    let duration = duration_days(start, end);
    if !is_visible(start_offset, duration, window.days) {
        return None;
    }
    let width = i64::from(day_width_px);
    Some(BarGeometry {
        task_id: task.id.clone(),
        start,
        end,
        start_offset,
        duration_days: duration,
        left_px: start_offset * width,
        width_px: duration * width,
        clipped_left: start_offset < 0,
        clipped_right: start_offset + duration > i64::from(window.days),
    })
}

/// Bars for every visible, scheduled, non-deleted task, in input order.
pub fn visible_bars(tasks: &[Task], window: &TimelineWindow, day_width_px: u32) -> Vec<BarGeometry> {
    tasks
        .iter()
        .filter(|task| !task.is_deleted())
        .filter_map(|task| bar_geometry(task, window, day_width_px))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Manipulating {
    pub task_id: TaskId,
    pub mode: Manipulation,
    pub origin_x: f64,
    pub current_x: f64,
    pub original_start: NaiveDate,
    pub original_end: NaiveDate,
}

impl Manipulating {
    fn candidate(&self, day_width_px: u32) -> (i64, NaiveDate, NaiveDate) {
        let delta = day_delta(self.current_x - self.origin_x, day_width_px);
        let (start, end) = transform(self.mode, self.original_start, self.original_end, delta);
        (delta, start, end)
    }
}

/// Live preview while the pointer moves. Never touches the overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub task_id: TaskId,
    pub mode: Manipulation,
    pub day_delta: i64,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Release {
    /// Nothing to persist: zero delta, or clamping left the dates unchanged.
    NoDelta { task_id: TaskId },
    Changed {
        task_id: TaskId,
        day_delta: i64,
        start: NaiveDate,
        end: NaiveDate,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum TimelineDrag {
    #[default]
    Idle,
    Manipulating(Manipulating),
}

impl TimelineDrag {
    pub fn is_active(&self) -> bool {
        matches!(self, TimelineDrag::Manipulating(_))
    }

    /// Start manipulating `task` from pointer position `x`.
    pub fn pointer_down(&mut self, task: &Task, mode: Manipulation, x: f64) -> Result<()> {
        if task.is_deleted() {
            return Err(Error::InvalidArgument(format!("task {} is deleted", task.id)));
        }
        let (start, end) = task.schedule().ok_or_else(|| {
            Error::InvalidArgument(format!("task {} has no dates to drag", task.id))
        })?;
        *self = TimelineDrag::Manipulating(Manipulating {
            task_id: task.id.clone(),
            mode,
            origin_x: x,
            current_x: x,
            original_start: start,
            original_end: end.max(start),
        });
        Ok(())
    }

    /// Track the pointer and return the clamped candidate dates.
    pub fn pointer_move(&mut self, x: f64, day_width_px: u32) -> Option<Preview> {
        match self {
            TimelineDrag::Manipulating(state) => {
                state.current_x = x;
                Some(Self::preview_of(state, day_width_px))
            }
            TimelineDrag::Idle => None,
        }
    }

    pub fn preview(&self, day_width_px: u32) -> Option<Preview> {
        match self {
            TimelineDrag::Manipulating(state) => Some(Self::preview_of(state, day_width_px)),
            TimelineDrag::Idle => None,
        }
    }

    /// Finish the gesture at `x`. Returns `None` if nothing was in progress.
    pub fn pointer_up(&mut self, x: f64, day_width_px: u32) -> Option<Release> {
        let TimelineDrag::Manipulating(mut state) = std::mem::take(self) else {
            return None;
        };
        state.current_x = x;
        let (delta, start, end) = state.candidate(day_width_px);
        if delta == 0 || (start == state.original_start && end == state.original_end) {
            return Some(Release::NoDelta {
                task_id: state.task_id,
            });
        }
        Some(Release::Changed {
            task_id: state.task_id,
            day_delta: delta,
            start,
            end,
        })
    }

    /// Abandon the gesture without persisting anything.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.is_active();
        *self = TimelineDrag::Idle;
        was_active
    }

    fn preview_of(state: &Manipulating, day_width_px: u32) -> Preview {
        let (delta, start, end) = state.candidate(day_width_px);
        Preview {
            task_id: state.task_id.clone(),
            mode: state.mode,
            day_delta: delta,
            start,
            end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Priority, TaskStatus};
    use chrono::Utc;

    const W: u32 = 40;

    #[test]
    fn manipulation_parses_cli_spellings() {
        assert_eq!("move".parse::<Manipulation>().ok(), Some(Manipulation::Move));
        assert_eq!("resize_start".parse::<Manipulation>().ok(), Some(Manipulation::ResizeStart));
        assert_eq!("END".parse::<Manipulation>().ok(), Some(Manipulation::ResizeEnd));
        assert!("stretch".parse::<Manipulation>().is_err());
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).expect("date")
    }

    fn task(start: Option<NaiveDate>, due: Option<NaiveDate>) -> Task {
        Task {
            id: TaskId::new("t"),
            project_id: "p".to_string(),
            title: "t".to_string(),
            status: TaskStatus::InProgress,
            assigned_to: None,
            priority: Priority::Medium,
            start_date: start,
            due_date: due,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn quantization_rounds_to_nearest_day() {
        assert_eq!(day_delta(0.0, W), 0);
        assert_eq!(day_delta(19.0, W), 0);
        assert_eq!(day_delta(20.0, W), 1);
        assert_eq!(day_delta(-20.0, W), -1);
        assert_eq!(day_delta(-19.9, W), 0);
        assert_eq!(day_delta(81.0, W), 2);
        assert_eq!(day_delta(100.0, 0), 0);
    }

    #[test]
    fn move_shifts_both_dates() {
        assert_eq!(
            transform(Manipulation::Move, date(3, 1), date(3, 5), 2),
            (date(3, 3), date(3, 7))
        );
        assert_eq!(
            transform(Manipulation::Move, date(3, 1), date(3, 5), -3),
            (date(2, 27), date(3, 2))
        );
    }

    #[test]
    fn resize_end_clamps_to_start() {
        assert_eq!(
            transform(Manipulation::ResizeEnd, date(3, 1), date(3, 5), -10),
            (date(3, 1), date(3, 1))
        );
        assert_eq!(
            transform(Manipulation::ResizeEnd, date(3, 1), date(3, 5), 3),
            (date(3, 1), date(3, 8))
        );
    }

    #[test]
    fn resize_start_clamps_to_end() {
        assert_eq!(
            transform(Manipulation::ResizeStart, date(3, 1), date(3, 5), 9),
            (date(3, 5), date(3, 5))
        );
        assert_eq!(
            transform(Manipulation::ResizeStart, date(3, 1), date(3, 5), -2),
            (date(2, 28), date(3, 5))
        );
    }

    #[test]
    fn ordering_holds_across_resize_sequences() {
        let modes = [
            Manipulation::ResizeStart,
            Manipulation::ResizeEnd,
            Manipulation::Move,
        ];
        let deltas = [-40_i64, -7, -1, 0, 1, 3, 12, 90];
        let (mut start, mut end) = (date(3, 1), date(3, 5));
        for round in 0..64 {
            let mode = modes[round % modes.len()];
            let delta = deltas[(round * 5 + 3) % deltas.len()];
            (start, end) = transform(mode, start, end, delta);
            assert!(start <= end, "inverted after {mode:?} by {delta}");
        }
    }

    #[test]
    fn inverted_input_is_repaired() {
        let (start, end) = transform(Manipulation::Move, date(3, 9), date(3, 2), 1);
        assert_eq!((start, end), (date(3, 10), date(3, 10)));
    }

    fn days_from(base: NaiveDate, days: i64) -> NaiveDate {
        base.checked_add_signed(Duration::days(days)).expect("in range")
    }

    #[test]
    fn move_past_calendar_edge_keeps_bar_in_place() {
        let start = days_from(NaiveDate::MAX, -4);
        let end = days_from(NaiveDate::MAX, -1);
        assert_eq!(transform(Manipulation::Move, start, end, 10), (start, end));
        // Start alone would fit; the move still has to carry both edges.
        assert_eq!(transform(Manipulation::Move, start, end, 3), (start, end));

        let start = days_from(NaiveDate::MIN, 3);
        let end = days_from(NaiveDate::MIN, 4);
        assert_eq!(transform(Manipulation::Move, start, end, -4), (start, end));
        assert_eq!(
            transform(Manipulation::Move, start, end, -3),
            (NaiveDate::MIN, days_from(NaiveDate::MIN, 1))
        );
    }

    #[test]
    fn resize_past_calendar_edge_stays_ordered() {
        let start = days_from(NaiveDate::MAX, -2);
        let end = NaiveDate::MAX;
        let (s, e) = transform(Manipulation::ResizeEnd, start, end, 5);
        assert!(s <= e);
        let (s, e) = transform(Manipulation::ResizeStart, start, end, i64::MAX);
        assert!(s <= e);
    }

    #[test]
    fn huge_drag_never_inverts_the_bar() {
        let mut drag = TimelineDrag::default();
        drag.pointer_down(&task(Some(date(3, 1)), Some(date(3, 5))), Manipulation::Move, 0.0)
            .expect("down");
        let preview = drag.pointer_move(3_800_258_080.0, W).expect("preview");
        assert!(preview.start <= preview.end);
        assert!(matches!(
            drag.pointer_up(3_800_258_080.0, W),
            Some(Release::NoDelta { .. })
        ));
    }

    #[test]
    fn hit_test_picks_handles_and_body() {
        assert_eq!(hit_test(102.0, 100.0, 120.0, 8.0), Some(Manipulation::ResizeStart));
        assert_eq!(hit_test(150.0, 100.0, 120.0, 8.0), Some(Manipulation::Move));
        assert_eq!(hit_test(215.0, 100.0, 120.0, 8.0), Some(Manipulation::ResizeEnd));
        assert_eq!(hit_test(99.0, 100.0, 120.0, 8.0), None);
        assert_eq!(hit_test(221.0, 100.0, 120.0, 8.0), None);
    }

    #[test]
    fn culling_treats_partial_overlap_as_visible() {
        // fully left, touching left edge, partial left
        assert!(!is_visible(-5, 5, 30));
        assert!(is_visible(-5, 6, 30));
        assert!(is_visible(-2, 10, 30));
        // inside, partial right, fully right
        assert!(is_visible(0, 1, 30));
        assert!(is_visible(29, 4, 30));
        assert!(!is_visible(30, 1, 30));
        // spans the whole window
        assert!(is_visible(-10, 100, 30));
        assert!(!is_visible(0, 0, 30));
    }

    #[test]
    fn bar_geometry_uses_inclusive_ranges() {
        let window = TimelineWindow::new(date(2, 28), 14);
        let bar = bar_geometry(&task(Some(date(3, 1)), Some(date(3, 5))), &window, W)
            .expect("visible");
        assert_eq!(bar.start_offset, 2);
        assert_eq!(bar.duration_days, 5);
        assert_eq!(bar.left_px, 80);
        assert_eq!(bar.width_px, 200);
        assert!(!bar.clipped_left && !bar.clipped_right);

        let single = bar_geometry(&task(None, Some(date(2, 28))), &window, W).expect("visible");
        assert_eq!(single.duration_days, 1);
        assert_eq!(single.left_px, 0);

        assert!(bar_geometry(&task(None, None), &window, W).is_none());
        assert!(bar_geometry(&task(Some(date(4, 1)), Some(date(4, 2))), &window, W).is_none());
    }

    #[test]
    fn window_navigation() {
        let mut window = TimelineWindow::centered_on(date(3, 15), 7);
        assert_eq!(window.start, date(3, 12));
        assert_eq!(window.end(), date(3, 18));
        assert_eq!(window.dates().count(), 7);
        window.scroll(-12);
        assert_eq!(window.start, date(2, 29));
        assert_eq!(window.offset_of(date(3, 1)), 1);
    }

    #[test]
    fn drag_body_two_columns_moves_dates() {
        let mut drag = TimelineDrag::default();
        drag.pointer_down(&task(Some(date(3, 1)), Some(date(3, 5))), Manipulation::Move, 300.0)
            .expect("down");
        let preview = drag.pointer_move(345.0, W).expect("preview");
        assert_eq!(preview.day_delta, 1);
        assert_eq!(
            drag.pointer_up(380.0, W),
            Some(Release::Changed {
                task_id: TaskId::new("t"),
                day_delta: 2,
                start: date(3, 3),
                end: date(3, 7),
            })
        );
        assert!(!drag.is_active());
    }

    #[test]
    fn right_handle_far_left_collapses_to_start() {
        let mut drag = TimelineDrag::default();
        drag.pointer_down(&task(Some(date(3, 1)), Some(date(3, 5))), Manipulation::ResizeEnd, 500.0)
            .expect("down");
        let preview = drag.pointer_move(100.0, W).expect("preview");
        assert_eq!((preview.start, preview.end), (date(3, 1), date(3, 1)));
        assert_eq!(
            drag.pointer_up(100.0, W),
            Some(Release::Changed {
                task_id: TaskId::new("t"),
                day_delta: -10,
                start: date(3, 1),
                end: date(3, 1),
            })
        );
    }

    #[test]
    fn sub_column_release_is_a_no_op() {
        let mut drag = TimelineDrag::default();
        drag.pointer_down(&task(Some(date(3, 1)), Some(date(3, 5))), Manipulation::Move, 10.0)
            .expect("down");
        drag.pointer_move(90.0, W);
        assert_eq!(
            drag.pointer_up(25.0, W),
            Some(Release::NoDelta {
                task_id: TaskId::new("t")
            })
        );
    }

    #[test]
    fn clamped_to_unchanged_is_a_no_op() {
        let mut drag = TimelineDrag::default();
        drag.pointer_down(&task(Some(date(3, 5)), Some(date(3, 5))), Manipulation::ResizeEnd, 0.0)
            .expect("down");
        assert!(matches!(drag.pointer_up(-120.0, W), Some(Release::NoDelta { .. })));
    }

    #[test]
    fn cancel_discards_gesture() {
        let mut drag = TimelineDrag::default();
        drag.pointer_down(&task(Some(date(3, 1)), None), Manipulation::Move, 0.0)
            .expect("down");
        assert!(drag.cancel());
        assert!(!drag.cancel());
        assert_eq!(drag.pointer_up(400.0, W), None);
    }

    #[test]
    fn unscheduled_task_cannot_be_dragged() {
        let mut drag = TimelineDrag::default();
        let err = drag
            .pointer_down(&task(None, None), Manipulation::Move, 0.0)
            .expect_err("no dates");
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(!drag.is_active());
    }
}
