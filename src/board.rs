//! One project's board: both views over a shared overlay.
//!
//! Control flow for every gesture:
//!
//! ```text
//! pointer events ─► engine (pixel math / lane) ─► permission gate
//!     ├─► overlay.apply ─► store.update_task ─► overlay.resolve ─► refresh
//!     └─► proof gate (status untouched)
//! ```
//!
//! Applying always happens before committing. Gestures that produce no net
//! change never reach the store.

use std::sync::Arc;

use serde::Serialize;

use crate::config::BoardConfig;
use crate::error::{Error, Result};
use crate::kanban::{self, DropContext, DropOutcome, KanbanDrag, Lane};
use crate::notice::Notice;
use crate::overlay::{CommitRequest, Overlay, OverlayId};
use crate::palette::ColorMap;
use crate::proof::ProofGate;
use crate::store::TaskStoreClient;
use crate::task::{ProjectMember, Task, TaskId, TaskPatch};
use crate::timeline::{
    self, BarGeometry, Manipulation, Preview, Release, TimelineDrag, TimelineWindow,
};

/// What releasing a timeline gesture did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ReleaseOutcome {
    /// No gesture was in progress.
    Idle,
    /// Released without a net change; nothing sent to the store.
    NoChange { task_id: TaskId },
    /// The task already has a change in flight.
    InFlight { task_id: TaskId },
    Applied {
        overlay_id: OverlayId,
        task_id: TaskId,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
}

impl ReleaseOutcome {
    pub fn overlay_id(&self) -> Option<OverlayId> {
        match self {
            ReleaseOutcome::Applied { overlay_id, .. } => Some(*overlay_id),
            _ => None,
        }
    }
}

pub struct Board {
    project_id: String,
    actor_id: String,
    config: BoardConfig,
    store: Arc<dyn TaskStoreClient>,
    proof_gate: Arc<dyn ProofGate>,
    overlay: Overlay,
    members: Vec<ProjectMember>,
    colors: ColorMap,
    kanban: KanbanDrag,
    timeline: TimelineDrag,
}

impl Board {
    /// Build a board and load its canonical state from the store.
    pub async fn open(
        project_id: impl Into<String>,
        actor_id: impl Into<String>,
        config: BoardConfig,
        store: Arc<dyn TaskStoreClient>,
        proof_gate: Arc<dyn ProofGate>,
    ) -> Result<Self> {
        let colors = ColorMap::new(config.palette_size);
        let mut board = Self {
            project_id: project_id.into(),
            actor_id: actor_id.into(),
            config,
            store,
            proof_gate,
            overlay: Overlay::default(),
            members: Vec::new(),
            colors,
            kanban: KanbanDrag::Idle,
            timeline: TimelineDrag::Idle,
        };
        board.refresh().await?;
        Ok(board)
    }

    /// Pull the canonical task list and membership from the store.
    ///
    /// Tasks with a change in flight keep their optimistic values.
    pub async fn refresh(&mut self) -> Result<()> {
        let tasks = self.store.list_tasks(&self.project_id).await?;
        let members = self.store.list_members(&self.project_id).await?;
        self.install_snapshot(tasks, members);
        Ok(())
    }

    /// Install a canonical snapshot pushed from upstream (poll or subscription).
    pub fn install_snapshot(&mut self, tasks: Vec<Task>, members: Vec<ProjectMember>) {
        self.colors.sync(&tasks);
        self.overlay.refresh(tasks);
        self.members = members;
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn actor_id(&self) -> &str {
        &self.actor_id
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn members(&self) -> &[ProjectMember] {
        &self.members
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn store(&self) -> Arc<dyn TaskStoreClient> {
        Arc::clone(&self.store)
    }

    /// The rendered collection shared by both views.
    pub fn tasks(&self) -> &[Task] {
        self.overlay.tasks()
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.overlay.task(id)
    }

    pub fn lanes(&self) -> Vec<(Lane, Vec<&Task>)> {
        kanban::lanes(self.overlay.tasks())
    }

    pub fn color_slot(&self, id: &TaskId) -> Option<usize> {
        self.colors.slot(id)
    }

    pub fn colors(&self) -> &ColorMap {
        &self.colors
    }

    pub fn default_window(&self, today: chrono::NaiveDate) -> TimelineWindow {
        TimelineWindow::centered_on(today, self.config.default_visible_days)
    }

    pub fn timeline_bars(&self, window: &TimelineWindow) -> Vec<BarGeometry> {
        timeline::visible_bars(self.overlay.tasks(), window, self.config.day_column_width_px)
    }

    pub fn notices(&self) -> &[Notice] {
        self.overlay.notices()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.overlay.drain_notices()
    }

    // Kanban

    pub fn begin_kanban_drag(&mut self, task_id: &TaskId) -> Result<()> {
        let task = self
            .overlay
            .task(task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.clone()))?;
        self.kanban.begin(task)
    }

    pub fn cancel_kanban_drag(&mut self) {
        self.kanban.cancel();
    }

    /// Drop the dragged task. An allowed move is applied but not yet committed.
    pub fn drop_on_lane(&mut self, target: Option<Lane>) -> Result<DropOutcome> {
        self.kanban.drop_on(
            target,
            DropContext {
                actor_id: &self.actor_id,
                members: &self.members,
                overlay: &mut self.overlay,
                proof_gate: self.proof_gate.as_ref(),
            },
        )
    }

    /// Drop the dragged task and, if a change was applied, commit it.
    pub async fn drop_and_commit(&mut self, target: Option<Lane>) -> Result<DropOutcome> {
        let outcome = self.drop_on_lane(target)?;
        if let Some(id) = outcome.overlay_id() {
            self.commit(id).await?;
        }
        Ok(outcome)
    }

    // Timeline

    pub fn begin_timeline_drag(&mut self, task_id: &TaskId, mode: Manipulation, x: f64) -> Result<()> {
        let task = self
            .overlay
            .task(task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.clone()))?;
        self.timeline.pointer_down(task, mode, x)
    }

    /// Pick the manipulation mode from where on the bar the pointer went down.
    pub fn begin_timeline_drag_at(
        &mut self,
        task_id: &TaskId,
        window: &TimelineWindow,
        x: f64,
    ) -> Result<()> {
        let task = self
            .overlay
            .task(task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.clone()))?;
        let bar = timeline::bar_geometry(task, window, self.config.day_column_width_px)
            .ok_or_else(|| {
                Error::InvalidArgument(format!("task {task_id} is not on the timeline"))
            })?;
        let mode = timeline::hit_test(
            x,
            bar.left_px as f64,
            bar.width_px as f64,
            f64::from(self.config.handle_width_px),
        )
        .ok_or_else(|| Error::InvalidArgument(format!("pointer is outside task {task_id}")))?;
        self.timeline.pointer_down(task, mode, x)
    }

    pub fn timeline_pointer_move(&mut self, x: f64) -> Option<Preview> {
        self.timeline.pointer_move(x, self.config.day_column_width_px)
    }

    pub fn timeline_preview(&self) -> Option<Preview> {
        self.timeline.preview(self.config.day_column_width_px)
    }

    pub fn cancel_timeline_drag(&mut self) -> bool {
        self.timeline.cancel()
    }

    /// Release the timeline gesture. A net change is applied but not committed.
    pub fn release_timeline_drag(&mut self, x: f64) -> Result<ReleaseOutcome> {
        let Some(release) = self.timeline.pointer_up(x, self.config.day_column_width_px) else {
            return Ok(ReleaseOutcome::Idle);
        };
        match release {
            Release::NoDelta { task_id } => Ok(ReleaseOutcome::NoChange { task_id }),
            Release::Changed {
                task_id,
                day_delta,
                start,
                end,
            } => match self.overlay.apply(&task_id, TaskPatch::dates(start, end)) {
                Ok(overlay_id) => {
                    tracing::debug!(task = %task_id, day_delta, %start, %end, "timeline release applied");
                    Ok(ReleaseOutcome::Applied {
                        overlay_id,
                        task_id,
                        start,
                        end,
                    })
                }
                Err(Error::MutationInFlight(_)) => {
                    self.overlay.push_notice(Notice::warning(
                        &task_id,
                        "This task is still saving; try again in a moment",
                    ));
                    Ok(ReleaseOutcome::InFlight { task_id })
                }
                Err(err) => Err(err),
            },
        }
    }

    /// Release the timeline gesture and commit any applied change.
    pub async fn release_and_commit(&mut self, x: f64) -> Result<ReleaseOutcome> {
        let outcome = self.release_timeline_drag(x)?;
        if let Some(id) = outcome.overlay_id() {
            self.commit(id).await?;
        }
        Ok(outcome)
    }

    // Commit

    /// The request for a pending change, for hosts that run several store
    /// calls concurrently. Pair with [`Board::finish_commit`].
    pub fn begin_commit(&self, id: OverlayId) -> Result<CommitRequest> {
        self.overlay.commit_request(id)
    }

    /// Record the store's answer for a change started with [`Board::begin_commit`].
    pub fn finish_commit(&mut self, id: OverlayId, outcome: Result<()>) -> Result<()> {
        self.overlay.resolve(id, outcome)
    }

    /// Send a pending change to the store and settle it.
    ///
    /// On failure the task is reverted, a notice is raised and `CommitFailed`
    /// is returned. On success the board resynchronizes with the store.
    pub async fn commit(&mut self, id: OverlayId) -> Result<()> {
        let request = self.overlay.commit_request(id)?;
        let outcome = self
            .store
            .update_task(&request.task_id, &request.patch)
            .await;
        self.overlay.resolve(id, outcome)?;

        if let Err(err) = self.refresh().await {
            tracing::warn!(error = %err, "refresh after commit failed; keeping local state");
        }
        Ok(())
    }
}
