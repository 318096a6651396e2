//! Command-line interface for taskboard
//!
//! A developer harness that drives one board against a JSON store file.
//! Each subcommand is defined in its own submodule.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::actor;
use crate::board::Board;
use crate::config::Config;
use crate::error::Result;
use crate::output::{HumanOutput, OutputOptions};
use crate::proof::RecordingProofGate;
use crate::store::JsonTaskStore;

mod board;
mod move_task;
mod shift;
mod timeline;

/// Store file used when `--store` is not given, relative to the root.
pub const DEFAULT_STORE_FILENAME: &str = "taskboard.json";

/// taskboard - kanban and timeline boards with optimistic updates
#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Working root holding .taskboard.toml (defaults to current directory)
    #[arg(long, global = true, env = "TASKBOARD_ROOT")]
    pub root: Option<PathBuf>,

    /// Task store file (defaults to <root>/taskboard.json)
    #[arg(long, global = true, env = "TASKBOARD_STORE")]
    pub store: Option<PathBuf>,

    /// Acting user id
    #[arg(long, global = true)]
    pub actor: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the kanban lanes of a project
    Board {
        /// Project id
        #[arg(long)]
        project: String,
    },

    /// Drag a task onto another lane
    Move {
        /// Task id
        task: String,

        /// Target lane: not_started, in_progress, completed (or todo, doing, done)
        lane: String,

        /// Project id
        #[arg(long)]
        project: String,
    },

    /// Drag or resize a task's bar on the timeline
    Shift {
        /// Task id
        task: String,

        /// Manipulation: move, resize-start, resize-end
        #[arg(long, default_value = "move")]
        mode: String,

        /// Horizontal pointer travel in pixels (negative drags left)
        #[arg(long, allow_hyphen_values = true)]
        px: f64,

        /// Project id
        #[arg(long)]
        project: String,
    },

    /// Show timeline bars for a window of days
    Timeline {
        /// Project id
        #[arg(long)]
        project: String,

        /// First visible day (YYYY-MM-DD); defaults to a window centered on today
        #[arg(long)]
        from: Option<chrono::NaiveDate>,

        /// Number of visible days (defaults to board.default_visible_days)
        #[arg(long)]
        days: Option<u32>,
    },
}

/// Everything a command needs: a loaded board plus where proof requests land.
pub(crate) struct Session {
    pub board: Board,
    pub proofs: RecordingProofGate,
    pub options: OutputOptions,
}

impl Session {
    async fn open(cli: &GlobalArgs, project: &str) -> Result<Self> {
        let root = cli.root.clone().unwrap_or_else(|| {
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        });
        let config = Config::load_from_root(&root);
        let actor = actor::resolve_actor(cli.actor.as_deref(), &config);
        let store_path = cli
            .store
            .clone()
            .unwrap_or_else(|| root.join(DEFAULT_STORE_FILENAME));
        tracing::debug!(store = %store_path.display(), %actor, project, "opening board");

        let proofs = RecordingProofGate::new();
        let board = Board::open(
            project,
            actor,
            config.board,
            Arc::new(JsonTaskStore::new(store_path)),
            Arc::new(proofs.clone()),
        )
        .await?;

        Ok(Self {
            board,
            proofs,
            options: OutputOptions {
                json: cli.json,
                quiet: cli.quiet,
            },
        })
    }

    /// Move board notices and pending proof requests into the human output.
    pub fn collect_notices(&mut self, human: &mut HumanOutput) {
        let notices = self.board.drain_notices();
        human.push_notices(&notices);
        for task in self.proofs.requests() {
            human.push_next_step(format!("submit proof of work for {}", task.id));
        }
    }
}

/// Global flags shared by every subcommand.
struct GlobalArgs {
    root: Option<PathBuf>,
    store: Option<PathBuf>,
    actor: Option<String>,
    json: bool,
    quiet: bool,
}

impl Cli {
    /// Run the CLI command on a single-threaded runtime.
    pub fn run(self) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.dispatch())
    }

    async fn dispatch(self) -> Result<()> {
        let global = GlobalArgs {
            root: self.root,
            store: self.store,
            actor: self.actor,
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Board { project } => {
                let session = Session::open(&global, &project).await?;
                board::run(session)
            }
            Commands::Move {
                task,
                lane,
                project,
            } => {
                let lane = lane.parse()?;
                let session = Session::open(&global, &project).await?;
                move_task::run(session, task.into(), lane).await
            }
            Commands::Shift {
                task,
                mode,
                px,
                project,
            } => {
                let mode = mode.parse()?;
                let session = Session::open(&global, &project).await?;
                shift::run(session, task.into(), mode, px).await
            }
            Commands::Timeline {
                project,
                from,
                days,
            } => {
                let session = Session::open(&global, &project).await?;
                timeline::run(session, from, days)
            }
        }
    }
}
