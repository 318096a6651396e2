//! taskboard - optimistic task mutation and direct-manipulation scheduling
//!
//! A kanban board and a timeline (Gantt) view share one optimistic overlay of
//! a project's tasks. Gestures become patches that are applied locally first,
//! sent to the task store, and reverted if the store rejects them.
//!
//! # Core Concepts
//!
//! - **Overlay**: canonical snapshot plus an append-only log of pending patches
//! - **Permission gate**: who may move a task, and when completion needs proof
//! - **Kanban drag**: lane-to-lane status changes
//! - **Timeline drag**: pixel deltas quantized into whole-day date shifts
//! - **Palette**: stable per-task colors derived from creation order
//!
//! # Module Organization
//!
//! - `task`: Task, patch and membership data model
//! - `store`: Task store client trait with in-memory and JSON file backends
//! - `overlay`: Optimistic overlay and mutation log
//! - `permission` / `proof`: Permission gate and proof-of-work boundary
//! - `kanban` / `timeline`: Gesture engines
//! - `palette`: Color assignment
//! - `board`: Coordinator tying engines, gate, overlay and store together
//! - `config`: Configuration loading from `.taskboard.toml`
//! - `error`: Error types and result aliases
//! - `cli` / `output`: Developer CLI harness
//! - `lock`: File locking and atomic writes for the JSON store

pub mod actor;
pub mod board;
pub mod cli;
pub mod config;
pub mod error;
pub mod kanban;
pub mod lock;
pub mod notice;
pub mod output;
pub mod overlay;
pub mod palette;
pub mod permission;
pub mod proof;
pub mod store;
pub mod task;
pub mod timeline;

pub use board::Board;
pub use error::{Error, Result};
