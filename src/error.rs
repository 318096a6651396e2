//! Error types for taskboard
//!
//! Exit codes used by the CLI harness:
//! - 0: Success
//! - 2: User error (bad args, unknown task, bad config)
//! - 3: Blocked by policy (permission denied, mutation already in flight)
//! - 4: Operation failed (store rejected the commit, IO error)
//!
//! Out-of-range resizes are not errors: the timeline clamps them.

use std::path::PathBuf;
use thiserror::Error;

use crate::task::TaskId;

/// Exit codes for the taskboard CLI
pub mod exit_codes {
    pub const USER_ERROR: i32 = 2;
    pub const POLICY_BLOCKED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for taskboard operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Overlay entry not found: {0}")]
    OverlayEntryNotFound(u64),

    // Policy blocks (exit code 3)
    #[error("Permission denied: {actor} may not move task {task}")]
    PermissionDenied { actor: String, task: TaskId },

    #[error("Task {0} already has a change in flight")]
    MutationInFlight(TaskId),

    // Operation failures (exit code 4)
    #[error("Commit failed for task {task}: {reason}")]
    CommitFailed { task: TaskId, reason: String },

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::TaskNotFound(_)
            | Error::OverlayEntryNotFound(_) => exit_codes::USER_ERROR,

            // Policy blocks
            Error::PermissionDenied { .. } | Error::MutationInFlight(_) => {
                exit_codes::POLICY_BLOCKED
            }

            // Operation failures
            Error::CommitFailed { .. }
            | Error::Store(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::LockFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON output, when the error carries any.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::PermissionDenied { actor, task } => Some(serde_json::json!({
                "actor": actor,
                "task": task,
            })),
            Error::CommitFailed { task, reason } => Some(serde_json::json!({
                "task": task,
                "reason": reason,
            })),
            Error::MutationInFlight(task) | Error::TaskNotFound(task) => {
                Some(serde_json::json!({ "task": task }))
            }
            _ => None,
        }
    }
}

/// Result type alias for taskboard operations
pub type Result<T> = std::result::Result<T, Error>;
