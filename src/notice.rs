//! User-visible notices raised by the board.
//!
//! Nothing here is fatal: a notice tells the user a gesture did not stick
//! (or was redirected) and they may retry.

use serde::Serialize;

use crate::task::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
}

impl Notice {
    pub fn info(task_id: &TaskId, message: impl Into<String>) -> Self {
        Self::with_kind(NoticeKind::Info, task_id, message)
    }

    pub fn warning(task_id: &TaskId, message: impl Into<String>) -> Self {
        Self::with_kind(NoticeKind::Warning, task_id, message)
    }

    pub fn error(task_id: &TaskId, message: impl Into<String>) -> Self {
        Self::with_kind(NoticeKind::Error, task_id, message)
    }

    fn with_kind(kind: NoticeKind, task_id: &TaskId, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            task_id: Some(task_id.clone()),
        }
    }
}

/// Pending notices, oldest first.
#[derive(Debug, Clone, Default)]
pub struct Notices {
    entries: Vec<Notice>,
}

impl Notices {
    pub fn push(&mut self, notice: Notice) {
        self.entries.push(notice);
    }

    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.entries)
    }

    pub fn as_slice(&self) -> &[Notice] {
        &self.entries
    }
}
