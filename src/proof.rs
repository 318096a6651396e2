//! Boundary to the proof-of-work approval flow.
//!
//! The flow owns its own submission lifecycle. On approval it writes
//! `status = completed` through the store itself; the board only notices
//! on its next canonical refresh.

use std::sync::{Arc, Mutex};

use crate::task::Task;

pub trait ProofGate: Send + Sync {
    fn open_proof_flow(&self, task: &Task);
}

/// Proof gate that records every request, for hosts that present the flow
/// later (the CLI prints them) and for tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingProofGate {
    requests: Arc<Mutex<Vec<Task>>>,
}

impl RecordingProofGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<Task> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl ProofGate for RecordingProofGate {
    fn open_proof_flow(&self, task: &Task) {
        tracing::info!(task = %task.id, "opening proof-of-work flow");
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(task.clone());
    }
}
