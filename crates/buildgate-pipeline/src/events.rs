//! Admission event system for observability.
//!
//! Emits [`AdmissionEvent`]s via a [`tokio::sync::broadcast`] channel so that
//! observers (loggers, build queue UIs, tests) can follow admission runs
//! without coupling to the pipeline internals.

use buildgate_types::{PartId, Rejection, RunId};
use serde::{Deserialize, Serialize};

use crate::operator::DecisionChoice;
use crate::steps::CheckStep;

/// Events emitted while a vessel moves through the admission pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AdmissionEvent {
    RunStarted {
        run_id: RunId,
        vessel: String,
    },
    /// The session does not enforce limits; the vessel was admitted unchecked.
    Bypassed {
        run_id: RunId,
        vessel: String,
    },
    StepSkipped {
        run_id: RunId,
        step: CheckStep,
    },
    StepPassed {
        run_id: RunId,
        step: CheckStep,
    },
    DecisionRequested {
        run_id: RunId,
        title: String,
        options: Vec<String>,
    },
    DecisionAnswered {
        run_id: RunId,
        choice: DecisionChoice,
    },
    PartsUnlocked {
        run_id: RunId,
        parts: Vec<PartId>,
        cost: f64,
    },
    RunAdmitted {
        run_id: RunId,
        vessel: String,
        duration_ms: u64,
    },
    RunRejected {
        run_id: RunId,
        vessel: String,
        step: CheckStep,
        reason: Rejection,
    },
}

/// Events buffered per subscriber before a slow one starts lagging.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Fan-out of admission events to every subscribed observer.
///
/// Clones share one channel, so a build queue UI subscribed once sees runs
/// from every pipeline holding a clone.
#[derive(Clone)]
pub struct EventEmitter {
    sender: tokio::sync::broadcast::Sender<AdmissionEvent>,
}

impl EventEmitter {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = tokio::sync::broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a run event. Runs never wait on observers; with nobody
    /// subscribed the event is discarded.
    pub fn emit(&self, event: AdmissionEvent) {
        let _ = self.sender.send(event);
    }

    /// Follow runs started after this call.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<AdmissionEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
