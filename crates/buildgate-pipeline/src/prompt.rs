//! Prompt surface for non-suspending operator notifications.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where a transient message is shown on screen. Admission messages all go
/// to the top center of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    UpperCenter,
}

pub trait UserPrompt: Send + Sync {
    /// Acknowledgeable warning dialog.
    fn warn(&self, title: &str, body: &str);

    /// Non-modal message that dismisses itself after `duration`.
    fn transient_message(&self, text: &str, duration: Duration, placement: Placement);

    /// Informational modal with a single acknowledge button.
    fn inform(&self, title: &str, body: &str);
}

/// A notification as it was shown to the operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Warning {
        title: String,
        body: String,
    },
    Transient {
        text: String,
        duration: Duration,
        placement: Placement,
    },
    Info {
        title: String,
        body: String,
    },
}

impl Notice {
    /// Every piece of text carried by the notice, joined by newlines.
    pub fn text(&self) -> String {
        match self {
            Notice::Warning { title, body } | Notice::Info { title, body } => {
                format!("{title}\n{body}")
            }
            Notice::Transient { text, .. } => text.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// ConsolePrompt
// ---------------------------------------------------------------------------

pub struct ConsolePrompt;

impl UserPrompt for ConsolePrompt {
    fn warn(&self, title: &str, body: &str) {
        println!("\n[!] {title}\n{body}\n    [Acknowledged]");
    }

    fn transient_message(&self, text: &str, duration: Duration, _placement: Placement) {
        println!("\n>>> {text} ({}s)", duration.as_secs_f32());
    }

    fn inform(&self, title: &str, body: &str) {
        println!("\n[i] {title}\n{body}\n    [Acknowledged]");
    }
}

// ---------------------------------------------------------------------------
// RecordingPrompt
// ---------------------------------------------------------------------------

/// Keeps every notice in memory instead of displaying it.
#[derive(Default)]
pub struct RecordingPrompt {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_empty(&self) -> bool {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    fn record(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}

impl UserPrompt for RecordingPrompt {
    fn warn(&self, title: &str, body: &str) {
        self.record(Notice::Warning {
            title: title.to_string(),
            body: body.to_string(),
        });
    }

    fn transient_message(&self, text: &str, duration: Duration, placement: Placement) {
        self.record(Notice::Transient {
            text: text.to_string(),
            duration,
            placement,
        });
    }

    fn inform(&self, title: &str, body: &str) {
        self.record(Notice::Info {
            title: title.to_string(),
            body: body.to_string(),
        });
    }
}
