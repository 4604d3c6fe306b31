//! Operator decisions: the one point where an admission run suspends.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use buildgate_types::{BuildgateError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionChoice {
    /// Dismiss the dialog without doing anything.
    Acknowledge,
    /// Pay for the offered unlock and continue the admission.
    UnlockAndProceed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionOption {
    pub label: String,
    pub choice: DecisionChoice,
}

/// Modal decision presented to the operator. Options are in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub title: String,
    pub body: String,
    pub options: Vec<DecisionOption>,
}

impl DecisionRequest {
    pub fn label_for(&self, choice: DecisionChoice) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.choice == choice)
            .map(|o| o.label.as_str())
    }

    pub fn choice_for_label(&self, label: &str) -> Option<DecisionChoice> {
        self.options
            .iter()
            .find(|o| o.label == label)
            .map(|o| o.choice)
    }
}

#[async_trait]
pub trait Operator: Send + Sync {
    async fn decide(&self, request: &DecisionRequest) -> Result<DecisionChoice>;
}

// ---------------------------------------------------------------------------
// AutoApproveOperator
// ---------------------------------------------------------------------------

/// Always takes the unlock offer when there is one.
pub struct AutoApproveOperator;

#[async_trait]
impl Operator for AutoApproveOperator {
    async fn decide(&self, request: &DecisionRequest) -> Result<DecisionChoice> {
        if request.label_for(DecisionChoice::UnlockAndProceed).is_some() {
            Ok(DecisionChoice::UnlockAndProceed)
        } else {
            Ok(DecisionChoice::Acknowledge)
        }
    }
}

// ---------------------------------------------------------------------------
// DeclineOperator
// ---------------------------------------------------------------------------

pub struct DeclineOperator;

#[async_trait]
impl Operator for DeclineOperator {
    async fn decide(&self, _request: &DecisionRequest) -> Result<DecisionChoice> {
        Ok(DecisionChoice::Acknowledge)
    }
}

// ---------------------------------------------------------------------------
// ConsoleOperator
// ---------------------------------------------------------------------------

pub struct ConsoleOperator;

#[async_trait]
impl Operator for ConsoleOperator {
    async fn decide(&self, request: &DecisionRequest) -> Result<DecisionChoice> {
        println!("\n{}\n{}", request.title, request.body);
        for (i, option) in request.options.iter().enumerate() {
            println!("  [{}] {}", i + 1, option.label);
        }
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        let trimmed = input.trim();
        if let Ok(idx) = trimmed.parse::<usize>() {
            if idx > 0 && idx <= request.options.len() {
                return Ok(request.options[idx - 1].choice);
            }
        }
        request
            .choice_for_label(trimmed)
            .ok_or_else(|| BuildgateError::UnknownChoice(trimmed.to_string()))
    }
}

// ---------------------------------------------------------------------------
// RecordingOperator
// ---------------------------------------------------------------------------

/// Plays back scripted answers and records every request it was shown.
///
/// Once the script runs out it fails with [`BuildgateError::OperatorUnavailable`].
pub struct RecordingOperator {
    answers: Mutex<Vec<DecisionChoice>>,
    requests: Mutex<Vec<DecisionRequest>>,
}

impl RecordingOperator {
    pub fn new(answers: Vec<DecisionChoice>) -> Self {
        let mut reversed = answers;
        reversed.reverse();
        Self {
            answers: Mutex::new(reversed),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<DecisionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Operator for RecordingOperator {
    async fn decide(&self, request: &DecisionRequest) -> Result<DecisionChoice> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        self.answers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .ok_or_else(|| BuildgateError::OperatorUnavailable {
                title: request.title.clone(),
                message: "no scripted answer left".into(),
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
