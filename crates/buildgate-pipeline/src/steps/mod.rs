//! The individual admission checks and the order they run in.

pub mod facility;
pub mod funds;
pub mod parts;

use std::fmt;

use buildgate_types::{Rejection, ValidationConfig, Vessel};
use serde::{Deserialize, Serialize};

use crate::services::Services;

pub use parts::PendingUnlock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStep {
    Facility,
    Funds,
    Parts,
    /// Second funds gate, run after parts have possibly been paid for.
    FundsRecheck,
}

/// Fixed order every constrained admission runs in.
pub const CHECK_ORDER: [CheckStep; 4] = [
    CheckStep::Facility,
    CheckStep::Funds,
    CheckStep::Parts,
    CheckStep::FundsRecheck,
];

/// What a single check decided.
#[derive(Debug)]
pub enum StepResult {
    Pass,
    Reject(Rejection),
    /// The check needs an operator decision before it can pass or reject.
    AwaitDecision(PendingUnlock),
}

impl CheckStep {
    pub fn is_enabled(self, config: &ValidationConfig) -> bool {
        match self {
            CheckStep::Facility => config.check_facility_requirements,
            CheckStep::Funds | CheckStep::FundsRecheck => config.check_available_funds,
            CheckStep::Parts => config.check_part_availability,
        }
    }

    /// Run the check. Callers are expected to consult [`is_enabled`](Self::is_enabled) first.
    pub fn apply(self, vessel: &Vessel, services: &Services) -> StepResult {
        match self {
            CheckStep::Facility => facility::check(vessel, services),
            CheckStep::Funds | CheckStep::FundsRecheck => funds::check(vessel, services),
            CheckStep::Parts => parts::check(vessel, services),
        }
    }
}

impl fmt::Display for CheckStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckStep::Facility => "facility",
            CheckStep::Funds => "funds",
            CheckStep::Parts => "parts",
            CheckStep::FundsRecheck => "funds_recheck",
        };
        f.write_str(name)
    }
}
