//! Collaborator contracts the admission pipeline consumes.
//!
//! None of these are implemented by the pipeline itself: the host supplies
//! them (see [`crate::memory`] for in-process reference implementations).

use std::sync::Arc;

use buildgate_types::{Part, PartRequirement, Vessel};

use crate::prompt::UserPrompt;

/// Reports whether the current session enforces economy and facility limits.
pub trait SessionMode: Send + Sync {
    fn is_constrained_economy(&self) -> bool;
}

/// Checks a vessel against the capabilities of the facility it is built in.
pub trait FacilityChecker: Send + Sync {
    /// Returns one human-readable description per violated requirement.
    ///
    /// With `allow_soft_pass` set, only checks that still permit building
    /// are evaluated.
    fn evaluate(&self, vessel: &Vessel, allow_soft_pass: bool) -> Vec<String>;
}

pub trait FundsLedger: Send + Sync {
    fn current_balance(&self) -> f64;

    /// Debits `amount`. Returns `false` and leaves the balance untouched when
    /// the debit cannot be made.
    fn spend(&self, amount: f64) -> bool;
}

pub trait PartInspector: Send + Sync {
    /// Parts that cannot be built under any circumstances right now.
    fn locked_parts(&self, vessel: &Vessel) -> Vec<PartRequirement>;

    /// Parts that become buildable once purchased.
    fn experimental_parts(&self, vessel: &Vessel) -> Vec<PartRequirement>;
}

pub trait TechRegistry: Send + Sync {
    /// Whether the tech node a part depends on has been researched.
    fn is_researched(&self, part: &Part) -> bool;
}

pub trait UnlockRegistry: Send + Sync {
    /// Combined one-time cost of purchasing `parts`.
    fn unlock_cost(&self, parts: &[Part]) -> f64;

    /// Marks `parts` as purchased. Unlocking an already purchased part is a no-op.
    fn unlock(&self, parts: &[Part]);
}

/// Handles to every collaborator a run needs.
#[derive(Clone)]
pub struct Services {
    pub session: Arc<dyn SessionMode>,
    pub facility: Arc<dyn FacilityChecker>,
    pub ledger: Arc<dyn FundsLedger>,
    pub parts: Arc<dyn PartInspector>,
    pub tech: Arc<dyn TechRegistry>,
    pub unlocks: Arc<dyn UnlockRegistry>,
    pub prompt: Arc<dyn UserPrompt>,
}
