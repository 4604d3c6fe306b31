//! Part availability check with the experimental-part unlock offer.
//!
//! ```text
//! Start --no issues--------------------------> Pass
//! Start --locked parts-----------------------> Reject
//! Start --experimental, none researched------> Reject
//! Start --experimental, some researched------> AwaitingDecision
//!     AwaitingDecision --unlock, affordable--> Pass
//!     AwaitingDecision --unlock, short-------> Reject
//!     AwaitingDecision --acknowledge---------> Reject
//! ```

use buildgate_types::{FundsPurpose, Part, PartRequirement, Rejection, Vessel};

use crate::messages;
use crate::operator::{DecisionChoice, DecisionRequest};
use crate::prompt::Placement;
use crate::services::Services;

use super::StepResult;

/// An unlock offer waiting for the operator.
#[derive(Debug, Clone)]
pub struct PendingUnlock {
    pub request: DecisionRequest,
    pub parts: Vec<Part>,
    pub unlock_cost: f64,
}

/// Parts purchased after the operator accepted an unlock offer.
#[derive(Debug, Clone)]
pub struct UnlockReceipt {
    pub parts: Vec<Part>,
    pub cost: f64,
}

pub fn check(vessel: &Vessel, services: &Services) -> StepResult {
    let locked = services.parts.locked_parts(vessel);
    if !locked.is_empty() {
        tracing::debug!(
            vessel = %vessel.name,
            locked = locked.len(),
            "Tried to add vessel to build list but it contains locked parts"
        );
        services.prompt.transient_message(
            &messages::locked_parts_warning(&locked),
            messages::LOCKED_PARTS_DURATION,
            Placement::UpperCenter,
        );
        return StepResult::Reject(Rejection::LockedComponentsPresent { parts: locked });
    }

    let experimental = services.parts.experimental_parts(vessel);
    if experimental.is_empty() {
        return StepResult::Pass;
    }

    let (unlockable, unresearched): (Vec<PartRequirement>, Vec<PartRequirement>) = experimental
        .into_iter()
        .partition(|req| services.tech.is_researched(&req.part));

    if unlockable.is_empty() {
        tracing::debug!(
            vessel = %vessel.name,
            unresearched = unresearched.len(),
            "Vessel contains experimental parts that cannot be unlocked yet"
        );
        services.prompt.inform(
            messages::EXPERIMENTAL_TITLE,
            &messages::experimental_parts_warning(&[], &unresearched),
        );
        return StepResult::Reject(Rejection::UnresolvableExperimentalComponents {
            parts: unresearched,
        });
    }

    let parts: Vec<Part> = unlockable.iter().map(|req| req.part.clone()).collect();
    let unlock_cost = services.unlocks.unlock_cost(&parts);
    let request = messages::unlock_decision(&unlockable, &unresearched, unlock_cost, vessel.mode);
    StepResult::AwaitDecision(PendingUnlock {
        request,
        parts,
        unlock_cost,
    })
}

/// Apply the operator's answer to an unlock offer.
///
/// The balance is read again here; it may have changed while the offer was open.
pub fn resolve(
    pending: PendingUnlock,
    choice: DecisionChoice,
    services: &Services,
) -> Result<UnlockReceipt, Rejection> {
    match choice {
        DecisionChoice::Acknowledge => Err(Rejection::OperatorDeclined),
        DecisionChoice::UnlockAndProceed => {
            let balance = services.ledger.current_balance();
            if balance > pending.unlock_cost && services.ledger.spend(pending.unlock_cost) {
                services.unlocks.unlock(&pending.parts);
                return Ok(UnlockReceipt {
                    parts: pending.parts,
                    cost: pending.unlock_cost,
                });
            }

            tracing::debug!(
                unlock_cost = pending.unlock_cost,
                balance,
                "Insufficient funds to unlock parts"
            );
            services.prompt.transient_message(
                messages::UNLOCK_FUNDS_SHORT,
                messages::UNLOCK_FUNDS_SHORT_DURATION,
                Placement::UpperCenter,
            );
            Err(Rejection::InsufficientFunds {
                purpose: FundsPurpose::Unlock,
                required: pending.unlock_cost,
                available: balance,
            })
        }
    }
}
