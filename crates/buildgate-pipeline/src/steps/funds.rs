use buildgate_types::{FundsPurpose, Rejection, Vessel};

use crate::messages;
use crate::prompt::Placement;
use crate::services::Services;

use super::StepResult;

/// Gate on affordability. Reads the ledger on every call and never debits it.
pub fn check(vessel: &Vessel, services: &Services) -> StepResult {
    let cost = vessel.total_cost();
    let balance = services.ledger.current_balance();
    if cost <= balance {
        return StepResult::Pass;
    }

    tracing::debug!(
        vessel = %vessel.name,
        cost,
        balance,
        "Tried to add vessel to build list but not enough funds"
    );
    services.prompt.transient_message(
        messages::NOT_ENOUGH_FUNDS,
        messages::NOT_ENOUGH_FUNDS_DURATION,
        Placement::UpperCenter,
    );
    StepResult::Reject(Rejection::InsufficientFunds {
        purpose: FundsPurpose::Build,
        required: cost,
        available: balance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{FacilityLimits, ResearchState};
    use crate::prompt::Notice;
    use crate::services::FundsLedger;
    use crate::steps::test_support::{harness, part};

    fn vessel_costing(cost: f64) -> Vessel {
        Vessel::new("Stayputnik").with_part(part("pod", cost, 0.0, "start"), 1)
    }

    #[test]
    fn exact_balance_passes() {
        let h = harness(1000.0, FacilityLimits::unlimited(), ResearchState::new());
        assert!(matches!(check(&vessel_costing(1000.0), &h.services), StepResult::Pass));
        assert!(h.prompt.is_empty());
    }

    #[test]
    fn shortfall_rejects_with_transient_message() {
        let h = harness(500.0, FacilityLimits::unlimited(), ResearchState::new());

        match check(&vessel_costing(1000.0), &h.services) {
            StepResult::Reject(Rejection::InsufficientFunds {
                purpose,
                required,
                available,
            }) => {
                assert_eq!(purpose, FundsPurpose::Build);
                assert_eq!(required, 1000.0);
                assert_eq!(available, 500.0);
            }
            other => panic!("expected funds rejection, got {other:?}"),
        }

        assert_eq!(
            h.prompt.notices(),
            vec![Notice::Transient {
                text: messages::NOT_ENOUGH_FUNDS.into(),
                duration: messages::NOT_ENOUGH_FUNDS_DURATION,
                placement: Placement::UpperCenter,
            }]
        );
    }

    #[test]
    fn does_not_debit_the_ledger() {
        let h = harness(1200.0, FacilityLimits::unlimited(), ResearchState::new());
        check(&vessel_costing(1000.0), &h.services);
        assert_eq!(h.ledger.current_balance(), 1200.0);
    }

    #[test]
    fn reads_balance_at_call_time() {
        let h = harness(1200.0, FacilityLimits::unlimited(), ResearchState::new());
        let vessel = vessel_costing(1000.0);
        assert!(matches!(check(&vessel, &h.services), StepResult::Pass));

        assert!(h.ledger.spend(300.0));
        assert!(matches!(check(&vessel, &h.services), StepResult::Reject(_)));
    }
}
