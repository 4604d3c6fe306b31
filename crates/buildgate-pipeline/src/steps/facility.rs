use buildgate_types::{Rejection, Vessel};

use crate::messages;
use crate::services::Services;

use super::StepResult;

/// Blocks the vessel when the facility reports any violation.
///
/// The facility is queried in soft-pass mode, so every reported violation
/// would still allow building. Any non-empty report rejects regardless.
pub fn check(vessel: &Vessel, services: &Services) -> StepResult {
    let violations = services.facility.evaluate(vessel, true);
    if violations.is_empty() {
        return StepResult::Pass;
    }

    tracing::debug!(
        vessel = %vessel.name,
        violations = violations.len(),
        "Vessel failed facility checks"
    );
    services.prompt.warn(
        messages::FACILITY_WARNING_TITLE,
        &messages::facility_warning_body(&violations),
    );
    StepResult::Reject(Rejection::FacilityViolation { violations })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{FacilityLimits, ResearchState};
    use crate::prompt::Notice;
    use crate::steps::test_support::{harness, part};

    #[test]
    fn passes_within_limits_without_prompt() {
        let h = harness(0.0, FacilityLimits::new(Some(10), None), ResearchState::new());
        let vessel = Vessel::new("Stayputnik").with_part(part("pod", 100.0, 0.0, "start"), 3);

        assert!(matches!(check(&vessel, &h.services), StepResult::Pass));
        assert!(h.prompt.is_empty());
    }

    #[test]
    fn rejects_with_single_warning_listing_every_violation() {
        let h = harness(
            0.0,
            FacilityLimits::new(Some(2), Some(1.0)),
            ResearchState::new(),
        );
        let vessel = Vessel::new("Heavy").with_part(part("tank", 100.0, 0.0, "start"), 3);

        let violations = match check(&vessel, &h.services) {
            StepResult::Reject(Rejection::FacilityViolation { violations }) => violations,
            other => panic!("expected facility rejection, got {other:?}"),
        };
        assert_eq!(violations.len(), 2);

        let notices = h.prompt.notices();
        assert_eq!(notices.len(), 1);
        match &notices[0] {
            Notice::Warning { title, body } => {
                assert_eq!(title, messages::FACILITY_WARNING_TITLE);
                for v in &violations {
                    assert!(body.contains(v.as_str()), "missing {v} in {body}");
                }
            }
            other => panic!("expected warning, got {other:?}"),
        }
    }
}
