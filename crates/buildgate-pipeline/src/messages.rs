//! Operator-facing text for every notification the pipeline emits.

use std::time::Duration;

use buildgate_types::{BuildMode, PartRequirement};

use crate::operator::{DecisionChoice, DecisionOption, DecisionRequest};

pub const ACKNOWLEDGED: &str = "Acknowledged";

pub const FACILITY_WARNING_TITLE: &str = "Failed editor checks!";

pub const NOT_ENOUGH_FUNDS: &str = "Not Enough Funds To Build!";
pub const NOT_ENOUGH_FUNDS_DURATION: Duration = Duration::from_secs(4);

pub const LOCKED_PARTS_DURATION: Duration = Duration::from_secs(4);

pub const UNLOCK_FUNDS_SHORT: &str = "Insufficient funds to unlock parts";
pub const UNLOCK_FUNDS_SHORT_DURATION: Duration = Duration::from_secs(5);

pub const EXPERIMENTAL_TITLE: &str = "Vessel cannot be built!";

fn bullet_list<I>(lines: I) -> String
where
    I: IntoIterator<Item = String>,
{
    lines
        .into_iter()
        .map(|line| format!("• {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe(req: &PartRequirement) -> String {
    format!("{}x {}", req.count, req.part.title)
}

pub fn facility_warning_body(violations: &[String]) -> String {
    format!(
        "Warning! This vessel did not pass the editor checks! It will still be built, \
         but you will not be able to launch it without upgrading. \
         Listed below are the failed checks:\n{}",
        bullet_list(violations.iter().cloned())
    )
}

pub fn locked_parts_warning(locked: &[PartRequirement]) -> String {
    format!(
        "Warning! This vessel cannot be built. It contains parts which are not available \
         at the moment:\n{}",
        bullet_list(locked.iter().map(describe))
    )
}

/// Lists experimental parts, separating the ones that can be bought now
/// from the ones still waiting on research.
pub fn experimental_parts_warning(
    unlockable: &[PartRequirement],
    unresearched: &[PartRequirement],
) -> String {
    let mut body = String::from(
        "This vessel contains parts which are still in development and have to be unlocked first.",
    );
    if !unlockable.is_empty() {
        body.push_str("\nResearched, can be unlocked now:\n");
        body.push_str(&bullet_list(unlockable.iter().map(describe)));
    }
    if !unresearched.is_empty() {
        body.push_str("\nRequire further research:\n");
        body.push_str(&bullet_list(unresearched.iter().map(|req| {
            format!("{} (needs {})", describe(req), req.part.tech_required)
        })));
    }
    body
}

pub fn unlock_option_label(part_count: usize, unlock_cost: f64, mode: BuildMode) -> String {
    format!(
        "Unlock {part_count} part{} for {unlock_cost} Fund{} and {}",
        if part_count > 1 { "s" } else { "" },
        if unlock_cost > 1.0 { "s" } else { "" },
        mode.action_phrase()
    )
}

/// The two-option decision offered when some experimental parts can be bought.
pub fn unlock_decision(
    unlockable: &[PartRequirement],
    unresearched: &[PartRequirement],
    unlock_cost: f64,
    mode: BuildMode,
) -> DecisionRequest {
    DecisionRequest {
        title: EXPERIMENTAL_TITLE.to_string(),
        body: experimental_parts_warning(unlockable, unresearched),
        options: vec![
            DecisionOption {
                label: ACKNOWLEDGED.to_string(),
                choice: DecisionChoice::Acknowledge,
            },
            DecisionOption {
                label: unlock_option_label(unlockable.len(), unlock_cost, mode),
                choice: DecisionChoice::UnlockAndProceed,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildgate_types::{Part, PartId};

    fn req(title: &str, count: u32, tech: &str) -> PartRequirement {
        PartRequirement::new(
            Part {
                id: PartId::new(title.to_lowercase()),
                title: title.into(),
                cost: 100.0,
                entry_cost: 50.0,
                mass: 1.0,
                tech_required: tech.into(),
            },
            count,
        )
    }

    #[test]
    fn facility_body_lists_each_violation() {
        let body = facility_warning_body(&["Part count too high".into(), "Mass too high".into()]);
        assert!(body.starts_with("Warning! This vessel did not pass the editor checks!"));
        assert!(body.contains("• Part count too high\n• Mass too high"));
    }

    #[test]
    fn locked_warning_includes_counts() {
        let text = locked_parts_warning(&[req("Mainsail", 2, "heavyRocketry")]);
        assert!(text.contains("• 2x Mainsail"));
    }

    #[test]
    fn experimental_warning_splits_sections() {
        let text = experimental_parts_warning(
            &[req("Poodle", 1, "advRocketry")],
            &[req("Nerv", 1, "nuclearPropulsion")],
        );
        assert!(text.contains("Researched, can be unlocked now:\n• 1x Poodle"));
        assert!(text.contains("Require further research:\n• 1x Nerv (needs nuclearPropulsion)"));
    }

    #[test]
    fn unlock_label_pluralizes() {
        assert_eq!(
            unlock_option_label(1, 1.0, BuildMode::Build),
            "Unlock 1 part for 1 Fund and build vessel"
        );
        assert_eq!(
            unlock_option_label(3, 4500.0, BuildMode::SaveEdits),
            "Unlock 3 parts for 4500 Funds and save edits"
        );
    }

    #[test]
    fn unlock_decision_offers_acknowledge_first() {
        let request =
            unlock_decision(&[req("Poodle", 1, "advRocketry")], &[], 300.0, BuildMode::Build);
        assert_eq!(request.title, EXPERIMENTAL_TITLE);
        assert_eq!(request.options.len(), 2);
        assert_eq!(request.options[0].choice, DecisionChoice::Acknowledge);
        assert_eq!(
            request.options[1].label,
            "Unlock 1 part for 300 Funds and build vessel"
        );
    }
}
