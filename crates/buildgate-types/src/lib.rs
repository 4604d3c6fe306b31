//! Shared types, errors, rejections, and outcomes for the buildgate admission pipeline.
//!
//! This crate provides the foundational types used across the other buildgate crates:
//! - `BuildgateError`: infrastructure failures (I/O, parsing, operator input)
//! - `Rejection`: typed business reasons a vessel was refused
//! - `Vessel` / `Part` / `PartRequirement`: the artifact under validation
//! - `ValidationConfig`: per-check toggles
//! - `AdmissionOutcome` / `AdmissionReport`: the result of one admission run

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unified error type for failures that are not validation outcomes.
///
/// A vessel being refused is never an error; see [`Rejection`].
#[derive(Debug, thiserror::Error)]
pub enum BuildgateError {
    #[error("Operator could not answer decision '{title}': {message}")]
    OperatorUnavailable { title: String, message: String },

    #[error("Unknown decision choice '{0}'")]
    UnknownChoice(String),

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenience alias for `Result<T, BuildgateError>`.
pub type Result<T> = std::result::Result<T, BuildgateError>;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// Identifier of a single admission run, used to correlate logs and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub uuid::Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

// ---------------------------------------------------------------------------
// Parts and vessels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartId(pub String);

impl PartId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A buildable component as known to the parts catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: PartId,
    pub title: String,
    /// Per-unit build cost in funds.
    pub cost: f64,
    /// One-time cost to purchase the part once its tech node is researched.
    #[serde(default)]
    pub entry_cost: f64,
    #[serde(default)]
    pub mass: f64,
    /// Tech node that has to be researched before the part can be purchased.
    pub tech_required: String,
}

/// A part used by a vessel together with how many copies it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartRequirement {
    pub part: Part,
    pub count: u32,
}

impl PartRequirement {
    pub fn new(part: Part, count: u32) -> Self {
        Self { part, count }
    }
}

/// Whether the operator is building a new vessel or saving edits to one
/// already in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildMode {
    #[default]
    Build,
    SaveEdits,
}

impl BuildMode {
    /// Verb phrase used on the unlock option.
    pub fn action_phrase(self) -> &'static str {
        match self {
            BuildMode::Build => "build vessel",
            BuildMode::SaveEdits => "save edits",
        }
    }
}

/// The candidate vessel submitted for admission to the build queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vessel {
    pub name: String,
    #[serde(default)]
    pub mode: BuildMode,
    #[serde(default)]
    pub parts: Vec<PartRequirement>,
}

impl Vessel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: BuildMode::Build,
            parts: Vec::new(),
        }
    }

    /// Builder-style helper that appends `count` copies of `part`.
    pub fn with_part(mut self, part: Part, count: u32) -> Self {
        self.parts.push(PartRequirement::new(part, count));
        self
    }

    pub fn with_mode(mut self, mode: BuildMode) -> Self {
        self.mode = mode;
        self
    }

    /// Total build cost: every part's unit cost times its count.
    pub fn total_cost(&self) -> f64 {
        self.parts
            .iter()
            .map(|req| req.part.cost * f64::from(req.count))
            .sum()
    }

    pub fn part_count(&self) -> u32 {
        self.parts.iter().map(|req| req.count).sum()
    }

    pub fn total_mass(&self) -> f64 {
        self.parts
            .iter()
            .map(|req| req.part.mass * f64::from(req.count))
            .sum()
    }
}

// ---------------------------------------------------------------------------
// ValidationConfig
// ---------------------------------------------------------------------------

fn enabled() -> bool {
    true
}

/// Toggles for the individual admission checks. A disabled check passes
/// every vessel through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "enabled")]
    pub check_facility_requirements: bool,
    #[serde(default = "enabled")]
    pub check_part_availability: bool,
    #[serde(default = "enabled")]
    pub check_available_funds: bool,
}

impl ValidationConfig {
    /// Configuration with every check turned off.
    pub fn disabled() -> Self {
        Self {
            check_facility_requirements: false,
            check_part_availability: false,
            check_available_funds: false,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            check_facility_requirements: true,
            check_part_availability: true,
            check_available_funds: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Rejection: typed reason a vessel was refused
// ---------------------------------------------------------------------------

/// What the funds were needed for when a funds gate failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundsPurpose {
    Build,
    Unlock,
}

impl fmt::Display for FundsPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FundsPurpose::Build => f.write_str("build"),
            FundsPurpose::Unlock => f.write_str("unlock parts"),
        }
    }
}

/// Terminal reason an admission run ended in rejection.
///
/// Every variant has already been surfaced to the operator through the
/// prompt surface by the time the caller sees it.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    #[error("Vessel failed {} facility check(s)", .violations.len())]
    FacilityViolation { violations: Vec<String> },

    #[error("Insufficient funds to {purpose}: need {required}, have {available}")]
    InsufficientFunds {
        purpose: FundsPurpose,
        required: f64,
        available: f64,
    },

    #[error("Vessel contains {} locked part(s)", .parts.len())]
    LockedComponentsPresent { parts: Vec<PartRequirement> },

    #[error("Vessel contains {} experimental part(s) whose tech is not researched", .parts.len())]
    UnresolvableExperimentalComponents { parts: Vec<PartRequirement> },

    #[error("Operator declined to unlock experimental parts")]
    OperatorDeclined,
}

impl Rejection {
    /// Short machine-friendly name of the rejection kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::FacilityViolation { .. } => "facility_violation",
            Rejection::InsufficientFunds { .. } => "insufficient_funds",
            Rejection::LockedComponentsPresent { .. } => "locked_components_present",
            Rejection::UnresolvableExperimentalComponents { .. } => {
                "unresolvable_experimental_components"
            }
            Rejection::OperatorDeclined => "operator_declined",
        }
    }
}

// ---------------------------------------------------------------------------
// AdmissionOutcome
// ---------------------------------------------------------------------------

/// Result of one admission run.
#[derive(Debug, Clone, PartialEq)]
pub enum AdmissionOutcome {
    Admitted(Vessel),
    Rejected(Rejection),
}

impl AdmissionOutcome {
    pub fn is_admitted(&self) -> bool {
        matches!(self, AdmissionOutcome::Admitted(_))
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            AdmissionOutcome::Admitted(_) => None,
            AdmissionOutcome::Rejected(r) => Some(r),
        }
    }
}

/// Serializable summary of a finished run, suitable for logs or JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionReport {
    pub run_id: RunId,
    pub vessel: String,
    pub admitted: bool,
    pub rejection: Option<Rejection>,
    pub finished_at: chrono::DateTime<chrono::Utc>,
}

impl AdmissionReport {
    pub fn new(run_id: RunId, vessel: impl Into<String>, outcome: &AdmissionOutcome) -> Self {
        Self {
            run_id,
            vessel: vessel.into(),
            admitted: outcome.is_admitted(),
            rejection: outcome.rejection().cloned(),
            finished_at: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(id: &str, cost: f64) -> Part {
        Part {
            id: PartId::new(id),
            title: id.to_uppercase(),
            cost,
            entry_cost: 0.0,
            mass: 1.5,
            tech_required: "start".into(),
        }
    }

    #[test]
    fn total_cost_multiplies_counts() {
        let vessel = Vessel::new("Stayputnik")
            .with_part(part("tank", 250.0), 2)
            .with_part(part("engine", 500.0), 1);
        assert_eq!(vessel.total_cost(), 1000.0);
        assert_eq!(vessel.part_count(), 3);
        assert_eq!(vessel.total_mass(), 4.5);
    }

    #[test]
    fn empty_vessel_costs_nothing() {
        assert_eq!(Vessel::new("Empty").total_cost(), 0.0);
    }

    #[test]
    fn validation_config_defaults_to_all_enabled() {
        let cfg = ValidationConfig::default();
        assert!(cfg.check_facility_requirements);
        assert!(cfg.check_part_availability);
        assert!(cfg.check_available_funds);
    }

    #[test]
    fn validation_config_missing_fields_default_to_enabled() {
        let cfg: ValidationConfig =
            serde_json::from_str(r#"{"check_available_funds": false}"#).unwrap();
        assert!(cfg.check_facility_requirements);
        assert!(cfg.check_part_availability);
        assert!(!cfg.check_available_funds);
    }

    #[test]
    fn build_mode_phrases() {
        assert_eq!(BuildMode::Build.action_phrase(), "build vessel");
        assert_eq!(BuildMode::SaveEdits.action_phrase(), "save edits");
    }

    #[test]
    fn rejection_display_insufficient_funds() {
        let r = Rejection::InsufficientFunds {
            purpose: FundsPurpose::Build,
            required: 1000.0,
            available: 500.0,
        };
        assert_eq!(r.to_string(), "Insufficient funds to build: need 1000, have 500");
    }

    #[test]
    fn rejection_display_facility() {
        let r = Rejection::FacilityViolation {
            violations: vec!["too heavy".into(), "too many parts".into()],
        };
        assert_eq!(r.to_string(), "Vessel failed 2 facility check(s)");
    }

    #[test]
    fn rejection_serializes_with_kind_tag() {
        let json = serde_json::to_value(Rejection::OperatorDeclined).unwrap();
        assert_eq!(json["kind"], "operator_declined");
        assert_eq!(Rejection::OperatorDeclined.kind(), "operator_declined");
    }

    #[test]
    fn outcome_accessors() {
        let admitted = AdmissionOutcome::Admitted(Vessel::new("A"));
        assert!(admitted.is_admitted());
        assert!(admitted.rejection().is_none());

        let rejected = AdmissionOutcome::Rejected(Rejection::OperatorDeclined);
        assert!(!rejected.is_admitted());
        assert_eq!(rejected.rejection(), Some(&Rejection::OperatorDeclined));
    }

    #[test]
    fn report_captures_outcome() {
        let outcome = AdmissionOutcome::Rejected(Rejection::OperatorDeclined);
        let report = AdmissionReport::new(RunId::new(), "Stayputnik", &outcome);
        assert!(!report.admitted);
        assert_eq!(report.vessel, "Stayputnik");
        assert_eq!(report.rejection, Some(Rejection::OperatorDeclined));
    }

    #[test]
    fn run_id_display_is_short() {
        assert_eq!(RunId::new().to_string().len(), 8);
    }

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BuildgateError = io_err.into();
        assert!(matches!(err, BuildgateError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }
}
