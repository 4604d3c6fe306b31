//! JSON scenario files: a vessel plus the world state it is admitted into.

use std::path::Path;
use std::sync::Arc;

use buildgate_pipeline::{
    FacilityLimits, FixedSession, InMemoryLedger, ResearchState, Services, UserPrompt,
};
use buildgate_types::{BuildgateError, Result, ValidationConfig, Vessel};
use serde::Deserialize;

fn career() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResearchSnapshot {
    #[serde(default)]
    pub researched_techs: Vec<String>,
    #[serde(default)]
    pub purchased_parts: Vec<String>,
    #[serde(default)]
    pub experimental_parts: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Whether economy and facility limits apply.
    #[serde(default = "career")]
    pub career: bool,
    pub funds: f64,
    #[serde(default)]
    pub research: ResearchSnapshot,
    #[serde(default)]
    pub facility: FacilityLimits,
    #[serde(default)]
    pub validation: ValidationConfig,
    pub vessel: Vessel,
}

/// Collaborators built from a scenario, with direct handles to the mutable ones.
pub struct World {
    pub services: Services,
    pub ledger: Arc<InMemoryLedger>,
    pub research: Arc<ResearchState>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        let scenario: Scenario = serde_json::from_str(&source)?;
        if scenario.vessel.name.trim().is_empty() {
            return Err(BuildgateError::InvalidScenario(format!(
                "{}: vessel name is empty",
                path.display()
            )));
        }
        Ok(scenario)
    }

    pub fn world(&self, prompt: Arc<dyn UserPrompt>) -> World {
        let research = self
            .research
            .researched_techs
            .iter()
            .fold(ResearchState::new(), |state, tech| state.research(tech.as_str()));
        let research = self
            .research
            .purchased_parts
            .iter()
            .fold(research, |state, part| state.purchase(part.as_str()));
        let research = Arc::new(
            self.research
                .experimental_parts
                .iter()
                .fold(research, |state, part| state.grant_experimental(part.as_str())),
        );

        let ledger = Arc::new(InMemoryLedger::new(self.funds));
        let session = if self.career {
            FixedSession::career()
        } else {
            FixedSession::sandbox()
        };

        World {
            services: Services {
                session: Arc::new(session),
                facility: Arc::new(self.facility.clone()),
                ledger: ledger.clone(),
                parts: research.clone(),
                tech: research.clone(),
                unlocks: research.clone(),
                prompt,
            },
            ledger,
            research,
        }
    }
}
