//! In-process collaborator implementations.
//!
//! Used by the CLI to run admissions against a scenario file and by tests.
//! Hosts embedding the pipeline normally provide their own.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, PoisonError};

use buildgate_types::{Part, PartId, PartRequirement, Vessel};
use serde::{Deserialize, Serialize};

use crate::services::{
    FacilityChecker, FundsLedger, PartInspector, SessionMode, TechRegistry, UnlockRegistry,
};

// ---------------------------------------------------------------------------
// FixedSession
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct FixedSession {
    constrained: bool,
}

impl FixedSession {
    /// Session with economy and facility limits enforced.
    pub fn career() -> Self {
        Self { constrained: true }
    }

    /// Session without limits; every vessel is admitted unchecked.
    pub fn sandbox() -> Self {
        Self { constrained: false }
    }
}

impl SessionMode for FixedSession {
    fn is_constrained_economy(&self) -> bool {
        self.constrained
    }
}

// ---------------------------------------------------------------------------
// InMemoryLedger
// ---------------------------------------------------------------------------

pub struct InMemoryLedger {
    balance: Mutex<f64>,
}

impl InMemoryLedger {
    pub fn new(balance: f64) -> Self {
        Self {
            balance: Mutex::new(balance),
        }
    }
}

impl FundsLedger for InMemoryLedger {
    fn current_balance(&self) -> f64 {
        *self.balance.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spend(&self, amount: f64) -> bool {
        let mut balance = self.balance.lock().unwrap_or_else(PoisonError::into_inner);
        if amount < 0.0 || amount > *balance {
            return false;
        }
        *balance -= amount;
        true
    }
}

// ---------------------------------------------------------------------------
// FacilityLimits
// ---------------------------------------------------------------------------

/// Part count and mass limits of the building facility.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacilityLimits {
    #[serde(default)]
    pub max_parts: Option<u32>,
    /// Maximum vessel mass in tonnes.
    #[serde(default)]
    pub max_mass: Option<f64>,
}

impl FacilityLimits {
    pub fn new(max_parts: Option<u32>, max_mass: Option<f64>) -> Self {
        Self {
            max_parts,
            max_mass,
        }
    }

    pub fn unlimited() -> Self {
        Self::default()
    }
}

impl FacilityChecker for FacilityLimits {
    // Part count and mass never prevent building, only launching, so both
    // are reported whatever `allow_soft_pass` says.
    fn evaluate(&self, vessel: &Vessel, _allow_soft_pass: bool) -> Vec<String> {
        let mut violations = Vec::new();
        if let Some(max) = self.max_parts {
            let count = vessel.part_count();
            if count > max {
                violations.push(format!("Part count too high: {count} > {max}"));
            }
        }
        if let Some(max) = self.max_mass {
            let mass = vessel.total_mass();
            if mass > max {
                violations.push(format!("Mass too high: {mass:.2}t > {max:.2}t"));
            }
        }
        violations
    }
}

// ---------------------------------------------------------------------------
// ResearchState
// ---------------------------------------------------------------------------

/// Research progress and part purchases.
///
/// A part the vessel uses is
/// - available when purchased,
/// - experimental when not purchased but its tech is researched or it was
///   granted as an experimental part,
/// - locked otherwise.
#[derive(Debug, Default)]
pub struct ResearchState {
    researched_techs: BTreeSet<String>,
    experimental: BTreeSet<PartId>,
    purchased: Mutex<BTreeSet<PartId>>,
}

impl ResearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn research(mut self, tech: impl Into<String>) -> Self {
        self.researched_techs.insert(tech.into());
        self
    }

    pub fn purchase(self, part: impl Into<String>) -> Self {
        self.purchased
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(PartId::new(part));
        self
    }

    pub fn grant_experimental(mut self, part: impl Into<String>) -> Self {
        self.experimental.insert(PartId::new(part));
        self
    }

    pub fn is_purchased(&self, part: &PartId) -> bool {
        self.purchased
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(part)
    }

    pub fn purchased_parts(&self) -> Vec<PartId> {
        self.purchased
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    fn tech_researched(&self, part: &Part) -> bool {
        self.researched_techs.contains(&part.tech_required)
    }

    fn unpurchased<F>(&self, vessel: &Vessel, keep: F) -> Vec<PartRequirement>
    where
        F: Fn(&Part) -> bool,
    {
        group_by_part(vessel)
            .into_iter()
            .filter(|req| !self.is_purchased(&req.part.id) && keep(&req.part))
            .collect()
    }
}

impl PartInspector for ResearchState {
    fn locked_parts(&self, vessel: &Vessel) -> Vec<PartRequirement> {
        self.unpurchased(vessel, |part| {
            !self.tech_researched(part) && !self.experimental.contains(&part.id)
        })
    }

    fn experimental_parts(&self, vessel: &Vessel) -> Vec<PartRequirement> {
        self.unpurchased(vessel, |part| {
            self.tech_researched(part) || self.experimental.contains(&part.id)
        })
    }
}

impl TechRegistry for ResearchState {
    fn is_researched(&self, part: &Part) -> bool {
        self.tech_researched(part)
    }
}

impl UnlockRegistry for ResearchState {
    fn unlock_cost(&self, parts: &[Part]) -> f64 {
        let mut seen = BTreeSet::new();
        parts
            .iter()
            .filter(|part| !self.is_purchased(&part.id) && seen.insert(part.id.clone()))
            .map(|part| part.entry_cost)
            .sum()
    }

    fn unlock(&self, parts: &[Part]) {
        let mut purchased = self.purchased.lock().unwrap_or_else(PoisonError::into_inner);
        for part in parts {
            if purchased.insert(part.id.clone()) {
                tracing::debug!(part = %part.id, "Part unlocked");
            }
        }
    }
}

/// Merge repeated entries for the same part, summing their counts.
/// Output is ordered by part id.
pub fn group_by_part(vessel: &Vessel) -> Vec<PartRequirement> {
    let mut grouped: BTreeMap<PartId, PartRequirement> = BTreeMap::new();
    for req in &vessel.parts {
        grouped
            .entry(req.part.id.clone())
            .and_modify(|existing| existing.count += req.count)
            .or_insert_with(|| req.clone());
    }
    grouped.into_values().collect()
}
