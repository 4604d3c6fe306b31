//! Admission pipeline: the driver loop over [`CHECK_ORDER`].
//!
//! A run either finishes synchronously or stops at the parts check with a
//! [`SuspendedRun`]. The suspended run is plain data holding everything
//! needed to continue; hand it back to [`AdmissionPipeline::resume`] together
//! with the operator's choice.

use std::time::Instant;

use buildgate_types::{AdmissionOutcome, Rejection, Result, RunId, ValidationConfig, Vessel};

use crate::events::{AdmissionEvent, EventEmitter};
use crate::operator::{DecisionChoice, DecisionRequest, Operator};
use crate::services::Services;
use crate::steps::{parts, CheckStep, PendingUnlock, StepResult, CHECK_ORDER};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

pub struct AdmissionPipeline {
    services: Services,
    config: ValidationConfig,
    events: EventEmitter,
}

/// A run that reached a terminal outcome.
#[derive(Debug)]
pub struct CompletedRun {
    pub run_id: RunId,
    pub outcome: AdmissionOutcome,
}

#[derive(Debug)]
pub enum Progress {
    Complete(CompletedRun),
    Suspended(SuspendedRun),
}

/// A run waiting on the operator's answer to an unlock offer.
#[derive(Debug)]
#[must_use = "a suspended run only completes once it is resumed"]
pub struct SuspendedRun {
    run: ActiveRun,
    unlock: PendingUnlock,
}

impl SuspendedRun {
    pub fn run_id(&self) -> RunId {
        self.run.id
    }

    pub fn vessel(&self) -> &Vessel {
        &self.run.vessel
    }

    pub fn request(&self) -> &DecisionRequest {
        &self.unlock.request
    }
}

#[derive(Debug)]
struct ActiveRun {
    id: RunId,
    vessel: Vessel,
    /// Index into [`CHECK_ORDER`] of the next check to run.
    cursor: usize,
    started: Instant,
}

// ---------------------------------------------------------------------------
// Continuation-style API
// ---------------------------------------------------------------------------

type AdmittedFn = Box<dyn FnOnce(Vessel) + Send>;
type RejectedFn = Box<dyn FnOnce(Rejection) + Send>;

/// Callbacks invoked when a run finishes. Exactly one of them is called.
/// Unset callbacks are no-ops.
pub struct Continuations {
    on_admitted: AdmittedFn,
    on_rejected: RejectedFn,
}

impl Continuations {
    pub fn new() -> Self {
        Self {
            on_admitted: Box::new(|_| {}),
            on_rejected: Box::new(|_| {}),
        }
    }

    pub fn on_admitted(mut self, f: impl FnOnce(Vessel) + Send + 'static) -> Self {
        self.on_admitted = Box::new(f);
        self
    }

    pub fn on_rejected(mut self, f: impl FnOnce(Rejection) + Send + 'static) -> Self {
        self.on_rejected = Box::new(f);
        self
    }

    fn deliver(self, outcome: AdmissionOutcome) {
        match outcome {
            AdmissionOutcome::Admitted(vessel) => (self.on_admitted)(vessel),
            AdmissionOutcome::Rejected(reason) => (self.on_rejected)(reason),
        }
    }
}

impl Default for Continuations {
    fn default() -> Self {
        Self::new()
    }
}

/// A suspended run bundled with the callbacks it will eventually call.
#[must_use = "the callbacks only fire once the pending decision is answered"]
pub struct PendingAdmission {
    run: SuspendedRun,
    continuations: Continuations,
}

impl PendingAdmission {
    pub fn request(&self) -> &DecisionRequest {
        self.run.request()
    }

    pub fn vessel(&self) -> &Vessel {
        self.run.vessel()
    }
}

// ---------------------------------------------------------------------------
// AdmissionPipeline
// ---------------------------------------------------------------------------

impl AdmissionPipeline {
    pub fn new(services: Services, config: ValidationConfig) -> Self {
        Self {
            services,
            config,
            events: EventEmitter::default(),
        }
    }

    /// Replace the event emitter, e.g. to share one across pipelines.
    pub fn with_events(mut self, events: EventEmitter) -> Self {
        self.events = events;
        self
    }

    pub fn events(&self) -> &EventEmitter {
        &self.events
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Start a run for `vessel` and drive it as far as it goes without
    /// operator input.
    pub fn begin(&self, vessel: Vessel) -> Progress {
        let run_id = RunId::new();
        if !self.services.session.is_constrained_economy() {
            tracing::debug!(
                run = %run_id,
                vessel = %vessel.name,
                "Unconstrained session, admitting without checks"
            );
            self.events.emit(AdmissionEvent::Bypassed {
                run_id,
                vessel: vessel.name.clone(),
            });
            return Progress::Complete(CompletedRun {
                run_id,
                outcome: AdmissionOutcome::Admitted(vessel),
            });
        }

        self.events.emit(AdmissionEvent::RunStarted {
            run_id,
            vessel: vessel.name.clone(),
        });
        self.drive(ActiveRun {
            id: run_id,
            vessel,
            cursor: 0,
            started: Instant::now(),
        })
    }

    /// Continue a suspended run with the operator's choice.
    pub fn resume(&self, suspended: SuspendedRun, choice: DecisionChoice) -> Progress {
        let SuspendedRun { mut run, unlock } = suspended;
        self.events.emit(AdmissionEvent::DecisionAnswered {
            run_id: run.id,
            choice,
        });

        match parts::resolve(unlock, choice, &self.services) {
            Ok(receipt) => {
                tracing::info!(
                    run = %run.id,
                    vessel = %run.vessel.name,
                    parts = receipt.parts.len(),
                    cost = receipt.cost,
                    "Unlocked experimental parts"
                );
                self.events.emit(AdmissionEvent::PartsUnlocked {
                    run_id: run.id,
                    parts: receipt.parts.into_iter().map(|p| p.id).collect(),
                    cost: receipt.cost,
                });
                self.events.emit(AdmissionEvent::StepPassed {
                    run_id: run.id,
                    step: CheckStep::Parts,
                });
                run.cursor += 1;
                self.drive(run)
            }
            Err(reason) => self.reject(run, CheckStep::Parts, reason),
        }
    }

    /// Run an admission to completion, asking `operator` whenever the run suspends.
    ///
    /// An error from the operator abandons the run without an outcome.
    pub async fn admit(&self, vessel: Vessel, operator: &dyn Operator) -> Result<CompletedRun> {
        let mut progress = self.begin(vessel);
        loop {
            match progress {
                Progress::Complete(done) => return Ok(done),
                Progress::Suspended(suspended) => {
                    let choice = operator.decide(suspended.request()).await?;
                    progress = self.resume(suspended, choice);
                }
            }
        }
    }

    /// Start a run and deliver its outcome to `continuations`.
    ///
    /// Returns `Some` when the run suspended; the callbacks fire once the
    /// pending admission is passed to [`answer`](Self::answer).
    pub fn run(&self, vessel: Vessel, continuations: Continuations) -> Option<PendingAdmission> {
        Self::settle(self.begin(vessel), continuations)
    }

    pub fn answer(
        &self,
        pending: PendingAdmission,
        choice: DecisionChoice,
    ) -> Option<PendingAdmission> {
        let PendingAdmission { run, continuations } = pending;
        Self::settle(self.resume(run, choice), continuations)
    }

    fn settle(progress: Progress, continuations: Continuations) -> Option<PendingAdmission> {
        match progress {
            Progress::Complete(done) => {
                continuations.deliver(done.outcome);
                None
            }
            Progress::Suspended(run) => Some(PendingAdmission { run, continuations }),
        }
    }

    fn drive(&self, mut run: ActiveRun) -> Progress {
        while let Some(&step) = CHECK_ORDER.get(run.cursor) {
            if !step.is_enabled(&self.config) {
                tracing::debug!(run = %run.id, %step, "Check disabled, skipping");
                self.events.emit(AdmissionEvent::StepSkipped {
                    run_id: run.id,
                    step,
                });
                run.cursor += 1;
                continue;
            }

            tracing::debug!(run = %run.id, vessel = %run.vessel.name, %step, "Running check");
            match step.apply(&run.vessel, &self.services) {
                StepResult::Pass => {
                    self.events.emit(AdmissionEvent::StepPassed {
                        run_id: run.id,
                        step,
                    });
                    run.cursor += 1;
                }
                StepResult::Reject(reason) => return self.reject(run, step, reason),
                StepResult::AwaitDecision(unlock) => {
                    tracing::debug!(
                        run = %run.id,
                        title = %unlock.request.title,
                        "Awaiting operator decision"
                    );
                    self.events.emit(AdmissionEvent::DecisionRequested {
                        run_id: run.id,
                        title: unlock.request.title.clone(),
                        options: unlock.request.options.iter().map(|o| o.label.clone()).collect(),
                    });
                    return Progress::Suspended(SuspendedRun { run, unlock });
                }
            }
        }

        tracing::info!(run = %run.id, vessel = %run.vessel.name, "Vessel admitted to build list");
        self.events.emit(AdmissionEvent::RunAdmitted {
            run_id: run.id,
            vessel: run.vessel.name.clone(),
            duration_ms: run.started.elapsed().as_millis() as u64,
        });
        Progress::Complete(CompletedRun {
            run_id: run.id,
            outcome: AdmissionOutcome::Admitted(run.vessel),
        })
    }

    fn reject(&self, run: ActiveRun, step: CheckStep, reason: Rejection) -> Progress {
        tracing::info!(
            run = %run.id,
            vessel = %run.vessel.name,
            %step,
            reason = %reason,
            "Vessel rejected"
        );
        self.events.emit(AdmissionEvent::RunRejected {
            run_id: run.id,
            vessel: run.vessel.name,
            step,
            reason: reason.clone(),
        });
        Progress::Complete(CompletedRun {
            run_id: run.id,
            outcome: AdmissionOutcome::Rejected(reason),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::memory::{FacilityLimits, FixedSession, ResearchState};
    use crate::operator::RecordingOperator;
    use crate::services::FundsLedger;
    use crate::steps::test_support::{harness, part, Harness};

    fn pipeline(h: &Harness) -> AdmissionPipeline {
        AdmissionPipeline::new(h.services.clone(), ValidationConfig::default())
    }

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<AdmissionEvent>) -> Vec<AdmissionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn upper_stage() -> Vessel {
        Vessel::new("Upper").with_part(part("poodle", 400.0, 300.0, "advRocketry"), 1)
    }

    #[test]
    fn sandbox_session_bypasses_every_check() {
        let mut h = harness(0.0, FacilityLimits::new(Some(0), None), ResearchState::new());
        h.services.session = Arc::new(FixedSession::sandbox());
        let p = pipeline(&h);
        let mut rx = p.events().subscribe();

        match p.begin(upper_stage()) {
            Progress::Complete(done) => assert!(done.outcome.is_admitted()),
            other => panic!("expected completion, got {other:?}"),
        }
        assert!(h.prompt.is_empty());
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], AdmissionEvent::Bypassed { .. }));
    }

    #[test]
    fn all_checks_disabled_admits() {
        let h = harness(0.0, FacilityLimits::new(Some(0), None), ResearchState::new());
        let p = AdmissionPipeline::new(h.services.clone(), ValidationConfig::disabled());
        let mut rx = p.events().subscribe();

        match p.begin(upper_stage()) {
            Progress::Complete(done) => assert!(done.outcome.is_admitted()),
            other => panic!("expected completion, got {other:?}"),
        }
        assert!(h.prompt.is_empty());
        let skipped = drain(&mut rx)
            .into_iter()
            .filter(|e| matches!(e, AdmissionEvent::StepSkipped { .. }))
            .count();
        assert_eq!(skipped, CHECK_ORDER.len());
    }

    #[test]
    fn suspends_then_resumes_into_funds_recheck() {
        // 1000 funds: 400 build cost passes, unlock leaves 700, recheck passes.
        let h = harness(
            1000.0,
            FacilityLimits::unlimited(),
            ResearchState::new().research("advRocketry"),
        );
        let p = pipeline(&h);

        let suspended = match p.begin(upper_stage()) {
            Progress::Suspended(s) => s,
            other => panic!("expected suspension, got {other:?}"),
        };
        assert_eq!(suspended.vessel().name, "Upper");

        match p.resume(suspended, DecisionChoice::UnlockAndProceed) {
            Progress::Complete(done) => assert!(done.outcome.is_admitted()),
            other => panic!("expected completion, got {other:?}"),
        }
        assert_eq!(h.ledger.current_balance(), 700.0);
    }

    #[test]
    fn recheck_uses_post_unlock_balance() {
        // 500 funds: 400 build cost passes, unlock leaves 200, recheck fails.
        let h = harness(
            500.0,
            FacilityLimits::unlimited(),
            ResearchState::new().research("advRocketry"),
        );
        let p = pipeline(&h);
        let mut rx = p.events().subscribe();

        let suspended = match p.begin(upper_stage()) {
            Progress::Suspended(s) => s,
            other => panic!("expected suspension, got {other:?}"),
        };
        let done = match p.resume(suspended, DecisionChoice::UnlockAndProceed) {
            Progress::Complete(done) => done,
            other => panic!("expected completion, got {other:?}"),
        };
        assert_eq!(
            done.outcome.rejection(),
            Some(&Rejection::InsufficientFunds {
                purpose: buildgate_types::FundsPurpose::Build,
                required: 400.0,
                available: 200.0,
            })
        );
        let rejected_at = drain(&mut rx).into_iter().find_map(|e| match e {
            AdmissionEvent::RunRejected { step, .. } => Some(step),
            _ => None,
        });
        assert_eq!(rejected_at, Some(CheckStep::FundsRecheck));
    }

    #[test]
    fn continuations_receive_exactly_one_outcome() {
        let h = harness(
            1000.0,
            FacilityLimits::unlimited(),
            ResearchState::new().research("advRocketry"),
        );
        let p = pipeline(&h);
        let calls = Arc::new(Mutex::new(Vec::new()));

        let admitted = calls.clone();
        let rejected = calls.clone();
        let pending = p
            .run(
                upper_stage(),
                Continuations::new()
                    .on_admitted(move |v| {
                        admitted.lock().unwrap().push(format!("admitted {}", v.name))
                    })
                    .on_rejected(move |r| {
                        rejected.lock().unwrap().push(format!("rejected {}", r.kind()))
                    }),
            )
            .expect("run should suspend on the unlock offer");
        assert!(calls.lock().unwrap().is_empty());
        assert!(pending.request().label_for(DecisionChoice::UnlockAndProceed).is_some());

        assert!(p.answer(pending, DecisionChoice::Acknowledge).is_none());
        assert_eq!(*calls.lock().unwrap(), vec!["rejected operator_declined".to_string()]);
    }

    #[test]
    fn default_continuations_are_noops() {
        let h = harness(1000.0, FacilityLimits::unlimited(), ResearchState::new());
        let p = pipeline(&h);
        assert!(p.run(Vessel::new("Empty"), Continuations::default()).is_none());
    }

    #[tokio::test]
    async fn admit_drives_operator_decisions() {
        let h = harness(
            1000.0,
            FacilityLimits::unlimited(),
            ResearchState::new().research("advRocketry"),
        );
        let p = pipeline(&h);
        let operator = RecordingOperator::new(vec![DecisionChoice::UnlockAndProceed]);

        let done = p.admit(upper_stage(), &operator).await.unwrap();
        assert!(done.outcome.is_admitted());
        assert_eq!(operator.requests().len(), 1);
    }

    #[tokio::test]
    async fn admit_propagates_operator_failure() {
        let h = harness(
            1000.0,
            FacilityLimits::unlimited(),
            ResearchState::new().research("advRocketry"),
        );
        let p = pipeline(&h);
        let operator = RecordingOperator::new(Vec::new());

        assert!(p.admit(upper_stage(), &operator).await.is_err());
        assert_eq!(h.ledger.current_balance(), 1000.0);
    }
}
