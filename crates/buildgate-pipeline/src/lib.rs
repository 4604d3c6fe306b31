//! Vessel admission pipeline.
//!
//! Decides whether a vessel may join the build queue by running facility,
//! funds, and part availability checks in a fixed order, stopping at the first
//! rejection. The parts check can suspend the run to offer the operator an
//! unlock of experimental parts; the run is resumed with the operator's answer.

pub mod events;
pub mod memory;
pub mod messages;
pub mod operator;
pub mod pipeline;
pub mod prompt;
pub mod services;
pub mod steps;

pub use events::{AdmissionEvent, EventEmitter};
pub use memory::{FacilityLimits, FixedSession, InMemoryLedger, ResearchState};
pub use operator::{
    AutoApproveOperator, ConsoleOperator, DecisionChoice, DecisionOption, DecisionRequest,
    DeclineOperator, Operator, RecordingOperator,
};
pub use pipeline::{
    AdmissionPipeline, CompletedRun, Continuations, PendingAdmission, Progress, SuspendedRun,
};
pub use prompt::{ConsolePrompt, Notice, Placement, RecordingPrompt, UserPrompt};
pub use services::{
    FacilityChecker, FundsLedger, PartInspector, Services, SessionMode, TechRegistry,
    UnlockRegistry,
};
pub use steps::{CheckStep, StepResult, CHECK_ORDER};
