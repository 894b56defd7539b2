//! # NetReach Workflow
//!
//! The orchestrator: composes the store, the rate limiter, and the
//! template renderer with two external collaborators — an [`Actuator`]
//! that performs UI actions against the live platform and a [`Parser`]
//! that extracts structured data from rendered pages — into the
//! discovery → connect → status-poll → inbox-sweep → messaging pipeline.
//!
//! The pipeline holds no state of its own between runs: everything that
//! matters is in the store, and every stage is safe to re-run after an
//! interruption.

pub mod actuator;
pub mod runner;
pub mod schedule;
pub mod selectors;
pub mod stats;

pub use actuator::{Actuator, CandidateProfile, ControlHandle, ConversationPeek, Parser};
pub use runner::WorkflowRunner;
pub use schedule::{is_active_hours, next_active_time};
pub use stats::{
    ConnectStats, DiscoveryStats, MessageStats, PollStats, RunReport, StageOutcome, SweepStats,
};
