//! # zkpipe-pipeline — Pipeline Orchestration
//!
//! Chains the domain services into the full artifact lifecycle: compile →
//! key material → prove → export verification key → verify → optional
//! ledger submission. Execution stops at the first failure and nothing is
//! rolled back — artifacts produced before the failure stay cached and
//! are reused on retry.
//!
//! The workspace itself has no locking, so this crate also owns the
//! concurrency discipline the pipeline needs when exposed as a server:
//! per-circuit-name mutual exclusion for artifact-writing operations, a
//! bounded permit pool over external tool spawns, and single-flight
//! de-duplication of universal-setup downloads.
//!
//! ## Crate Policy
//!
//! - Sits above every domain crate; only the API and CLI depend on it.
//! - No `unsafe` code.

pub mod error;
pub mod gate;
pub mod ledger;
pub mod orchestrator;

pub use error::{PipelineError, Stage};
pub use gate::CircuitGate;
pub use ledger::{
    AchievementReceipt, HttpLedgerClient, LedgerClient, LedgerError, MockLedgerClient,
    SubmissionReceipt, SubmissionRequest,
};
pub use orchestrator::{CompleteRequest, KeyMaterialPaths, Pipeline, PipelineReport};
