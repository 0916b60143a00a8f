//! # Pipeline Errors and Stage Names
//!
//! Each stage failure keeps its domain error intact; the pipeline adds
//! only the stage attribution used for logs and metrics labels.

use std::fmt;
use thiserror::Error;

use zkpipe_backend::BackendError;
use zkpipe_compiler::CompileError;
use zkpipe_keys::KeyError;
use zkpipe_prover::{ProveError, VerifyError};

use crate::ledger::LedgerError;

/// A pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Circuit compilation.
    Compile,
    /// Proving-key derivation (including setup acquisition).
    KeySetup,
    /// Witness computation and proof generation.
    Prove,
    /// Verification-key export.
    ExportKey,
    /// Cryptographic verification.
    Verify,
    /// Ledger submission.
    Submit,
}

impl Stage {
    /// The identifier used in log fields and metrics labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::KeySetup => "key_setup",
            Self::Prove => "prove",
            Self::ExportKey => "export_key",
            Self::Verify => "verify",
            Self::Submit => "submit",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from pipeline execution.
///
/// A clean `verified: false` result is not represented here — it is a
/// [`VerificationResult`](zkpipe_prover::VerificationResult), not an
/// error, and the orchestrator stops before submission when it occurs.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Compilation failed (precheck, diagnostics, or missing artifact).
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Key ceremony failed (setup prerequisite, derivation, export).
    #[error(transparent)]
    Key(#[from] KeyError),

    /// Witness computation or proof generation failed.
    #[error(transparent)]
    Prove(#[from] ProveError),

    /// Verification failed as an operation (not a clean `false` result).
    #[error(transparent)]
    Verify(#[from] VerifyError),

    /// A direct backend utility call failed (verifier-contract export).
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Ledger submission failed or no ledger is configured.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The tool-concurrency gate was closed during shutdown.
    #[error("tool concurrency gate closed")]
    GateClosed(#[from] tokio::sync::AcquireError),
}

impl PipelineError {
    /// The stage this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Compile(_) => Stage::Compile,
            Self::Key(_) => Stage::KeySetup,
            Self::Prove(_) => Stage::Prove,
            Self::Backend(_) => Stage::ExportKey,
            Self::Verify(_) => Stage::Verify,
            Self::Ledger(_) => Stage::Submit,
            Self::GateClosed(_) => Stage::Compile,
        }
    }

    /// The external tool's error lines, when the failure carries any.
    pub fn error_lines(&self) -> &[String] {
        match self {
            Self::Compile(e) => e.error_lines(),
            Self::Prove(e) => e.error_lines(),
            Self::Backend(e) => e.output_lines(),
            _ => &[],
        }
    }
}
