//! # Prover and Verifier Errors
//!
//! Proving failures carry the tool's error lines so callers can render
//! them; a clean `verified: false` is a result, not an error, and never
//! appears here.

use std::path::PathBuf;
use thiserror::Error;

use zkpipe_backend::BackendError;

/// Errors from witness computation and proof generation.
#[derive(Error, Debug)]
pub enum ProveError {
    /// An input artifact (witness calculator, proving key) is absent.
    #[error("required artifact missing: {path}")]
    ArtifactMissing {
        /// The missing path.
        path: PathBuf,
    },

    /// The input assignment is not a named-value object.
    #[error("invalid input assignment: {0}")]
    InvalidAssignment(String),

    /// The external proving call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Proof outputs could not be read back.
    #[error("proof output parse error: {0}")]
    Output(#[from] serde_json::Error),

    /// IO error around proof artifacts.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProveError {
    /// The external tool's error lines, when the failure carries any.
    pub fn error_lines(&self) -> &[String] {
        match self {
            ProveError::Backend(e) => e.output_lines(),
            _ => &[],
        }
    }
}

/// Errors from proof verification.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// No exported verification key exists for the circuit.
    #[error("verification key missing: {path}")]
    ArtifactMissing {
        /// The expected verification-key path.
        path: PathBuf,
    },

    /// The proof payload is malformed for the declared proving system.
    #[error("structural validation failed for {system}: missing {missing:?}")]
    Structure {
        /// The proving system the proof claims.
        system: String,
        /// Required fields that are absent or mis-shaped.
        missing: Vec<String>,
    },

    /// The external verification call itself failed (distinct from a
    /// clean `false` result).
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// IO error around verification artifacts.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error staging verification inputs.
    #[error("verification input serialization error: {0}")]
    Input(#[from] serde_json::Error),
}
