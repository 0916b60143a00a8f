//! # Compiler Adapter Errors
//!
//! The adapter distinguishes failures caught before the tool runs
//! (prechecks), failures reported by the tool (classified diagnostics),
//! and the tool lying about success (missing artifacts).

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the circuit compiler adapter.
#[derive(Error, Debug)]
pub enum CompileError {
    /// The source failed a fast precheck; the compiler was never invoked.
    #[error("precheck failed: {0}")]
    Precheck(String),

    /// The compiler reported errors (regardless of exit code).
    #[error("compilation reported {} error line(s)", errors.len())]
    Diagnostics {
        /// The classified error lines, verbatim (ANSI-stripped).
        errors: Vec<String>,
        /// Grouped rendering of the full captured output.
        formatted: String,
    },

    /// The compiler exited cleanly but an expected artifact is absent.
    #[error("compiler reported success but expected artifact is missing: {path}")]
    ArtifactMissing {
        /// The artifact path that does not exist.
        path: PathBuf,
    },

    /// The compiler binary could not be started.
    #[error("failed to spawn {tool}: {source} (is it installed and on PATH?)")]
    Spawn {
        /// The binary that failed to start.
        tool: String,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// IO error in the workspace.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Foundation-type error (name validation, layout).
    #[error(transparent)]
    Core(#[from] zkpipe_core::CoreError),
}

impl CompileError {
    /// The verbatim error lines, when the failure carries any.
    pub fn error_lines(&self) -> &[String] {
        match self {
            CompileError::Diagnostics { errors, .. } => errors,
            _ => &[],
        }
    }
}
