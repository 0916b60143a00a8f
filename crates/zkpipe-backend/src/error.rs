//! # Backend Error Types
//!
//! Failures crossing the external-tool boundary. Tool diagnostics are
//! carried as raw output lines so the caller can classify and format
//! them; this crate does not interpret tool output beyond exit handling.

use thiserror::Error;

/// Errors from a proving backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The tool binary could not be started.
    #[error("failed to spawn {tool}: {source} (is it installed and on PATH?)")]
    Spawn {
        /// The binary that failed to start.
        tool: String,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The tool ran but reported failure.
    #[error("{operation} failed with status {status:?}")]
    Tool {
        /// The backend operation that failed (e.g. "groth16 setup").
        operation: String,
        /// Process exit code, if the process exited normally.
        status: Option<i32>,
        /// Captured output lines, ANSI-stripped, possibly truncated.
        lines: Vec<String>,
    },

    /// An artifact the operation requires or promises is missing.
    #[error("expected file missing after {operation}: {path}")]
    MissingOutput {
        /// The operation that should have produced the file.
        operation: String,
        /// The path that does not exist.
        path: std::path::PathBuf,
    },

    /// IO error reading or writing backend artifacts.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON in a backend artifact (mock paths only; the real
    /// backend never parses proof payloads).
    #[error("artifact parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BackendError {
    /// The captured tool output lines, when the error carries any.
    pub fn output_lines(&self) -> &[String] {
        match self {
            BackendError::Tool { lines, .. } => lines,
            _ => &[],
        }
    }
}
