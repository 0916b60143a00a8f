//! # Error Types — Core Crate Errors
//!
//! Errors raised by the foundational types: name validation, workspace
//! layout, and configuration loading. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations.

use thiserror::Error;

/// Errors from zkpipe-core primitives.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A circuit name failed validation.
    #[error("invalid circuit name: {0}")]
    InvalidCircuitName(String),

    /// An unknown proving-system name was supplied.
    #[error("unknown proving system: {0:?} (expected groth16, plonk, or fflonk)")]
    UnknownProvingSystem(String),

    /// Configuration file could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// YAML deserialization failed.
    #[error("config parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error while touching the workspace.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
