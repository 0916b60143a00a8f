//! # Key Ceremony Errors
//!
//! A missing-and-unfetchable universal setup is fatal and carries the
//! exact remediation an operator needs; everything else propagates the
//! backend or IO failure it wraps.

use std::path::PathBuf;
use thiserror::Error;

use zkpipe_backend::BackendError;

/// Errors from key ceremony operations.
#[derive(Error, Debug)]
pub enum KeyError {
    /// Universal setup parameters are absent locally and could not be
    /// fetched. Requires operator action; nothing falls back silently.
    #[error(
        "universal setup parameters unavailable: {reason}; \
         download {url} manually and place it at {dest}"
    )]
    SetupPrerequisite {
        /// Why acquisition failed.
        reason: String,
        /// The remote file that was attempted.
        url: String,
        /// Where the file must be placed.
        dest: PathBuf,
    },

    /// A required input artifact does not exist.
    #[error("required artifact missing: {path}")]
    ArtifactMissing {
        /// The missing path.
        path: PathBuf,
    },

    /// The proving tool failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// IO error in the key directory.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Foundation-type error.
    #[error(transparent)]
    Core(#[from] zkpipe_core::CoreError),
}
