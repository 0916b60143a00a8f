//! # zkpipe-core — Foundational Types for the Proof Pipeline
//!
//! This crate is the bedrock of the zkpipe workspace. It defines the
//! primitives every other crate builds on: the on-disk workspace layout,
//! validated circuit names, the proving-system selector, and the
//! diagnostic classification/formatting machinery that turns raw tool
//! output into readable error blocks.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `CircuitName` is a
//!    validated newtype — no bare strings reach the filesystem layer, so
//!    a request cannot smuggle path separators into artifact paths.
//!
//! 2. **Explicit configuration, no singletons.** Services receive a
//!    `WorkspaceConfig` at construction. There is no process-wide mutable
//!    state anywhere in the workspace.
//!
//! 3. **Pluggable classification.** Tool-output heuristics live behind
//!    the `LineClassifier` trait so a structured diagnostic format can
//!    replace the substring heuristic without touching callers.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `zkpipe-*` crates (leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod circuit;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod system;

// Re-export primary types for ergonomic imports.
pub use circuit::CircuitName;
pub use config::{PipelineConfig, ToolchainConfig, WorkspaceConfig};
pub use diagnostics::{
    strip_ansi, Diagnostic, DiagnosticFormatter, DiagnosticKind, LineClassifier, LineKind,
    SubstringClassifier,
};
pub use error::CoreError;
pub use system::ProvingSystem;
