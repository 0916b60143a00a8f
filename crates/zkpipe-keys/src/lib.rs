//! # zkpipe-keys — Key Ceremony Management
//!
//! Owns per-circuit key material: acquiring universal setup parameters,
//! deriving proving keys through the two-phase ceremony, exporting
//! verification keys, and regenerating keys when their constraint system
//! moves underneath them.
//!
//! ## Caching Invariant
//!
//! A cached proving key is valid only while it is not older than its
//! constraint system. Staleness is decided by a pluggable
//! [`StalenessPredicate`]; the default compares modification times, and a
//! content-hash predicate can replace it for distributed deployments.
//!
//! ## Crate Policy
//!
//! - Depends on `zkpipe-core` and `zkpipe-backend` internally.
//! - No `unsafe` code.

pub mod ceremony;
pub mod error;
pub mod setup;
pub mod staleness;

pub use ceremony::KeyCeremony;
pub use error::KeyError;
pub use setup::{SetupStore, SetupTier, SETUP_TIERS};
pub use staleness::{MtimeStaleness, StalenessPredicate};
