//! # zkpipe-prover — Witness/Proof Generation and Verification
//!
//! The proving half of the pipeline: computes witnesses from input
//! assignments, generates proofs (step-wise or combined), verifies them
//! against exported verification keys, and performs the cheap structural
//! screening that rejects malformed submissions before any cryptography
//! runs.
//!
//! Proof payloads are opaque throughout — this crate reads them from and
//! writes them to disk for the backend but never interprets their
//! contents beyond the structural field check.
//!
//! ## Crate Policy
//!
//! - Depends on `zkpipe-core` and `zkpipe-backend` internally.
//! - No `unsafe` code.

pub mod error;
pub mod generator;
pub mod hash;
pub mod proof;
pub mod verifier;
pub mod witness;

pub use error::{ProveError, VerifyError};
pub use generator::ProofGenerator;
pub use hash::proof_hash;
pub use proof::{Proof, VerificationResult};
pub use verifier::ProofVerifier;
pub use witness::WitnessAssignment;
