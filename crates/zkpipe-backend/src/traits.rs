//! # Proving Backend Trait
//!
//! The abstract interface over the external proving-system tool. All
//! operations are file-path based: the tool reads and writes artifacts on
//! disk, and proof payloads stay opaque to the pipeline.
//!
//! Implementations must be `Send + Sync` so a backend can be shared
//! across async tasks behind an `Arc`. The trait is object-safe to
//! support runtime backend selection (subprocess in production, mock in
//! tests).

use async_trait::async_trait;
use std::path::Path;

use zkpipe_core::ProvingSystem;

use crate::error::BackendError;

/// Abstract interface for the external proving-system tool.
///
/// Each method corresponds to one tool operation. Callers own artifact
/// placement; the backend never chooses paths.
#[async_trait]
pub trait ProvingBackend: Send + Sync {
    /// Compute a witness from a witness-calculator artifact and an input
    /// assignment file, writing the witness to `wtns_out`.
    async fn compute_witness(
        &self,
        wasm: &Path,
        input_json: &Path,
        wtns_out: &Path,
    ) -> Result<(), BackendError>;

    /// Derive a proving key from a constraint system and a universal
    /// setup file. For Groth16 the output is an intermediate key that
    /// still needs a contribution; for PLONK/FFLONK it is final.
    async fn setup_key(
        &self,
        system: ProvingSystem,
        r1cs: &Path,
        ptau: &Path,
        zkey_out: &Path,
    ) -> Result<(), BackendError>;

    /// Apply one ceremony contribution to an intermediate proving key.
    async fn contribute(
        &self,
        zkey_in: &Path,
        zkey_out: &Path,
        entropy: &str,
    ) -> Result<(), BackendError>;

    /// Export the verification key from a proving key. The verification
    /// key is derived and recomputable at any time.
    async fn export_verification_key(
        &self,
        zkey: &Path,
        vkey_out: &Path,
    ) -> Result<(), BackendError>;

    /// Generate a proof from a proving key and a computed witness,
    /// writing the opaque proof payload and the ordered public signals.
    async fn prove(
        &self,
        system: ProvingSystem,
        zkey: &Path,
        wtns: &Path,
        proof_out: &Path,
        public_out: &Path,
    ) -> Result<(), BackendError>;

    /// Combined witness computation and proving — the default path.
    async fn full_prove(
        &self,
        system: ProvingSystem,
        input_json: &Path,
        wasm: &Path,
        zkey: &Path,
        proof_out: &Path,
        public_out: &Path,
    ) -> Result<(), BackendError>;

    /// Cryptographically verify a proof against a verification key and
    /// public signals. A clean `false` means the proof (or the public
    /// signals) did not verify — the two cases are not distinguished.
    async fn verify(
        &self,
        system: ProvingSystem,
        vkey: &Path,
        public_json: &Path,
        proof_json: &Path,
    ) -> Result<bool, BackendError>;

    /// Export a verifier-contract artifact from a proving key. Utility
    /// only — nothing in the verification flow consumes it.
    async fn export_verifier_contract(
        &self,
        zkey: &Path,
        contract_out: &Path,
    ) -> Result<(), BackendError>;
}
