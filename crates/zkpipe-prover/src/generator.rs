//! # Proof Generator Service
//!
//! Two operating modes over the backend:
//!
//! - **Step-wise** — [`compute_witness`](ProofGenerator::compute_witness)
//!   then [`prove_with_witness`](ProofGenerator::prove_with_witness),
//!   which isolates witness failures from proving failures.
//! - **Combined** — [`full_prove`](ProofGenerator::full_prove), the
//!   default path.
//!
//! Input artifacts are checked for existence before the backend runs, so
//! a missing calculator or key surfaces immediately instead of as an
//! opaque tool failure.

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use zkpipe_backend::ProvingBackend;
use zkpipe_core::{CircuitName, ProvingSystem, WorkspaceConfig};

use crate::error::ProveError;
use crate::proof::Proof;
use crate::witness::WitnessAssignment;

/// Witness and proof generation for one workspace.
pub struct ProofGenerator {
    workspace: WorkspaceConfig,
    backend: Arc<dyn ProvingBackend>,
}

impl ProofGenerator {
    /// Create a generator over the given workspace and backend.
    pub fn new(workspace: WorkspaceConfig, backend: Arc<dyn ProvingBackend>) -> Self {
        Self { workspace, backend }
    }

    fn input_path(&self, name: &CircuitName) -> PathBuf {
        self.workspace.circuit_dir(name).join("input.json")
    }

    /// Path the computed witness is written to.
    pub fn witness_path(&self, name: &CircuitName) -> PathBuf {
        self.workspace.circuit_dir(name).join(format!("{name}.wtns"))
    }

    fn proof_path(&self, name: &CircuitName, system: ProvingSystem) -> PathBuf {
        self.workspace
            .circuit_dir(name)
            .join(format!("{}_proof.json", system.as_str()))
    }

    fn public_path(&self, name: &CircuitName, system: ProvingSystem) -> PathBuf {
        self.workspace
            .circuit_dir(name)
            .join(format!("{}_public.json", system.as_str()))
    }

    fn require(path: &Path) -> Result<(), ProveError> {
        if path.exists() {
            Ok(())
        } else {
            Err(ProveError::ArtifactMissing {
                path: path.to_path_buf(),
            })
        }
    }

    async fn stage_input(
        &self,
        name: &CircuitName,
        assignment: &WitnessAssignment,
    ) -> Result<PathBuf, ProveError> {
        tokio::fs::create_dir_all(self.workspace.circuit_dir(name)).await?;
        let input = self.input_path(name);
        assignment.write_to(&input).await?;
        Ok(input)
    }

    /// Read the proof payload and ordered public signals back from disk.
    async fn read_outputs(
        proof_path: &Path,
        public_path: &Path,
    ) -> Result<(Value, Vec<String>), ProveError> {
        let payload: Value = serde_json::from_slice(&tokio::fs::read(proof_path).await?)?;
        let raw: Vec<Value> = serde_json::from_slice(&tokio::fs::read(public_path).await?)?;
        let signals = raw
            .into_iter()
            .map(|v| match v {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect();
        Ok((payload, signals))
    }

    /// Compute a witness from the calculator artifact and an input
    /// assignment (step-wise mode).
    pub async fn compute_witness(
        &self,
        name: &CircuitName,
        wasm: &Path,
        assignment: &WitnessAssignment,
    ) -> Result<PathBuf, ProveError> {
        Self::require(wasm)?;
        let input = self.stage_input(name, assignment).await?;
        let witness = self.witness_path(name);
        self.backend
            .compute_witness(wasm, &input, &witness)
            .await?;
        tracing::info!(circuit = %name, witness = %witness.display(), "witness computed");
        Ok(witness)
    }

    /// Generate a proof from an already-computed witness (step-wise mode).
    pub async fn prove_with_witness(
        &self,
        name: &CircuitName,
        system: ProvingSystem,
        proving_key: &Path,
        witness: &Path,
    ) -> Result<Proof, ProveError> {
        Self::require(proving_key)?;
        Self::require(witness)?;
        let proof_path = self.proof_path(name, system);
        let public_path = self.public_path(name, system);

        let started = Instant::now();
        self.backend
            .prove(system, proving_key, witness, &proof_path, &public_path)
            .await?;
        let duration_ms = started.elapsed().as_millis() as u64;

        let (payload, public_signals) = Self::read_outputs(&proof_path, &public_path).await?;
        tracing::info!(circuit = %name, system = %system, duration_ms, "proof generated");
        Ok(Proof {
            system,
            payload,
            public_signals,
            duration_ms,
        })
    }

    /// Combined witness computation and proving — the default path.
    pub async fn full_prove(
        &self,
        name: &CircuitName,
        system: ProvingSystem,
        wasm: &Path,
        proving_key: &Path,
        assignment: &WitnessAssignment,
    ) -> Result<Proof, ProveError> {
        Self::require(wasm)?;
        Self::require(proving_key)?;
        let input = self.stage_input(name, assignment).await?;
        let proof_path = self.proof_path(name, system);
        let public_path = self.public_path(name, system);

        let started = Instant::now();
        self.backend
            .full_prove(system, &input, wasm, proving_key, &proof_path, &public_path)
            .await?;
        let duration_ms = started.elapsed().as_millis() as u64;

        let (payload, public_signals) = Self::read_outputs(&proof_path, &public_path).await?;
        tracing::info!(circuit = %name, system = %system, duration_ms, "proof generated");
        Ok(Proof {
            system,
            payload,
            public_signals,
            duration_ms,
        })
    }
}
