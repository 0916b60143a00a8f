//! # Pipeline Orchestrator
//!
//! Runs the staged lifecycle — compile, key material, prove, export
//! verification key, verify, submit — stopping at the first failure.
//! There is no compensating rollback: artifacts produced before a
//! failure stay cached under their circuit name and are reused when the
//! request is retried.
//!
//! Every operation that writes a circuit's artifacts runs under that
//! circuit's gate lock, and every external tool invocation consumes one
//! permit from the bounded pool. Key staleness is re-checked on each
//! prove, so a recompiled constraint system transparently regenerates
//! its key — the pipeline's only self-healing behavior.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use zkpipe_backend::ProvingBackend;
use zkpipe_compiler::{CircuitCompiler, CircuitSource, CircuitStats, CompiledArtifactSet};
use zkpipe_core::config::{LimitsConfig, SetupConfig};
use zkpipe_core::{CircuitName, ProvingSystem, ToolchainConfig, WorkspaceConfig};
use zkpipe_keys::KeyCeremony;
use zkpipe_prover::{
    proof_hash, Proof, ProofGenerator, ProofVerifier, VerificationResult, WitnessAssignment,
};

use crate::error::{PipelineError, Stage};
use crate::gate::CircuitGate;
use crate::ledger::{LedgerClient, LedgerError, SubmissionReceipt, SubmissionRequest};

/// Record one stage outcome into the metrics facade.
fn record_stage(stage: Stage, ok: bool, elapsed: Duration) {
    metrics::histogram!("zkpipe_stage_duration_seconds", "stage" => stage.as_str())
        .record(elapsed.as_secs_f64());
    metrics::counter!(
        "zkpipe_stage_total",
        "stage" => stage.as_str(),
        "outcome" => if ok { "ok" } else { "error" }
    )
    .increment(1);
}

/// Proving- and verification-key paths for one circuit.
#[derive(Debug, Clone, Serialize)]
pub struct KeyMaterialPaths {
    /// Final proving key.
    pub proving_key: PathBuf,
    /// Exported verification key.
    pub verification_key: PathBuf,
}

/// One end-to-end pipeline request.
#[derive(Debug, Clone)]
pub struct CompleteRequest {
    /// Circuit submission (name, source, options).
    pub source: CircuitSource,
    /// Proving system for key material and proof.
    pub system: ProvingSystem,
    /// Input assignment for witness computation.
    pub assignment: WitnessAssignment,
    /// Task identifier for the ledger; generated when absent.
    pub task_id: Option<Uuid>,
    /// Submitting user for the ledger.
    pub user_id: Option<String>,
    /// Metadata forwarded to the ledger verbatim.
    pub metadata: serde_json::Value,
}

/// Outcome of a complete pipeline run.
///
/// `submission` is `None` when no ledger is configured or when
/// verification rejected the proof (the run stops before submission; the
/// rejection itself is a result, not an error).
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// The circuit that ran.
    pub circuit: CircuitName,
    /// Proving system used.
    pub system: ProvingSystem,
    /// Stats from the compile stage.
    pub stats: CircuitStats,
    /// The generated proof.
    pub proof: Proof,
    /// Canonical hash of the proof, as submitted to the ledger.
    pub proof_hash: String,
    /// Verification outcome.
    pub verification: VerificationResult,
    /// Ledger receipt, when submission happened.
    pub submission: Option<SubmissionReceipt>,
}

/// The pipeline orchestrator for one workspace.
pub struct Pipeline {
    workspace: WorkspaceConfig,
    backend: Arc<dyn ProvingBackend>,
    compiler: CircuitCompiler,
    ceremony: KeyCeremony,
    generator: ProofGenerator,
    verifier: ProofVerifier,
    gate: CircuitGate,
    ledger: Option<Arc<dyn LedgerClient>>,
}

impl Pipeline {
    /// Assemble a pipeline over the given workspace, toolchain, and
    /// backend. No ledger is configured; submission stages fail with
    /// [`LedgerError::Unconfigured`] until one is attached.
    pub fn new(
        workspace: WorkspaceConfig,
        toolchain: ToolchainConfig,
        setup: &SetupConfig,
        limits: &LimitsConfig,
        backend: Arc<dyn ProvingBackend>,
    ) -> Self {
        let compiler = CircuitCompiler::new(workspace.clone(), toolchain);
        let ceremony = KeyCeremony::new(workspace.clone(), backend.clone(), setup);
        let generator = ProofGenerator::new(workspace.clone(), backend.clone());
        let verifier = ProofVerifier::new(workspace.clone(), backend.clone());
        Self {
            workspace,
            backend,
            compiler,
            ceremony,
            generator,
            verifier,
            gate: CircuitGate::new(limits.max_concurrent_tools),
            ledger: None,
        }
    }

    /// Attach a ledger collaborator.
    pub fn with_ledger(mut self, ledger: Arc<dyn LedgerClient>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// The workspace this pipeline operates on.
    pub fn workspace(&self) -> &WorkspaceConfig {
        &self.workspace
    }

    /// Whether a ledger collaborator is configured.
    pub fn has_ledger(&self) -> bool {
        self.ledger.is_some()
    }

    /// Run the source prechecks without compiling.
    pub fn precheck(&self, source: &str) -> Result<(), PipelineError> {
        zkpipe_compiler::precheck::run(source)?;
        Ok(())
    }

    /// Compile a circuit under its gate lock.
    pub async fn compile(
        &self,
        src: &CircuitSource,
    ) -> Result<CompiledArtifactSet, PipelineError> {
        let lock = self.gate.circuit(&src.name);
        let _guard = lock.lock().await;
        let _permit = self.gate.tool_permit().await?;

        let started = Instant::now();
        let result = self.compiler.compile(src).await;
        record_stage(Stage::Compile, result.is_ok(), started.elapsed());
        Ok(result?)
    }

    /// Reconstruct the artifact set for a previously compiled circuit.
    pub async fn artifact_set(
        &self,
        name: &CircuitName,
    ) -> Result<CompiledArtifactSet, PipelineError> {
        Ok(self.compiler.artifact_set(name).await?)
    }

    /// Make sure a universal setup file is present, collapsing
    /// concurrent fetches into one download.
    async fn ensure_setup(&self) -> Result<(), PipelineError> {
        if self.ceremony.setup_store().find_local().is_some() {
            return Ok(());
        }
        let lock = self.gate.setup_lock();
        let _guard = lock.lock().await;
        // Another request may have finished the download while we waited.
        if self.ceremony.setup_store().find_local().is_some() {
            return Ok(());
        }
        self.ceremony.setup_store().acquire().await?;
        Ok(())
    }

    /// Return a valid proving key for the circuit, deriving or
    /// regenerating as needed. Caller must hold the circuit lock.
    async fn key_for(
        &self,
        name: &CircuitName,
        artifacts: &CompiledArtifactSet,
        system: ProvingSystem,
    ) -> Result<PathBuf, PipelineError> {
        self.ensure_setup().await?;
        let _permit = self.gate.tool_permit().await?;

        let started = Instant::now();
        let result = self
            .ceremony
            .get_or_create_key(name, &artifacts.r1cs, system, Some(artifacts.stats.constraints()))
            .await;
        record_stage(Stage::KeySetup, result.is_ok(), started.elapsed());
        Ok(result?)
    }

    /// Derive (or reuse) key material for a compiled circuit, exporting
    /// the verification key alongside.
    pub async fn setup(
        &self,
        name: &CircuitName,
        system: ProvingSystem,
    ) -> Result<KeyMaterialPaths, PipelineError> {
        let artifacts = self.compiler.artifact_set(name).await?;
        let lock = self.gate.circuit(name);
        let _guard = lock.lock().await;

        let proving_key = self.key_for(name, &artifacts, system).await?;
        let verification_key = self.export_verification_key(name, system).await?;
        Ok(KeyMaterialPaths {
            proving_key,
            verification_key,
        })
    }

    async fn export_verification_key(
        &self,
        name: &CircuitName,
        system: ProvingSystem,
    ) -> Result<PathBuf, PipelineError> {
        let _permit = self.gate.tool_permit().await?;
        let started = Instant::now();
        let result = self.ceremony.verification_key(name, system).await;
        record_stage(Stage::ExportKey, result.is_ok(), started.elapsed());
        Ok(result?)
    }

    /// The exported verification key for a circuit, recomputed from the
    /// proving key when absent.
    pub async fn verification_key(
        &self,
        name: &CircuitName,
        system: ProvingSystem,
    ) -> Result<PathBuf, PipelineError> {
        let lock = self.gate.circuit(name);
        let _guard = lock.lock().await;
        self.export_verification_key(name, system).await
    }

    /// Compute a witness for a compiled circuit (step-wise mode).
    pub async fn compute_witness(
        &self,
        name: &CircuitName,
        assignment: &WitnessAssignment,
    ) -> Result<PathBuf, PipelineError> {
        let artifacts = self.compiler.artifact_set(name).await?;
        let _permit = self.gate.tool_permit().await?;
        Ok(self
            .generator
            .compute_witness(name, &artifacts.wasm, assignment)
            .await?)
    }

    /// Generate a proof for a compiled circuit, regenerating stale key
    /// material first.
    pub async fn prove(
        &self,
        name: &CircuitName,
        system: ProvingSystem,
        assignment: &WitnessAssignment,
    ) -> Result<Proof, PipelineError> {
        let artifacts = self.compiler.artifact_set(name).await?;
        let proving_key = {
            let lock = self.gate.circuit(name);
            let _guard = lock.lock().await;
            self.key_for(name, &artifacts, system).await?
        };
        self.prove_with_key(name, system, &artifacts, &proving_key, assignment)
            .await
    }

    async fn prove_with_key(
        &self,
        name: &CircuitName,
        system: ProvingSystem,
        artifacts: &CompiledArtifactSet,
        proving_key: &Path,
        assignment: &WitnessAssignment,
    ) -> Result<Proof, PipelineError> {
        let _permit = self.gate.tool_permit().await?;
        let started = Instant::now();
        let result = self
            .generator
            .full_prove(name, system, &artifacts.wasm, proving_key, assignment)
            .await;
        record_stage(Stage::Prove, result.is_ok(), started.elapsed());
        Ok(result?)
    }

    /// Verify a proof against the circuit's stored verification key.
    pub async fn verify(
        &self,
        name: &CircuitName,
        proof: &Proof,
    ) -> Result<VerificationResult, PipelineError> {
        let _permit = self.gate.tool_permit().await?;
        let started = Instant::now();
        let result = self.verifier.verify_with_stored_key(name, proof).await;
        record_stage(Stage::Verify, result.is_ok(), started.elapsed());
        Ok(result?)
    }

    /// Submit a proof digest to the configured ledger.
    pub async fn submit(
        &self,
        proof: &Proof,
        task_id: Option<Uuid>,
        user_id: &str,
        metadata: serde_json::Value,
    ) -> Result<SubmissionReceipt, PipelineError> {
        let Some(ledger) = &self.ledger else {
            return Err(LedgerError::Unconfigured.into());
        };
        let request = SubmissionRequest {
            proof_hash: proof_hash(proof),
            task_id: task_id.unwrap_or_else(Uuid::new_v4),
            user_id: user_id.to_string(),
            submitted_at: chrono::Utc::now(),
            metadata,
        };
        let started = Instant::now();
        let result = ledger.submit(&request).await;
        record_stage(Stage::Submit, result.is_ok(), started.elapsed());
        Ok(result?)
    }

    /// Export a verifier-contract artifact from the circuit's proving
    /// key. Utility only — nothing in the verification flow consumes it.
    pub async fn export_verifier_contract(
        &self,
        name: &CircuitName,
        system: ProvingSystem,
        contract_out: &Path,
    ) -> Result<(), PipelineError> {
        let proving_key = self.workspace.proving_key_path(name, system);
        if !proving_key.exists() {
            return Err(PipelineError::Key(zkpipe_keys::KeyError::ArtifactMissing {
                path: proving_key,
            }));
        }
        let _permit = self.gate.tool_permit().await?;
        self.backend
            .export_verifier_contract(&proving_key, contract_out)
            .await?;
        Ok(())
    }

    /// Run the full lifecycle for one request.
    ///
    /// Stops at the first failing stage. A clean verification rejection
    /// is not a failure: the report is returned with
    /// `verification.verified == false` and no submission.
    pub async fn complete(
        &self,
        request: &CompleteRequest,
    ) -> Result<PipelineReport, PipelineError> {
        let name = request.source.name.clone();
        tracing::info!(circuit = %name, system = %request.system, "pipeline run started");

        let artifacts = self.compile(&request.source).await?;

        let proving_key = {
            let lock = self.gate.circuit(&name);
            let _guard = lock.lock().await;
            let key = self.key_for(&name, &artifacts, request.system).await?;
            self.export_verification_key(&name, request.system).await?;
            key
        };

        let proof = self
            .prove_with_key(
                &name,
                request.system,
                &artifacts,
                &proving_key,
                &request.assignment,
            )
            .await?;
        let hash = proof_hash(&proof);

        let verification = self.verify(&name, &proof).await?;
        if !verification.verified {
            tracing::warn!(circuit = %name, "proof rejected by verification, skipping submission");
            return Ok(PipelineReport {
                circuit: name,
                system: request.system,
                stats: artifacts.stats,
                proof,
                proof_hash: hash,
                verification,
                submission: None,
            });
        }

        let submission = if self.ledger.is_some() {
            let user = request.user_id.as_deref().unwrap_or("anonymous");
            Some(
                self.submit(&proof, request.task_id, user, request.metadata.clone())
                    .await?,
            )
        } else {
            None
        };

        tracing::info!(
            circuit = %name,
            system = %request.system,
            verified = verification.verified,
            submitted = submission.is_some(),
            "pipeline run finished"
        );
        Ok(PipelineReport {
            circuit: name,
            system: request.system,
            stats: artifacts.stats,
            proof,
            proof_hash: hash,
            verification,
            submission,
        })
    }
}
