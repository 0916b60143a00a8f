//! # Circuit Lifecycle API
//!
//! REST endpoints for the per-circuit artifact lifecycle: compilation,
//! prechecks, artifact inspection, witness computation, key setup,
//! verification-key retrieval, proving, and the composite end-to-end
//! operation.
//!
//! ## Endpoints
//!
//! - `POST /v1/circuits/compile`          — Compile a circuit source
//! - `POST /v1/circuits/precheck`         — Run source prechecks only
//! - `GET  /v1/circuits/{name}/artifacts` — Inspect compiled artifacts
//! - `POST /v1/circuits/{name}/witness`   — Compute a witness (step-wise)
//! - `POST /v1/circuits/{name}/setup`     — Derive or reuse key material
//! - `GET  /v1/circuits/{name}/vkey`      — Fetch the verification key
//! - `POST /v1/circuits/{name}/prove`     — Generate a proof
//! - `POST /v1/circuits/{name}/complete`  — Full compile-to-ledger run

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use zkpipe_compiler::{CircuitSource, CircuitStats, CompileOptions, CompiledArtifactSet};
use zkpipe_core::{CircuitName, ProvingSystem};
use zkpipe_pipeline::CompleteRequest;
use zkpipe_prover::WitnessAssignment;

use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// Request to compile a circuit source.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CompileBody {
    /// Circuit name; keys all durable artifacts.
    pub name: String,
    /// Circuit source text.
    pub source: String,
    /// Compiler options; defaults emit r1cs, wasm, and sym.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub options: CompileOptions,
}

/// Request to run the source prechecks without compiling.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PrecheckBody {
    /// Circuit source text.
    pub source: String,
}

/// Paths of a circuit's compiled artifacts.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ArtifactPaths {
    /// Constraint system.
    pub r1cs: String,
    /// Witness calculator.
    pub wasm: String,
    /// Symbol table.
    pub sym: String,
}

impl ArtifactPaths {
    fn from_set(set: &CompiledArtifactSet) -> Self {
        Self {
            r1cs: set.r1cs.display().to_string(),
            wasm: set.wasm.display().to_string(),
            sym: set.sym.display().to_string(),
        }
    }
}

/// Response for a successful compile or artifact inspection.
#[derive(Debug, Serialize, ToSchema)]
pub struct CompileResponse {
    /// Whether the operation succeeded.
    pub success: bool,
    /// The circuit name.
    pub name: String,
    /// Derived circuit statistics.
    #[schema(value_type = Object)]
    pub stats: CircuitStats,
    /// Artifact locations on disk.
    pub artifacts: ArtifactPaths,
}

/// Response for a passed precheck.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PrecheckResponse {
    /// Whether the prechecks passed.
    pub success: bool,
}

/// Request to compute a witness.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct WitnessBody {
    /// Named input values (scalars, arrays, or nested shapes).
    #[schema(value_type = Object)]
    pub inputs: serde_json::Value,
}

/// Response for a computed witness.
#[derive(Debug, Serialize, ToSchema)]
pub struct WitnessResponse {
    /// Whether witness computation succeeded.
    pub success: bool,
    /// Where the witness was written.
    pub witness: String,
}

/// Request to derive or reuse key material.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SetupBody {
    /// Proving system to derive keys for.
    #[schema(value_type = String)]
    pub system: ProvingSystem,
}

/// Response for key setup.
#[derive(Debug, Serialize, ToSchema)]
pub struct SetupResponse {
    /// Whether setup succeeded.
    pub success: bool,
    /// Final proving-key path.
    pub proving_key: String,
    /// Exported verification-key path.
    pub verification_key: String,
}

/// Query selecting the proving system for a verification-key fetch.
#[derive(Debug, Deserialize)]
pub struct VkeyQuery {
    /// Proving system the key belongs to.
    pub system: ProvingSystem,
}

/// Response carrying a verification key.
#[derive(Debug, Serialize, ToSchema)]
pub struct VkeyResponse {
    /// Whether the key was found or recomputed.
    pub success: bool,
    /// The verification key document, verbatim.
    #[schema(value_type = Object)]
    pub verification_key: serde_json::Value,
}

/// Request to generate a proof.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ProveBody {
    /// Proving system to use.
    #[schema(value_type = String)]
    pub system: ProvingSystem,
    /// Named input values for the witness.
    #[schema(value_type = Object)]
    pub inputs: serde_json::Value,
}

/// Response carrying a generated proof.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProveResponse {
    /// Whether proving succeeded.
    pub success: bool,
    /// Proving system used.
    #[schema(value_type = String)]
    pub system: ProvingSystem,
    /// Opaque proof payload.
    #[schema(value_type = Object)]
    pub proof: serde_json::Value,
    /// Ordered public signal values.
    pub public_signals: Vec<String>,
    /// Wall-clock generation time in milliseconds.
    pub duration_ms: u64,
}

/// Request for the composite compile-to-ledger operation.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CompleteBody {
    /// Circuit source text.
    pub source: String,
    /// Compiler options.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub options: CompileOptions,
    /// Proving system to use.
    #[schema(value_type = String)]
    pub system: ProvingSystem,
    /// Named input values for the witness.
    #[schema(value_type = Object)]
    pub inputs: serde_json::Value,
    /// Task identifier for the ledger; generated when absent.
    #[serde(default)]
    pub task_id: Option<Uuid>,
    /// Submitting user for the ledger.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Metadata forwarded to the ledger verbatim.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
}

/// Response for the composite operation.
#[derive(Debug, Serialize, ToSchema)]
pub struct CompleteResponse {
    /// Whether the full run succeeded (including verification).
    pub success: bool,
    /// Whether the proof verified.
    pub verified: bool,
    /// Derived circuit statistics.
    #[schema(value_type = Object)]
    pub stats: CircuitStats,
    /// Opaque proof payload.
    #[schema(value_type = Object)]
    pub proof: serde_json::Value,
    /// Ordered public signal values.
    pub public_signals: Vec<String>,
    /// Canonical proof hash, as submitted to the ledger.
    pub proof_hash: String,
    /// Ledger transaction identifier, when submission happened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the circuit lifecycle router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/circuits/compile", post(compile_circuit))
        .route("/v1/circuits/precheck", post(precheck_circuit))
        .route("/v1/circuits/{name}/artifacts", get(get_artifacts))
        .route("/v1/circuits/{name}/witness", post(compute_witness))
        .route("/v1/circuits/{name}/setup", post(run_setup))
        .route("/v1/circuits/{name}/vkey", get(get_verification_key))
        .route("/v1/circuits/{name}/prove", post(generate_proof))
        .route("/v1/circuits/{name}/complete", post(complete_pipeline))
}

fn parse_name(raw: &str) -> Result<CircuitName, AppError> {
    Ok(CircuitName::new(raw)?)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/circuits/compile — Compile a circuit source.
#[utoipa::path(
    post,
    path = "/v1/circuits/compile",
    request_body = CompileBody,
    responses(
        (status = 200, description = "Compilation succeeded", body = CompileResponse),
        (status = 422, description = "Precheck or compiler diagnostics", body = crate::error::ErrorBody),
    ),
    tag = "circuits"
)]
pub(crate) async fn compile_circuit(
    State(state): State<AppState>,
    Json(body): Json<CompileBody>,
) -> Result<Json<CompileResponse>, AppError> {
    let src = CircuitSource {
        name: parse_name(&body.name)?,
        source: body.source,
        options: body.options,
    };
    let set = state.pipeline.compile(&src).await?;
    Ok(Json(CompileResponse {
        success: true,
        name: set.name.as_str().to_string(),
        artifacts: ArtifactPaths::from_set(&set),
        stats: set.stats,
    }))
}

/// POST /v1/circuits/precheck — Run the source prechecks only.
#[utoipa::path(
    post,
    path = "/v1/circuits/precheck",
    request_body = PrecheckBody,
    responses(
        (status = 200, description = "Prechecks passed", body = PrecheckResponse),
        (status = 422, description = "Precheck failure with the specific diagnostic", body = crate::error::ErrorBody),
    ),
    tag = "circuits"
)]
pub(crate) async fn precheck_circuit(
    State(state): State<AppState>,
    Json(body): Json<PrecheckBody>,
) -> Result<Json<PrecheckResponse>, AppError> {
    state.pipeline.precheck(&body.source)?;
    Ok(Json(PrecheckResponse { success: true }))
}

/// GET /v1/circuits/{name}/artifacts — Inspect a compiled circuit.
#[utoipa::path(
    get,
    path = "/v1/circuits/{name}/artifacts",
    params(("name" = String, Path, description = "Circuit name")),
    responses(
        (status = 200, description = "Artifact set", body = CompileResponse),
        (status = 404, description = "Circuit was never compiled", body = crate::error::ErrorBody),
    ),
    tag = "circuits"
)]
pub(crate) async fn get_artifacts(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CompileResponse>, AppError> {
    let name = parse_name(&name)?;
    let set = state.pipeline.artifact_set(&name).await?;
    Ok(Json(CompileResponse {
        success: true,
        name: name.as_str().to_string(),
        artifacts: ArtifactPaths::from_set(&set),
        stats: set.stats,
    }))
}

/// POST /v1/circuits/{name}/witness — Compute a witness (step-wise mode).
#[utoipa::path(
    post,
    path = "/v1/circuits/{name}/witness",
    params(("name" = String, Path, description = "Circuit name")),
    request_body = WitnessBody,
    responses(
        (status = 200, description = "Witness computed", body = WitnessResponse),
        (status = 404, description = "Circuit was never compiled", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid input assignment", body = crate::error::ErrorBody),
    ),
    tag = "circuits"
)]
pub(crate) async fn compute_witness(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<WitnessBody>,
) -> Result<Json<WitnessResponse>, AppError> {
    let name = parse_name(&name)?;
    let assignment = WitnessAssignment::from_value(body.inputs)?;
    let witness = state.pipeline.compute_witness(&name, &assignment).await?;
    Ok(Json(WitnessResponse {
        success: true,
        witness: witness.display().to_string(),
    }))
}

/// POST /v1/circuits/{name}/setup — Derive or reuse key material.
#[utoipa::path(
    post,
    path = "/v1/circuits/{name}/setup",
    params(("name" = String, Path, description = "Circuit name")),
    request_body = SetupBody,
    responses(
        (status = 200, description = "Key material ready", body = SetupResponse),
        (status = 404, description = "Circuit was never compiled", body = crate::error::ErrorBody),
        (status = 503, description = "Universal setup unavailable", body = crate::error::ErrorBody),
    ),
    tag = "circuits"
)]
pub(crate) async fn run_setup(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<SetupBody>,
) -> Result<Json<SetupResponse>, AppError> {
    let name = parse_name(&name)?;
    let keys = state.pipeline.setup(&name, body.system).await?;
    Ok(Json(SetupResponse {
        success: true,
        proving_key: keys.proving_key.display().to_string(),
        verification_key: keys.verification_key.display().to_string(),
    }))
}

/// GET /v1/circuits/{name}/vkey — Fetch the exported verification key.
#[utoipa::path(
    get,
    path = "/v1/circuits/{name}/vkey",
    params(
        ("name" = String, Path, description = "Circuit name"),
        ("system" = String, Query, description = "Proving system"),
    ),
    responses(
        (status = 200, description = "Verification key", body = VkeyResponse),
        (status = 404, description = "No key material for this circuit", body = crate::error::ErrorBody),
    ),
    tag = "circuits"
)]
pub(crate) async fn get_verification_key(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<VkeyQuery>,
) -> Result<Json<VkeyResponse>, AppError> {
    let name = parse_name(&name)?;
    let path = state.pipeline.verification_key(&name, query.system).await?;
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| AppError::Internal(format!("cannot read {}: {e}", path.display())))?;
    let verification_key = serde_json::from_slice(&bytes)
        .map_err(|e| AppError::Internal(format!("malformed verification key: {e}")))?;
    Ok(Json(VkeyResponse {
        success: true,
        verification_key,
    }))
}

/// POST /v1/circuits/{name}/prove — Generate a proof.
#[utoipa::path(
    post,
    path = "/v1/circuits/{name}/prove",
    params(("name" = String, Path, description = "Circuit name")),
    request_body = ProveBody,
    responses(
        (status = 200, description = "Proof generated", body = ProveResponse),
        (status = 404, description = "Circuit was never compiled", body = crate::error::ErrorBody),
        (status = 500, description = "Proving tool failure", body = crate::error::ErrorBody),
    ),
    tag = "circuits"
)]
pub(crate) async fn generate_proof(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<ProveBody>,
) -> Result<Json<ProveResponse>, AppError> {
    let name = parse_name(&name)?;
    let assignment = WitnessAssignment::from_value(body.inputs)?;
    let proof = state.pipeline.prove(&name, body.system, &assignment).await?;
    Ok(Json(ProveResponse {
        success: true,
        system: proof.system,
        proof: proof.payload,
        public_signals: proof.public_signals,
        duration_ms: proof.duration_ms,
    }))
}

/// POST /v1/circuits/{name}/complete — Full compile-to-ledger run.
#[utoipa::path(
    post,
    path = "/v1/circuits/{name}/complete",
    params(("name" = String, Path, description = "Circuit name")),
    request_body = CompleteBody,
    responses(
        (status = 200, description = "Pipeline report (verification may still be false)", body = CompleteResponse),
        (status = 422, description = "Precheck or compiler diagnostics", body = crate::error::ErrorBody),
        (status = 502, description = "Ledger failure", body = crate::error::ErrorBody),
    ),
    tag = "circuits"
)]
pub(crate) async fn complete_pipeline(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<CompleteBody>,
) -> Result<Json<CompleteResponse>, AppError> {
    let request = CompleteRequest {
        source: CircuitSource {
            name: parse_name(&name)?,
            source: body.source,
            options: body.options,
        },
        system: body.system,
        assignment: WitnessAssignment::from_value(body.inputs)?,
        task_id: body.task_id,
        user_id: body.user_id,
        metadata: body.metadata,
    };
    let report = state.pipeline.complete(&request).await?;
    Ok(Json(CompleteResponse {
        success: report.verification.verified,
        verified: report.verification.verified,
        stats: report.stats,
        proof: report.proof.payload,
        public_signals: report.proof.public_signals,
        proof_hash: report.proof_hash,
        transaction_id: report.submission.map(|s| s.transaction_id),
    }))
}
