//! # Proof API
//!
//! REST endpoints operating on already-generated proofs: cryptographic
//! verification against stored keys, the cheap structural screening, and
//! ledger submission.
//!
//! ## Endpoints
//!
//! - `POST /v1/proofs/verify`   — Verify against a circuit's stored key
//! - `POST /v1/proofs/validate` — Structural shape check only
//! - `POST /v1/proofs/submit`   — Submit a proof digest to the ledger

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use zkpipe_core::{CircuitName, ProvingSystem};
use zkpipe_prover::{Proof, ProofVerifier};

use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// Request to verify a proof against a circuit's stored key.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct VerifyBody {
    /// Circuit whose exported verification key to use.
    pub circuit: String,
    /// Proving system the proof claims.
    #[schema(value_type = String)]
    pub system: ProvingSystem,
    /// Opaque proof payload.
    #[schema(value_type = Object)]
    pub proof: serde_json::Value,
    /// Ordered public signal values.
    pub public_signals: Vec<String>,
}

/// Verification outcome.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    /// Whether the request completed (a rejected proof still completes).
    pub success: bool,
    /// Whether the proof verified. A `false` does not distinguish an
    /// invalid proof from malformed public signals.
    pub verified: bool,
    /// Diagnostic text for rejected proofs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
    /// Wall-clock verification time in milliseconds.
    pub duration_ms: u64,
}

/// Request for the structural shape check.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ValidateBody {
    /// Proving system the proof claims.
    #[schema(value_type = String)]
    pub system: ProvingSystem,
    /// Opaque proof payload.
    #[schema(value_type = Object)]
    pub proof: serde_json::Value,
}

/// Structural check outcome.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidateResponse {
    /// Whether the shape check passed.
    pub success: bool,
}

/// Request to submit a proof digest to the ledger.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SubmitBody {
    /// Proving system the proof claims.
    #[schema(value_type = String)]
    pub system: ProvingSystem,
    /// Opaque proof payload.
    #[schema(value_type = Object)]
    pub proof: serde_json::Value,
    /// Ordered public signal values.
    pub public_signals: Vec<String>,
    /// Task identifier; generated when absent.
    #[serde(default)]
    pub task_id: Option<Uuid>,
    /// Submitting user.
    pub user_id: String,
    /// Metadata forwarded to the ledger verbatim.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
}

/// Ledger submission outcome.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitResponse {
    /// Whether the submission was accepted.
    pub success: bool,
    /// Ledger transaction identifier.
    pub transaction_id: String,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the proof router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/proofs/verify", post(verify_proof))
        .route("/v1/proofs/validate", post(validate_proof))
        .route("/v1/proofs/submit", post(submit_proof))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/proofs/verify — Verify a proof against a stored key.
#[utoipa::path(
    post,
    path = "/v1/proofs/verify",
    request_body = VerifyBody,
    responses(
        (status = 200, description = "Verification outcome (verified may be false)", body = VerifyResponse),
        (status = 404, description = "No stored verification key", body = crate::error::ErrorBody),
    ),
    tag = "proofs"
)]
pub(crate) async fn verify_proof(
    State(state): State<AppState>,
    Json(body): Json<VerifyBody>,
) -> Result<Json<VerifyResponse>, AppError> {
    let name = CircuitName::new(&body.circuit)?;
    let proof = Proof {
        system: body.system,
        payload: body.proof,
        public_signals: body.public_signals,
        duration_ms: 0,
    };
    let result = state.pipeline.verify(&name, &proof).await?;
    Ok(Json(VerifyResponse {
        success: true,
        verified: result.verified,
        diagnostic: result.diagnostic,
        duration_ms: result.duration_ms,
    }))
}

/// POST /v1/proofs/validate — Cheap structural shape check.
///
/// Rejects obviously malformed submissions without any cryptographic
/// call; a passing check says nothing about validity.
#[utoipa::path(
    post,
    path = "/v1/proofs/validate",
    request_body = ValidateBody,
    responses(
        (status = 200, description = "Shape check passed", body = ValidateResponse),
        (status = 422, description = "Malformed proof shape", body = crate::error::ErrorBody),
    ),
    tag = "proofs"
)]
pub(crate) async fn validate_proof(
    Json(body): Json<ValidateBody>,
) -> Result<Json<ValidateResponse>, AppError> {
    ProofVerifier::validate_structure(&body.proof, body.system)?;
    Ok(Json(ValidateResponse { success: true }))
}

/// POST /v1/proofs/submit — Submit a proof digest to the ledger.
#[utoipa::path(
    post,
    path = "/v1/proofs/submit",
    request_body = SubmitBody,
    responses(
        (status = 200, description = "Submission accepted", body = SubmitResponse),
        (status = 502, description = "Ledger failure", body = crate::error::ErrorBody),
        (status = 503, description = "No ledger configured", body = crate::error::ErrorBody),
    ),
    tag = "proofs"
)]
pub(crate) async fn submit_proof(
    State(state): State<AppState>,
    Json(body): Json<SubmitBody>,
) -> Result<Json<SubmitResponse>, AppError> {
    let proof = Proof {
        system: body.system,
        payload: body.proof,
        public_signals: body.public_signals,
        duration_ms: 0,
    };
    let receipt = state
        .pipeline
        .submit(&proof, body.task_id, &body.user_id, body.metadata)
        .await?;
    Ok(Json(SubmitResponse {
        success: true,
        transaction_id: receipt.transaction_id,
    }))
}
