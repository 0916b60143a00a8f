//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into a single OpenAPI
//! document served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "zkpipe API",
        description = "Zero-knowledge proof pipeline service: circuit compilation, \
key-ceremony management with staleness-aware caching, witness/proof generation, \
verification, and optional ledger submission.\n\nResponses are `{success, ...}` on \
200; error bodies are `{error, errors?, formatted_errors?}`.",
        license(name = "AGPL-3.0-or-later")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        crate::routes::circuits::compile_circuit,
        crate::routes::circuits::precheck_circuit,
        crate::routes::circuits::get_artifacts,
        crate::routes::circuits::compute_witness,
        crate::routes::circuits::run_setup,
        crate::routes::circuits::get_verification_key,
        crate::routes::circuits::generate_proof,
        crate::routes::circuits::complete_pipeline,
        crate::routes::proofs::verify_proof,
        crate::routes::proofs::validate_proof,
        crate::routes::proofs::submit_proof,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::routes::circuits::CompileBody,
        crate::routes::circuits::PrecheckBody,
        crate::routes::circuits::PrecheckResponse,
        crate::routes::circuits::ArtifactPaths,
        crate::routes::circuits::CompileResponse,
        crate::routes::circuits::WitnessBody,
        crate::routes::circuits::WitnessResponse,
        crate::routes::circuits::SetupBody,
        crate::routes::circuits::SetupResponse,
        crate::routes::circuits::VkeyResponse,
        crate::routes::circuits::ProveBody,
        crate::routes::circuits::ProveResponse,
        crate::routes::circuits::CompleteBody,
        crate::routes::circuits::CompleteResponse,
        crate::routes::proofs::VerifyBody,
        crate::routes::proofs::VerifyResponse,
        crate::routes::proofs::ValidateBody,
        crate::routes::proofs::ValidateResponse,
        crate::routes::proofs::SubmitBody,
        crate::routes::proofs::SubmitResponse,
    )),
    tags(
        (name = "circuits", description = "Circuit artifact lifecycle"),
        (name = "proofs", description = "Proof verification and submission"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — the generated specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_covers_the_request_surface() {
        let spec = ApiDoc::openapi();
        let paths: Vec<&String> = spec.paths.paths.keys().collect();
        for expected in [
            "/v1/circuits/compile",
            "/v1/circuits/precheck",
            "/v1/circuits/{name}/artifacts",
            "/v1/circuits/{name}/witness",
            "/v1/circuits/{name}/setup",
            "/v1/circuits/{name}/vkey",
            "/v1/circuits/{name}/prove",
            "/v1/circuits/{name}/complete",
            "/v1/proofs/verify",
            "/v1/proofs/validate",
            "/v1/proofs/submit",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing path {expected}, have {paths:?}"
            );
        }
    }
}
