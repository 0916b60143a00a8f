//! # zkpipe-api — Axum Request Surface
//!
//! The glue layer over the pipeline orchestrator. Handlers validate and
//! translate; every operation delegates to `zkpipe-pipeline` — no
//! business logic lives here.
//!
//! ## API Surface
//!
//! | Route                            | Operation                       |
//! |----------------------------------|---------------------------------|
//! | `POST /v1/circuits/compile`      | Compile a circuit source        |
//! | `POST /v1/circuits/precheck`     | Source prechecks only           |
//! | `GET  /v1/circuits/{name}/artifacts` | Inspect compiled artifacts  |
//! | `POST /v1/circuits/{name}/witness`   | Compute a witness           |
//! | `POST /v1/circuits/{name}/setup`     | Derive or reuse key material|
//! | `GET  /v1/circuits/{name}/vkey`      | Fetch the verification key  |
//! | `POST /v1/circuits/{name}/prove`     | Generate a proof            |
//! | `POST /v1/circuits/{name}/complete`  | Full compile-to-ledger run  |
//! | `POST /v1/proofs/verify`         | Verify against a stored key     |
//! | `POST /v1/proofs/validate`       | Structural shape check          |
//! | `POST /v1/proofs/submit`         | Ledger submission               |
//! | `GET  /health/live`, `/health/ready` | Probes (no auth)            |
//! | `GET  /metrics`                  | Prometheus scrape               |
//! | `GET  /openapi.json`             | Generated OpenAPI document      |
//!
//! Success responses are `{success, ...}`; error bodies are
//! `{error, errors?, formatted_errors?}` with conventional 4xx/5xx
//! distinctions mapped through [`AppError`].
//!
//! ## Crate Policy
//!
//! - No business logic in route handlers.
//! - Unexpected errors reduce to a message at this boundary; a request
//!   never crashes the host process.

pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::AppError;
pub use state::AppState;

/// Assemble the full application router.
///
/// Health probes, `/metrics`, and `/openapi.json` sit alongside the
/// `/v1` surface; request bodies are capped at 2 MiB (circuit sources
/// and proofs are far smaller).
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::circuits::router())
        .merge(routes::proofs::router())
        .merge(routes::health::router())
        .merge(openapi::router())
        .route("/metrics", axum::routing::get(prometheus_metrics))
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /metrics — Prometheus text exposition.
async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()).into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}
