//! # Health Probes
//!
//! Unauthenticated liveness and readiness endpoints. Readiness verifies
//! the workspace tree is present and writable — the only dependency the
//! service owns; the external tools are exercised lazily per request.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Build the health router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health/live", get(liveness))
        .route("/health/ready", get(readiness))
}

/// GET /health/live — always 200 while the process runs.
async fn liveness() -> &'static str {
    "ok"
}

/// GET /health/ready — verifies the workspace layout is usable.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let workspace = state.pipeline.workspace().clone();
    match tokio::task::spawn_blocking(move || workspace.ensure_layout()).await {
        Ok(Ok(())) => (StatusCode::OK, "ready").into_response(),
        Ok(Err(e)) => {
            tracing::warn!("readiness probe failed: {e}");
            (StatusCode::SERVICE_UNAVAILABLE, "workspace unavailable").into_response()
        }
        Err(e) => {
            tracing::warn!("readiness probe panicked: {e}");
            (StatusCode::SERVICE_UNAVAILABLE, "probe failure").into_response()
        }
    }
}
