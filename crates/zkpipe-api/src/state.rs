//! # Application State
//!
//! Shared state for the Axum application: the pipeline orchestrator
//! behind an `Arc`, and the Prometheus handle when the deployment
//! installed a metrics recorder.

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use zkpipe_pipeline::Pipeline;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// The pipeline orchestrator. All handlers delegate here — no
    /// business logic lives in the route layer.
    pub pipeline: Arc<Pipeline>,
    /// Prometheus render handle, when metrics are enabled.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create application state over a pipeline, without metrics.
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self {
            pipeline,
            metrics: None,
        }
    }

    /// Attach a Prometheus render handle for the `/metrics` endpoint.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
