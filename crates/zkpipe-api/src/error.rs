//! # API Error Types
//!
//! Maps pipeline errors to structured HTTP responses. Error bodies carry
//! the message plus, when the failure came from the external tools, the
//! verbatim error lines and their grouped rendering — clients get both
//! the machine-consumable list and the human-readable block.
//!
//! Internal error details are logged but never returned to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use zkpipe_compiler::CompileError;
use zkpipe_keys::KeyError;
use zkpipe_pipeline::{LedgerError, PipelineError};
use zkpipe_prover::{ProveError, VerifyError};

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
    /// Verbatim tool error lines, when the failure carries any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    /// Grouped rendering of the tool output, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_errors: Option<String>,
}

/// Application-level error type that implements [`IntoResponse`].
#[derive(Error, Debug)]
pub enum AppError {
    /// A required artifact or resource does not exist (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed — bad name, bad inputs, precheck (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// The compiler reported classified error lines (422).
    #[error("compilation failed with {} error line(s)", errors.len())]
    CompilerDiagnostics {
        /// The classified error lines, verbatim.
        errors: Vec<String>,
        /// Grouped rendering of the full tool output.
        formatted: String,
    },

    /// The proof payload is malformed for its proving system (422).
    #[error("structural validation failed: {0}")]
    Structure(String),

    /// The external proving tool failed (500, with its error lines).
    #[error("proving failed: {message}")]
    Proving {
        /// Summary of the failure.
        message: String,
        /// The tool's error lines.
        errors: Vec<String>,
    },

    /// Universal setup parameters are unavailable (503). The message
    /// carries the operator remediation verbatim.
    #[error("{0}")]
    SetupUnavailable(String),

    /// The ledger collaborator failed or is unreachable (502).
    #[error("ledger submission failed: {0}")]
    LedgerUpstream(String),

    /// No ledger is configured for this deployment (503).
    #[error("no ledger endpoint configured")]
    LedgerUnconfigured,

    /// Internal server error (500). Message is logged, not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::CompilerDiagnostics { .. } | Self::Structure(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Proving { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SetupUnavailable(_) | Self::LedgerUnconfigured => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::LedgerUpstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server-side failures for operator visibility.
        match &self {
            Self::Internal(_) | Self::Proving { .. } => {
                tracing::error!(error = %self, "internal server error")
            }
            Self::SetupUnavailable(_) => tracing::error!(error = %self, "setup prerequisite"),
            Self::LedgerUpstream(_) => tracing::error!(error = %self, "ledger upstream error"),
            _ => {}
        }

        let body = match self {
            Self::CompilerDiagnostics { errors, formatted } => ErrorBody {
                error: format!("compilation failed with {} error line(s)", errors.len()),
                errors: Some(errors),
                formatted_errors: Some(formatted),
            },
            Self::Proving { message, errors } => ErrorBody {
                error: message,
                errors: if errors.is_empty() {
                    None
                } else {
                    Some(errors)
                },
                formatted_errors: None,
            },
            // Internal details never leak to clients.
            Self::Internal(_) => ErrorBody {
                error: "an internal error occurred".to_string(),
                errors: None,
                formatted_errors: None,
            },
            other => ErrorBody {
                error: other.to_string(),
                errors: None,
                formatted_errors: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<zkpipe_core::CoreError> for AppError {
    fn from(err: zkpipe_core::CoreError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<CompileError> for AppError {
    fn from(err: CompileError) -> Self {
        match err {
            CompileError::Precheck(msg) => Self::Validation(msg),
            CompileError::Diagnostics { errors, formatted } => {
                Self::CompilerDiagnostics { errors, formatted }
            }
            CompileError::ArtifactMissing { path } => {
                Self::NotFound(format!("artifact missing: {}", path.display()))
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<KeyError> for AppError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::SetupPrerequisite { .. } => Self::SetupUnavailable(err.to_string()),
            KeyError::ArtifactMissing { path } => {
                Self::NotFound(format!("key material missing: {}", path.display()))
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<ProveError> for AppError {
    fn from(err: ProveError) -> Self {
        match err {
            ProveError::ArtifactMissing { path } => {
                Self::NotFound(format!("artifact missing: {}", path.display()))
            }
            ProveError::InvalidAssignment(msg) => Self::Validation(msg),
            ProveError::Backend(backend) => Self::Proving {
                message: backend.to_string(),
                errors: backend.output_lines().to_vec(),
            },
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<VerifyError> for AppError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::ArtifactMissing { path } => {
                Self::NotFound(format!("verification key missing: {}", path.display()))
            }
            VerifyError::Structure { .. } => Self::Structure(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Unconfigured => Self::LedgerUnconfigured,
            other => Self::LedgerUpstream(other.to_string()),
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Compile(e) => e.into(),
            PipelineError::Key(e) => e.into(),
            PipelineError::Prove(e) => e.into(),
            PipelineError::Verify(e) => e.into(),
            PipelineError::Ledger(e) => e.into(),
            PipelineError::Backend(e) => Self::Proving {
                message: e.to_string(),
                errors: e.output_lines().to_vec(),
            },
            PipelineError::GateClosed(e) => {
                Self::Internal(format!("tool concurrency gate closed: {e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn precheck_maps_to_422_with_specific_message() {
        let err = AppError::from(CompileError::Precheck(
            "no template declaration found".to_string(),
        ));
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.error.contains("no template declaration found"));
        assert!(body.errors.is_none());
    }

    #[tokio::test]
    async fn diagnostics_carry_both_renderings() {
        let err = AppError::from(CompileError::Diagnostics {
            errors: vec!["error[P1001]: foo".to_string()],
            formatted: "error[P1001]: foo\n  detail".to_string(),
        });
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.errors.unwrap(), vec!["error[P1001]: foo"]);
        assert!(body.formatted_errors.unwrap().contains("detail"));
    }

    #[tokio::test]
    async fn missing_artifact_is_404() {
        let err = AppError::from(CompileError::ArtifactMissing {
            path: "/ws/artifacts/m/m.r1cs".into(),
        });
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.error.contains("m.r1cs"));
    }

    #[tokio::test]
    async fn setup_prerequisite_is_503_with_remediation() {
        let err = AppError::from(KeyError::SetupPrerequisite {
            reason: "store returned 404".to_string(),
            url: "https://store/file.ptau".to_string(),
            dest: "/ws/setup/file.ptau".into(),
        });
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.error.contains("download https://store/file.ptau"));
        assert!(body.error.contains("place it at"));
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let err = AppError::Internal("sqlite file corrupted at /secret/path".to_string());
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "an internal error occurred");
    }

    #[tokio::test]
    async fn ledger_errors_distinguish_unconfigured_from_upstream() {
        let (status, _) = response_parts(AppError::from(LedgerError::Unconfigured)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, _) = response_parts(AppError::from(LedgerError::Api {
            endpoint: "https://ledger/v1/submissions".to_string(),
            status: 500,
            body: "boom".to_string(),
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn structure_error_is_422() {
        let err = AppError::from(VerifyError::Structure {
            system: "groth16".to_string(),
            missing: vec!["pi_b".to_string()],
        });
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.error.contains("pi_b"));
    }
}
