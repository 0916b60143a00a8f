//! # Ledger Submission Client
//!
//! The ledger collaborator records a digest of each verified proof, not
//! the proof itself. Submissions carry the proof hash, a task identifier,
//! the submitting user, a UTC timestamp, and free-form metadata; the
//! ledger answers with a transaction identifier. The composite variant
//! additionally mints an achievement token and returns its serial number.
//!
//! Retry and availability semantics beyond transient-transport backoff
//! are the ledger's own concern.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use zkpipe_core::config::LedgerConfig;

/// Maximum number of retry attempts after the initial request.
const MAX_RETRIES: u32 = 3;

/// Base delay between retries (doubles each attempt: 200ms, 400ms, 800ms).
const BASE_DELAY_MS: u64 = 200;

/// A proof submission to the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRequest {
    /// SHA-256 hex digest over the proof payload and public signals.
    pub proof_hash: String,
    /// Task the proof fulfils.
    pub task_id: Uuid,
    /// Submitting user.
    pub user_id: String,
    /// Submission timestamp (UTC).
    pub submitted_at: DateTime<Utc>,
    /// Free-form metadata forwarded verbatim.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// The ledger's acknowledgement of a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    /// Ledger transaction identifier.
    pub transaction_id: String,
}

/// Acknowledgement of a composite submission that also minted an
/// achievement token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementReceipt {
    /// Ledger transaction identifier.
    pub transaction_id: String,
    /// Serial number of the minted achievement token.
    pub serial_number: u64,
}

/// Errors from ledger submission.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// HTTP transport error after retries were exhausted.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        /// The endpoint that was called.
        endpoint: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The ledger returned a non-2xx status.
    #[error("ledger {endpoint} returned {status}: {body}")]
    Api {
        /// The endpoint that was called.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },

    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        /// The endpoint that was called.
        endpoint: String,
        /// The underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// No ledger endpoint is configured for this deployment.
    #[error("no ledger endpoint configured; submission is disabled")]
    Unconfigured,
}

/// Abstract ledger collaborator.
///
/// Implementations must be `Send + Sync` so a client can be shared
/// across async tasks behind an `Arc`.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Record a proof submission, returning the transaction identifier.
    async fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionReceipt, LedgerError>;

    /// Record a proof submission and mint an achievement token.
    async fn submit_with_achievement(
        &self,
        request: &SubmissionRequest,
    ) -> Result<AchievementReceipt, LedgerError>;
}

/// Send an HTTP request with exponential backoff retry on transport
/// errors. Non-2xx responses are returned to the caller without retry.
async fn retry_send<F, Fut>(f: F) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    for attempt in 0..MAX_RETRIES {
        match f().await {
            Ok(response) => return Ok(response),
            Err(e) => {
                let delay = Duration::from_millis(BASE_DELAY_MS * 2u64.pow(attempt));
                tracing::warn!(
                    attempt = attempt + 1,
                    max_retries = MAX_RETRIES,
                    "ledger request failed, retrying in {delay:?}: {e}"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
    // Final attempt, no more retries.
    f().await
}

/// HTTP ledger client.
pub struct HttpLedgerClient {
    client: reqwest::Client,
    base: String,
    api_key: Option<String>,
}

impl HttpLedgerClient {
    /// Create a client for the configured ledger endpoint.
    pub fn new(config: &LedgerConfig) -> Result<Self, LedgerError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|source| LedgerError::Http {
                endpoint: config.endpoint.clone(),
                source,
            })?;
        Ok(Self {
            client,
            base: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        request: &SubmissionRequest,
    ) -> Result<T, LedgerError> {
        let endpoint = format!("{}/{path}", self.base);
        let response = retry_send(|| {
            let mut builder = self.client.post(&endpoint).json(request);
            if let Some(token) = &self.api_key {
                builder = builder.bearer_auth(token);
            }
            builder.send()
        })
        .await
        .map_err(|source| LedgerError::Http {
            endpoint: endpoint.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::Api {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }
        response
            .json()
            .await
            .map_err(|source| LedgerError::Deserialization { endpoint, source })
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionReceipt, LedgerError> {
        let receipt: SubmissionReceipt = self.post("v1/submissions", request).await?;
        tracing::info!(
            proof_hash = %request.proof_hash,
            tx = %receipt.transaction_id,
            "proof submitted to ledger"
        );
        Ok(receipt)
    }

    async fn submit_with_achievement(
        &self,
        request: &SubmissionRequest,
    ) -> Result<AchievementReceipt, LedgerError> {
        let receipt: AchievementReceipt = self.post("v1/submissions/achievement", request).await?;
        tracing::info!(
            proof_hash = %request.proof_hash,
            tx = %receipt.transaction_id,
            serial = receipt.serial_number,
            "proof submitted to ledger with achievement"
        );
        Ok(receipt)
    }
}

/// Deterministic in-memory ledger for tests and local development.
///
/// Transaction identifiers derive from the submitted proof hash, and
/// achievement serial numbers count up from one.
#[derive(Debug, Default)]
pub struct MockLedgerClient {
    submissions: tokio::sync::Mutex<Vec<SubmissionRequest>>,
    fail: bool,
}

impl MockLedgerClient {
    /// Create a mock that accepts every submission.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose submissions fail with an injected outage.
    pub fn failing() -> Self {
        Self {
            submissions: tokio::sync::Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Submissions recorded so far, in order.
    pub async fn submissions(&self) -> Vec<SubmissionRequest> {
        self.submissions.lock().await.clone()
    }

    async fn record(&self, request: &SubmissionRequest) -> Result<(String, u64), LedgerError> {
        if self.fail {
            return Err(LedgerError::Api {
                endpoint: "mock".to_string(),
                status: 503,
                body: "injected ledger outage".to_string(),
            });
        }
        let mut submissions = self.submissions.lock().await;
        submissions.push(request.clone());
        let serial = submissions.len() as u64;
        let prefix: String = request.proof_hash.chars().take(12).collect();
        Ok((format!("mock-tx-{prefix}"), serial))
    }
}

#[async_trait]
impl LedgerClient for MockLedgerClient {
    async fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionReceipt, LedgerError> {
        let (transaction_id, _) = self.record(request).await?;
        Ok(SubmissionReceipt { transaction_id })
    }

    async fn submit_with_achievement(
        &self,
        request: &SubmissionRequest,
    ) -> Result<AchievementReceipt, LedgerError> {
        let (transaction_id, serial_number) = self.record(request).await?;
        Ok(AchievementReceipt {
            transaction_id,
            serial_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(hash: &str) -> SubmissionRequest {
        SubmissionRequest {
            proof_hash: hash.to_string(),
            task_id: Uuid::new_v4(),
            user_id: "tester".to_string(),
            submitted_at: Utc::now(),
            metadata: serde_json::json!({"circuit": "m"}),
        }
    }

    #[tokio::test]
    async fn mock_records_submissions_in_order() {
        let ledger = MockLedgerClient::new();
        let first = ledger.submit(&request("aaaa")).await.unwrap();
        let second = ledger
            .submit_with_achievement(&request("bbbb"))
            .await
            .unwrap();

        assert_eq!(first.transaction_id, "mock-tx-aaaa");
        assert_eq!(second.serial_number, 2);
        let recorded = ledger.submissions().await;
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[1].proof_hash, "bbbb");
    }

    #[tokio::test]
    async fn failing_mock_reports_api_error() {
        let ledger = MockLedgerClient::failing();
        let err = ledger.submit(&request("cccc")).await.unwrap_err();
        match err {
            LedgerError::Api { status, .. } => assert_eq!(status, 503),
            other => panic!("expected api error, got {other:?}"),
        }
        assert!(ledger.submissions().await.is_empty());
    }

    #[tokio::test]
    async fn unreachable_ledger_surfaces_http_error() {
        let config = LedgerConfig {
            endpoint: "http://127.0.0.1:1".to_string(),
            api_key: None,
        };
        let client = HttpLedgerClient::new(&config).unwrap();
        let err = client.submit(&request("dddd")).await.unwrap_err();
        match err {
            LedgerError::Http { endpoint, .. } => {
                assert!(endpoint.contains("/v1/submissions"), "{endpoint}");
            }
            other => panic!("expected http error, got {other:?}"),
        }
    }

    #[test]
    fn submission_serializes_with_metadata() {
        let json = serde_json::to_value(request("eeee")).unwrap();
        assert_eq!(json["proof_hash"], "eeee");
        assert_eq!(json["metadata"]["circuit"], "m");
        assert!(json["submitted_at"].is_string());
    }
}
