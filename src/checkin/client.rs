//! HTTP client for the check-in endpoint

use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;

use super::error::TransportError;
use super::model::{CheckinOutcome, CheckinRequest, CheckinResponse, ScanPayload};

/// Endpoint path appended to the server URL
pub const DEFAULT_ENDPOINT: &str = "/scan-checkin";

/// Upper bound for one check-in request before it is treated as unreachable
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Submits a decoded payload and reports what the server said.
///
/// Implementations must never fail: transport problems are reported through
/// `CheckinOutcome::Unreachable`.
#[async_trait]
pub trait CheckinClient: Send + Sync {
    async fn submit(&self, payload: &ScanPayload) -> CheckinOutcome;
}

/// `reqwest` backed check-in client
#[derive(Debug, Clone)]
pub struct HttpCheckinClient {
    client: reqwest::Client,
    url: Url,
    timeout: Duration,
}

impl HttpCheckinClient {
    /// Build a client posting to `server` + `endpoint`
    pub fn new(server: &str, endpoint: &str, timeout: Duration) -> Result<Self, TransportError> {
        if !server.starts_with("http://") && !server.starts_with("https://") {
            return Err(TransportError::Setup(format!(
                "Invalid server URL scheme. Only http:// and https:// are supported: {server}"
            )));
        }

        let base = Url::parse(server)
            .map_err(|e| TransportError::Setup(format!("Invalid server URL '{server}': {e}")))?;
        let url = base.join(endpoint).map_err(|e| {
            TransportError::Setup(format!("Invalid check-in endpoint '{endpoint}': {e}"))
        })?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Setup(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url,
            timeout,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn post(&self, payload: &ScanPayload) -> Result<CheckinResponse, TransportError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&CheckinRequest::from(payload))
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        // Non-2xx statuses are accepted as long as the body decodes
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                self.timeout_error()
            } else {
                TransportError::Body {
                    url: self.url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        log::trace!("check-in response HTTP {status}: {body}");
        CheckinResponse::from_body(status, &body)
    }

    fn classify(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            self.timeout_error()
        } else {
            TransportError::Network {
                url: self.url.to_string(),
                reason: e.to_string(),
            }
        }
    }

    fn timeout_error(&self) -> TransportError {
        TransportError::Timeout {
            url: self.url.to_string(),
            timeout_ms: self.timeout.as_millis(),
        }
    }
}

#[async_trait]
impl CheckinClient for HttpCheckinClient {
    async fn submit(&self, payload: &ScanPayload) -> CheckinOutcome {
        log::debug!("submitting check-in to {}", self.url);
        let outcome = CheckinOutcome::from(self.post(payload).await);
        if let CheckinOutcome::Unreachable(e) = &outcome {
            log::warn!("check-in transport failure: {e}");
        }
        outcome
    }
}
