//! Transport errors for the check-in call

use thiserror::Error;

/// Everything that can go wrong between issuing the request and holding a
/// decoded `CheckinResponse`.
///
/// None of these reach the scan loop as an `Err`: the client folds them into
/// `CheckinOutcome::Unreachable`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportError {
    /// The HTTP client or the endpoint URL could not be set up
    #[error("invalid check-in client setup: {0}")]
    Setup(String),

    /// Connection refused, DNS failure, TLS failure and similar
    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    /// No response within the configured request timeout
    #[error("request to {url} timed out after {timeout_ms} ms")]
    Timeout { url: String, timeout_ms: u128 },

    /// Body could not be read from the connection
    #[error("failed to read response body from {url}: {reason}")]
    Body { url: String, reason: String },

    /// Body was read but is not a check-in response
    #[error("malformed check-in response (HTTP {status}): {reason}")]
    Decode { status: u16, reason: String },
}

impl crate::core::error_handling::ContextualError for TransportError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, TransportError::Setup(_))
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            TransportError::Setup(msg) => Some(msg),
            _ => None,
        }
    }
}
