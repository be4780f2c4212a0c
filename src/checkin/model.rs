//! Wire model for `POST /scan-checkin`

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::TransportError;

/// Text decoded from one QR code.
///
/// The kiosk assumes nothing about its structure; it is forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanPayload(String);

impl ScanPayload {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScanPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScanPayload {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for ScanPayload {
    fn from(text: String) -> Self {
        Self(text)
    }
}

/// Request body: the payload is the only field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckinRequest<'a> {
    pub qr_data: &'a str,
}

impl<'a> From<&'a ScanPayload> for CheckinRequest<'a> {
    fn from(payload: &'a ScanPayload) -> Self {
        Self {
            qr_data: payload.as_str(),
        }
    }
}

/// Fields the server sends back for an accepted check-in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckinReceipt {
    pub full_name: String,
    pub status: Option<String>,
    pub status_class: Option<String>,
    pub message: String,
    pub time: Option<String>,
}

/// Decoded server answer.
///
/// The JSON object is flat and discriminated by `success`; only the field
/// set selected by the discriminant is kept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawCheckinResponse")]
pub enum CheckinResponse {
    Accepted(CheckinReceipt),
    Rejected { message: String },
}

impl CheckinResponse {
    pub fn message(&self) -> &str {
        match self {
            CheckinResponse::Accepted(receipt) => &receipt.message,
            CheckinResponse::Rejected { message } => message,
        }
    }

    /// Decode a response body
    pub fn from_body(status: u16, body: &str) -> Result<Self, TransportError> {
        serde_json::from_str(body).map_err(|e| TransportError::Decode {
            status,
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawUser {
    full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCheckinResponse {
    success: bool,
    #[serde(default)]
    user: Option<RawUser>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    status_class: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    time: Option<String>,
}

impl TryFrom<RawCheckinResponse> for CheckinResponse {
    type Error = String;

    fn try_from(raw: RawCheckinResponse) -> Result<Self, Self::Error> {
        let message = raw.message.unwrap_or_default();
        if !raw.success {
            return Ok(CheckinResponse::Rejected { message });
        }

        let full_name = raw
            .user
            .and_then(|user| user.full_name)
            .ok_or_else(|| "successful check-in without user.full_name".to_string())?;

        Ok(CheckinResponse::Accepted(CheckinReceipt {
            full_name,
            status: raw.status.filter(|s| !s.is_empty()),
            status_class: raw.status_class.filter(|s| !s.is_empty()),
            message,
            time: raw.time.filter(|s| !s.is_empty()),
        }))
    }
}

/// Result of one submission as seen by the scan loop
#[derive(Debug, Clone, PartialEq)]
pub enum CheckinOutcome {
    /// The server answered with a decodable body (success or failure)
    Answered(CheckinResponse),
    /// Network failure, timeout or undecodable body
    Unreachable(TransportError),
}

impl CheckinOutcome {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, CheckinOutcome::Unreachable(_))
    }

    /// The response to display, with transport failures collapsed into a
    /// synthetic rejection carrying `connectivity_message`.
    pub fn response(&self, connectivity_message: &str) -> CheckinResponse {
        match self {
            CheckinOutcome::Answered(response) => response.clone(),
            CheckinOutcome::Unreachable(_) => CheckinResponse::Rejected {
                message: connectivity_message.to_string(),
            },
        }
    }
}

impl From<Result<CheckinResponse, TransportError>> for CheckinOutcome {
    fn from(result: Result<CheckinResponse, TransportError>) -> Self {
        match result {
            Ok(response) => CheckinOutcome::Answered(response),
            Err(e) => CheckinOutcome::Unreachable(e),
        }
    }
}
