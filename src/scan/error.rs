//! Scan loop errors

use thiserror::Error;

use crate::core::error_handling::ContextualError;
use crate::scanner::ScannerError;

/// Module-local result type for the scan loop
pub type Result<T> = std::result::Result<T, ScanError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScanError {
    /// The scanner could not be started; the kiosk shows a persistent
    /// status message and does not retry
    #[error("scanner could not be started: {0}")]
    ScannerUnavailable(#[source] ScannerError),

    /// The scanner failed while the loop was running
    #[error("scanner failed: {0}")]
    Scanner(#[from] ScannerError),
}

impl ContextualError for ScanError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, ScanError::ScannerUnavailable(_))
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ScanError::ScannerUnavailable(e) => e.user_message(),
            _ => None,
        }
    }
}
