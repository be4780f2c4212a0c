//! Scanner adapter errors

use thiserror::Error;

/// Module-local result type for scanner operations
pub type Result<T> = std::result::Result<T, ScannerError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScannerError {
    /// The input device could not be acquired
    #[error("scanner unavailable ({source_name}): {reason}")]
    Unavailable { source_name: String, reason: String },

    /// `start` was called twice
    #[error("scanner already started")]
    AlreadyStarted,

    /// A decode was requested before `start`
    #[error("scanner not started")]
    NotStarted,

    /// A decode was requested while paused
    #[error("scanner is paused")]
    Paused,
}

impl crate::core::error_handling::ContextualError for ScannerError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, ScannerError::Unavailable { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ScannerError::Unavailable { reason, .. } => Some(reason),
            _ => None,
        }
    }
}
