//! Generic error handling utilities
//!
//! Lets startup report any module error the same way while keeping
//! configuration mistakes readable for the person setting up the kiosk.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// When `is_user_actionable()` returns `true`, `user_message()` should return
/// `Some(message)` with a helpful, actionable message. When it returns `false`,
/// `user_message()` should return `None`.
pub trait ContextualError: std::error::Error {
    /// Returns true if this error contains a specific, user-actionable message
    ///
    /// Examples of user-actionable errors:
    /// - Invalid server URL in the configuration file
    /// - Scanner input path that does not exist
    ///
    /// Examples of system errors:
    /// - Logger backend failing to start
    /// - Scanner input failing mid-session
    fn is_user_actionable(&self) -> bool;

    /// Returns the specific user message if this is a user-actionable error
    fn user_message(&self) -> Option<&str>;
}

/// Log errors with appropriate detail level based on error specificity
///
/// User-actionable errors log their own message; system errors log the
/// operation context. Full details always go to debug level.
///
/// # Examples
/// ```rust,no_run
/// # use attendance_kiosk::core::error_handling::log_error_with_context;
/// # use attendance_kiosk::app::cli::config::ConfigError;
/// let err = ConfigError::new("server URL is required (--server or server = \"...\")");
/// log_error_with_context(&err, "Configuration loading");
/// // Logs: "FATAL: server URL is required (--server or server = \"...\")"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => log::error!("FATAL: {}", user_msg),
        _ => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}
