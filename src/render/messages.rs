//! User facing kiosk texts

use serde::Deserialize;

/// Every string the kiosk shows on its own behalf.
///
/// Loaded from the `[messages]` table of the configuration file; missing
/// keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct KioskMessages {
    pub ready: String,
    pub ready_next: String,
    pub validating: String,
    pub connectivity_error: String,
    pub scanner_unavailable: String,
    pub error_name: String,
    pub success_badge: String,
    pub failed_badge: String,
    pub time_placeholder: String,
}

impl Default for KioskMessages {
    fn default() -> Self {
        Self {
            ready: "Ready to scan...".to_string(),
            ready_next: "Ready for the next scan...".to_string(),
            validating: "Validating data...".to_string(),
            connectivity_error: "Server connection error!".to_string(),
            scanner_unavailable: "Camera/scanner not found!".to_string(),
            error_name: "Check-in error".to_string(),
            success_badge: "Success".to_string(),
            failed_badge: "Failed".to_string(),
            time_placeholder: "--:--".to_string(),
        }
    }
}
