//! TOML configuration file loading and final kiosk settings
//!
//! The configuration file uses the long option names as keys and may carry
//! a `[messages]` table with the texts the kiosk shows:
//!
//! ```toml
//! server = "http://attendance.local:5000"
//! input = "/run/kiosk/qr.fifo"
//! result-delay = 3000
//! audio = "command"
//! player = "paplay"
//! success-sound = "/usr/share/kiosk/success.ogg"
//! error-sound = "/usr/share/kiosk/error.ogg"
//!
//! [messages]
//! validating = "Đang kiểm tra dữ liệu..."
//! ```

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use super::args::Args;
use crate::checkin::{DEFAULT_ENDPOINT, DEFAULT_REQUEST_TIMEOUT};
use crate::core::error_handling::ContextualError;
use crate::render::{AudioMode, KioskMessages};
use crate::scan::ScanTiming;
use crate::scanner::ScanSource;

/// Configuration problem the operator has to fix
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{message}")]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        Some(&self.message)
    }
}

type Result<T> = std::result::Result<T, ConfigError>;

/// Default player for `--audio command`
pub const DEFAULT_PLAYER: &str = "paplay";

/// Default configuration file: `<config dir>/Kiosk/kiosk.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("Kiosk").join("kiosk.toml"))
}

/// Read and parse the configuration file.
///
/// An explicitly given file must exist; the default file is optional.
pub async fn load_config_file(config_file: Option<&Path>) -> Result<Option<toml::Table>> {
    let path = match config_file {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::new(format!(
                    "The specified configuration file does not exist: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(None),
        },
    };

    let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
        ConfigError::new(format!(
            "Error reading configuration file {}: {}",
            path.display(),
            e
        ))
    })?;
    let table = toml::from_str::<toml::Table>(&contents).map_err(|e| {
        ConfigError::new(format!(
            "Error parsing configuration file {}: {}",
            path.display(),
            e
        ))
    })?;
    log::debug!("loaded configuration from {}", path.display());
    Ok(Some(table))
}

fn string_field(config: &toml::Table, key: &str) -> Result<Option<String>> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| ConfigError::new(format!("'{key}' must be a string"))),
    }
}

fn integer_field(config: &toml::Table, key: &str) -> Result<Option<u64>> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => match value.as_integer() {
            Some(n) if n >= 0 => Ok(Some(n as u64)),
            _ => Err(ConfigError::new(format!(
                "'{key}' must be a non-negative integer"
            ))),
        },
    }
}

fn bool_field(config: &toml::Table, key: &str) -> Result<Option<bool>> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_bool()
            .map(Some)
            .ok_or_else(|| ConfigError::new(format!("'{key}' must be true or false"))),
    }
}

fn fill<T>(target: &mut Option<T>, value: Option<T>) {
    if target.is_none() {
        *target = value;
    }
}

impl Args {
    /// Fill options not given on the command line from the configuration file
    pub fn apply_toml_values(args: &mut Self, config: &toml::Table) -> Result<()> {
        fill(&mut args.server, string_field(config, "server")?);
        fill(&mut args.endpoint, string_field(config, "endpoint")?);
        fill(&mut args.input, string_field(config, "input")?);
        fill(&mut args.request_timeout, integer_field(config, "request-timeout")?);
        fill(&mut args.result_delay, integer_field(config, "result-delay")?);
        fill(&mut args.error_delay, integer_field(config, "error-delay")?);
        fill(&mut args.audio, string_field(config, "audio")?);
        fill(&mut args.player, string_field(config, "player")?);
        fill(
            &mut args.success_sound,
            string_field(config, "success-sound")?.map(PathBuf::from),
        );
        fill(
            &mut args.error_sound,
            string_field(config, "error-sound")?.map(PathBuf::from),
        );
        fill(&mut args.log_level, string_field(config, "log-level")?);
        fill(&mut args.log_format, string_field(config, "log-format")?);
        fill(
            &mut args.log_file,
            string_field(config, "log-file")?.map(PathBuf::from),
        );

        if !args.color && !args.no_color {
            match bool_field(config, "color")? {
                Some(true) => args.color = true,
                Some(false) => args.no_color = true,
                None => args.no_color = bool_field(config, "no-color")?.unwrap_or(false),
            }
        }
        Ok(())
    }
}

/// Messages table of the configuration file, defaults for missing keys
pub fn messages_from_table(config: Option<&toml::Table>) -> Result<KioskMessages> {
    match config.and_then(|c| c.get("messages")) {
        None => Ok(KioskMessages::default()),
        Some(value) => {
            let messages: KioskMessages = value
                .clone()
                .try_into()
                .map_err(|e| ConfigError::new(format!("Invalid [messages] table: {e}")))?;
            Ok(messages)
        }
    }
}

/// Whether to color output: flags first, then `NO_COLOR`, then TTY detection
pub fn resolve_color(args: &Args) -> bool {
    if args.color {
        return true;
    }
    if args.no_color || std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        return false;
    }
    std::io::stdout().is_terminal()
}

/// Validated settings the kiosk runs with
#[derive(Debug, Clone, PartialEq)]
pub struct KioskConfig {
    pub server: String,
    pub endpoint: String,
    pub input: ScanSource,
    pub request_timeout: Duration,
    pub timing: ScanTiming,
    pub audio: AudioMode,
    pub player: String,
    pub success_sound: Option<PathBuf>,
    pub error_sound: Option<PathBuf>,
    pub messages: KioskMessages,
    pub color: bool,
    pub log_level: String,
    pub log_format: String,
    pub log_file: Option<PathBuf>,
}

impl KioskConfig {
    /// Validate merged arguments into the final configuration
    pub fn resolve(args: &Args, messages: KioskMessages) -> Result<Self> {
        let server = args
            .server
            .clone()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ConfigError::new("server URL is required (--server or server = \"...\")"))?;
        if !server.starts_with("http://") && !server.starts_with("https://") {
            return Err(ConfigError::new(format!(
                "server URL must start with http:// or https://: {server}"
            )));
        }

        let endpoint = args
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        if !endpoint.starts_with('/') {
            return Err(ConfigError::new(format!(
                "endpoint must be an absolute path starting with '/': {endpoint}"
            )));
        }

        let request_timeout = match args.request_timeout {
            None => DEFAULT_REQUEST_TIMEOUT,
            Some(0) => return Err(ConfigError::new("request-timeout must be at least 1 second")),
            Some(secs) => Duration::from_secs(secs),
        };

        let defaults = ScanTiming::default();
        let timing = ScanTiming {
            result_delay: args
                .result_delay
                .map(Duration::from_millis)
                .unwrap_or(defaults.result_delay),
            error_delay: args
                .error_delay
                .map(Duration::from_millis)
                .unwrap_or(defaults.error_delay),
        };

        let audio = match args.audio.as_deref() {
            None => AudioMode::Bell,
            Some(mode) => mode.parse::<AudioMode>().map_err(ConfigError::new)?,
        };
        if audio == AudioMode::Command && (args.success_sound.is_none() || args.error_sound.is_none())
        {
            return Err(ConfigError::new(
                "audio mode 'command' needs both success-sound and error-sound",
            ));
        }

        let log_file = args
            .log_file
            .clone()
            .filter(|p| !(p.as_os_str().eq_ignore_ascii_case("none") || p.as_os_str() == "-"));

        Ok(Self {
            server,
            endpoint,
            input: ScanSource::parse(args.input.as_deref().unwrap_or("-")),
            request_timeout,
            timing,
            audio,
            player: args
                .player
                .clone()
                .unwrap_or_else(|| DEFAULT_PLAYER.to_string()),
            success_sound: args.success_sound.clone(),
            error_sound: args.error_sound.clone(),
            messages,
            color: resolve_color(args),
            log_level: crate::core::logging::level_for_verbosity(
                args.log_level.as_deref().unwrap_or("info"),
                args.verbose,
                args.quiet,
            )
            .to_string(),
            log_format: args.log_format.clone().unwrap_or_else(|| "text".to_string()),
            log_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn table(text: &str) -> toml::Table {
        toml::from_str(text).unwrap()
    }

    fn args_with_server() -> Args {
        Args {
            server: Some("http://attendance.local:5000".to_string()),
            ..Args::default()
        }
    }

    #[test]
    fn test_cli_values_win_over_file() {
        let mut args =
            Args::try_parse_from(["kiosk", "--server", "http://cli:1", "--result-delay", "100"])
                .unwrap();
        let config = table(
            r#"
            server = "http://file:2"
            result-delay = 9000
            error-delay = 500
            input = "/run/qr.fifo"
            "#,
        );
        Args::apply_toml_values(&mut args, &config).unwrap();

        assert_eq!(args.server.as_deref(), Some("http://cli:1"));
        assert_eq!(args.result_delay, Some(100));
        assert_eq!(args.error_delay, Some(500));
        assert_eq!(args.input.as_deref(), Some("/run/qr.fifo"));
    }

    #[test]
    fn test_wrong_value_type_rejected() {
        let mut args = Args::default();
        let err = Args::apply_toml_values(&mut args, &table("result-delay = \"3s\"")).unwrap_err();
        assert!(err.to_string().contains("result-delay"));

        let err = Args::apply_toml_values(&mut args, &table("color = 1")).unwrap_err();
        assert!(err.to_string().contains("color"));
    }

    #[test]
    fn test_resolve_defaults() {
        let config = KioskConfig::resolve(&args_with_server(), KioskMessages::default()).unwrap();
        assert_eq!(config.endpoint, "/scan-checkin");
        assert_eq!(config.input, ScanSource::Stdin);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.timing.result_delay, Duration::from_millis(3000));
        assert_eq!(config.timing.error_delay, Duration::from_millis(2000));
        assert_eq!(config.audio, AudioMode::Bell);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_file, None);
    }

    #[test]
    fn test_resolve_requires_server() {
        let err = KioskConfig::resolve(&Args::default(), KioskMessages::default()).unwrap_err();
        assert!(err.is_user_actionable());
        assert!(err.to_string().contains("server URL is required"));
    }

    #[test]
    fn test_resolve_rejects_zero_timeout_and_relative_endpoint() {
        let args = Args {
            request_timeout: Some(0),
            ..args_with_server()
        };
        assert!(KioskConfig::resolve(&args, KioskMessages::default()).is_err());

        let args = Args {
            endpoint: Some("scan-checkin".to_string()),
            ..args_with_server()
        };
        assert!(KioskConfig::resolve(&args, KioskMessages::default()).is_err());
    }

    #[test]
    fn test_command_audio_needs_sounds() {
        let args = Args {
            audio: Some("command".to_string()),
            success_sound: Some(PathBuf::from("ok.ogg")),
            ..args_with_server()
        };
        assert!(KioskConfig::resolve(&args, KioskMessages::default()).is_err());
    }

    #[test]
    fn test_log_file_none_disables_file_logging() {
        let args = Args {
            log_file: Some(PathBuf::from("none")),
            ..args_with_server()
        };
        let config = KioskConfig::resolve(&args, KioskMessages::default()).unwrap();
        assert_eq!(config.log_file, None);
    }

    #[test]
    fn test_messages_table() {
        let config = table(
            r#"
            [messages]
            connectivity-error = "Lỗi kết nối Server!"
            "#,
        );
        let messages = messages_from_table(Some(&config)).unwrap();
        assert_eq!(messages.connectivity_error, "Lỗi kết nối Server!");
        assert_eq!(messages.ready, KioskMessages::default().ready);

        let bad = table("[messages]\nunknown = \"x\"");
        assert!(messages_from_table(Some(&bad)).is_err());
    }

    #[test]
    #[serial]
    fn test_no_color_env_disables_color() {
        std::env::set_var("NO_COLOR", "1");
        assert!(!resolve_color(&Args::default()));
        assert!(resolve_color(&Args {
            color: true,
            ..Args::default()
        }));
        std::env::remove_var("NO_COLOR");
    }

    #[tokio::test]
    async fn test_load_explicit_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "server = \"http://attendance.local\"").unwrap();

        let config = load_config_file(Some(file.path())).await.unwrap().unwrap();
        assert_eq!(
            config.get("server").and_then(|v| v.as_str()),
            Some("http://attendance.local")
        );
    }

    #[tokio::test]
    async fn test_missing_explicit_config_file_is_error() {
        let err = load_config_file(Some(Path::new("/nonexistent/kiosk.toml")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[tokio::test]
    async fn test_malformed_config_file_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "server = ").unwrap();
        let err = load_config_file(Some(file.path())).await.unwrap_err();
        assert!(err.to_string().contains("Error parsing configuration file"));
    }
}
