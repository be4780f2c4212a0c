//! Command line arguments
//!
//! Every option can also be set in the configuration file under the same
//! long name; command line values win.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(name = "kiosk")]
#[command(about = "QR code attendance check-in kiosk")]
#[command(version)]
#[command(after_help = "Scanner input is read one decoded QR code per line ('-' for stdin).")]
pub struct Args {
    /// Attendance server base URL
    #[arg(short = 's', long = "server", value_name = "URL")]
    pub server: Option<String>,

    /// Check-in endpoint path on the server
    #[arg(long = "endpoint", value_name = "PATH")]
    pub endpoint: Option<String>,

    /// Scanner input: '-' for stdin, or a file/FIFO path
    #[arg(short = 'i', long = "input", value_name = "SOURCE")]
    pub input: Option<String>,

    /// Check-in request timeout in seconds
    #[arg(short = 't', long = "request-timeout", value_name = "SECS")]
    pub request_timeout: Option<u64>,

    /// Milliseconds a result stays on screen before scanning resumes
    #[arg(long = "result-delay", value_name = "MS")]
    pub result_delay: Option<u64>,

    /// Milliseconds to wait after a connection error before scanning resumes
    #[arg(long = "error-delay", value_name = "MS")]
    pub error_delay: Option<u64>,

    /// Audio cue mode
    #[arg(short = 'a', long = "audio", value_name = "MODE", value_parser = ["bell", "command", "none"])]
    pub audio: Option<String>,

    /// Player program for --audio command
    #[arg(long = "player", value_name = "PROGRAM")]
    pub player: Option<String>,

    /// Sound file played on a successful check-in
    #[arg(long = "success-sound", value_name = "FILE")]
    pub success_sound: Option<PathBuf>,

    /// Sound file played on a failed check-in
    #[arg(long = "error-sound", value_name = "FILE")]
    pub error_sound: Option<PathBuf>,

    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Force colored output
    #[arg(long = "color", action = ArgAction::SetTrue, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color", action = ArgAction::SetTrue)]
    pub no_color: bool,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// More log output (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Less log output (repeatable)
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,
}

impl Args {
    /// Parse from the process arguments, styling help with the kiosk palette
    pub fn parse_from_env(color: bool) -> Self {
        use clap::{CommandFactory, FromArgMatches};

        let matches = Self::command()
            .styles(crate::core::styles::palette_to_clap(color))
            .get_matches();
        match Self::from_arg_matches(&matches) {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }
}
