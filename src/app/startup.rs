use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use super::cli::args::Args;
use super::cli::config::{load_config_file, messages_from_table, resolve_color, KioskConfig};
use crate::checkin::{CheckinClient, HttpCheckinClient};
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::shutdown::ShutdownCoordinator;
use crate::core::version::banner;
use crate::render::{AudioCue, AudioMode, CommandPlayer, Silent, TerminalBell, TerminalDisplay};
use crate::scan::{ScanError, ScanLoopController};
use crate::scanner::LineScanner;

// A pending stdin read keeps a blocking thread busy; don't wait on it at exit
const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(500);

/// Initialize and run the kiosk
pub fn startup() -> ExitCode {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let code = runtime.block_on(run());
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);
    code
}

async fn run() -> ExitCode {
    // Stage 1: command line, styled before we know the final color choice
    let mut args = Args::parse_from_env(resolve_color(&Args::default()));

    // Stage 2: configuration file fills in what the command line left out
    let table = match load_config_file(args.config_file.as_deref()).await {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(table) = table.as_ref() {
        if let Err(e) = Args::apply_toml_values(&mut args, table) {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    }
    let config = match messages_from_table(table.as_ref())
        .and_then(|messages| KioskConfig::resolve(&args, messages))
    {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let log_file = config.log_file.as_ref().map(|p| p.to_string_lossy().to_string());
    if let Err(e) = init_logging(
        Some(config.log_level.as_str()),
        Some(config.log_format.as_str()),
        log_file.as_deref(),
        config.color && log_file.is_none(),
    ) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    log::info!("{} starting", banner());
    log::debug!("Final configuration: {:#?}", config);

    // Stage 3: assemble the scan loop
    let client: Arc<dyn CheckinClient> = match HttpCheckinClient::new(
        &config.server,
        &config.endpoint,
        config.request_timeout,
    ) {
        Ok(client) => {
            log::info!("check-in endpoint {}", client.url());
            Arc::new(client)
        }
        Err(e) => {
            log_error_with_context(&e, "Check-in client setup");
            return ExitCode::FAILURE;
        }
    };

    let scanner = LineScanner::new(config.input.clone());
    let display = TerminalDisplay::stdout(config.color);
    let audio = audio_for(&config);

    let (coordinator, shutdown_rx) = ShutdownCoordinator::new();
    coordinator.listen_for_signals();

    let controller = ScanLoopController::new(
        Box::new(scanner),
        client,
        Box::new(display),
        audio,
    )
    .with_timing(config.timing)
    .with_messages(config.messages.clone());

    match controller.run(shutdown_rx).await {
        Ok(stats) => {
            log::debug!("scan loop finished after {} cycles", stats.cycles);
            ExitCode::SUCCESS
        }
        Err(e @ ScanError::ScannerUnavailable(_)) => {
            log_error_with_context(&e, "Scanner startup");
            ExitCode::FAILURE
        }
        Err(e) => {
            log_error_with_context(&e, "Scan loop");
            ExitCode::FAILURE
        }
    }
}

fn audio_for(config: &KioskConfig) -> Box<dyn AudioCue> {
    match (config.audio, &config.success_sound, &config.error_sound) {
        (AudioMode::Command, Some(success), Some(error)) => Box::new(CommandPlayer::new(
            config.player.clone(),
            success.clone(),
            error.clone(),
        )),
        (AudioMode::None, _, _) => Box::new(Silent),
        _ => Box::new(TerminalBell),
    }
}
