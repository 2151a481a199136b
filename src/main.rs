use clap::Parser;
use gopro_connect::domain::error::ConfigError;
use gopro_connect::domain::orchestrator::Orchestrator;
use gopro_connect::domain::settings::SettingsService;
use gopro_connect::infrastructure::logging::{self, LoggingGuard};
use gopro_connect::infrastructure::system_transports;
use gopro_connect::presentation::cli::{Cli, Commands, ConnectArgs};
use gopro_connect::presentation::{narrator, report};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Configuration or validation problem; nothing was attempted
const EXIT_CONFIG: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::InitConfig { force } => init_config(cli.config, force),
        Commands::Connect(args) => connect(cli.config, cli.verbose, args).await,
        Commands::Status { ids, json } => status(cli.config, cli.verbose, ids, json).await,
    }
}

fn init_config(path: Option<PathBuf>, force: bool) -> ExitCode {
    let path = match path {
        Some(path) => path,
        None => match SettingsService::default_path() {
            Ok(path) => path,
            Err(e) => return config_failure(e),
        },
    };

    match SettingsService::write_template(&path, force) {
        Ok(()) => {
            println!("Wrote settings template to {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(EXIT_CONFIG)
        }
    }
}

/// Load settings, then start logging as they describe
fn load(
    path: Option<PathBuf>,
    verbose: bool,
) -> Result<(SettingsService, Option<LoggingGuard>), ConfigError> {
    let service = SettingsService::load(path)?;

    let guard = logging::init_logger(&service.get().log_settings, verbose)
        .map_err(|e| eprintln!("Failed to initialize logging: {}", e))
        .ok();

    tracing::info!("Loaded settings from {}", service.path().display());
    Ok((service, guard))
}

async fn connect(config: Option<PathBuf>, verbose: bool, args: ConnectArgs) -> ExitCode {
    let (service, _guard) = match load(config, verbose) {
        Ok(loaded) => loaded,
        Err(e) => return config_failure(e),
    };
    let settings = service.get();

    let devices = match service.select_devices(&args.ids, args.all) {
        Ok(devices) => devices,
        Err(e) => return config_failure(e),
    };
    let mode = args.mode(settings.connection.mode);
    let timeout = args
        .timeout
        .map(Duration::from_secs)
        .or_else(|| settings.connection.run_timeout());

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    // JSON output owns stdout, so the narrative is only printed in text mode
    let narration = (!args.json).then(|| narrator::spawn(event_rx));

    let orchestrator = Orchestrator::new(
        system_transports(settings),
        Arc::new(settings.connection.clone()),
        event_tx,
    );
    let result = orchestrator.run(devices, mode, timeout).await;
    drop(orchestrator);
    if let Some(narration) = narration {
        let _ = narration.await;
    }

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => return config_failure(e),
    };

    if args.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("error: could not encode summary: {}", e),
        }
    } else {
        print!("{}", report::summary_text(&summary));
    }

    ExitCode::from(summary.exit_code())
}

async fn status(config: Option<PathBuf>, verbose: bool, ids: Vec<String>, json: bool) -> ExitCode {
    let (service, _guard) = match load(config, verbose) {
        Ok(loaded) => loaded,
        Err(e) => return config_failure(e),
    };
    let settings = service.get();

    let devices = match service.select_devices(&ids, ids.is_empty()) {
        Ok(devices) => devices,
        Err(e) => return config_failure(e),
    };

    let (event_tx, _event_rx) = mpsc::unbounded_channel();
    let orchestrator = Orchestrator::new(
        system_transports(settings),
        Arc::new(settings.connection.clone()),
        event_tx,
    );
    let results = orchestrator.check_reachability(&devices).await;

    if json {
        match serde_json::to_string_pretty(&results) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("error: could not encode results: {}", e),
        }
    } else {
        print!("{}", report::reachability_text(&results));
    }

    if results.iter().all(|r| r.is_reachable()) {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn config_failure(error: ConfigError) -> ExitCode {
    eprintln!("error: {}", error);
    ExitCode::from(EXIT_CONFIG)
}
