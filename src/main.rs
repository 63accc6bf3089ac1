use anyhow::{Context, Result};
use murmur::integration::AppConfig;
use std::fs::{self, File};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal: {:#}", e);
            murmur::ui::show_fatal_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Tracing goes up first so a bad config file is still logged.
    let config = AppConfig::load();
    init_tracing(log_target(&config));
    let config = config.context("Failed to load configuration")?;

    info!("Starting Murmur with model {}", config.inference.model);
    murmur::ui::run(&config).context("Failed to start the chat window")?;
    info!("Murmur closed");
    Ok(())
}

/// Log file to use, if the configuration loaded and names one
fn log_target(config: &murmur::Result<AppConfig>) -> Option<&Path> {
    config.as_ref().ok().and_then(|c| c.ui.log_file.as_deref())
}

fn init_tracing(log_file: Option<&Path>) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "murmur=debug,info".into());

    let file_layer = log_file.and_then(|path| match open_log_file(path) {
        Ok(file) => Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .boxed(),
        ),
        Err(e) => {
            eprintln!("murmur: not logging to {}: {}", path.display(), e);
            None
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    if log_file.is_none() {
        warn!("No log file configured, logging to the console only");
    }
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    File::options().create(true).append(true).open(path)
}
