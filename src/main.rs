#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{Level as TraceLevel, debug};
use tracing_subscriber::FmtSubscriber;

use brightness_levels::constants::env;
use brightness_levels::{Config, Operation, controller};

/// Step screen brightness through software dimming, the hardware backlight
/// and software boosting as one 0-29 ladder.
#[derive(Parser, Debug)]
#[command(name = "brightness", version)]
struct Cli {
    /// Operation to perform: max, min, increase (+) or decrease (-)
    #[arg(value_name = "OPERATION", allow_hyphen_values = true)]
    operation: String,

    /// Config file [default: ~/.config/brightness-levels/config.toml]
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn init_logging() -> Result<()> {
    // Parse log level from environment variable
    let log_level = match std::env::var(env::LOG_LEVEL)
        .unwrap_or_else(|_| "warn".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "info" => TraceLevel::INFO,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to install log subscriber")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let operation: Operation = cli.operation.parse()?;

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    debug!(?config, "effective config");

    let mut controller = controller::open(&config).context("Failed to initialise brightness control")?;
    controller
        .run(operation)
        .with_context(|| format!("Failed to apply '{operation}'"))?;
    Ok(())
}
