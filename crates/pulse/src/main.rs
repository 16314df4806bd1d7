//! Pulse - presence heartbeat analytics service
//!
//! # Usage
//!
//! ```bash
//! # Run the server (default)
//! pulse
//! pulse --config configs/pulse.toml
//!
//! # Explicit subcommand
//! pulse serve --config configs/pulse.toml
//! ```

mod cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pulse_config::{LogConfig, LogFormat};

/// Pulse - presence heartbeat analytics service
#[derive(Parser, Debug)]
#[command(name = "pulse")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the server (default when no subcommand is given)
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => cmd::serve::run(cli.config, cli.log_level).await,
    }
}

/// Initialize the tracing subscriber.
///
/// Precedence: `--log-level` flag, then `RUST_LOG`, then the config file.
pub(crate) fn init_logging(log: &LogConfig, override_level: Option<&str>) -> Result<()> {
    let default_level = override_level.unwrap_or(log.level.as_str());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    match log.format {
        LogFormat::Console => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
    }
    Ok(())
}
