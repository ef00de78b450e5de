//! CLI argument definitions using clap.

use anyhow::Result;
use clap::{Parser, Subcommand};
use gateway_telemetry::{init_logging, LogFormat, LoggingConfig};

use crate::commands;

/// Validate, preview and serve gateway routing profiles
#[derive(Parser, Debug)]
#[command(name = "routing-profiles")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log level or filter directive
    #[arg(long, env = "ROUTING_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load and validate a routing config file
    #[command(visible_alias = "validate")]
    Check(commands::check::CheckArgs),

    /// Preview the routing decision for a model string
    Simulate(commands::simulate::SimulateArgs),

    /// Load profiles and hot-reload them on file change
    Watch(commands::watch::WatchArgs),
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        let Self {
            log_level,
            json,
            command,
        } = self;

        match command {
            Commands::Check(args) => {
                init_quiet_logging(log_level.as_deref(), json);
                commands::check::execute(args, json).await
            }
            Commands::Simulate(args) => {
                init_quiet_logging(log_level.as_deref(), json);
                commands::simulate::execute(args, json).await
            }
            Commands::Watch(args) => commands::watch::execute(args, log_level.as_deref()).await,
        }
    }
}

/// One-shot commands only surface warnings unless asked otherwise.
fn init_quiet_logging(level: Option<&str>, json: bool) {
    let format = if json { LogFormat::Json } else { LogFormat::Text };
    let config = LoggingConfig::new()
        .with_level(level.unwrap_or("warn"))
        .with_format(format)
        .with_target(false);
    if let Err(e) = init_logging(&config) {
        eprintln!("Failed to initialize logging: {e}");
    }
}
