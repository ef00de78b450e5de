//! # Routing Profiles
//!
//! Command-line driver for gateway routing profiles.
//!
//! ## Usage
//!
//! ```bash
//! # Validate a profile file
//! routing-profiles check --file routing.yaml
//!
//! # Preview where a model string would route
//! routing-profiles simulate --file routing.yaml --model light/light --capability vision
//!
//! # Keep a registry loaded and hot-reload on change
//! ROUTING_PROFILES_CONFIG=routing.yaml routing-profiles watch
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod output;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.execute().await
}
