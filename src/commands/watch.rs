//! Watch command - keep a registry loaded and hot-reload it.

use anyhow::Result;
use clap::Args;
use gateway_config::{ConfigLoader, ConfigWatcher};
use gateway_routing::{ConfiguredProviders, ProfileRegistry};
use gateway_telemetry::init_logging;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Arguments for the watch command.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Config file (.yaml, .yml, .toml or .json); defaults to $ROUTING_PROFILES_CONFIG
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

/// Execute the watch command.
pub async fn execute(args: WatchArgs, log_level: Option<&str>) -> Result<()> {
    let (path, config) = ConfigLoader::new().load(args.file.as_deref()).await?;
    let config = config.with_env_overrides();

    let mut logging = config.logging.to_logging_config();
    if let Some(level) = log_level {
        logging = logging.with_level(level);
    }
    init_logging(&logging)?;

    // Provider set is fixed for the life of the process; reloads only swap profiles
    let providers: BTreeSet<String> = config
        .providers
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    let providers: Arc<dyn ConfiguredProviders> = Arc::new(providers);

    let registry = Arc::new(ProfileRegistry::new(providers));
    registry.replace(config.effective_profiles())?;

    let handle = ConfigWatcher::new(Arc::clone(&registry), &path).watch()?;
    info!(
        path = %path.display(),
        profiles = registry.snapshot().len(),
        "Routing profiles active; press Ctrl-C to stop"
    );

    tokio::signal::ctrl_c().await?;
    handle.stop();
    info!(version = registry.snapshot().version(), "Stopped watching routing config");
    Ok(())
}
