//! Configuration file loading.

use crate::config::RoutingGatewayConfig;
use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "ROUTING_PROFILES_CONFIG";

/// Supported file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    /// `.yaml` / `.yml`
    Yaml,
    /// `.toml`
    Toml,
    /// `.json`
    Json,
}

impl ConfigFormat {
    /// Detect the format from a file extension
    ///
    /// # Errors
    /// Returns [`ConfigError::UnsupportedFormat`] for other extensions
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Lowercase name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Toml => "toml",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loads [`RoutingGatewayConfig`] from disk
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Create a loader
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Load and parse a config file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub async fn load_file(&self, path: &Path) -> ConfigResult<RoutingGatewayConfig> {
        let format = ConfigFormat::from_path(path)?;
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let config = Self::parse_str(&content, format)?;
        debug!(
            path = %path.display(),
            format = %format,
            profiles = config.active_profiles().len(),
            "Loaded routing config"
        );
        Ok(config)
    }

    /// Load from `explicit`, or from `ROUTING_PROFILES_CONFIG` when absent
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingPath`] when neither is set
    pub async fn load(&self, explicit: Option<&Path>) -> ConfigResult<(PathBuf, RoutingGatewayConfig)> {
        let path = Self::resolve_path(explicit, |key| std::env::var(key).ok())?;
        let config = self.load_file(&path).await?;
        Ok((path, config))
    }

    /// Pick the config path from an explicit value or the environment
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingPath`] when neither is set
    pub fn resolve_path<F>(explicit: Option<&Path>, lookup: F) -> ConfigResult<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        lookup(CONFIG_PATH_ENV)
            .filter(|v| !v.trim().is_empty())
            .map(|v| PathBuf::from(v.trim()))
            .ok_or(ConfigError::MissingPath(CONFIG_PATH_ENV))
    }

    /// Parse config text in the given format
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] on malformed input
    pub fn parse_str(content: &str, format: ConfigFormat) -> ConfigResult<RoutingGatewayConfig> {
        if content.trim().is_empty() {
            return Ok(RoutingGatewayConfig::default());
        }
        match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| ConfigError::parse(format, e)),
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| ConfigError::parse(format, e)),
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| ConfigError::parse(format, e)),
        }
    }
}
