//! Configuration errors.

use crate::loader::ConfigFormat;
use gateway_routing::RoutingError;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// File contents did not parse
    #[error("Failed to parse {format} config: {message}")]
    Parse {
        /// Format the contents were parsed as
        format: ConfigFormat,
        /// Parser message
        message: String,
    },

    /// Extension is not one of yaml, yml, toml or json
    #[error("Unsupported config file extension: {0}")]
    UnsupportedFormat(PathBuf),

    /// No path given and the environment variable is unset
    #[error("No config path given and {0} is not set")]
    MissingPath(&'static str),

    /// Profiles failed validation
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// File watching could not be set up
    #[error("Config watch error: {0}")]
    Watch(String),
}

impl ConfigError {
    /// Create a parse error
    pub fn parse(format: ConfigFormat, message: impl ToString) -> Self {
        Self::Parse {
            format,
            message: message.to_string(),
        }
    }
}

impl From<notify::Error> for ConfigError {
    fn from(err: notify::Error) -> Self {
        Self::Watch(err.to_string())
    }
}
