//! # Gateway Config
//!
//! Configuration for the routing-profile gateway.
//!
//! This crate provides:
//! - YAML, TOML and JSON config files
//! - Environment overrides for the config path and logging
//! - Profile source precedence
//! - Hot reload into the profile registry

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod loader;
pub mod watcher;

// Re-export main types
pub use config::{profiles_from_sources, GovernanceSection, LoggingSettings, RoutingGatewayConfig};
pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigFormat, ConfigLoader, CONFIG_PATH_ENV};
pub use watcher::{ConfigWatcher, WatchHandle};
