//! Routing gateway configuration model.

use crate::error::ConfigResult;
use gateway_routing::{validate_profiles, RoutingProfile};
use gateway_telemetry::{LogFormat, LoggingConfig};
use serde::{Deserialize, Serialize};

/// Environment variable overriding the log level
pub const LOG_LEVEL_ENV: &str = "ROUTING_LOG_LEVEL";
/// Environment variable overriding the log format
pub const LOG_FORMAT_ENV: &str = "ROUTING_LOG_FORMAT";

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingGatewayConfig {
    /// Real provider ids configured in the gateway
    pub providers: Vec<String>,
    /// Routing profiles declared in the routing section
    pub routing_profiles: Vec<RoutingProfile>,
    /// Secondary profile source
    pub governance: GovernanceSection,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Governance section; only its profiles are read here
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceSection {
    /// Profiles used when the routing section declares none
    pub routing_profiles: Vec<RoutingProfile>,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Level or filter directive
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl LoggingSettings {
    /// Convert to a subscriber configuration
    #[must_use]
    pub fn to_logging_config(&self) -> LoggingConfig {
        LoggingConfig::new()
            .with_level(self.level.clone())
            .with_format(self.format)
    }
}

impl RoutingGatewayConfig {
    /// Profiles that should be active
    #[must_use]
    pub fn effective_profiles(&self) -> Vec<RoutingProfile> {
        self.active_profiles().to_vec()
    }

    /// Borrowed view of [`Self::effective_profiles`]
    #[must_use]
    pub fn active_profiles(&self) -> &[RoutingProfile] {
        select_source(&self.routing_profiles, &self.governance.routing_profiles)
    }

    /// Validate the effective profiles against the configured providers
    ///
    /// # Errors
    /// Returns the first validation failure
    pub fn validate(&self) -> ConfigResult<()> {
        validate_profiles(self.active_profiles(), &self.providers)?;
        Ok(())
    }

    /// Apply `ROUTING_LOG_LEVEL` and `ROUTING_LOG_FORMAT`
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup
    #[must_use]
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(LOG_LEVEL_ENV).filter(|v| !v.trim().is_empty()) {
            self.logging.level = level.trim().to_string();
        }
        if let Some(format) = lookup(LOG_FORMAT_ENV).and_then(|v| v.parse().ok()) {
            self.logging.format = format;
        }
        self
    }
}

/// Routing-section profiles win when present; otherwise use the fallback source
#[must_use]
pub fn profiles_from_sources(
    primary: &[RoutingProfile],
    fallback: &[RoutingProfile],
) -> Vec<RoutingProfile> {
    select_source(primary, fallback).to_vec()
}

fn select_source<'a>(primary: &'a [RoutingProfile], fallback: &'a [RoutingProfile]) -> &'a [RoutingProfile] {
    if primary.is_empty() {
        fallback
    } else {
        primary
    }
}
