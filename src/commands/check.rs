//! Check command - load and validate a routing config file.

use anyhow::{bail, Result};
use clap::Args;
use gateway_config::{ConfigError, ConfigLoader, RoutingGatewayConfig};
use gateway_routing::{RoutingProfile, UsageMetric};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::Tabled;

use crate::output::{self, OutputFormat};

/// Arguments for the check command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Config file (.yaml, .yml, .toml or .json); defaults to $ROUTING_PROFILES_CONFIG
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

/// Check result.
#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub file: String,
    pub source: ProfileSource,
    pub profiles: Vec<ProfileSummary>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CheckError>,
}

/// Which config section supplied the active profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileSource {
    RoutingProfiles,
    Governance,
    None,
}

/// Validation failure.
#[derive(Debug, Serialize)]
pub struct CheckError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<&'static str>,
    pub message: String,
}

/// One row of the profile table.
#[derive(Debug, Serialize, Tabled)]
pub struct ProfileSummary {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Alias")]
    pub alias: String,
    #[tabled(rename = "Strategy")]
    pub strategy: String,
    #[tabled(rename = "Targets")]
    pub targets: usize,
    #[tabled(rename = "Enabled")]
    pub enabled: bool,
    #[tabled(rename = "Virtual key")]
    pub virtual_key: String,
}

impl From<&RoutingProfile> for ProfileSummary {
    fn from(profile: &RoutingProfile) -> Self {
        Self {
            name: profile.name.clone(),
            alias: profile.virtual_provider.clone(),
            strategy: profile.effective_strategy().to_string(),
            targets: profile.targets.len(),
            enabled: profile.enabled,
            virtual_key: profile.virtual_key_id.clone().unwrap_or_default(),
        }
    }
}

/// Execute the check command.
pub async fn execute(args: CheckArgs, json: bool) -> Result<()> {
    let format = OutputFormat::from_json_flag(json);
    let (path, config) = ConfigLoader::new().load(args.file.as_deref()).await?;

    let result = check_config(&path, &config);
    print_result(&result, format)?;

    if !result.valid {
        bail!("routing config {} is invalid", path.display());
    }
    Ok(())
}

/// Validate a loaded config and gather warnings.
pub fn check_config(path: &Path, config: &RoutingGatewayConfig) -> CheckResult {
    let profiles = config.effective_profiles();
    let source = if !config.routing_profiles.is_empty() {
        ProfileSource::RoutingProfiles
    } else if !config.governance.routing_profiles.is_empty() {
        ProfileSource::Governance
    } else {
        ProfileSource::None
    };

    let error = config.validate().err().map(|e| {
        let rule = match &e {
            ConfigError::Routing(routing) => routing.rule().map(|r| r.as_str()),
            _ => None,
        };
        CheckError {
            rule,
            message: e.to_string(),
        }
    });

    CheckResult {
        valid: error.is_none(),
        file: path.display().to_string(),
        source,
        profiles: profiles.iter().map(ProfileSummary::from).collect(),
        warnings: collect_warnings(&profiles, source),
        error,
    }
}

fn collect_warnings(profiles: &[RoutingProfile], source: ProfileSource) -> Vec<String> {
    let mut warnings = Vec::new();

    match source {
        ProfileSource::Governance => {
            warnings.push("routing_profiles is empty; using governance.routing_profiles".to_string());
        }
        ProfileSource::None => warnings.push("No routing profiles are defined".to_string()),
        ProfileSource::RoutingProfiles => {}
    }

    for profile in profiles {
        if !profile.enabled {
            warnings.push(format!("Profile '{}' is disabled", profile.name));
        }
        for target in &profile.targets {
            if !target.enabled {
                warnings.push(format!(
                    "Target '{}' in profile '{}' is disabled",
                    target.provider, profile.name
                ));
            }
            let Some(hint) = &target.rate_limit else { continue };
            for metric in UsageMetric::ALL {
                if let Some(threshold) = hint.threshold(metric) {
                    if !(0.0..=100.0).contains(&threshold) {
                        warnings.push(format!(
                            "Target '{}' in profile '{}' has {metric} threshold {threshold} outside [0, 100]; it will never be selected",
                            target.provider, profile.name
                        ));
                    }
                }
            }
        }
    }

    warnings
}

fn print_result(result: &CheckResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => output::json(result),
        OutputFormat::Text => {
            output::section("Routing profiles");
            output::key_value("File", &result.file);
            output::table(&result.profiles);

            for warning in &result.warnings {
                output::warning(warning);
            }
            match &result.error {
                Some(err) => output::error(&err.message),
                None => output::success(&format!("{} profile(s) valid", result.profiles.len())),
            }
            Ok(())
        }
    }
}
