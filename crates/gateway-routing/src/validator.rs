//! Structural validation of a routing profile set.
//!
//! A set is checked as a whole before it may become active. The first
//! violation wins and names the offending profile and rule.

use crate::backends::ConfiguredProviders;
use crate::error::{RoutingError, RoutingResult, ValidationRule};
use crate::profile::{RoutingProfile, RoutingStrategy, UsageMetric, WILDCARD};
use std::collections::HashSet;
use tracing::warn;

/// Validate a complete candidate profile set.
///
/// # Errors
/// Returns [`RoutingError::InvalidProfile`] for the first violated rule
pub fn validate_profiles(
    profiles: &[RoutingProfile],
    providers: &dyn ConfiguredProviders,
) -> RoutingResult<()> {
    let real_providers: HashSet<String> = providers
        .provider_ids()
        .iter()
        .map(|id| fold_key(id))
        .collect();

    let mut seen_names = HashSet::new();
    let mut seen_aliases = HashSet::new();

    for profile in profiles {
        let name = profile.name.trim();
        if name.is_empty() {
            return Err(RoutingError::invalid(
                &profile.name,
                ValidationRule::NameRequired,
                "routing profile name is required",
            ));
        }
        if !seen_names.insert(fold_key(name)) {
            return Err(RoutingError::invalid(
                name,
                ValidationRule::DuplicateName,
                format!("routing profile name {name} must be unique"),
            ));
        }

        let alias = profile.virtual_provider.trim();
        if alias.is_empty() {
            return Err(RoutingError::invalid(
                name,
                ValidationRule::AliasRequired,
                "virtual_provider is required",
            ));
        }
        if alias == WILDCARD {
            return Err(RoutingError::invalid(
                name,
                ValidationRule::ReservedAlias,
                "virtual_provider '*' is reserved",
            ));
        }
        let alias_key = fold_key(alias);
        if real_providers.contains(&alias_key) {
            return Err(RoutingError::invalid(
                name,
                ValidationRule::AliasConflictsWithProvider,
                format!("virtual_provider {alias} conflicts with a configured real provider"),
            ));
        }
        if !seen_aliases.insert(alias_key) {
            return Err(RoutingError::invalid(
                name,
                ValidationRule::DuplicateAlias,
                format!("virtual_provider {alias} must be unique"),
            ));
        }

        if RoutingStrategy::parse(&profile.strategy).is_none() {
            return Err(RoutingError::invalid(
                name,
                ValidationRule::UnknownStrategy,
                format!(
                    "strategy {} must be ordered_failover or weighted",
                    profile.strategy
                ),
            ));
        }

        validate_targets(name, profile)?;
    }

    Ok(())
}

fn validate_targets(name: &str, profile: &RoutingProfile) -> RoutingResult<()> {
    if profile.targets.is_empty() {
        return Err(RoutingError::invalid(
            name,
            ValidationRule::NoTargets,
            "must define at least one target",
        ));
    }

    let mut has_wildcard = false;
    let mut seen_virtual_models = HashSet::new();

    for (index, target) in profile.targets.iter().enumerate() {
        if target.provider.trim().is_empty() {
            return Err(RoutingError::invalid(
                name,
                ValidationRule::TargetProviderMissing,
                format!("target #{index} must define a provider"),
            ));
        }

        if target.has_wildcard_virtual_model() {
            has_wildcard = true;
        }

        if let Some(alias) = target.named_virtual_model() {
            if target.model.trim().is_empty() {
                return Err(RoutingError::invalid(
                    name,
                    ValidationRule::ModelRequired,
                    format!("target for virtual_model {alias} must define model"),
                ));
            }
            if !seen_virtual_models.insert(fold_key(alias)) {
                return Err(RoutingError::invalid(
                    name,
                    ValidationRule::DuplicateVirtualModel,
                    format!("duplicate virtual_model alias {alias}"),
                ));
            }
        }

        // Out-of-range thresholds are accepted here and fail closed at
        // resolution time.
        if let Some(hint) = &target.rate_limit {
            for metric in UsageMetric::ALL {
                if let Some(threshold) = hint.threshold(metric) {
                    if !(0.0..=100.0).contains(&threshold) {
                        warn!(
                            profile = %name,
                            provider = %target.provider,
                            metric = %metric,
                            threshold,
                            "Rate hint threshold outside [0, 100]; target will never be selected"
                        );
                    }
                }
            }
        }
    }

    if has_wildcard && !seen_virtual_models.is_empty() {
        return Err(RoutingError::invalid(
            name,
            ValidationRule::WildcardMix,
            "mixes wildcard virtual_model '*' with named virtual models",
        ));
    }

    Ok(())
}

fn fold_key(value: &str) -> String {
    value.trim().to_lowercase()
}
