//! Offline dry-run of profile resolution.
//!
//! Simulation runs the declared filters and ranking against a candidate
//! profile set without touching live state. Provider liveness, model catalog
//! refinement and usage thresholds are skipped, and each skipped check is
//! reported as a caveat so callers can see where live routing may differ.

use crate::capabilities::Capabilities;
use crate::error::{RoutingError, RoutingResult};
use crate::profile::{RoutingProfile, RoutingStrategy};
use crate::resolver::{check_declared, declared_model, Candidate, RejectionTally, RequestAttributes};
use crate::strategy::{primary_and_fallbacks, rank};
use gateway_core::QualifiedModel;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Live check that simulation does not perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationCaveat {
    /// Providers are not checked for being configured
    ProviderLivenessSkipped,
    /// Declared models are not refined through the catalog
    ModelCatalogSkipped,
    /// Usage thresholds are not evaluated
    UsageThresholdsSkipped,
}

impl SimulationCaveat {
    /// Every caveat, in report order
    pub const ALL: [Self; 3] = [
        Self::ProviderLivenessSkipped,
        Self::ModelCatalogSkipped,
        Self::UsageThresholdsSkipped,
    ];

    /// Stable tag
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProviderLivenessSkipped => "provider_liveness_skipped",
            Self::ModelCatalogSkipped => "model_catalog_skipped",
            Self::UsageThresholdsSkipped => "usage_thresholds_skipped",
        }
    }

    /// Human-readable note
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::ProviderLivenessSkipped => {
                "targets whose provider is not configured would be dropped at request time"
            }
            Self::ModelCatalogSkipped => "declared model names are used as-is",
            Self::UsageThresholdsSkipped => {
                "targets over their rate-limit thresholds would be dropped at request time"
            }
        }
    }
}

impl fmt::Display for SimulationCaveat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a simulated resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedDecision {
    /// Matched profile
    pub profile: RoutingProfile,
    /// Strategy used for ranking
    pub strategy: RoutingStrategy,
    /// `<provider>/<model>` of the primary, if any candidate survived
    pub primary: Option<String>,
    /// Fallbacks in rank order
    pub fallbacks: Vec<String>,
    /// Ranked candidates
    pub candidates: Vec<Candidate>,
    /// Dropped targets by reason
    pub rejections: RejectionTally,
    /// Live checks that were not performed
    pub caveats: Vec<SimulationCaveat>,
}

/// Simulate resolution of `model` against `profiles`.
///
/// `model` must be `<alias>/<virtual_model>`; the first enabled profile
/// with a matching alias is used.
///
/// # Errors
///
/// Returns [`RoutingError::InvalidQualifiedModel`] for a malformed model and
/// [`RoutingError::ProfileNotFound`] when no enabled profile has the alias.
pub fn simulate(
    profiles: &[RoutingProfile],
    model: &str,
    request_type: Option<&str>,
    capabilities: &Capabilities,
) -> RoutingResult<SimulatedDecision> {
    let qualified = QualifiedModel::parse_strict(model)
        .map_err(|_| RoutingError::InvalidQualifiedModel(model.to_string()))?;

    let profile = profiles
        .iter()
        .find(|p| p.enabled && p.matches_alias(&qualified.provider))
        .ok_or_else(|| RoutingError::ProfileNotFound(qualified.provider.clone()))?;

    let attrs = RequestAttributes {
        base_model: &qualified.model,
        request_type,
        capabilities,
    };

    let mut candidates = Vec::with_capacity(profile.targets.len());
    let mut rejections = RejectionTally::default();
    for target in &profile.targets {
        match check_declared(target, &attrs) {
            Ok(()) => candidates.push(Candidate {
                provider: target.provider.trim().to_string(),
                model: declared_model(target, &qualified.model),
                priority: target.priority,
                weight: target.effective_weight(),
            }),
            Err(reason) => rejections.record(reason),
        }
    }

    let strategy = profile.effective_strategy();
    rank(&mut candidates, strategy);
    let (primary, fallbacks) = match primary_and_fallbacks(&candidates) {
        Some((primary, fallbacks)) => (Some(primary), fallbacks),
        None => (None, Vec::new()),
    };

    Ok(SimulatedDecision {
        profile: profile.clone(),
        strategy,
        primary,
        fallbacks,
        candidates,
        rejections,
        caveats: SimulationCaveat::ALL.to_vec(),
    })
}
