//! Candidate resolution.
//!
//! Each target of a matched profile runs through a fixed filter chain. The
//! first failing filter drops the target and is tallied by reason, so the
//! tally explains an empty result as well as a partial one.
//!
//! | # | Filter | Reason |
//! |---|--------|--------|
//! | 1 | target disabled / provider blank | `target_disabled_or_provider_missing` |
//! | 2 | virtual model alias | `virtual_model_mismatch` |
//! | 3 | accepted request types | `request_type_mismatch` |
//! | 4 | required capabilities | `capability_mismatch` |
//! | 5 | provider configured | `provider_not_configured` |
//! | 6 | catalog refinement | `model_refine_failed` |
//! | 7 | usage thresholds | `usage_unavailable`, `*_threshold_exceeded` |
//!
//! Filters 1-4 only read the profile and request; simulation reuses them.

use crate::backends::{LiveBackends, VirtualKeyContext};
use crate::capabilities::Capabilities;
use crate::profile::{contains_fold, RoutingProfile, RoutingTarget, UsageMetric};
use crate::threshold::check_usage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Why a target was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// Target disabled or provider blank
    TargetDisabledOrProviderMissing,
    /// Virtual model alias did not match
    VirtualModelMismatch,
    /// Request type not accepted
    RequestTypeMismatch,
    /// None of the required capabilities present
    CapabilityMismatch,
    /// Provider not configured on the gateway
    ProviderNotConfigured,
    /// Catalog could not refine the model
    ModelRefineFailed,
    /// Usage counters could not be read
    UsageUnavailable,
    /// Request rate limit threshold reached
    RequestThresholdExceeded,
    /// Token rate limit threshold reached
    TokenThresholdExceeded,
    /// Budget threshold reached
    BudgetThresholdExceeded,
}

impl RejectionReason {
    /// Reason tag used in diagnostics
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TargetDisabledOrProviderMissing => "target_disabled_or_provider_missing",
            Self::VirtualModelMismatch => "virtual_model_mismatch",
            Self::RequestTypeMismatch => "request_type_mismatch",
            Self::CapabilityMismatch => "capability_mismatch",
            Self::ProviderNotConfigured => "provider_not_configured",
            Self::ModelRefineFailed => "model_refine_failed",
            Self::UsageUnavailable => "usage_unavailable",
            Self::RequestThresholdExceeded => "request_threshold_exceeded",
            Self::TokenThresholdExceeded => "token_threshold_exceeded",
            Self::BudgetThresholdExceeded => "budget_threshold_exceeded",
        }
    }

    /// Reason for a metric over its threshold
    #[must_use]
    pub fn threshold_exceeded(metric: UsageMetric) -> Self {
        match metric {
            UsageMetric::Request => Self::RequestThresholdExceeded,
            UsageMetric::Token => Self::TokenThresholdExceeded,
            UsageMetric::Budget => Self::BudgetThresholdExceeded,
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Count of dropped targets per reason
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RejectionTally(BTreeMap<RejectionReason, usize>);

impl RejectionTally {
    /// Record one rejection
    pub fn record(&mut self, reason: RejectionReason) {
        *self.0.entry(reason).or_insert(0) += 1;
    }

    /// Rejections for a reason
    #[must_use]
    pub fn count(&self, reason: RejectionReason) -> usize {
        self.0.get(&reason).copied().unwrap_or(0)
    }

    /// Total rejections
    #[must_use]
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Whether nothing was rejected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reasons and counts, ordered by filter position
    pub fn iter(&self) -> impl Iterator<Item = (RejectionReason, usize)> + '_ {
        self.0.iter().map(|(reason, count)| (*reason, *count))
    }
}

/// A target that survived filtering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Real provider id
    pub provider: String,
    /// Resolved concrete model
    pub model: String,
    /// Declared priority
    pub priority: i32,
    /// Declared weight, 1.0 when unset
    pub weight: f64,
}

impl Candidate {
    /// `<provider>/<model>` reference for dispatch
    #[must_use]
    pub fn qualified(&self) -> String {
        format!("{}/{}", self.provider, self.model)
    }
}

/// Request attributes the filters read
#[derive(Debug, Clone, Copy)]
pub struct RequestAttributes<'a> {
    /// Requested virtual model (the part after the alias)
    pub base_model: &'a str,
    /// Request type, when known
    pub request_type: Option<&'a str>,
    /// Capabilities the request needs
    pub capabilities: &'a Capabilities,
}

/// Surviving candidates in declaration order plus the rejection tally
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Candidates, unranked
    pub candidates: Vec<Candidate>,
    /// Dropped targets by reason
    pub rejections: RejectionTally,
}

/// Filters 1-4: checks that only depend on declared data.
pub(crate) fn check_declared(
    target: &RoutingTarget,
    attrs: &RequestAttributes<'_>,
) -> Result<(), RejectionReason> {
    if !target.enabled || target.provider.trim().is_empty() {
        return Err(RejectionReason::TargetDisabledOrProviderMissing);
    }
    if !target.matches_virtual_model(attrs.base_model) {
        return Err(RejectionReason::VirtualModelMismatch);
    }
    if let Some(request_type) = attrs.request_type.map(str::trim).filter(|t| !t.is_empty()) {
        if !target.request_types.is_empty() && !contains_fold(&target.request_types, request_type) {
            return Err(RejectionReason::RequestTypeMismatch);
        }
    }
    if !target.capabilities.is_empty() && !attrs.capabilities.satisfies_any(&target.capabilities) {
        return Err(RejectionReason::CapabilityMismatch);
    }
    Ok(())
}

/// Declared model, or the requested one when the target leaves it blank
pub(crate) fn declared_model(target: &RoutingTarget, base_model: &str) -> String {
    let model = target.model.trim();
    if model.is_empty() {
        base_model.trim().to_string()
    } else {
        model.to_string()
    }
}

/// Runs the full filter chain against live gateway state
#[derive(Debug, Clone)]
pub struct CandidateResolver {
    backends: LiveBackends,
}

impl CandidateResolver {
    /// Create a resolver over live collaborators
    #[must_use]
    pub fn new(backends: LiveBackends) -> Self {
        Self { backends }
    }

    /// Filter a profile's targets for a request
    pub fn resolve(
        &self,
        profile: &RoutingProfile,
        attrs: &RequestAttributes<'_>,
        key: &VirtualKeyContext,
    ) -> Resolution {
        let mut resolution = Resolution {
            candidates: Vec::with_capacity(profile.targets.len()),
            rejections: RejectionTally::default(),
        };

        for target in &profile.targets {
            match self.evaluate(target, attrs, key) {
                Ok(candidate) => resolution.candidates.push(candidate),
                Err(reason) => {
                    debug!(
                        profile = %profile.name,
                        provider = %target.provider,
                        model = %target.model,
                        reason = %reason,
                        "Routing profile target rejected"
                    );
                    resolution.rejections.record(reason);
                }
            }
        }

        resolution
    }

    fn evaluate(
        &self,
        target: &RoutingTarget,
        attrs: &RequestAttributes<'_>,
        key: &VirtualKeyContext,
    ) -> Result<Candidate, RejectionReason> {
        check_declared(target, attrs)?;

        let provider = target.provider.trim();
        if !self.backends.providers.is_configured(provider) {
            return Err(RejectionReason::ProviderNotConfigured);
        }

        let raw_model = declared_model(target, attrs.base_model);
        let model = self
            .backends
            .catalog
            .refine_model(provider, &raw_model)
            .map_err(|e| {
                debug!(provider, model = %raw_model, error = %e, "Model refinement failed");
                RejectionReason::ModelRefineFailed
            })?;

        let usage = self.backends.usage.usage(key, &model, provider).map_err(|e| {
            debug!(provider, model = %model, error = %e, "Usage lookup failed");
            RejectionReason::UsageUnavailable
        })?;
        if let Some(status) = usage {
            check_usage(&status, target.rate_limit.as_ref())?;
        }

        Ok(Candidate {
            provider: provider.to_string(),
            model,
            priority: target.priority,
            weight: target.effective_weight(),
        })
    }
}
