//! Routing profile data model.
//!
//! A profile maps a client-facing virtual provider alias onto an ordered list
//! of real provider/model targets. The JSON shape here is also the canonical
//! decoded form of the target blob a config store persists next to the
//! profile's scalar columns.

use crate::error::{RoutingError, RoutingResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Alias value that matches any requested virtual model
pub const WILDCARD: &str = "*";

/// Ranking strategy of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingStrategy {
    /// Ascending priority, weight breaks ties
    #[default]
    OrderedFailover,
    /// Descending weight, priority breaks ties
    Weighted,
}

impl RoutingStrategy {
    /// Wire name of the strategy
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderedFailover => "ordered_failover",
            Self::Weighted => "weighted",
        }
    }

    /// Parse a declared strategy; blank means the default.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Some(Self::default());
        }
        if eq_fold(raw, Self::OrderedFailover.as_str()) {
            Some(Self::OrderedFailover)
        } else if eq_fold(raw, Self::Weighted.as_str()) {
            Some(Self::Weighted)
        } else {
            None
        }
    }
}

impl fmt::Display for RoutingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_enabled() -> bool {
    true
}

fn is_zero(value: &i32) -> bool {
    *value == 0
}

/// A virtual provider backed by one or more real targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingProfile {
    /// Stable identifier
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Display name, unique case-insensitively
    pub name: String,
    /// Free-form description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Client-facing provider alias, unique case-insensitively
    pub virtual_provider: String,
    /// Virtual key this profile is bound to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_key_id: Option<String>,
    /// Disabled profiles are never matched
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Declared strategy; kept raw so unknown values reach validation
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub strategy: String,
    /// Targets in declaration order
    #[serde(default)]
    pub targets: Vec<RoutingTarget>,
}

impl RoutingProfile {
    /// Create an enabled profile with no targets
    #[must_use]
    pub fn new(name: impl Into<String>, virtual_provider: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            description: String::new(),
            virtual_provider: virtual_provider.into(),
            virtual_key_id: None,
            enabled: true,
            strategy: String::new(),
            targets: Vec::new(),
        }
    }

    /// Set the identifier
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the strategy
    #[must_use]
    pub fn with_strategy(mut self, strategy: RoutingStrategy) -> Self {
        self.strategy = strategy.as_str().to_string();
        self
    }

    /// Bind the profile to a virtual key
    #[must_use]
    pub fn with_virtual_key(mut self, virtual_key_id: impl Into<String>) -> Self {
        self.virtual_key_id = Some(virtual_key_id.into());
        self
    }

    /// Append a target
    #[must_use]
    pub fn with_target(mut self, target: RoutingTarget) -> Self {
        self.targets.push(target);
        self
    }

    /// Mark the profile disabled
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Strategy to rank with; unknown declarations fall back to the default
    #[must_use]
    pub fn effective_strategy(&self) -> RoutingStrategy {
        RoutingStrategy::parse(&self.strategy).unwrap_or_default()
    }

    /// Whether the alias names this profile
    #[must_use]
    pub fn matches_alias(&self, alias: &str) -> bool {
        eq_fold(self.virtual_provider.trim(), alias.trim())
    }

    /// Whether the profile is bound to the given virtual key
    #[must_use]
    pub fn matches_virtual_key(&self, virtual_key_id: &str) -> bool {
        let wanted = virtual_key_id.trim();
        !wanted.is_empty()
            && self
                .virtual_key_id
                .as_deref()
                .is_some_and(|bound| eq_fold(bound.trim(), wanted))
    }
}

/// One provider/model mapping inside a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingTarget {
    /// Real provider id
    pub provider: String,
    /// Virtual model alias; empty or `*` matches anything
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub virtual_model: String,
    /// Concrete model; empty means "use the requested model"
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,
    /// Lower is preferred under ordered failover
    #[serde(default, skip_serializing_if = "is_zero")]
    pub priority: i32,
    /// Relative weight, 1.0 when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Accepted request types; empty accepts any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub request_types: Vec<String>,
    /// Required capabilities; empty accepts any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,
    /// Disabled targets never become candidates
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Usage thresholds that take the target out of rotation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateHint>,
}

impl RoutingTarget {
    /// Create an enabled target for a provider
    #[must_use]
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            virtual_model: String::new(),
            model: String::new(),
            priority: 0,
            weight: None,
            request_types: Vec::new(),
            capabilities: Vec::new(),
            enabled: true,
            rate_limit: None,
        }
    }

    /// Set the concrete model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the virtual model alias
    #[must_use]
    pub fn with_virtual_model(mut self, virtual_model: impl Into<String>) -> Self {
        self.virtual_model = virtual_model.into();
        self
    }

    /// Set the priority
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the weight
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Restrict to request types
    #[must_use]
    pub fn with_request_types<I, S>(mut self, request_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request_types = request_types.into_iter().map(Into::into).collect();
        self
    }

    /// Require capabilities
    #[must_use]
    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }

    /// Attach usage thresholds
    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: RateHint) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    /// Mark the target disabled
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Weight used for ranking
    #[must_use]
    pub fn effective_weight(&self) -> f64 {
        self.weight.unwrap_or(1.0)
    }

    /// Named (non-wildcard) virtual model alias, trimmed
    #[must_use]
    pub fn named_virtual_model(&self) -> Option<&str> {
        let alias = self.virtual_model.trim();
        (!alias.is_empty() && alias != WILDCARD).then_some(alias)
    }

    /// Whether the alias is the explicit `*` wildcard
    #[must_use]
    pub fn has_wildcard_virtual_model(&self) -> bool {
        self.virtual_model.trim() == WILDCARD
    }

    /// Whether this target serves the requested virtual model
    #[must_use]
    pub fn matches_virtual_model(&self, requested: &str) -> bool {
        self.named_virtual_model()
            .map_or(true, |alias| eq_fold(alias, requested.trim()))
    }
}

/// Usage metric a threshold applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsageMetric {
    /// Request rate limit consumption
    Request,
    /// Token rate limit consumption
    Token,
    /// Budget consumption
    Budget,
}

impl UsageMetric {
    /// All metrics in evaluation order
    pub const ALL: [Self; 3] = [Self::Request, Self::Token, Self::Budget];

    /// Lowercase name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Token => "token",
            Self::Budget => "budget",
        }
    }
}

impl fmt::Display for UsageMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percent-used thresholds above which a target is skipped
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RateHint {
    /// Request rate limit threshold, percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_percent_threshold: Option<f64>,
    /// Token rate limit threshold, percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_percent_threshold: Option<f64>,
    /// Budget threshold, percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_percent_threshold: Option<f64>,
}

impl RateHint {
    /// Threshold configured for a metric
    #[must_use]
    pub fn threshold(&self, metric: UsageMetric) -> Option<f64> {
        match metric {
            UsageMetric::Request => self.request_percent_threshold,
            UsageMetric::Token => self.token_percent_threshold,
            UsageMetric::Budget => self.budget_percent_threshold,
        }
    }
}

/// Encode a target list for storage; an empty list stores nothing.
///
/// # Errors
/// Returns [`RoutingError::Storage`] if serialization fails
pub fn encode_targets(targets: &[RoutingTarget]) -> RoutingResult<Option<String>> {
    if targets.is_empty() {
        return Ok(None);
    }
    serde_json::to_string(targets)
        .map(Some)
        .map_err(|e| RoutingError::Storage(e.to_string()))
}

/// Decode a stored target list; a missing or blank blob is an empty list.
///
/// # Errors
/// Returns [`RoutingError::Storage`] if the blob is not a valid target list
pub fn decode_targets(blob: Option<&str>) -> RoutingResult<Vec<RoutingTarget>> {
    match blob.map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(raw) => serde_json::from_str(raw).map_err(|e| RoutingError::Storage(e.to_string())),
    }
}

/// Unicode-aware case-insensitive comparison without allocating
pub(crate) fn eq_fold(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Whether any item equals the value case-insensitively
pub(crate) fn contains_fold<S: AsRef<str>>(values: &[S], value: &str) -> bool {
    values.iter().any(|item| eq_fold(item.as_ref(), value))
}
