//! Error types for routing profiles.

use std::fmt;
use thiserror::Error;

/// Result type for routing-profile operations
pub type RoutingResult<T> = Result<T, RoutingError>;

/// Structural rule a profile set can violate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationRule {
    /// Profile name is blank
    NameRequired,
    /// Two profiles share a name (case-insensitive)
    DuplicateName,
    /// Virtual provider alias is blank
    AliasRequired,
    /// Virtual provider alias is the reserved `*`
    ReservedAlias,
    /// Virtual provider alias shadows a configured real provider
    AliasConflictsWithProvider,
    /// Two profiles share a virtual provider alias (case-insensitive)
    DuplicateAlias,
    /// Profile has no targets
    NoTargets,
    /// A target has a blank provider id
    TargetProviderMissing,
    /// Two targets share a named virtual model alias (case-insensitive)
    DuplicateVirtualModel,
    /// Wildcard and named virtual model aliases are mixed in one profile
    WildcardMix,
    /// A target with a named virtual model alias has no concrete model
    ModelRequired,
    /// Strategy is neither `ordered_failover` nor `weighted`
    UnknownStrategy,
}

impl ValidationRule {
    /// Stable identifier of the rule
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NameRequired => "name_required",
            Self::DuplicateName => "duplicate_name",
            Self::AliasRequired => "virtual_provider_required",
            Self::ReservedAlias => "virtual_provider_reserved",
            Self::AliasConflictsWithProvider => "virtual_provider_conflict",
            Self::DuplicateAlias => "duplicate_virtual_provider",
            Self::NoTargets => "no_targets",
            Self::TargetProviderMissing => "target_provider_required",
            Self::DuplicateVirtualModel => "duplicate_virtual_model",
            Self::WildcardMix => "wildcard_virtual_model_mix",
            Self::ModelRequired => "target_model_required",
            Self::UnknownStrategy => "unknown_strategy",
        }
    }
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by routing-profile operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// A candidate profile set violated a structural rule
    #[error("invalid routing profile {profile:?} ({rule}): {message}")]
    InvalidProfile {
        /// Name of the offending profile (may be empty)
        profile: String,
        /// Violated rule
        rule: ValidationRule,
        /// Human-readable detail
        message: String,
    },

    /// Simulation input was not `<virtual_provider>/<virtual_model>`
    #[error("model must be in virtual_provider/virtual_model format, got {0:?}")]
    InvalidQualifiedModel(String),

    /// No enabled profile carries the requested alias
    #[error("no routing profile found for virtual provider {0}")]
    ProfileNotFound(String),

    /// Target list could not be encoded or decoded
    #[error("routing profile storage error: {0}")]
    Storage(String),
}

impl RoutingError {
    /// Create a validation error for a profile
    pub fn invalid(
        profile: impl Into<String>,
        rule: ValidationRule,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidProfile {
            profile: profile.into(),
            rule,
            message: message.into(),
        }
    }

    /// The violated rule, if this is a validation error
    #[must_use]
    pub fn rule(&self) -> Option<ValidationRule> {
        match self {
            Self::InvalidProfile { rule, .. } => Some(*rule),
            _ => None,
        }
    }
}
