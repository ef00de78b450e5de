//! Routing decision and the diagnostics it carries.

use crate::profile::{RoutingProfile, RoutingStrategy};
use crate::request::RoutableRequest;
use crate::resolver::{Candidate, RejectionTally};
use crate::strategy::primary_and_fallbacks;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Context key for the matched profile id
pub const PROFILE_ID_KEY: &str = "routing-profile-id";
/// Context key for the matched profile name
pub const PROFILE_NAME_KEY: &str = "routing-profile-name";
/// Context key for the chosen primary
pub const PRIMARY_KEY: &str = "routing-profile-primary";
/// Context key for the surviving candidate count
pub const CANDIDATE_COUNT_KEY: &str = "routing-profile-candidate-count";
/// Context key for the fallback count
pub const FALLBACK_COUNT_KEY: &str = "routing-profile-fallback-count";
/// Context key for the rejection tally
pub const REJECTIONS_KEY: &str = "routing-profile-rejections";

/// What a profile match decided, for telemetry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDiagnostics {
    /// Matched profile id
    pub profile_id: String,
    /// Matched profile name
    pub profile_name: String,
    /// Strategy the candidates were ranked with
    pub strategy: RoutingStrategy,
    /// `<provider>/<model>` of the primary, if any candidate survived
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    /// Fallback chain in rank order
    #[serde(default)]
    pub fallbacks: Vec<String>,
    /// Ranked candidates
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Dropped targets by reason
    #[serde(default)]
    pub rejections: RejectionTally,
}

impl RoutingDiagnostics {
    /// Build diagnostics from a profile and its ranked candidates
    #[must_use]
    pub fn new(profile: &RoutingProfile, ranked: Vec<Candidate>, rejections: RejectionTally) -> Self {
        let (primary, fallbacks) = match primary_and_fallbacks(&ranked) {
            Some((primary, fallbacks)) => (Some(primary), fallbacks),
            None => (None, Vec::new()),
        };
        Self {
            profile_id: profile.id.clone(),
            profile_name: profile.name.clone(),
            strategy: profile.effective_strategy(),
            primary,
            fallbacks,
            candidates: ranked,
            rejections,
        }
    }

    /// Number of surviving candidates
    #[must_use]
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Number of fallbacks
    #[must_use]
    pub fn fallback_count(&self) -> usize {
        self.fallbacks.len()
    }

    /// Copy the diagnostics into the request's context
    pub fn attach_to<R: RoutableRequest + ?Sized>(&self, request: &mut R) {
        request.set_diagnostic(PROFILE_ID_KEY, Value::from(self.profile_id.as_str()));
        request.set_diagnostic(PROFILE_NAME_KEY, Value::from(self.profile_name.as_str()));
        if let Some(primary) = &self.primary {
            request.set_diagnostic(PRIMARY_KEY, Value::from(primary.as_str()));
        }
        request.set_diagnostic(CANDIDATE_COUNT_KEY, Value::from(self.candidate_count()));
        request.set_diagnostic(FALLBACK_COUNT_KEY, Value::from(self.fallback_count()));

        let rejections: Map<String, Value> = self
            .rejections
            .iter()
            .map(|(reason, count)| (reason.as_str().to_string(), Value::from(count)))
            .collect();
        request.set_diagnostic(REJECTIONS_KEY, Value::Object(rejections));
    }
}

/// Result of live resolution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveOutcome {
    /// Whether the request was rewritten to a profile target
    pub matched: bool,
    /// Present whenever a profile matched, even with zero candidates
    pub diagnostics: Option<RoutingDiagnostics>,
}

impl ResolveOutcome {
    /// Routing profiles did not apply
    #[must_use]
    pub fn pass_through() -> Self {
        Self::default()
    }
}
