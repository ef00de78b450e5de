//! Live resolution entry point.
//!
//! Profile selection precedence:
//! 1. A profile bound to the request's virtual key, unconditionally.
//! 2. A profile whose alias matches the `<alias>/<model>` request model.
//!
//! Anything else passes through untouched; profiles are an optional layer,
//! so neither a missing profile nor an empty candidate list is an error.

use crate::backends::{LiveBackends, VirtualKeyContext};
use crate::decision::{ResolveOutcome, RoutingDiagnostics};
use crate::registry::ProfileRegistry;
use crate::request::{split_model_suffix, RoutableRequest};
use crate::resolver::{CandidateResolver, RequestAttributes};
use crate::strategy::rank;
use gateway_core::QualifiedModel;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Resolves requests against the active profile set
#[derive(Debug, Clone)]
pub struct ProfileRouter {
    registry: Arc<ProfileRegistry>,
    resolver: CandidateResolver,
}

impl ProfileRouter {
    /// Create a router over a registry and live collaborators
    #[must_use]
    pub fn new(registry: Arc<ProfileRegistry>, backends: LiveBackends) -> Self {
        Self {
            registry,
            resolver: CandidateResolver::new(backends),
        }
    }

    /// Registry this router reads from
    #[must_use]
    pub fn registry(&self) -> &Arc<ProfileRegistry> {
        &self.registry
    }

    /// Resolve a request in place.
    ///
    /// On a match with at least one candidate the target model becomes the
    /// primary and the remaining ranks become the fallback list. Diagnostics
    /// are returned and also attached to the request context whenever a
    /// profile matched.
    #[instrument(skip_all, fields(virtual_key = key.id.as_deref().unwrap_or_default()))]
    pub fn resolve<R: RoutableRequest + ?Sized>(
        &self,
        request: &mut R,
        key: &VirtualKeyContext,
    ) -> ResolveOutcome {
        let snapshot = self.registry.snapshot();
        if snapshot.is_empty() {
            return ResolveOutcome::pass_through();
        }

        let raw_model = request.target_model().unwrap_or_default().to_string();
        let (model, suffix) = split_model_suffix(&raw_model, request.model_suffixes());
        let parsed = QualifiedModel::parse(model);

        let bound = key
            .id
            .as_deref()
            .and_then(|id| snapshot.find_by_virtual_key_id(id));

        let (profile, base_model) = match (bound, parsed) {
            (Some(profile), Some(parsed)) => (profile, parsed.model),
            (Some(profile), None) => (profile, model.to_string()),
            (None, Some(parsed)) => match snapshot.find_by_alias(&parsed.provider) {
                Some(profile) => (profile, parsed.model),
                None => return ResolveOutcome::pass_through(),
            },
            (None, None) => return ResolveOutcome::pass_through(),
        };

        let capabilities = request.capabilities();
        let request_type = request.request_type().map(str::to_string);
        let attrs = RequestAttributes {
            base_model: &base_model,
            request_type: request_type.as_deref(),
            capabilities: &capabilities,
        };

        let mut resolution = self.resolver.resolve(&profile, &attrs, key);
        rank(&mut resolution.candidates, profile.effective_strategy());
        let diagnostics = RoutingDiagnostics::new(&profile, resolution.candidates, resolution.rejections);

        let matched = match &diagnostics.primary {
            Some(primary) => {
                request.set_target_model(format!("{primary}{suffix}"));
                if !diagnostics.fallbacks.is_empty() {
                    request.set_fallbacks(diagnostics.fallbacks.clone());
                }
                true
            }
            None => false,
        };
        diagnostics.attach_to(request);

        debug!(
            profile = %diagnostics.profile_name,
            primary = ?diagnostics.primary,
            candidates = diagnostics.candidate_count(),
            fallbacks = diagnostics.fallback_count(),
            rejected = diagnostics.rejections.total(),
            "Routing profile resolved"
        );

        ResolveOutcome {
            matched,
            diagnostics: Some(diagnostics),
        }
    }
}
