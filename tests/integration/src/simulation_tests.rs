//! Simulation integration tests
//!
//! Simulation uses declared data only, so it can disagree with live
//! resolution; these tests pin down where and how that is reported.

use crate::fixtures::*;
use crate::helpers::*;
use crate::mock_backends::*;
use gateway_routing::capabilities::{TEXT, VISION};
use gateway_routing::{simulate, Capabilities, RejectionReason, RoutingError, SimulationCaveat, VirtualKeyContext};
use pretty_assertions::assert_eq;

fn text() -> Capabilities {
    [TEXT].into_iter().collect()
}

/// Simulation agrees with live routing when collaborators are permissive
#[test]
fn test_simulation_matches_live_resolution() {
    let gateway = TestGateway::new(all_profiles());

    for model in ["light/light", "weighted/x", "studio/write", "guarded/x"] {
        let decision = simulate(&all_profiles(), model, Some("chat"), &text()).unwrap();

        let mut request = chat_request(model);
        gateway.router.resolve(&mut request, &VirtualKeyContext::anonymous());

        assert_eq!(decision.primary.as_deref(), Some(request.model.as_str()), "{model}");
        assert_eq!(decision.fallbacks, request.fallbacks.clone().unwrap_or_default(), "{model}");
    }
}

/// The decision carries the whole matched profile
#[test]
fn test_simulation_returns_matched_profile() {
    let decision = simulate(&all_profiles(), "LIGHT/light", None, &text()).unwrap();
    let matched = light_profile();

    assert_eq!(decision.profile.id, matched.id);
    assert_eq!(decision.profile.virtual_provider, matched.virtual_provider);
    assert_eq!(decision.profile.targets, matched.targets);
    assert_eq!(decision.profile, matched);
}

/// Live-only filters are reported as caveats rather than applied
#[test]
fn test_simulation_diverges_on_live_state() {
    let usage = MockUsage::new().with_budget_used("openai", 95.0);
    let gateway = TestGateway::with_backends(all_profiles(), MockCatalog::new(), usage);

    let decision = simulate(&all_profiles(), "guarded/x", None, &text()).unwrap();
    let mut request = chat_request("guarded/x");
    gateway.router.resolve(&mut request, &VirtualKeyContext::anonymous());

    assert_eq!(decision.primary.as_deref(), Some("openai/gpt-4o"));
    assert_eq!(request.model, "anthropic/claude-3-5-haiku-latest");
    assert!(decision.caveats.contains(&SimulationCaveat::UsageThresholdsSkipped));
    assert_eq!(decision.caveats.len(), 3);
}

/// Capability and virtual-model filters still apply
#[test]
fn test_simulation_applies_declared_filters() {
    let decision = simulate(&all_profiles(), "studio/see", None, &text()).unwrap();
    assert!(decision.primary.is_none());
    assert_eq!(decision.rejections.count(RejectionReason::CapabilityMismatch), 1);
    assert_eq!(decision.rejections.count(RejectionReason::VirtualModelMismatch), 2);

    let vision: Capabilities = [TEXT, VISION].into_iter().collect();
    let decision = simulate(&all_profiles(), "studio/see", None, &vision).unwrap();
    assert_eq!(decision.primary.as_deref(), Some("openai/gpt-4o"));
}

/// Malformed models and unknown aliases are errors, not pass-throughs
#[test]
fn test_simulation_errors() {
    assert!(matches!(
        simulate(&all_profiles(), "light", None, &text()),
        Err(RoutingError::InvalidQualifiedModel(_))
    ));
    let err = simulate(&all_profiles(), "fast/light", None, &text()).unwrap_err();
    assert_eq!(err.to_string(), "no routing profile found for virtual provider fast");
}

/// Decisions serialize with caveat tags for API consumers
#[test]
fn test_simulated_decision_json() {
    let decision = simulate(&all_profiles(), "light/light", None, &text()).unwrap();
    let value = serde_json::to_value(&decision).unwrap();

    assert_eq!(value["profile"]["name"], "Light");
    assert_eq!(value["profile"]["id"], "rp-light");
    assert_eq!(value["strategy"], "ordered_failover");
    assert_eq!(value["primary"], "anthropic/claude-3-5-haiku-latest");
    assert_eq!(
        value["caveats"],
        serde_json::json!([
            "provider_liveness_skipped",
            "model_catalog_skipped",
            "usage_thresholds_skipped"
        ])
    );
}
