//! Routing integration tests
//!
//! Tests for live resolution: alias matching, filters, ranking, request
//! rewriting and the diagnostics attached to each decision.

use crate::fixtures::*;
use crate::helpers::*;
use crate::mock_backends::*;
use gateway_routing::decision::{
    CANDIDATE_COUNT_KEY, FALLBACK_COUNT_KEY, PRIMARY_KEY, PROFILE_ID_KEY, PROFILE_NAME_KEY, REJECTIONS_KEY,
};
use gateway_routing::{PathModelRequest, RejectionReason, RoutingProfile, RoutingTarget, VirtualKeyContext};
use pretty_assertions::assert_eq;
use serde_json::json;

fn anonymous() -> VirtualKeyContext {
    VirtualKeyContext::anonymous()
}

/// Lower priority value wins under ordered failover
#[test]
fn test_light_profile_ordered_failover() {
    let gateway = TestGateway::new(all_profiles());
    let mut request = chat_request("light/light");

    let outcome = gateway.router.resolve(&mut request, &anonymous());

    assert!(outcome.matched);
    assert_eq!(request.model, "anthropic/claude-3-5-haiku-latest");
    assert_eq!(fallbacks(&request), vec!["cerebras/glm-4.7-flash"]);
}

/// Every diagnostic key is written on a match
#[test]
fn test_diagnostics_attached_to_request() {
    let gateway = TestGateway::new(all_profiles());
    let mut request = chat_request("light/light");

    gateway.router.resolve(&mut request, &anonymous());

    assert_eq!(diagnostic(&request, PROFILE_ID_KEY), Some(&json!("rp-light")));
    assert_eq!(diagnostic(&request, PROFILE_NAME_KEY), Some(&json!("Light")));
    assert_eq!(
        diagnostic(&request, PRIMARY_KEY),
        Some(&json!("anthropic/claude-3-5-haiku-latest"))
    );
    assert_eq!(diagnostic(&request, CANDIDATE_COUNT_KEY), Some(&json!(2)));
    assert_eq!(diagnostic(&request, FALLBACK_COUNT_KEY), Some(&json!(1)));
    assert_eq!(diagnostic(&request, REJECTIONS_KEY), Some(&json!({})));
}

/// Unknown aliases leave the request untouched
#[test]
fn test_unknown_alias_passes_through() {
    let gateway = TestGateway::new(all_profiles());
    let mut request = chat_request("fast/light");

    let outcome = gateway.router.resolve(&mut request, &anonymous());

    assert!(!outcome.matched);
    assert!(outcome.diagnostics.is_none());
    assert_eq!(request.model, "fast/light");
    assert!(request.fallbacks.is_none());
    assert!(request.context.is_empty());
}

/// Real provider models are not profile aliases
#[test]
fn test_real_provider_model_passes_through() {
    let gateway = TestGateway::new(all_profiles());
    let mut request = chat_request("openai/gpt-4o");

    assert!(!gateway.router.resolve(&mut request, &anonymous()).matched);
    assert_eq!(request.model, "openai/gpt-4o");
}

/// Alias matching ignores case and surrounding whitespace
#[test]
fn test_alias_match_is_case_insensitive() {
    let gateway = TestGateway::new(all_profiles());
    let mut request = chat_request("LIGHT/light");

    assert!(gateway.router.resolve(&mut request, &anonymous()).matched);
    assert_eq!(request.model, "anthropic/claude-3-5-haiku-latest");
}

/// Named virtual models select only their own targets
#[test]
fn test_named_virtual_model_selects_target() {
    let gateway = TestGateway::new(all_profiles());
    let mut request = chat_request("studio/Write");

    let outcome = gateway.router.resolve(&mut request, &anonymous());

    assert!(outcome.matched);
    assert_eq!(request.model, "anthropic/claude-3-5-sonnet-latest");
    assert!(request.fallbacks.is_none());
    let diagnostics = outcome.diagnostics.expect("diagnostics");
    assert_eq!(diagnostics.rejections.count(RejectionReason::VirtualModelMismatch), 2);
}

/// Text-only requests cannot reach a vision-only target
#[test]
fn test_capability_filter() {
    let gateway = TestGateway::new(all_profiles());

    let mut text = chat_request("studio/see");
    let outcome = gateway.router.resolve(&mut text, &anonymous());
    assert!(!outcome.matched);
    assert_eq!(text.model, "studio/see");
    assert_eq!(
        diagnostic(&text, REJECTIONS_KEY),
        Some(&json!({"virtual_model_mismatch": 2, "capability_mismatch": 1}))
    );

    let mut image = vision_request("studio/see");
    assert!(gateway.router.resolve(&mut image, &anonymous()).matched);
    assert_eq!(image.model, "openai/gpt-4o");
}

/// Targets restricted to a request type reject other types
#[test]
fn test_request_type_filter() {
    let gateway = TestGateway::new(all_profiles());

    let mut embedding = embedding_request("studio/embed");
    assert!(gateway.router.resolve(&mut embedding, &anonymous()).matched);
    assert_eq!(embedding.model, "openai/text-embedding-3-small");

    let mut chat = chat_request("studio/embed");
    let outcome = gateway.router.resolve(&mut chat, &anonymous());
    assert!(!outcome.matched);
    let diagnostics = outcome.diagnostics.expect("diagnostics");
    assert_eq!(diagnostics.rejections.count(RejectionReason::RequestTypeMismatch), 1);
}

/// Unknown request type never triggers a type mismatch
#[test]
fn test_missing_request_type_is_permissive() {
    let gateway = TestGateway::new(all_profiles());
    let mut request = chat_request("studio/embed");
    request.request_type = None;

    assert!(gateway.router.resolve(&mut request, &anonymous()).matched);
    assert_eq!(request.model, "openai/text-embedding-3-small");
}

/// Weighted ranking: weight descending, then priority ascending
#[test]
fn test_weighted_strategy() {
    let gateway = TestGateway::new(all_profiles());
    let mut request = chat_request("weighted/anything");

    assert!(gateway.router.resolve(&mut request, &anonymous()).matched);
    assert_eq!(request.model, "cerebras/llama3.1-8b");
    assert_eq!(
        fallbacks(&request),
        vec!["groq/llama-3.1-8b-instant", "openai/gpt-4o-mini"]
    );
}

/// Equal keys keep declaration order
#[test]
fn test_ties_keep_declaration_order() {
    let profile = RoutingProfile::new("Ties", "ties")
        .with_target(RoutingTarget::new("groq").with_model("a"))
        .with_target(RoutingTarget::new("openai").with_model("b"))
        .with_target(RoutingTarget::new("anthropic").with_model("c"));
    let gateway = TestGateway::new(vec![profile]);
    let mut request = chat_request("ties/x");

    gateway.router.resolve(&mut request, &anonymous());

    assert_eq!(request.model, "groq/a");
    assert_eq!(fallbacks(&request), vec!["openai/b", "anthropic/c"]);
}

/// Providers missing from the gateway are dropped at request time
#[test]
fn test_unconfigured_provider_dropped() {
    let providers = vec!["anthropic".to_string(), "openai".to_string()];
    let gateway = TestGateway::with_providers(providers, vec![light_profile()], MockCatalog::new(), MockUsage::new());
    let mut request = chat_request("light/light");

    let outcome = gateway.router.resolve(&mut request, &anonymous());

    assert!(outcome.matched);
    assert_eq!(request.model, "anthropic/claude-3-5-haiku-latest");
    assert!(request.fallbacks.is_none());
    let diagnostics = outcome.diagnostics.expect("diagnostics");
    assert_eq!(diagnostics.rejections.count(RejectionReason::ProviderNotConfigured), 1);
}

/// Disabled targets are skipped before any live check
#[test]
fn test_disabled_target_dropped() {
    let profile = RoutingProfile::new("Half", "half")
        .with_target(RoutingTarget::new("openai").with_model("gpt-4o").disabled())
        .with_target(RoutingTarget::new("groq").with_model("llama"));
    let gateway = TestGateway::new(vec![profile]);
    let mut request = chat_request("half/x");

    let outcome = gateway.router.resolve(&mut request, &anonymous());

    assert_eq!(request.model, "groq/llama");
    assert_eq!(
        outcome.diagnostics.expect("diagnostics").rejections.count(RejectionReason::TargetDisabledOrProviderMissing),
        1
    );
    assert_eq!(gateway.catalog.calls(), vec![("groq".to_string(), "llama".to_string())]);
}

/// Disabled profiles are never matched
#[test]
fn test_disabled_profile_passes_through() {
    let gateway = TestGateway::new(vec![light_profile().disabled()]);
    let mut request = chat_request("light/light");

    assert!(!gateway.router.resolve(&mut request, &anonymous()).matched);
    assert_eq!(request.model, "light/light");
}

/// Catalog refinement rewrites the model or drops the target
#[test]
fn test_catalog_refinement() {
    let catalog = MockCatalog::new()
        .rewrite("anthropic", "claude-3-5-haiku-latest", "claude-3-5-haiku-20241022")
        .fail_provider("cerebras");
    let gateway = TestGateway::with_backends(all_profiles(), catalog, MockUsage::new());
    let mut request = chat_request("light/light");

    let outcome = gateway.router.resolve(&mut request, &anonymous());

    assert_eq!(request.model, "anthropic/claude-3-5-haiku-20241022");
    assert!(request.fallbacks.is_none());
    let diagnostics = outcome.diagnostics.expect("diagnostics");
    assert_eq!(diagnostics.rejections.count(RejectionReason::ModelRefineFailed), 1);
    assert_eq!(
        gateway.catalog.calls(),
        vec![
            ("cerebras".to_string(), "glm-4.7-flash".to_string()),
            ("anthropic".to_string(), "claude-3-5-haiku-latest".to_string()),
        ]
    );
}

/// Targets without a model inherit the requested one
#[test]
fn test_blank_target_model_uses_requested_model() {
    let profile = RoutingProfile::new("Any", "any").with_target(RoutingTarget::new("openai"));
    let gateway = TestGateway::new(vec![profile]);
    let mut request = chat_request("any/gpt-4.1-nano");

    gateway.router.resolve(&mut request, &anonymous());
    assert_eq!(request.model, "openai/gpt-4.1-nano");
}

/// Budget over the target threshold skips it
#[test]
fn test_budget_threshold_skips_target() {
    let usage = MockUsage::new().with_budget_used("openai", 85.0);
    let gateway = TestGateway::with_backends(all_profiles(), MockCatalog::new(), usage);
    let mut request = chat_request("guarded/x");

    let outcome = gateway.router.resolve(&mut request, &anonymous());

    assert_eq!(request.model, "anthropic/claude-3-5-haiku-latest");
    let diagnostics = outcome.diagnostics.expect("diagnostics");
    assert_eq!(diagnostics.rejections.count(RejectionReason::BudgetThresholdExceeded), 1);
}

/// Budget under the target threshold keeps it first
#[test]
fn test_budget_under_threshold_keeps_target() {
    let usage = MockUsage::new().with_budget_used("openai", 50.0);
    let gateway = TestGateway::with_backends(all_profiles(), MockCatalog::new(), usage);
    let mut request = chat_request("guarded/x");

    gateway.router.resolve(&mut request, &anonymous());

    assert_eq!(request.model, "openai/gpt-4o");
    assert_eq!(fallbacks(&request), vec!["anthropic/claude-3-5-haiku-latest"]);
}

/// Without a hint, a fully consumed limit still excludes the target
#[test]
fn test_hard_ceiling_without_hint() {
    let usage = MockUsage::new().with_budget_used("anthropic", 100.0);
    let gateway = TestGateway::with_backends(all_profiles(), MockCatalog::new(), usage);
    let mut request = chat_request("light/light");

    gateway.router.resolve(&mut request, &anonymous());

    assert_eq!(request.model, "cerebras/glm-4.7-flash");
    assert!(request.fallbacks.is_none());
}

/// Unreadable usage counters drop the target
#[test]
fn test_usage_unavailable_drops_target() {
    let usage = MockUsage::new().unavailable_for("cerebras");
    let gateway = TestGateway::with_backends(all_profiles(), MockCatalog::new(), usage);
    let mut request = chat_request("light/light");

    let outcome = gateway.router.resolve(&mut request, &anonymous());

    assert_eq!(request.model, "anthropic/claude-3-5-haiku-latest");
    assert!(request.fallbacks.is_none());
    let diagnostics = outcome.diagnostics.expect("diagnostics");
    assert_eq!(diagnostics.rejections.count(RejectionReason::UsageUnavailable), 1);
}

/// Usage lookups see the virtual key and the refined model
#[test]
fn test_usage_lookup_arguments() {
    let catalog = MockCatalog::new().rewrite("groq", "llama-3.1-70b-versatile", "llama-3.3-70b-versatile");
    let gateway = TestGateway::with_backends(all_profiles(), catalog, MockUsage::new());
    let mut request = chat_request("team-a/default");

    gateway.router.resolve(&mut request, &VirtualKeyContext::for_key("vk-team-a"));

    assert_eq!(
        gateway.usage.calls(),
        vec![(
            Some("vk-team-a".to_string()),
            "llama-3.3-70b-versatile".to_string(),
            "groq".to_string()
        )]
    );
}

/// A profile bound to the virtual key wins over the model alias
#[test]
fn test_virtual_key_binding_precedence() {
    let gateway = TestGateway::new(all_profiles());
    let mut request = chat_request("light/light");

    let outcome = gateway.router.resolve(&mut request, &VirtualKeyContext::for_key("vk-team-a"));

    assert!(outcome.matched);
    assert_eq!(request.model, "groq/llama-3.1-70b-versatile");
    assert_eq!(diagnostic(&request, PROFILE_ID_KEY), Some(&json!("rp-team-a")));
}

/// Path-surface suffixes go back on the primary only
#[test]
fn test_path_model_suffix_round_trip() {
    let gateway = TestGateway::new(all_profiles());
    let mut request = PathModelRequest::new("light/light:generateContent", chat_request("ignored"));

    assert!(gateway.router.resolve(&mut request, &anonymous()).matched);
    assert_eq!(request.path_model, "anthropic/claude-3-5-haiku-latest:generateContent");
    assert_eq!(fallbacks(&request.request), vec!["cerebras/glm-4.7-flash"]);
}

/// Same snapshot and collaborator answers give the same decision
#[test]
fn test_resolution_is_deterministic() {
    let gateway = TestGateway::new(all_profiles());

    let decisions: Vec<_> = (0..5)
        .map(|_| {
            let mut request = chat_request("weighted/x");
            let outcome = gateway.router.resolve(&mut request, &anonymous());
            (request.model, request.fallbacks, outcome)
        })
        .collect();

    assert!(decisions.windows(2).all(|pair| pair[0] == pair[1]));
}
