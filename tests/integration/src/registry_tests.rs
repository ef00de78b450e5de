//! Profile registry integration tests
//!
//! Tests for atomic replacement: rejected sets never become visible and
//! concurrent resolutions always see one whole snapshot.

use crate::fixtures::*;
use crate::helpers::*;
use gateway_routing::{RoutingProfile, RoutingTarget, ValidationRule, VirtualKeyContext};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn light_v2() -> RoutingProfile {
    RoutingProfile::new("Light", "light")
        .with_id("rp-light")
        .with_target(RoutingTarget::new("groq").with_model("llama-3.1-8b-instant").with_priority(1))
        .with_target(RoutingTarget::new("openai").with_model("gpt-4o-mini").with_priority(2))
}

/// Versions increase with each accepted set
#[test]
fn test_replace_bumps_version() {
    let gateway = TestGateway::new(vec![light_profile()]);
    assert_eq!(gateway.registry.snapshot().version(), 1);

    let version = gateway.registry.replace(vec![light_v2()]).unwrap();
    assert_eq!(version, 2);
    assert_eq!(gateway.registry.snapshot().version(), 2);
}

/// A rejected set leaves the previous one serving requests
#[test]
fn test_rejected_replace_keeps_active_set() {
    let gateway = TestGateway::new(all_profiles());

    let invalid = vec![
        light_v2(),
        RoutingProfile::new("Clash", "openai").with_target(RoutingTarget::new("groq")),
    ];
    let err = gateway.registry.replace(invalid).unwrap_err();
    assert_eq!(err.rule(), Some(ValidationRule::AliasConflictsWithProvider));

    let snapshot = gateway.registry.snapshot();
    assert_eq!(snapshot.version(), 1);
    assert_eq!(snapshot.len(), all_profiles().len());

    let mut request = chat_request("light/light");
    gateway.router.resolve(&mut request, &VirtualKeyContext::anonymous());
    assert_eq!(request.model, "anthropic/claude-3-5-haiku-latest");
}

/// Every rule surfaces as its own violation
#[test]
fn test_validation_rules_reported() {
    let gateway = TestGateway::new(Vec::new());
    let cases = vec![
        (
            vec![RoutingProfile::new(" ", "x").with_target(RoutingTarget::new("openai"))],
            ValidationRule::NameRequired,
        ),
        (vec![light_profile(), light_v2()], ValidationRule::DuplicateName),
        (
            vec![RoutingProfile::new("A", "*").with_target(RoutingTarget::new("openai"))],
            ValidationRule::ReservedAlias,
        ),
        (
            vec![
                RoutingProfile::new("A", "same").with_target(RoutingTarget::new("openai")),
                RoutingProfile::new("B", "SAME").with_target(RoutingTarget::new("openai")),
            ],
            ValidationRule::DuplicateAlias,
        ),
        (vec![RoutingProfile::new("A", "a")], ValidationRule::NoTargets),
        (
            vec![RoutingProfile::new("A", "a").with_target(RoutingTarget::new("  "))],
            ValidationRule::TargetProviderMissing,
        ),
        (
            vec![RoutingProfile::new("A", "a").with_target(RoutingTarget::new("openai").with_virtual_model("fast"))],
            ValidationRule::ModelRequired,
        ),
        (
            vec![RoutingProfile::new("A", "a")
                .with_target(RoutingTarget::new("openai").with_virtual_model("*"))
                .with_target(RoutingTarget::new("groq").with_virtual_model("fast").with_model("m"))],
            ValidationRule::WildcardMix,
        ),
    ];

    for (profiles, rule) in cases {
        let err = gateway.registry.replace(profiles).unwrap_err();
        assert_eq!(err.rule(), Some(rule));
    }
    assert_eq!(gateway.registry.snapshot().version(), 1);
}

/// A snapshot taken before a swap does not change underneath its holder
#[test]
fn test_held_snapshot_is_immutable() {
    let gateway = TestGateway::new(vec![light_profile()]);
    let before = gateway.registry.snapshot();

    gateway.registry.replace(vec![light_v2()]).unwrap();

    let held = before.find_by_alias("light").unwrap();
    assert_eq!(held.targets[0].provider, "cerebras");
    let current = gateway.registry.find_by_alias("light").unwrap();
    assert_eq!(current.targets[0].provider, "groq");
}

/// Readers racing a writer only ever observe one of the published sets
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_resolution_during_replace() {
    let gateway = Arc::new(TestGateway::new(vec![light_profile()]));

    let expected_a = (
        "anthropic/claude-3-5-haiku-latest".to_string(),
        Some(vec!["cerebras/glm-4.7-flash".to_string()]),
    );
    let expected_b = (
        "groq/llama-3.1-8b-instant".to_string(),
        Some(vec!["openai/gpt-4o-mini".to_string()]),
    );

    let mut readers = Vec::new();
    for _ in 0..4 {
        let gateway = Arc::clone(&gateway);
        let (a, b) = (expected_a.clone(), expected_b.clone());
        readers.push(tokio::spawn(async move {
            for _ in 0..200 {
                let mut request = chat_request("light/light");
                let outcome = gateway.router.resolve(&mut request, &VirtualKeyContext::anonymous());
                assert!(outcome.matched);
                let seen = (request.model, request.fallbacks);
                assert!(seen == a || seen == b, "mixed snapshot: {seen:?}");
                tokio::task::yield_now().await;
            }
        }));
    }

    let writer = {
        let gateway = Arc::clone(&gateway);
        tokio::spawn(async move {
            for i in 0..50 {
                let set = if i % 2 == 0 { light_v2() } else { light_profile() };
                gateway.registry.replace(vec![set]).unwrap();
                tokio::task::yield_now().await;
            }
        })
    };

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }
    assert_eq!(gateway.registry.snapshot().version(), 51);
}
