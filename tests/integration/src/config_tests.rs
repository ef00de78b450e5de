//! Config integration tests
//!
//! Tests for loading routing config files and hot-reloading them into a
//! live registry.

use crate::fixtures::*;
use crate::helpers::*;
use gateway_config::{ConfigLoader, ConfigWatcher, RoutingGatewayConfig};
use gateway_routing::{ProfileRegistry, VirtualKeyContext};
use pretty_assertions::assert_eq;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Write via rename so a watcher never reads a half-written file
fn write_config(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let staging = dir.join(format!(".{name}.tmp"));
    let mut file = std::fs::File::create(&staging).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.sync_all().unwrap();
    std::fs::rename(&staging, &path).unwrap();
    path
}

async fn load(path: &Path) -> RoutingGatewayConfig {
    ConfigLoader::new().load_file(path).await.unwrap()
}

/// YAML and TOML describe the same config
#[tokio::test]
async fn test_yaml_and_toml_agree() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = load(&write_config(dir.path(), "routing.yaml", ROUTING_YAML)).await;
    let toml = load(&write_config(dir.path(), "routing.toml", ROUTING_TOML)).await;

    assert_eq!(yaml, toml);
    yaml.validate().unwrap();
}

/// JSON config with the persisted target encoding
#[tokio::test]
async fn test_json_config() {
    let dir = tempfile::tempdir().unwrap();
    let json = serde_json::json!({
        "providers": ["openai"],
        "routing_profiles": [{
            "name": "Json",
            "virtual_provider": "json",
            "targets": gateway_routing::decode_targets(Some(
                r#"[{"provider":"openai","model":"gpt-4o-mini","enabled":true}]"#
            )).unwrap()
        }]
    });
    let path = write_config(dir.path(), "routing.json", &json.to_string());

    let config = load(&path).await;
    assert_eq!(config.routing_profiles[0].targets[0].model, "gpt-4o-mini");
    config.validate().unwrap();
}

/// Loaded profiles drive live routing
#[tokio::test]
async fn test_loaded_profiles_route_requests() {
    let dir = tempfile::tempdir().unwrap();
    let config = load(&write_config(dir.path(), "routing.yaml", ROUTING_YAML)).await;

    let gateway = TestGateway::new(config.effective_profiles());
    let mut request = chat_request("light/light");
    gateway.router.resolve(&mut request, &VirtualKeyContext::anonymous());

    assert_eq!(request.model, "anthropic/claude-3-5-haiku-latest");
    assert_eq!(fallbacks(&request), vec!["cerebras/glm-4.7-flash"]);
}

/// Governance profiles apply only when the routing section is empty
#[tokio::test]
async fn test_governance_profiles_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = r#"
governance:
  routing_profiles:
    - name: Gov
      virtual_provider: gov
      targets:
        - provider: openai
          model: gpt-4o
"#;
    let config = load(&write_config(dir.path(), "routing.yml", yaml)).await;

    let profiles = config.effective_profiles();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].name, "Gov");
}

/// Editing the watched file republishes profiles; a broken edit is ignored
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_watcher_hot_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "routing.yaml", ROUTING_YAML);

    let registry = Arc::new(ProfileRegistry::new(Arc::new(real_providers())));
    let watcher = ConfigWatcher::new(Arc::clone(&registry), &path);
    watcher.reload().await.unwrap();
    let handle = watcher.watch().unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    write_config(dir.path(), "routing.yaml", &ROUTING_YAML.replace("priority: 1", "priority: 3"));
    let reloaded = wait_for(|| {
        registry
            .find_by_alias("light")
            .is_some_and(|light| light.targets[1].priority == 3)
    })
    .await;
    assert!(reloaded, "config change was not picked up");
    tokio::time::sleep(Duration::from_millis(300)).await;

    let version = registry.snapshot().version();
    write_config(dir.path(), "routing.yaml", "routing_profiles: [{name: Broken, virtual_provider: broken}]");
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(registry.snapshot().version(), version);
    assert!(registry.find_by_alias("light").is_some());

    handle.stop();
}

async fn wait_for<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}
