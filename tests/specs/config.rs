// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration specs
//!
//! A configuration file and its workflow manifests yield a flavor catalogue
//! the service can create clusters from.

use crate::prelude::*;
use similar_asserts::assert_eq;
use infra_adapters::{
    FakeAuditSink, FakeChatClient, FakePodLogs, FakeSigner, FakeWorkflowBackend, FlavorRegistry,
    RegistryError,
};
use infra_core::test_support::epoch;
use infra_core::FakeClock;
use infra_daemon::{ClusterService, Config, ConfigError, ServiceConfig, ServiceDeps};
use std::path::Path;
use std::sync::Arc;

const WORKFLOW: &str = r#"
apiVersion: argoproj.io/v1alpha1
kind: Workflow
spec:
  entrypoint: main
  arguments:
    parameters:
      - name: name
      - name: machine
        value: e2-standard-4
"#;

const CONFIG: &str = r#"
[server]
namespace = "infra"
call_timeout = "15s"

[[flavor]]
id = "gke-small"
name = "GKE Small"
availability = "default"
aliases = ["small"]
workflow = "workflows/gke-small.yaml"

[[flavor.parameters]]
name = "name"
kind = "required"
order = 1

[[flavor.parameters]]
name = "machine"
kind = "hardcoded"
value = "e2-standard-4"
order = 2
"#;

fn write_config(dir: &Path, workflow: &str) -> Config {
    std::fs::create_dir_all(dir.join("workflows")).unwrap();
    std::fs::write(dir.join("workflows/gke-small.yaml"), workflow).unwrap();
    std::fs::write(dir.join("infra.toml"), CONFIG).unwrap();
    Config::from_path(&dir.join("infra.toml")).unwrap()
}

#[tokio::test]
async fn configured_flavor_creates_clusters() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), WORKFLOW);
    let registry = config.flavor_registry().unwrap();

    let clock = FakeClock::at(epoch());
    let backend = FakeWorkflowBackend::with_clock(clock.clone());
    let audit = FakeAuditSink::new();
    let deps = ServiceDeps {
        backend: Arc::new(backend.clone()),
        pod_logs: Arc::new(FakePodLogs::new()),
        chat: Arc::new(FakeChatClient::new()),
        signer: Arc::new(FakeSigner::new()),
        audit: Arc::new(audit.clone()),
        flavors: Arc::new(registry),
    };
    let service_config = ServiceConfig {
        call_timeout: config.server.call_timeout,
        portal_url: config.server.portal_url.clone(),
    };
    let service = ClusterService::new(deps, clock, service_config);

    let request = CreateRequest {
        flavor_id: "small".to_string(),
        owner: OWNER.to_string(),
        parameters: [("name".to_string(), "demo-1".to_string())].into_iter().collect(),
        ..CreateRequest::default()
    };
    service.create(request).await.unwrap();

    let run = backend.runs().pop().unwrap();
    assert_eq!(run.name, "demo-1-00001");
    assert_eq!(run.annotation(infra_core::metadata::ANNOTATION_FLAVOR), Some("gke-small"));
    let machine = run.parameters.iter().find(|p| p.name == "machine").unwrap();
    assert_eq!(machine.value, "e2-standard-4");

    let cluster = service.info("demo-1").await.unwrap();
    assert_eq!(cluster.flavor, "gke-small");
    assert_eq!(cluster.status, ClusterStatus::Creating);
}

#[test]
fn templates_are_loaded_relative_to_the_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), WORKFLOW);

    let registry = config.flavor_registry().unwrap();

    let entry = registry.get("gke-small").unwrap();
    assert_eq!(entry.template["kind"], serde_json::json!("Workflow"));
    assert_eq!(registry.default_flavor().map(|e| e.flavor.id), Some("gke-small".to_string()));
}

#[test]
fn workflow_must_declare_the_same_parameters() {
    let dir = tempfile::tempdir().unwrap();
    let workflow = WORKFLOW.replace("      - name: machine\n        value: e2-standard-4\n", "");
    let config = write_config(dir.path(), &workflow);

    let err = config.flavor_registry().unwrap_err();

    assert!(matches!(
        err,
        ConfigError::Registry(RegistryError::MissingWorkflowParameter { ref parameter, .. })
            if parameter == "machine"
    ));
}

#[test]
fn missing_workflow_file_is_reported_with_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), WORKFLOW);
    std::fs::remove_file(dir.path().join("workflows/gke-small.yaml")).unwrap();

    let err = config.flavor_registry().unwrap_err();

    assert!(matches!(&err, ConfigError::Read { path, .. } if path.ends_with("gke-small.yaml")));
}
