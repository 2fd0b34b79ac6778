// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A cluster service wired to fake adapters, for tests.

#![cfg_attr(coverage_nightly, coverage(off))]

use std::sync::Arc;
use std::time::Duration;

use infra_adapters::{
    FakeAuditSink, FakeChatClient, FakePodLogs, FakeSigner, FakeWorkflowBackend, FlavorEntry,
    StaticFlavorRegistry,
};
use infra_core::test_support::{cluster_run, epoch};
use infra_core::{
    ArtifactTag, Availability, FakeClock, Flavor, FlavorArtifact, FlavorParameter, GcsLocation,
    NodePhase, NodeStatus, OutputArtifact, ParameterKind, WorkflowPhase, WorkflowSnapshot,
};
use serde_json::json;

use crate::service::{ClusterService, ServiceConfig, ServiceDeps};

/// Id of the default flavor in [`test_flavors`]
pub const TEST_FLAVOR: &str = "gke-default";

/// Timeout used by harness services
pub const TEST_CALL_TIMEOUT: Duration = Duration::from_secs(30);

fn parameter(name: &str, kind: ParameterKind, value: &str, order: i32) -> FlavorParameter {
    FlavorParameter {
        name: name.to_string(),
        description: format!("{name} parameter"),
        kind,
        value: value.to_string(),
        order,
    }
}

fn artifact(name: &str, description: &str, tags: &[ArtifactTag]) -> FlavorArtifact {
    FlavorArtifact {
        name: name.to_string(),
        description: description.to_string(),
        tags: tags.iter().copied().collect(),
    }
}

fn entry(flavor: Flavor) -> FlavorEntry {
    let arguments: Vec<_> =
        flavor.parameters.iter().map(|param| json!({ "name": param.name })).collect();
    FlavorEntry {
        template: json!({
            "apiVersion": "argoproj.io/v1alpha1",
            "kind": "Workflow",
            "spec": { "entrypoint": "start", "arguments": { "parameters": arguments } },
        }),
        flavor,
    }
}

/// Catalogue with a GKE flavor (default) and a demo flavor.
///
/// `gke-default` declares `name` (required), `nodes` (optional, `3`) and
/// `region` (hardcoded, `us-central1`), and artifacts `url` (url),
/// `kubeconfig` (listed) and `state` (internal).
pub fn test_flavors() -> StaticFlavorRegistry {
    let gke = Flavor {
        id: TEST_FLAVOR.to_string(),
        name: "GKE Default".to_string(),
        description: "Standard GKE cluster".to_string(),
        availability: Availability::Default,
        parameters: vec![
            parameter("name", ParameterKind::Required, "example1", 1),
            parameter("nodes", ParameterKind::Optional, "3", 2),
            parameter("region", ParameterKind::Hardcoded, "us-central1", 3),
        ],
        artifacts: vec![
            artifact("url", "Console URL", &[ArtifactTag::Url]),
            artifact("kubeconfig", "Kube config for connecting to this cluster", &[]),
            artifact("state", "Terraform state", &[ArtifactTag::Internal]),
        ],
        aliases: vec!["gke".to_string()],
    };
    let demo = Flavor {
        id: "qa-demo".to_string(),
        name: "QA Demo".to_string(),
        description: "Demo environment".to_string(),
        availability: Availability::Stable,
        parameters: vec![parameter("name", ParameterKind::Required, "demo1", 1)],
        artifacts: vec![artifact("connect", "Connection instructions", &[ArtifactTag::Connect])],
        aliases: Vec::new(),
    };

    match StaticFlavorRegistry::new(vec![entry(gke), entry(demo)]) {
        Ok(registry) => registry,
        Err(err) => panic!("test flavors are invalid: {err}"),
    }
}

/// Bucket the harness stores artifacts in
pub const TEST_BUCKET: &str = "infra-artifacts";

/// Output artifact stored under `key` in [`TEST_BUCKET`]
pub fn stored_output(name: &str, key: &str) -> OutputArtifact {
    OutputArtifact {
        name: name.to_string(),
        gcs: Some(GcsLocation { bucket: TEST_BUCKET.to_string(), key: key.to_string() }),
        mode: None,
    }
}

/// Ready run whose provisioning step produced `outputs`
pub fn ready_run_with_outputs(cluster_id: &str, outputs: Vec<OutputArtifact>) -> WorkflowSnapshot {
    let create = NodeStatus::builder()
        .id("create")
        .name("create")
        .display_name("create")
        .phase(NodePhase::Succeeded)
        .outputs(outputs)
        .build();
    cluster_run(cluster_id)
        .phase(WorkflowPhase::Running)
        .node(create)
        .node(NodeStatus::suspend("wait", NodePhase::Running))
        .build()
}

/// Cluster service over fakes, with handles to each fake
#[derive(Clone)]
pub struct TestHarness {
    pub service: Arc<ClusterService<FakeClock>>,
    pub clock: FakeClock,
    pub backend: FakeWorkflowBackend,
    pub pod_logs: FakePodLogs,
    pub chat: FakeChatClient,
    pub signer: FakeSigner,
    pub audit: FakeAuditSink,
}

impl TestHarness {
    /// Harness whose clock starts at [`epoch`]
    pub fn new() -> Self {
        Self::with_config(ServiceConfig {
            call_timeout: TEST_CALL_TIMEOUT,
            portal_url: "https://infra.test".to_string(),
        })
    }

    pub fn with_config(config: ServiceConfig) -> Self {
        let clock = FakeClock::at(epoch());
        let backend = FakeWorkflowBackend::with_clock(clock.clone());
        let pod_logs = FakePodLogs::new();
        let chat = FakeChatClient::new();
        let signer = FakeSigner::new();
        let audit = FakeAuditSink::new();

        let deps = ServiceDeps {
            backend: Arc::new(backend.clone()),
            pod_logs: Arc::new(pod_logs.clone()),
            chat: Arc::new(chat.clone()),
            signer: Arc::new(signer.clone()),
            audit: Arc::new(audit.clone()),
            flavors: Arc::new(test_flavors()),
        };
        let service = Arc::new(ClusterService::new(deps, clock.clone(), config));
        Self { service, clock, backend, pod_logs, chat, signer, audit }
    }

    pub fn advance(&self, duration: Duration) {
        self.clock.advance(duration);
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
