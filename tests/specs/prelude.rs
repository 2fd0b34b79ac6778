// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for the specs.

pub use infra_adapters::{AuditCall, BackendCall, ChatCall};
pub use infra_core::{
    ClusterStatus, LifespanMethod, NodePhase, NodeStatus, WorkflowPhase, WorkflowSnapshot,
};
pub use infra_daemon::test_support::{TestHarness, TEST_FLAVOR};
pub use infra_daemon::{ClusterError, CreateRequest, ListFilter, SweepReport};
pub use similar_asserts::assert_eq;
pub use std::time::Duration;

pub const OWNER: &str = "dev@example.com";
pub const HOUR: Duration = Duration::from_secs(3600);

pub fn create_request(name: &str) -> CreateRequest {
    CreateRequest {
        flavor_id: TEST_FLAVOR.to_string(),
        owner: OWNER.to_string(),
        parameters: [("name".to_string(), name.to_string())].into_iter().collect(),
        ..CreateRequest::default()
    }
}

/// Create a cluster and return the name of its run.
pub async fn create_cluster(harness: &TestHarness, name: &str) -> String {
    harness.service.create(create_request(name)).await.unwrap();
    harness
        .backend
        .runs()
        .into_iter()
        .rev()
        .find(|run| run.name.starts_with(&format!("{name}-")))
        .map(|run| run.name)
        .expect("create submitted a run")
}

/// Provisioning finished; the run waits on its suspend step.
pub fn provision(harness: &TestHarness, run: &str) {
    harness.backend.update(run, |snapshot| {
        snapshot.phase = WorkflowPhase::Running;
        snapshot.nodes = vec![
            NodeStatus::pod("create", NodePhase::Succeeded, ""),
            NodeStatus::suspend("wait", NodePhase::Running),
        ];
    });
}

/// Provisioning is stuck on a pod failure.
pub fn stall(harness: &TestHarness, run: &str, message: &str) {
    harness.backend.update(run, |snapshot| {
        snapshot.phase = WorkflowPhase::Running;
        snapshot.nodes = vec![NodeStatus::pod("create", NodePhase::Pending, message)];
    });
}

/// Teardown completed.
pub fn finish(harness: &TestHarness, run: &str) {
    harness.backend.update(run, |snapshot| {
        snapshot.phase = WorkflowPhase::Succeeded;
        snapshot.nodes = vec![
            NodeStatus::pod("create", NodePhase::Succeeded, ""),
            NodeStatus::suspend("wait", NodePhase::Succeeded),
            NodeStatus::pod("destroy", NodePhase::Succeeded, ""),
        ];
    });
}

pub fn stored_notification(harness: &TestHarness, run: &str) -> String {
    harness
        .backend
        .run(run)
        .and_then(|snapshot| {
            snapshot.annotation(infra_core::metadata::ANNOTATION_NOTIFICATION).map(str::to_string)
        })
        .unwrap_or_default()
}

pub fn first_line(call: &ChatCall) -> &str {
    call.message().sections.first().map(String::as_str).unwrap_or_default()
}
