// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::{TestHarness, TEST_FLAVOR};
use infra_adapters::{AuditCall, BackendCall};
use infra_core::metadata::{
    ANNOTATION_DIRECT_MESSAGE, ANNOTATION_LIFESPAN, ANNOTATION_NOTIFICATION, ANNOTATION_OWNER,
    LABEL_CLUSTER_ID,
};
use infra_core::test_support::{creating_run, finished_run, ready_run};
use infra_core::{NodePhase, NodeStatus, WorkflowParameter, WorkflowPhase};
use yare::parameterized;

fn request(name: &str) -> CreateRequest {
    CreateRequest {
        flavor_id: TEST_FLAVOR.to_string(),
        owner: "dev@example.com".to_string(),
        description: "integration run".to_string(),
        parameters: [(NAME_PARAMETER.to_string(), name.to_string())].into_iter().collect(),
        ..CreateRequest::default()
    }
}

fn param(name: &str, value: &str) -> (String, String) {
    (name.to_string(), value.to_string())
}

#[tokio::test]
async fn create_submits_run_with_reconciled_parameters() {
    let harness = TestHarness::new();

    let id = harness.service.create(request("demo-1")).await.unwrap();

    assert_eq!(id, "demo-1");
    let created: Vec<_> = harness
        .backend
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            BackendCall::CreateRun { name, parameters } => Some((name, parameters)),
            _ => None,
        })
        .collect();
    assert_eq!(created.len(), 1);
    let (name, parameters) = &created[0];
    assert_eq!(name, "demo-1-00001");
    let values: Vec<(&str, &str)> =
        parameters.iter().map(|p| (p.name.as_str(), p.value.as_str())).collect();
    assert_eq!(values, vec![("name", "demo-1"), ("nodes", "3"), ("region", "us-central1")]);
}

#[tokio::test]
async fn create_writes_cluster_metadata() {
    let harness = TestHarness::new();
    let mut req = request("demo-1");
    req.lifespan = Duration::from_secs(2 * 3600);
    req.slack_dm = true;

    harness.service.create(req).await.unwrap();

    let run = harness.backend.run("demo-1-00001").unwrap();
    assert_eq!(run.labels.get(LABEL_CLUSTER_ID).map(String::as_str), Some("demo-1"));
    assert_eq!(run.annotation(ANNOTATION_OWNER), Some("dev@example.com"));
    assert_eq!(run.annotation(ANNOTATION_LIFESPAN), Some("2h0m0s"));
    assert_eq!(run.annotation(ANNOTATION_NOTIFICATION), Some(""));
    assert_eq!(run.annotation(ANNOTATION_DIRECT_MESSAGE), Some("yes"));
}

#[tokio::test]
async fn zero_lifespan_selects_default() {
    let harness = TestHarness::new();

    harness.service.create(request("demo-1")).await.unwrap();

    let run = harness.backend.run("demo-1-00001").unwrap();
    assert_eq!(run.annotation(ANNOTATION_LIFESPAN), Some("3h0m0s"));
}

#[tokio::test]
async fn no_slack_marks_notifications_skipped() {
    let harness = TestHarness::new();
    let mut req = request("demo-1");
    req.no_slack = true;

    harness.service.create(req).await.unwrap();

    let run = harness.backend.run("demo-1-00001").unwrap();
    assert_eq!(run.annotation(ANNOTATION_NOTIFICATION), Some("skip"));
}

#[tokio::test]
async fn flavor_alias_resolves_to_canonical_id() {
    let harness = TestHarness::new();
    let mut req = request("demo-1");
    req.flavor_id = "gke".to_string();

    harness.service.create(req).await.unwrap();

    assert_eq!(
        harness.audit.calls(),
        vec![AuditCall::Created {
            cluster_id: "demo-1".to_string(),
            workflow_name: "demo-1-00001".to_string(),
            flavor: TEST_FLAVOR.to_string(),
            actor: "dev@example.com".to_string(),
        }]
    );
}

#[tokio::test]
async fn unknown_flavor_is_rejected() {
    let harness = TestHarness::new();
    let mut req = request("demo-1");
    req.flavor_id = "openshift".to_string();

    let err = harness.service.create(req).await.unwrap_err();

    assert!(matches!(&err, ClusterError::Validation { field, .. } if field == "flavor"));
    assert_eq!(err.to_string(), "flavor \"openshift\" not found");
    assert!(harness.backend.calls().is_empty());
}

#[parameterized(
    hardcoded = { param("region", "eu-west1"), "region" },
    undefined = { param("zone", "a"), "zone" },
)]
#[test_macro(tokio::test)]
async fn parameter_contract_violations_name_the_parameter(extra: (String, String), field: &str) {
    let harness = TestHarness::new();
    let mut req = request("demo-1");
    req.parameters.insert(extra.0, extra.1);

    let err = harness.service.create(req).await.unwrap_err();

    assert!(matches!(&err, ClusterError::Validation { field: f, .. } if f == field));
}

#[tokio::test]
async fn missing_name_is_rejected() {
    let harness = TestHarness::new();
    let mut req = request("demo-1");
    req.parameters.clear();

    let err = harness.service.create(req).await.unwrap_err();

    assert!(matches!(&err, ClusterError::Validation { field, .. } if field == "name"));
}

#[parameterized(
    too_short = { "ab" },
    uppercase = { "Demo-1" },
    trailing_dash = { "demo-" },
)]
#[test_macro(tokio::test)]
async fn invalid_names_are_rejected(name: &str) {
    let harness = TestHarness::new();

    let err = harness.service.create(request(name)).await.unwrap_err();

    assert!(matches!(&err, ClusterError::Validation { field, .. } if field == "name"));
    assert!(harness.backend.calls().is_empty());
}

#[tokio::test]
async fn live_cluster_id_conflicts() {
    let harness = TestHarness::new();
    harness.backend.insert(ready_run("demo-1"));

    let err = harness.service.create(request("demo-1")).await.unwrap_err();

    assert!(matches!(err, ClusterError::Conflict(_)));
    assert_eq!(
        err.to_string(),
        "An infra cluster ID \"demo-1\" already exists in state READY."
    );
}

#[tokio::test]
async fn creating_cluster_id_conflicts() {
    let harness = TestHarness::new();
    harness.backend.insert(creating_run("demo-1"));

    let err = harness.service.create(request("demo-1")).await.unwrap_err();

    assert!(err.to_string().ends_with("in state CREATING."));
}

#[tokio::test]
async fn finished_cluster_id_may_be_reused() {
    let harness = TestHarness::new();
    harness.backend.insert(finished_run("demo-1"));

    let id = harness.service.create(request("demo-1")).await.unwrap();

    assert_eq!(id, "demo-1");
    assert!(harness.backend.run("demo-1-00001").is_some());
}

#[tokio::test]
async fn failed_cluster_id_may_be_reused() {
    let harness = TestHarness::new();
    let mut failed = ready_run("demo-1");
    failed.phase = WorkflowPhase::Failed;
    harness.backend.insert(failed);

    assert!(harness.service.create(request("demo-1")).await.is_ok());
}

#[tokio::test]
async fn existing_run_with_failed_suspend_node_is_an_invariant_violation() {
    let harness = TestHarness::new();
    let mut broken = ready_run("demo-1");
    broken.nodes[1] = NodeStatus::suspend("wait", NodePhase::Failed);
    harness.backend.insert(broken);

    let err = harness.service.create(request("demo-1")).await.unwrap_err();

    assert!(matches!(err, ClusterError::Invariant(_)));
}

#[tokio::test]
async fn backend_create_failure_is_returned() {
    let harness = TestHarness::new();
    harness.backend.fail_creates(true);

    let err = harness.service.create(request("demo-1")).await.unwrap_err();

    assert!(matches!(err, ClusterError::Backend(_)));
    assert!(harness.audit.calls().is_empty());
}

#[tokio::test]
async fn audit_failure_does_not_fail_create() {
    let harness = TestHarness::new();
    harness.audit.fail(true);

    let id = harness.service.create(request("demo-1")).await.unwrap();

    assert_eq!(id, "demo-1");
    assert_eq!(harness.audit.calls().len(), 1);
}

#[tokio::test]
async fn optional_parameter_override_is_passed_through() {
    let harness = TestHarness::new();
    let mut req = request("demo-1");
    req.parameters.insert("nodes".to_string(), "5".to_string());

    harness.service.create(req).await.unwrap();

    let run = harness.backend.run("demo-1-00001").unwrap();
    assert!(run.parameters.contains(&WorkflowParameter {
        name: "nodes".to_string(),
        value: "5".to_string(),
        description: "nodes parameter".to_string(),
    }));
}
