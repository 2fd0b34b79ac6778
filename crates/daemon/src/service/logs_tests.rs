// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::TestHarness;
use infra_core::test_support::{cluster_run, epoch};
use infra_core::{NodePhase, NodeStatus, NodeType, WorkflowPhase};

fn step(id: &str, display: &str, started_mins: i64) -> NodeStatus {
    NodeStatus::builder()
        .id(id)
        .name(format!("demo.{display}"))
        .display_name(display)
        .phase(NodePhase::Succeeded)
        .message(format!("{display} done"))
        .started_at(Some(epoch() + chrono::TimeDelta::minutes(started_mins)))
        .build()
}

fn run_with_steps(steps: Vec<NodeStatus>) -> WorkflowSnapshot {
    let mut builder = cluster_run("demo").phase(WorkflowPhase::Running);
    for node in steps {
        builder = builder.node(node);
    }
    builder.node(NodeStatus::suspend("wait", NodePhase::Running)).build()
}

#[tokio::test]
async fn logs_are_sorted_by_step_start() {
    let harness = TestHarness::new();
    harness.backend.insert(run_with_steps(vec![
        step("demo-3", "destroy", 30),
        step("demo-1", "create", 0),
        step("demo-2", "configure", 10),
    ]));
    harness.pod_logs.set_log("demo-1", "creating");
    harness.pod_logs.set_log("demo-2", "configuring");
    harness.pod_logs.set_log("demo-3", "destroying");

    let logs = harness.service.logs("demo").await.unwrap();

    let names: Vec<&str> = logs.iter().map(|log| log.name.as_str()).collect();
    assert_eq!(names, vec!["create", "configure", "destroy"]);
    assert_eq!(logs[0].body, b"creating".to_vec());
    assert_eq!(logs[0].message, "create done");
    assert_eq!(logs[0].started, Some(epoch()));
}

#[tokio::test(start_paused = true)]
async fn start_order_holds_when_fetches_finish_in_reverse() {
    let harness = TestHarness::new();
    harness.backend.insert(run_with_steps(vec![
        step("demo-1", "first", 0),
        step("demo-2", "second", 10),
        step("demo-3", "third", 20),
        step("demo-4", "fourth", 30),
    ]));
    harness.pod_logs.set_log("demo-1", "one");
    harness.pod_logs.set_failure("demo-2", "container not started");
    harness.pod_logs.set_log("demo-3", "three");
    harness.pod_logs.set_log("demo-4", "four");
    harness.pod_logs.set_delay("demo-1", Duration::from_secs(4));
    harness.pod_logs.set_delay("demo-2", Duration::from_secs(3));
    harness.pod_logs.set_delay("demo-3", Duration::from_secs(2));

    let logs = harness.service.logs("demo").await.unwrap();

    assert_eq!(harness.pod_logs.fetched(), vec!["demo-4", "demo-3", "demo-2", "demo-1"]);
    let names: Vec<&str> = logs.iter().map(|log| log.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second", "third", "fourth"]);
    let bodies: Vec<String> =
        logs.iter().map(|log| String::from_utf8_lossy(&log.body).into_owned()).collect();
    assert_eq!(
        bodies,
        vec!["one", "backend request failed: container not started", "three", "four"]
    );
}

#[tokio::test]
async fn only_pod_steps_are_fetched() {
    let harness = TestHarness::new();
    let mut group = step("demo-0", "group", 0);
    group.node_type = NodeType::Other;
    harness.backend.insert(run_with_steps(vec![group, step("demo-1", "create", 1)]));
    harness.pod_logs.set_log("demo-1", "creating");

    let logs = harness.service.logs("demo").await.unwrap();

    assert_eq!(logs.len(), 1);
    assert_eq!(harness.pod_logs.fetched(), vec!["demo-1".to_string()]);
}

#[tokio::test]
async fn fetch_errors_become_the_body() {
    let harness = TestHarness::new();
    let steps = vec![step("demo-1", "create", 0), step("demo-2", "gone", 1)];
    harness.backend.insert(run_with_steps(steps));
    harness.pod_logs.set_failure("demo-1", "container not started");

    let logs = harness.service.logs("demo").await.unwrap();

    assert_eq!(
        String::from_utf8_lossy(&logs[0].body),
        "backend request failed: container not started"
    );
    assert_eq!(String::from_utf8_lossy(&logs[1].body), "workflow not found: demo-2");
}

#[tokio::test(start_paused = true)]
async fn slow_steps_time_out_individually() {
    let harness = TestHarness::new();
    let snapshot = run_with_steps(vec![step("demo-1", "create", 0), step("demo-2", "slow", 1)]);
    harness.pod_logs.set_log("demo-1", "creating");
    harness.pod_logs.set_log("demo-2", "never seen");
    harness.pod_logs.set_delay("demo-2", Duration::from_secs(120));

    let pod_logs: Arc<dyn PodLogs> = Arc::new(harness.pod_logs.clone());
    let logs = aggregate_logs(pod_logs, &snapshot, Duration::from_secs(5)).await;

    assert_eq!(logs[0].body, b"creating".to_vec());
    assert_eq!(String::from_utf8_lossy(&logs[1].body), "log fetch timed out after 5s");
}

#[tokio::test]
async fn run_without_pod_steps_has_no_logs() {
    let harness = TestHarness::new();
    harness.backend.insert(run_with_steps(Vec::new()));

    let logs = harness.service.logs("demo").await.unwrap();

    assert!(logs.is_empty());
}

#[tokio::test]
async fn unknown_cluster_is_not_found() {
    let harness = TestHarness::new();

    let err = harness.service.logs("nope").await.unwrap_err();

    assert!(matches!(err, ClusterError::NotFound(_)));
}
