// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status specs
//!
//! The status callers see is derived from the run's phase and the first
//! decisive node.

use crate::prelude::*;
use similar_asserts::assert_eq;
use infra_core::test_support::cluster_run;

async fn status_of(
    nodes: Vec<NodeStatus>,
    phase: WorkflowPhase,
) -> Result<ClusterStatus, ClusterError> {
    let harness = TestHarness::new();
    let mut builder = cluster_run("demo").phase(phase);
    for node in nodes {
        builder = builder.node(node);
    }
    harness.backend.insert(builder.build());
    harness.service.info("demo").await.map(|cluster| cluster.status)
}

#[tokio::test]
async fn waiting_suspend_step_means_ready() {
    let status = status_of(
        vec![
            NodeStatus::pod("create", NodePhase::Succeeded, ""),
            NodeStatus::suspend("wait", NodePhase::Running),
        ],
        WorkflowPhase::Running,
    )
    .await;

    assert_eq!(status.unwrap(), ClusterStatus::Ready);
}

#[tokio::test]
async fn pod_failure_ahead_of_suspend_step_means_failed() {
    let status = status_of(
        vec![
            NodeStatus::pod("create", NodePhase::Pending, "ErrImagePull"),
            NodeStatus::suspend("wait", NodePhase::Succeeded),
        ],
        WorkflowPhase::Running,
    )
    .await;

    assert_eq!(status.unwrap(), ClusterStatus::Failed);
}

#[tokio::test]
async fn completed_suspend_step_means_destroying() {
    let status = status_of(
        vec![
            NodeStatus::suspend("wait", NodePhase::Succeeded),
            NodeStatus::pod("destroy", NodePhase::Running, ""),
        ],
        WorkflowPhase::Running,
    )
    .await;

    assert_eq!(status.unwrap(), ClusterStatus::Destroying);
}

#[tokio::test]
async fn omitted_suspend_step_is_passed_over() {
    let status = status_of(
        vec![
            NodeStatus::suspend("skipped-wait", NodePhase::Omitted),
            NodeStatus::suspend("wait", NodePhase::Pending),
        ],
        WorkflowPhase::Running,
    )
    .await;

    assert_eq!(status.unwrap(), ClusterStatus::Ready);
}

#[tokio::test]
async fn terminal_phases_override_nodes() {
    let waiting = vec![NodeStatus::suspend("wait", NodePhase::Running)];

    let failed = status_of(waiting.clone(), WorkflowPhase::Error).await;
    let finished = status_of(waiting, WorkflowPhase::Succeeded).await;

    assert_eq!(failed.unwrap(), ClusterStatus::Failed);
    assert_eq!(finished.unwrap(), ClusterStatus::Finished);
}

#[tokio::test]
async fn failed_suspend_step_is_an_invariant_violation() {
    let status = status_of(
        vec![NodeStatus::suspend("wait", NodePhase::Failed)],
        WorkflowPhase::Running,
    )
    .await;

    assert!(matches!(status, Err(ClusterError::Invariant(_))));
}
