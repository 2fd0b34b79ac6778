// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::metadata::{
    ANNOTATION_DESCRIPTION, ANNOTATION_DIRECT_MESSAGE, ANNOTATION_FLAVOR, ANNOTATION_LIFESPAN,
    ANNOTATION_NOTIFICATION, ANNOTATION_OWNER, LABEL_CLUSTER_ID,
};
use crate::workflow::{
    NodePhase, NodeStatus, WorkflowPhase, WorkflowSnapshot, WorkflowSnapshotBuilder,
};
use chrono::{DateTime, Utc};

/// Fixed start instant shared by builders and `FakeClock::new()`.
pub fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_704_067_200, 0).unwrap_or_default()
}

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for snapshot and lifecycle types.
pub mod strategies {
    use crate::notification::NotificationPhase;
    use crate::status::ClusterStatus;
    use crate::workflow::{NodePhase, NodeStatus, NodeType};
    use proptest::prelude::*;

    pub fn arb_node_phase() -> impl Strategy<Value = NodePhase> {
        prop_oneof![
            Just(NodePhase::Pending),
            Just(NodePhase::Running),
            Just(NodePhase::Succeeded),
            Just(NodePhase::Skipped),
            Just(NodePhase::Failed),
            Just(NodePhase::Error),
            Just(NodePhase::Omitted),
        ]
    }

    pub fn arb_node_type() -> impl Strategy<Value = NodeType> {
        prop_oneof![Just(NodeType::Pod), Just(NodeType::Suspend), Just(NodeType::Other)]
    }

    pub fn arb_node_message() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            Just("pod running".to_string()),
            Just("ErrImagePull".to_string()),
            Just("Pod was active on the node longer than the specified deadline".to_string()),
        ]
    }

    pub fn arb_node() -> impl Strategy<Value = NodeStatus> {
        ("[a-z]{1,8}", arb_node_type(), arb_node_phase(), arb_node_message()).prop_map(
            |(name, node_type, phase, message)| {
                NodeStatus::builder()
                    .id(name.clone())
                    .name(name.clone())
                    .display_name(name)
                    .node_type(node_type)
                    .phase(phase)
                    .message(message)
                    .build()
            },
        )
    }

    pub fn arb_cluster_status() -> impl Strategy<Value = ClusterStatus> {
        prop_oneof![
            Just(ClusterStatus::Creating),
            Just(ClusterStatus::Ready),
            Just(ClusterStatus::Destroying),
            Just(ClusterStatus::Failed),
            Just(ClusterStatus::Finished),
        ]
    }

    pub fn arb_notification_phase() -> impl Strategy<Value = NotificationPhase> {
        prop_oneof![
            Just(NotificationPhase::Skip),
            Just(NotificationPhase::Creating),
            Just(NotificationPhase::Ready),
            Just(NotificationPhase::NearingExpiry),
            Just(NotificationPhase::Failed),
            Just(NotificationPhase::Destroyed),
        ]
    }
}

// ── Snapshot factories ──────────────────────────────────────────────────

/// Run for `cluster_id` carrying the metadata a freshly created cluster has.
pub fn cluster_run(cluster_id: &str) -> WorkflowSnapshotBuilder {
    WorkflowSnapshot::builder()
        .name(format!("{cluster_id}-x7k2p"))
        .label(LABEL_CLUSTER_ID, cluster_id)
        .annotation(ANNOTATION_FLAVOR, "gke-default")
        .annotation(ANNOTATION_OWNER, "dev@example.com")
        .annotation(ANNOTATION_DESCRIPTION, "")
        .annotation(ANNOTATION_LIFESPAN, "3h0m0s")
        .annotation(ANNOTATION_NOTIFICATION, "")
        .annotation(ANNOTATION_DIRECT_MESSAGE, "no")
}

/// Running cluster whose suspend node is waiting (status READY).
pub fn ready_run(cluster_id: &str) -> WorkflowSnapshot {
    cluster_run(cluster_id)
        .phase(WorkflowPhase::Running)
        .node(NodeStatus::pod("create", NodePhase::Succeeded, ""))
        .node(NodeStatus::suspend("wait", NodePhase::Running))
        .build()
}

/// Running cluster still provisioning (status CREATING).
pub fn creating_run(cluster_id: &str) -> WorkflowSnapshot {
    cluster_run(cluster_id)
        .phase(WorkflowPhase::Running)
        .node(NodeStatus::pod("create", NodePhase::Running, ""))
        .build()
}

/// Finished cluster (status FINISHED).
pub fn finished_run(cluster_id: &str) -> WorkflowSnapshot {
    cluster_run(cluster_id)
        .phase(WorkflowPhase::Succeeded)
        .finished_at(Some(epoch() + chrono::TimeDelta::hours(3)))
        .node(NodeStatus::suspend("wait", NodePhase::Succeeded))
        .build()
}
