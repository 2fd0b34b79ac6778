// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster lifecycle status derived from a workflow snapshot.

use crate::workflow::{NodePhase, NodeStatus, NodeType, WorkflowPhase, WorkflowSnapshot};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse lifecycle state of a cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClusterStatus {
    Creating,
    Ready,
    Destroying,
    Failed,
    Finished,
}

crate::simple_display! {
    ClusterStatus {
        Creating => "CREATING",
        Ready => "READY",
        Destroying => "DESTROYING",
        Failed => "FAILED",
        Finished => "FINISHED",
    }
}

impl ClusterStatus {
    /// Whether a new cluster may reuse the id of a run in this state.
    pub fn allows_reuse(self) -> bool {
        matches!(self, Self::Failed | Self::Finished)
    }
}

/// A snapshot that cannot be mapped onto the lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    #[error("suspend node {node} of workflow {workflow} reported phase {phase}")]
    SuspendNodeFailed { workflow: String, node: String, phase: NodePhase },
}

/// Pod failure signatures, checked in order.
const FATAL_POD_MESSAGES: [(&str, FatalCause); 3] = [
    ("ImagePullBackOff", FatalCause::ImagePullBackOff),
    ("ErrImagePull", FatalCause::ImagePullError),
    ("Pod was active on the node longer than the specified deadline", FatalCause::DeadlineExceeded),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FatalCause {
    ImagePullBackOff,
    ImagePullError,
    DeadlineExceeded,
}

fn fatal_cause(node: &NodeStatus) -> Option<FatalCause> {
    if node.node_type != NodeType::Pod {
        return None;
    }
    FATAL_POD_MESSAGES
        .iter()
        .find(|(needle, _)| node.message.contains(needle))
        .map(|(_, cause)| *cause)
}

/// Infer the lifecycle status of the cluster behind `snapshot`.
///
/// Nodes are scanned in reported order and the first decisive node wins, so a
/// pod failure ahead of a suspend node is still reported as `Failed`.
pub fn infer_status(snapshot: &WorkflowSnapshot) -> Result<ClusterStatus, StatusError> {
    match snapshot.phase {
        WorkflowPhase::Failed | WorkflowPhase::Error => return Ok(ClusterStatus::Failed),
        WorkflowPhase::Succeeded => return Ok(ClusterStatus::Finished),
        WorkflowPhase::Pending | WorkflowPhase::Unset => return Ok(ClusterStatus::Creating),
        WorkflowPhase::Running => {}
    }

    for node in &snapshot.nodes {
        match node.node_type {
            NodeType::Pod => {
                if fatal_cause(node).is_some() {
                    return Ok(ClusterStatus::Failed);
                }
            }
            NodeType::Suspend => match node.phase {
                NodePhase::Succeeded => return Ok(ClusterStatus::Destroying),
                NodePhase::Running | NodePhase::Pending => return Ok(ClusterStatus::Ready),
                NodePhase::Error | NodePhase::Failed | NodePhase::Skipped => {
                    return Err(StatusError::SuspendNodeFailed {
                        workflow: snapshot.name.clone(),
                        node: node.name.clone(),
                        phase: node.phase,
                    })
                }
                NodePhase::Omitted => {}
            },
            NodeType::Other => {}
        }
    }

    // No suspend node has been reached yet
    Ok(ClusterStatus::Creating)
}

/// Describe the first pod failure of a running or failed run, if any.
pub fn failure_details(snapshot: &WorkflowSnapshot) -> Option<String> {
    if !matches!(snapshot.phase, WorkflowPhase::Running | WorkflowPhase::Failed) {
        return None;
    }
    snapshot.nodes.iter().find_map(|node| {
        let detail = match fatal_cause(node)? {
            FatalCause::ImagePullBackOff => "has encountered an image pull back-off.",
            FatalCause::ImagePullError => "has encountered an image pull error.",
            FatalCause::DeadlineExceeded => "has timed out.",
        };
        Some(format!("Workflow node `{}` {detail}", node.name))
    })
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
