// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Point-in-time view of one workflow run as reported by the backend.
//!
//! The snapshot is the only source of truth for a cluster: every derived
//! value (status, notification phase, expiry) is recomputed from it on each
//! read. Phases and node types are closed enums; unknown phase strings are
//! rejected at decode time rather than defaulted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from decoding backend-reported values into a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("unknown {kind} phase {value:?}")]
    UnknownPhase { kind: &'static str, value: String },
    #[error("workflow {0} has no creation timestamp")]
    MissingCreationTimestamp(String),
    #[error("malformed workflow {name}: {reason}")]
    Malformed { name: String, reason: String },
}

/// Overall phase of a workflow run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowPhase {
    /// The backend has not reported a phase yet
    Unset,
    Pending,
    Running,
    Succeeded,
    Failed,
    Error,
}

impl WorkflowPhase {
    pub fn parse(value: &str) -> Result<Self, SnapshotError> {
        match value {
            "" => Ok(Self::Unset),
            "Pending" => Ok(Self::Pending),
            "Running" => Ok(Self::Running),
            "Succeeded" => Ok(Self::Succeeded),
            "Failed" => Ok(Self::Failed),
            "Error" => Ok(Self::Error),
            other => {
                Err(SnapshotError::UnknownPhase { kind: "workflow", value: other.to_string() })
            }
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Error)
    }
}

crate::simple_display! {
    WorkflowPhase {
        Unset => "",
        Pending => "Pending",
        Running => "Running",
        Succeeded => "Succeeded",
        Failed => "Failed",
        Error => "Error",
    }
}

/// Phase of a single step node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodePhase {
    Pending,
    Running,
    Succeeded,
    Skipped,
    Failed,
    Error,
    Omitted,
}

impl NodePhase {
    /// Nodes that have been scheduled but not yet reported carry no phase;
    /// they are treated as pending.
    pub fn parse(value: &str) -> Result<Self, SnapshotError> {
        match value {
            "" | "Pending" => Ok(Self::Pending),
            "Running" => Ok(Self::Running),
            "Succeeded" => Ok(Self::Succeeded),
            "Skipped" => Ok(Self::Skipped),
            "Failed" => Ok(Self::Failed),
            "Error" => Ok(Self::Error),
            "Omitted" => Ok(Self::Omitted),
            other => Err(SnapshotError::UnknownPhase { kind: "node", value: other.to_string() }),
        }
    }
}

crate::simple_display! {
    NodePhase {
        Pending => "Pending",
        Running => "Running",
        Succeeded => "Succeeded",
        Skipped => "Skipped",
        Failed => "Failed",
        Error => "Error",
        Omitted => "Omitted",
    }
}

/// Kind of step node. Only pod and suspend nodes carry lifecycle meaning;
/// structural nodes (steps, DAGs, retries) collapse into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Pod,
    Suspend,
    Other,
}

impl NodeType {
    pub fn parse(value: &str) -> Self {
        match value {
            "Pod" => Self::Pod,
            "Suspend" => Self::Suspend,
            _ => Self::Other,
        }
    }
}

/// Object-storage location recorded on an output artifact
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcsLocation {
    pub bucket: String,
    pub key: String,
}

/// Artifact produced by a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputArtifact {
    pub name: String,
    /// Absent when the artifact was not stored in object storage
    pub gcs: Option<GcsLocation>,
    pub mode: Option<u32>,
}

/// One node of the run's step graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub node_type: NodeType,
    pub phase: NodePhase,
    pub message: String,
    pub started_at: Option<DateTime<Utc>>,
    pub outputs: Vec<OutputArtifact>,
}

crate::builder! {
    pub struct NodeStatusBuilder => NodeStatus {
        into {
            id: String = "node-1",
            name: String = "node-1",
            display_name: String = "node-1",
            message: String = "",
        }
        set {
            node_type: NodeType = NodeType::Pod,
            phase: NodePhase = NodePhase::Running,
            started_at: Option<DateTime<Utc>> = None,
            outputs: Vec<OutputArtifact> = Vec::new(),
        }
    }
}

/// Parameter passed to (or read back from) a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowParameter {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Snapshot of a workflow run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSnapshot {
    pub name: String,
    pub phase: WorkflowPhase,
    /// Nodes in the order the backend reported them
    pub nodes: Vec<NodeStatus>,
    pub annotations: BTreeMap<String, String>,
    pub labels: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Bucket of the run-level artifact repository, when one is referenced
    pub artifact_bucket: Option<String>,
    pub parameters: Vec<WorkflowParameter>,
}

impl WorkflowSnapshot {
    /// When the run started, or when it was submitted if it has not started yet.
    pub fn start_time(&self) -> DateTime<Utc> {
        self.started_at.unwrap_or(self.created_at)
    }

    pub fn pod_nodes(&self) -> impl Iterator<Item = &NodeStatus> {
        self.nodes.iter().filter(|node| node.node_type == NodeType::Pod)
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }
}

crate::builder! {
    pub struct WorkflowSnapshotBuilder => WorkflowSnapshot {
        into {
            name: String = "gke-default-x7k2p",
        }
        set {
            phase: WorkflowPhase = WorkflowPhase::Running,
            nodes: Vec<NodeStatus> = Vec::new(),
            annotations: BTreeMap<String, String> = BTreeMap::new(),
            labels: BTreeMap<String, String> = BTreeMap::new(),
            created_at: DateTime<Utc> = crate::test_support::epoch(),
            started_at: Option<DateTime<Utc>> = Some(crate::test_support::epoch()),
            finished_at: Option<DateTime<Utc>> = None,
            artifact_bucket: Option<String> = None,
            parameters: Vec<WorkflowParameter> = Vec::new(),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl WorkflowSnapshotBuilder {
    pub fn annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn node(mut self, node: NodeStatus) -> Self {
        self.nodes.push(node);
        self
    }
}

#[cfg(any(test, feature = "test-support"))]
impl NodeStatus {
    pub fn pod(id: &str, phase: NodePhase, message: &str) -> Self {
        Self::builder().id(id).name(id).display_name(id).phase(phase).message(message).build()
    }

    pub fn suspend(id: &str, phase: NodePhase) -> Self {
        Self::builder()
            .id(id)
            .name(id)
            .display_name(id)
            .node_type(NodeType::Suspend)
            .phase(phase)
            .build()
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
