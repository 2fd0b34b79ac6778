// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON shape of an Argo `Workflow` object.
//!
//! Only the fields the lifecycle logic reads are modelled. Node maps are
//! decoded into an [`IndexMap`], and `serde_json` is built with
//! `preserve_order`, so node order in the snapshot is the key order of the
//! object the API server returned.

use super::RunRequest;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use infra_core::{
    AnnotationPatch, GcsLocation, NodePhase, NodeStatus, NodeType, OutputArtifact, SnapshotError,
    WorkflowParameter, WorkflowPhase, WorkflowSnapshot,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

pub const API_GROUP: &str = "argoproj.io";
pub const API_VERSION: &str = "v1alpha1";
pub const KIND: &str = "Workflow";

#[derive(Debug, Deserialize)]
struct WireWorkflow {
    metadata: WireMetadata,
    #[serde(default)]
    spec: WireSpec,
    #[serde(default)]
    status: WireStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMetadata {
    name: String,
    #[serde(default)]
    annotations: BTreeMap<String, String>,
    #[serde(default)]
    labels: BTreeMap<String, String>,
    creation_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
struct WireSpec {
    #[serde(default)]
    arguments: WireArguments,
}

#[derive(Debug, Default, Deserialize)]
struct WireArguments {
    #[serde(default)]
    parameters: Vec<WireParameter>,
}

#[derive(Debug, Deserialize)]
struct WireParameter {
    name: String,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireStatus {
    #[serde(default)]
    phase: String,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    nodes: IndexMap<String, WireNode>,
    artifact_repository_ref: Option<WireRepositoryRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRepositoryRef {
    artifact_repository: Option<WireRepository>,
}

#[derive(Debug, Deserialize)]
struct WireRepository {
    gcs: Option<WireGcs>,
}

#[derive(Debug, Default, Deserialize)]
struct WireGcs {
    #[serde(default)]
    bucket: String,
    #[serde(default)]
    key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireNode {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    display_name: String,
    #[serde(default, rename = "type")]
    node_type: String,
    #[serde(default)]
    phase: String,
    #[serde(default)]
    message: String,
    started_at: Option<DateTime<Utc>>,
    outputs: Option<WireOutputs>,
}

#[derive(Debug, Default, Deserialize)]
struct WireOutputs {
    #[serde(default)]
    artifacts: Vec<WireArtifact>,
}

#[derive(Debug, Deserialize)]
struct WireArtifact {
    name: String,
    gcs: Option<WireGcs>,
    mode: Option<u32>,
}

/// Decode a workflow object into a snapshot.
pub fn decode(value: Value) -> Result<WorkflowSnapshot, SnapshotError> {
    let name =
        value.pointer("/metadata/name").and_then(Value::as_str).unwrap_or_default().to_string();
    let wire: WireWorkflow = serde_json::from_value(value)
        .map_err(|e| SnapshotError::Malformed { name: name.clone(), reason: e.to_string() })?;

    let created_at = wire
        .metadata
        .creation_timestamp
        .ok_or_else(|| SnapshotError::MissingCreationTimestamp(name.clone()))?;

    let nodes = wire
        .status
        .nodes
        .into_iter()
        .map(|(key, node)| decode_node(key, node))
        .collect::<Result<Vec<_>, _>>()?;

    let artifact_bucket = wire
        .status
        .artifact_repository_ref
        .and_then(|reference| reference.artifact_repository)
        .and_then(|repository| repository.gcs)
        .map(|gcs| gcs.bucket)
        .filter(|bucket| !bucket.is_empty());

    let parameters = wire
        .spec
        .arguments
        .parameters
        .into_iter()
        .map(|param| WorkflowParameter {
            name: param.name,
            value: param.value.unwrap_or_default(),
            description: param.description.unwrap_or_default(),
        })
        .collect();

    Ok(WorkflowSnapshot {
        name: wire.metadata.name,
        phase: WorkflowPhase::parse(&wire.status.phase)?,
        nodes,
        annotations: wire.metadata.annotations,
        labels: wire.metadata.labels,
        created_at,
        started_at: wire.status.started_at,
        finished_at: wire.status.finished_at,
        artifact_bucket,
        parameters,
    })
}

fn decode_node(key: String, node: WireNode) -> Result<NodeStatus, SnapshotError> {
    let outputs = node
        .outputs
        .unwrap_or_default()
        .artifacts
        .into_iter()
        .map(|artifact| OutputArtifact {
            name: artifact.name,
            gcs: artifact.gcs.map(|gcs| GcsLocation { bucket: gcs.bucket, key: gcs.key }),
            mode: artifact.mode,
        })
        .collect();

    Ok(NodeStatus {
        id: if node.id.is_empty() { key } else { node.id },
        name: node.name,
        display_name: node.display_name,
        node_type: NodeType::parse(&node.node_type),
        phase: NodePhase::parse(&node.phase)?,
        message: node.message,
        started_at: node.started_at,
        outputs,
    })
}

/// Build the workflow object submitted for `request`.
///
/// The flavor template may be a whole `Workflow` manifest or just its spec.
/// Its metadata is discarded and its arguments are replaced.
pub fn encode_run(request: &RunRequest) -> Result<Value, SnapshotError> {
    let mut spec = match request.template.get("spec") {
        Some(spec) => spec.clone(),
        None => request.template.clone(),
    };
    let Some(fields) = spec.as_object_mut() else {
        return Err(SnapshotError::Malformed {
            name: request.generate_name.clone(),
            reason: "workflow template is not an object".to_string(),
        });
    };

    let parameters: Vec<Value> = request
        .parameters
        .iter()
        .map(|param| json!({ "name": param.name, "value": param.value }))
        .collect();
    fields.insert("arguments".to_string(), json!({ "parameters": parameters }));

    Ok(json!({
        "apiVersion": format!("{API_GROUP}/{API_VERSION}"),
        "kind": KIND,
        "metadata": {
            "generateName": request.generate_name,
            "annotations": request.metadata.annotations,
            "labels": request.metadata.labels,
        },
        "spec": spec,
    }))
}

/// Merge patch that resumes a suspended run: every running suspend node
/// completes and the run-level suspension is lifted.
pub fn resume_patch(snapshot: &WorkflowSnapshot, now: DateTime<Utc>) -> Value {
    let nodes: serde_json::Map<String, Value> = snapshot
        .nodes
        .iter()
        .filter(|node| {
            node.node_type == NodeType::Suspend
                && matches!(node.phase, NodePhase::Running | NodePhase::Pending)
        })
        .map(|node| {
            (
                node.id.clone(),
                json!({
                    "phase": NodePhase::Succeeded.to_string(),
                    "finishedAt": now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
                }),
            )
        })
        .collect();

    json!({
        "spec": { "suspend": null },
        "status": { "nodes": nodes },
    })
}

/// JSON-Patch replacing one annotation. Applying it to a run that lacks the
/// key fails rather than adding it.
pub fn annotation_patch(patch: &AnnotationPatch) -> Result<json_patch::Patch, serde_json::Error> {
    serde_json::from_value(patch.to_json_patch())
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
