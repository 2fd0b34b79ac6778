// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Codec for the annotations and labels a cluster keeps on its workflow run.
//!
//! All cluster state that is not part of the backend's own status lives in
//! flat string maps on the run. Reads are lenient (missing values decode to
//! defaults); writes go through [`AnnotationPatch`], a single JSON-Patch
//! `replace` operation.

use crate::duration::{format_duration, parse_duration};
use crate::notification::NotificationPhase;
use crate::workflow::WorkflowSnapshot;
use std::collections::BTreeMap;
use std::time::Duration;

pub const ANNOTATION_FLAVOR: &str = "infra.stackrox.com/flavor";
pub const ANNOTATION_OWNER: &str = "infra.stackrox.com/owner";
pub const ANNOTATION_LIFESPAN: &str = "infra.stackrox.com/lifespan";
pub const ANNOTATION_DESCRIPTION: &str = "infra.stackrox.com/description";
pub const ANNOTATION_NOTIFICATION: &str = "infra.stackrox.com/slack";
pub const ANNOTATION_DIRECT_MESSAGE: &str = "infra.stackrox.com/slackdm";

/// Label mapping a run to the cluster it provisions
pub const LABEL_CLUSTER_ID: &str = "infra.stackrox.com/cluster-id";

/// Lifespan assumed when the annotation is missing or malformed
pub const DEFAULT_LIFESPAN: Duration = Duration::from_secs(3 * 60 * 60);

/// Cluster id of a run. Runs created before the id label existed are named
/// after their cluster.
pub fn cluster_id(snapshot: &WorkflowSnapshot) -> &str {
    snapshot
        .labels
        .get(LABEL_CLUSTER_ID)
        .map(String::as_str)
        .filter(|id| !id.is_empty())
        .unwrap_or(snapshot.name.as_str())
}

pub fn flavor(snapshot: &WorkflowSnapshot) -> &str {
    snapshot.annotation(ANNOTATION_FLAVOR).unwrap_or_default()
}

pub fn owner(snapshot: &WorkflowSnapshot) -> &str {
    snapshot.annotation(ANNOTATION_OWNER).unwrap_or_default()
}

pub fn description(snapshot: &WorkflowSnapshot) -> &str {
    snapshot.annotation(ANNOTATION_DESCRIPTION).unwrap_or_default()
}

/// Lifespan of the cluster, never negative.
pub fn lifespan(snapshot: &WorkflowSnapshot) -> Duration {
    match snapshot.annotation(ANNOTATION_LIFESPAN).map(parse_duration) {
        Some(Ok(delta)) => delta.to_std().unwrap_or(Duration::ZERO),
        _ => DEFAULT_LIFESPAN,
    }
}

pub fn notification_phase(snapshot: &WorkflowSnapshot) -> Option<NotificationPhase> {
    snapshot.annotation(ANNOTATION_NOTIFICATION).and_then(NotificationPhase::parse)
}

pub fn wants_direct_message(snapshot: &WorkflowSnapshot) -> bool {
    snapshot.annotation(ANNOTATION_DIRECT_MESSAGE) == Some("yes")
}

pub fn encode_lifespan(lifespan: Duration) -> String {
    format_duration(lifespan)
}

/// Metadata written onto a new run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunMetadata {
    pub annotations: BTreeMap<String, String>,
    pub labels: BTreeMap<String, String>,
}

/// Inputs for [`RunMetadata::for_new_cluster`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClusterMetadata<'a> {
    pub cluster_id: &'a str,
    pub flavor: &'a str,
    pub owner: &'a str,
    pub description: &'a str,
    pub lifespan: Duration,
    pub notifications_disabled: bool,
    pub direct_message: bool,
}

impl RunMetadata {
    pub fn for_new_cluster(meta: &NewClusterMetadata<'_>) -> Self {
        let mut annotations = BTreeMap::new();
        annotations.insert(ANNOTATION_FLAVOR.to_string(), meta.flavor.to_string());
        annotations.insert(ANNOTATION_OWNER.to_string(), meta.owner.to_string());
        annotations.insert(ANNOTATION_LIFESPAN.to_string(), encode_lifespan(meta.lifespan));
        annotations.insert(ANNOTATION_DESCRIPTION.to_string(), meta.description.to_string());
        // Patches are `replace` operations, so every key written later must exist
        let phase = if meta.notifications_disabled { NotificationPhase::Skip.as_str() } else { "" };
        annotations.insert(ANNOTATION_NOTIFICATION.to_string(), phase.to_string());
        let direct = if meta.direct_message { "yes" } else { "no" };
        annotations.insert(ANNOTATION_DIRECT_MESSAGE.to_string(), direct.to_string());

        let mut labels = BTreeMap::new();
        labels.insert(LABEL_CLUSTER_ID.to_string(), meta.cluster_id.to_string());

        Self { annotations, labels }
    }
}

/// Replacement of one annotation value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationPatch {
    pub key: String,
    pub value: String,
}

impl AnnotationPatch {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }

    pub fn lifespan(lifespan: Duration) -> Self {
        Self::new(ANNOTATION_LIFESPAN, encode_lifespan(lifespan))
    }

    pub fn notification(phase: NotificationPhase) -> Self {
        Self::new(ANNOTATION_NOTIFICATION, phase.as_str())
    }

    /// JSON pointer to the annotation, escaped per RFC 6901
    pub fn path(&self) -> String {
        format!("/metadata/annotations/{}", self.key.replace('~', "~0").replace('/', "~1"))
    }

    /// Render as a JSON-Patch document
    pub fn to_json_patch(&self) -> serde_json::Value {
        serde_json::json!([{ "op": "replace", "path": self.path(), "value": self.value }])
    }
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;
