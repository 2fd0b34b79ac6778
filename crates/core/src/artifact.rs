// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Where a cluster's output artifacts live and which of them users may see.

use crate::flavor::{ArtifactTag, Flavor};
use crate::workflow::OutputArtifact;
use serde::{Deserialize, Serialize};

/// File mode reported when the artifact does not carry one
pub const DEFAULT_ARTIFACT_MODE: u32 = 0o644;

/// Bucket and object key of a stored artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocation {
    pub bucket: String,
    pub key: String,
}

/// Resolve the storage location of an artifact.
///
/// The run-level repository bucket takes precedence over the bucket recorded
/// on the artifact itself (runs migrated between repositories keep stale
/// per-artifact buckets). Returns `None` when either part cannot be found.
pub fn resolve_location(
    run_bucket: Option<&str>,
    artifact: &OutputArtifact,
) -> Option<ArtifactLocation> {
    let gcs = artifact.gcs.as_ref();
    let bucket = run_bucket
        .filter(|bucket| !bucket.is_empty())
        .or_else(|| gcs.map(|gcs| gcs.bucket.as_str()).filter(|bucket| !bucket.is_empty()))?;
    let key = gcs.map(|gcs| gcs.key.as_str()).filter(|key| !key.is_empty())?;
    Some(ArtifactLocation { bucket: bucket.to_string(), key: key.to_string() })
}

/// How a flavor exposes one of its artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exposure {
    Hidden,
    Listed { description: String },
}

/// Decide whether an artifact may be listed. Artifacts the flavor does not
/// declare are listed without a description.
pub fn exposure(flavor: Option<&Flavor>, artifact_name: &str) -> Exposure {
    match flavor.and_then(|flavor| flavor.artifact(artifact_name)) {
        Some(declared) if declared.has_tag(ArtifactTag::Internal) => Exposure::Hidden,
        Some(declared) => Exposure::Listed { description: declared.description.clone() },
        None => Exposure::Listed { description: String::new() },
    }
}

/// Downloadable artifact of a cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,
    pub description: String,
    pub url: String,
    pub mode: u32,
}

#[cfg(test)]
#[path = "artifact_tests.rs"]
mod tests;
