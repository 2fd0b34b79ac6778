// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{ClusterError, ClusterService};
use infra_core::artifact::DEFAULT_ARTIFACT_MODE;
use infra_core::{exposure, metadata, resolve_location, Artifact, Clock, Exposure};

impl<C: Clock> ClusterService<C> {
    /// Downloadable artifacts of a cluster, each with a short-lived signed
    /// URL. Artifacts the flavor marks internal are never listed.
    pub async fn artifacts(&self, cluster_id: &str) -> Result<Vec<Artifact>, ClusterError> {
        let snapshot = self.most_recent_run(cluster_id).await?;
        let flavor = self.deps.flavors.get(metadata::flavor(&snapshot)).map(|entry| entry.flavor);

        let mut artifacts = Vec::new();
        for output in snapshot.nodes.iter().flat_map(|node| node.outputs.iter()) {
            if output.gcs.is_none() {
                continue;
            }
            let Exposure::Listed { description } = exposure(flavor.as_ref(), &output.name) else {
                continue;
            };
            let Some(location) = resolve_location(snapshot.artifact_bucket.as_deref(), output)
            else {
                tracing::warn!(
                    cluster_id,
                    workflow = %snapshot.name,
                    artifact = %output.name,
                    "artifact has no storage location, possibly a migration issue, not fatal"
                );
                continue;
            };

            let url = self.deps.signer.generate(&location.bucket, &location.key)?;
            artifacts.push(Artifact {
                name: output.name.clone(),
                description,
                url,
                mode: output.mode.unwrap_or(DEFAULT_ARTIFACT_MODE),
            });
        }
        Ok(artifacts)
    }
}

#[cfg(test)]
#[path = "artifacts_tests.rs"]
mod tests;
