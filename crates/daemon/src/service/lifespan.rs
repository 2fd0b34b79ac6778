// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{ClusterError, ClusterService};
use infra_core::{
    compute_lifespan, format_duration, lifespan, metadata, AnnotationPatch, Clock,
    LifespanMethod, WorkflowSnapshot,
};
use std::time::Duration;

impl<C: Clock> ClusterService<C> {
    /// Edit a cluster's lifespan and return the time it has left.
    pub async fn lifespan(
        &self,
        cluster_id: &str,
        method: LifespanMethod,
        requested: Duration,
        actor: &str,
    ) -> Result<Duration, ClusterError> {
        tracing::info!(
            audit = true,
            phase = "cluster-lifespan",
            actor,
            cluster_id,
            method = %method,
            lifespan = %format_duration(requested),
            "received a lifespan update request for infra cluster"
        );

        let snapshot = self.most_recent_run(cluster_id).await?;
        self.apply_lifespan(&snapshot, method, requested).await
    }

    /// Expire a cluster now and start its teardown.
    pub async fn delete(&self, cluster_id: &str, actor: &str) -> Result<(), ClusterError> {
        tracing::info!(
            audit = true,
            phase = "cluster-delete",
            actor,
            cluster_id,
            "received a delete request for infra cluster"
        );

        let snapshot = self.most_recent_run(cluster_id).await?;

        // Zero lifespan also lets the expiration sweep pick it up if the
        // resume below does not take
        let expire = self.apply_lifespan(&snapshot, LifespanMethod::Replace, Duration::ZERO);
        if let Err(err) = expire.await {
            tracing::error!(
                workflow = %snapshot.name,
                error = %err,
                "failed to set lifespan to 0 for workflow"
            );
            return Err(err);
        }

        self.resume_for_deletion(&snapshot).await;
        Ok(())
    }

    async fn apply_lifespan(
        &self,
        snapshot: &WorkflowSnapshot,
        method: LifespanMethod,
        requested: Duration,
    ) -> Result<Duration, ClusterError> {
        let updated = compute_lifespan(method, requested, metadata::lifespan(snapshot));
        tracing::info!(
            workflow = %snapshot.name,
            method = %method,
            lifespan = %format_duration(updated),
            "will apply a lifespan update to workflow"
        );

        let patch = AnnotationPatch::lifespan(updated);
        if let Err(err) = self
            .bounded("patch workflow", self.deps.backend.patch_annotation(&snapshot.name, &patch))
            .await
        {
            tracing::error!(
                workflow = %snapshot.name,
                error = %err,
                "error occurred updating the workflow"
            );
            return Err(err);
        }

        Ok(lifespan::remaining(snapshot.created_at, updated, self.clock.now()))
    }
}

#[cfg(test)]
#[path = "lifespan_tests.rs"]
mod tests;
