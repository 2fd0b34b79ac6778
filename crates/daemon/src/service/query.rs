// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{ClusterError, ClusterService};
use chrono::{DateTime, Utc};
use infra_core::{infer_status, lifespan, metadata, Clock, Cluster, ClusterStatus, WorkflowSnapshot};

/// Which clusters [`ClusterService::list`] returns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Include clusters owned by others
    pub all: bool,
    /// Include clusters past their lifespan
    pub expired: bool,
    /// Only ids starting with this prefix, when non-empty
    pub prefix: String,
    /// Only these flavors, when non-empty
    pub allowed_flavors: Vec<String>,
    /// Only these statuses, when non-empty
    pub allowed_statuses: Vec<ClusterStatus>,
    /// Email of the caller
    pub requester: String,
}

impl ListFilter {
    fn admits(&self, snapshot: &WorkflowSnapshot, now: DateTime<Utc>) -> bool {
        if !self.expired
            && lifespan::is_expired(snapshot.start_time(), metadata::lifespan(snapshot), now)
        {
            return false;
        }
        if !self.all && metadata::owner(snapshot) != self.requester {
            return false;
        }
        if !self.prefix.is_empty() && !metadata::cluster_id(snapshot).starts_with(&self.prefix) {
            return false;
        }
        if !self.allowed_flavors.is_empty()
            && !self.allowed_flavors.iter().any(|flavor| flavor == metadata::flavor(snapshot))
        {
            return false;
        }
        if !self.allowed_statuses.is_empty() {
            // Runs whose status cannot be inferred are reported by `list`
            if let Ok(status) = infer_status(snapshot) {
                if !self.allowed_statuses.contains(&status) {
                    return false;
                }
            }
        }
        true
    }
}

impl<C: Clock> ClusterService<C> {
    /// The cluster behind the most recent run for `cluster_id`.
    pub async fn info(&self, cluster_id: &str) -> Result<Cluster, ClusterError> {
        let snapshot = self.most_recent_run(cluster_id).await?;
        self.describe(&snapshot).await
    }

    /// Clusters matching `filter`. Runs that cannot be converted are logged
    /// and left out.
    pub async fn list(&self, filter: &ListFilter) -> Result<Vec<Cluster>, ClusterError> {
        let runs = self.list_runs().await?;
        let now = self.clock.now();

        let mut clusters = Vec::with_capacity(runs.len());
        for snapshot in runs.iter().filter(|snapshot| filter.admits(snapshot, now)) {
            match self.describe(snapshot).await {
                Ok(cluster) => clusters.push(cluster),
                Err(err) => tracing::error!(
                    workflow = %snapshot.name,
                    error = %err,
                    "failed to convert workflow to infra cluster"
                ),
            }
        }
        Ok(clusters)
    }
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
