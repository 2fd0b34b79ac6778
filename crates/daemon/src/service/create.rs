// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{ClusterError, ClusterService};
use infra_adapters::RunRequest;
use infra_core::metadata::DEFAULT_LIFESPAN;
use infra_core::{
    infer_status, reconcile_parameters, validate_cluster_name, Clock, NewClusterMetadata,
    RunMetadata,
};
use std::collections::BTreeMap;
use std::time::Duration;

/// Parameter holding the cluster id
pub const NAME_PARAMETER: &str = "name";

/// A request for a new cluster
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateRequest {
    pub flavor_id: String,
    /// Email of the requester
    pub owner: String,
    pub description: String,
    /// Zero selects the default lifespan
    pub lifespan: Duration,
    pub parameters: BTreeMap<String, String>,
    /// Never send chat notifications for this cluster
    pub no_slack: bool,
    /// Notify the owner directly instead of the broadcast channel
    pub slack_dm: bool,
}

impl<C: Clock> ClusterService<C> {
    /// Submit a run for a new cluster and return its id.
    ///
    /// An id may be reused once its previous run has failed or finished.
    pub async fn create(&self, request: CreateRequest) -> Result<String, ClusterError> {
        tracing::info!(
            audit = true,
            phase = "cluster-create",
            actor = %request.owner,
            flavor = %request.flavor_id,
            "received a create request for flavor"
        );

        let entry = self.deps.flavors.get(&request.flavor_id).ok_or_else(|| {
            ClusterError::validation("flavor", format!("flavor {:?} not found", request.flavor_id))
        })?;

        let parameters = reconcile_parameters(&entry.flavor.parameters, &request.parameters)
            .map_err(|err| ClusterError::validation(err.parameter(), err.to_string()))?;

        let cluster_id = request.parameters.get(NAME_PARAMETER).ok_or_else(|| {
            ClusterError::validation(NAME_PARAMETER, "parameter \"name\" was not provided")
        })?;
        validate_cluster_name(cluster_id)
            .map_err(|err| ClusterError::validation(NAME_PARAMETER, err.to_string()))?;

        self.ensure_id_available(cluster_id).await?;

        let lifespan = if request.lifespan.is_zero() { DEFAULT_LIFESPAN } else { request.lifespan };
        let metadata = RunMetadata::for_new_cluster(&NewClusterMetadata {
            cluster_id,
            flavor: &entry.flavor.id,
            owner: &request.owner,
            description: &request.description,
            lifespan,
            notifications_disabled: request.no_slack,
            direct_message: request.slack_dm,
        });

        tracing::info!(
            flavor = %entry.flavor.id,
            cluster_id = %cluster_id,
            owner = %request.owner,
            "will create an infra cluster"
        );

        let run_request = RunRequest {
            generate_name: format!("{cluster_id}-"),
            metadata,
            parameters,
            template: entry.template,
        };
        let create = self.deps.backend.create_run(run_request);
        let handle = match self.bounded("create workflow", create).await {
            Ok(handle) => handle,
            Err(err) => {
                tracing::error!(
                    cluster_id = %cluster_id,
                    error = %err,
                    "creating a new cluster failed"
                );
                return Err(err);
            }
        };
        tracing::info!(
            cluster_id = %cluster_id,
            workflow = %handle.name,
            "created a workflow for a new infra cluster"
        );

        let insert = self.deps.audit.insert_cluster_creation_record(
            cluster_id,
            &handle.name,
            &entry.flavor.id,
            &request.owner,
        );
        match tokio::time::timeout(self.config.call_timeout, insert).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!(
                cluster_id = %cluster_id,
                error = %err,
                "failed to record cluster creation"
            ),
            Err(_) => {
                tracing::warn!(cluster_id = %cluster_id, "recording cluster creation timed out")
            }
        }

        Ok(cluster_id.clone())
    }

    /// Reject the id while an earlier run for it is still live.
    async fn ensure_id_available(&self, cluster_id: &str) -> Result<(), ClusterError> {
        let existing = match self.most_recent_run(cluster_id).await {
            Ok(existing) => existing,
            Err(ClusterError::NotFound(_)) => return Ok(()),
            Err(err) => return Err(err),
        };

        let status = infer_status(&existing)?;
        if status.allows_reuse() {
            tracing::info!(
                cluster_id,
                workflow = %existing.name,
                workflow_phase = %existing.phase,
                "a completed workflow exists"
            );
            return Ok(());
        }

        tracing::warn!(
            cluster_id,
            workflow = %existing.name,
            workflow_phase = %existing.phase,
            "infra cluster create failed due to an existing busy workflow"
        );
        Err(ClusterError::Conflict(format!(
            "An infra cluster ID {cluster_id:?} already exists in state {status}."
        )))
    }
}

#[cfg(test)]
#[path = "create_tests.rs"]
mod tests;
