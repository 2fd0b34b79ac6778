// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster service: the operations callers invoke on clusters.
//!
//! Every operation reads the cluster's most recent workflow run, derives the
//! cluster from it and, where needed, mutates the run through the backend.
//! Nothing is cached between calls.

mod artifacts;
mod create;
mod lifespan;
mod logs;
mod query;

pub use create::CreateRequest;
pub use logs::{aggregate_logs, StepLog};
pub use query::ListFilter;

use infra_adapters::{
    AuditSink, BackendError, ChatClient, ChatError, FlavorRegistry, PodLogs, SignerError,
    UrlSigner, WorkflowBackend,
};
use infra_core::{
    format_duration, metadata, resolve_location, ArtifactTag, Clock, Cluster, SnapshotError,
    StatusError, WorkflowSnapshot,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors returned to callers of the cluster service
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("cluster {0:?} not found")]
    NotFound(String),

    /// Bad input; `field` names what was wrong
    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("{0}")]
    Conflict(String),

    /// The backend reported a state the lifecycle cannot account for
    #[error("invariant violation: {0}")]
    Invariant(String),

    #[error(transparent)]
    Backend(BackendError),

    #[error(transparent)]
    Storage(#[from] SignerError),

    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error("{operation} timed out after {}", format_duration(*after))]
    Timeout { operation: &'static str, after: Duration },
}

impl ClusterError {
    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }
}

impl From<BackendError> for ClusterError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound(id) => Self::NotFound(id),
            BackendError::Decode(err) => err.into(),
            other => Self::Backend(other),
        }
    }
}

impl From<StatusError> for ClusterError {
    fn from(err: StatusError) -> Self {
        Self::Invariant(err.to_string())
    }
}

impl From<SnapshotError> for ClusterError {
    fn from(err: SnapshotError) -> Self {
        Self::Invariant(err.to_string())
    }
}

/// External collaborators of the service
#[derive(Clone)]
pub struct ServiceDeps {
    pub backend: Arc<dyn WorkflowBackend>,
    pub pod_logs: Arc<dyn PodLogs>,
    pub chat: Arc<dyn ChatClient>,
    pub signer: Arc<dyn UrlSigner>,
    pub audit: Arc<dyn AuditSink>,
    pub flavors: Arc<dyn FlavorRegistry>,
}

/// Service tuning
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Upper bound on every outbound call
    pub call_timeout: Duration,
    /// Base URL linked from chat messages
    pub portal_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(30),
            portal_url: infra_core::template::DEFAULT_PORTAL_URL.to_string(),
        }
    }
}

/// Lifecycle operations over clusters
pub struct ClusterService<C: Clock> {
    pub(crate) deps: ServiceDeps,
    pub(crate) clock: C,
    pub(crate) config: ServiceConfig,
    shutdown: CancellationToken,
}

impl<C: Clock> ClusterService<C> {
    pub fn new(deps: ServiceDeps, clock: C, config: ServiceConfig) -> Self {
        Self { deps, clock, config, shutdown: CancellationToken::new() }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Token cancelled by [`ClusterService::shutdown`]; background sweeps
    /// stop when it fires.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    /// Stop the background sweeps.
    pub fn shutdown(&self) {
        tracing::info!("stopping cluster service");
        self.shutdown.cancel();
    }

    /// Run an outbound call under the configured timeout.
    pub(crate) async fn bounded<T, E>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, E>>,
    ) -> Result<T, ClusterError>
    where
        ClusterError: From<E>,
    {
        match tokio::time::timeout(self.config.call_timeout, call).await {
            Ok(result) => result.map_err(ClusterError::from),
            Err(_) => Err(ClusterError::Timeout { operation, after: self.config.call_timeout }),
        }
    }

    pub(crate) async fn most_recent_run(
        &self,
        cluster_id: &str,
    ) -> Result<WorkflowSnapshot, ClusterError> {
        self.bounded("get workflow", self.deps.backend.most_recent_run_for_cluster(cluster_id))
            .await
    }

    pub(crate) async fn list_runs(&self) -> Result<Vec<WorkflowSnapshot>, ClusterError> {
        self.bounded("list workflows", self.deps.backend.list_runs()).await
    }

    /// Rebuild the cluster from its run, including the fields stored as
    /// artifacts.
    pub(crate) async fn describe(
        &self,
        snapshot: &WorkflowSnapshot,
    ) -> Result<Cluster, ClusterError> {
        let mut cluster = Cluster::from_snapshot(snapshot)?;
        self.fill_artifact_fields(&mut cluster, snapshot).await?;
        Ok(cluster)
    }

    /// Populate `url` and `connect` from the contents of artifacts the
    /// flavor tags as such.
    pub(crate) async fn fill_artifact_fields(
        &self,
        cluster: &mut Cluster,
        snapshot: &WorkflowSnapshot,
    ) -> Result<(), ClusterError> {
        let Some(entry) = self.deps.flavors.get(&cluster.flavor) else {
            return Ok(());
        };

        for output in snapshot.nodes.iter().flat_map(|node| node.outputs.iter()) {
            let Some(declared) = entry.flavor.artifact(&output.name) else {
                continue;
            };
            let is_url = declared.has_tag(ArtifactTag::Url);
            let is_connect = declared.has_tag(ArtifactTag::Connect);
            if !(is_url || is_connect) || output.gcs.is_none() {
                continue;
            }
            let Some(location) = resolve_location(snapshot.artifact_bucket.as_deref(), output)
            else {
                tracing::warn!(
                    workflow = %snapshot.name,
                    artifact = %output.name,
                    "artifact has no storage location, possibly a migration issue, not fatal"
                );
                continue;
            };

            let read = self.deps.signer.contents(&location.bucket, &location.key);
            let contents = match self.bounded("read artifact", read).await {
                Ok(contents) => contents,
                Err(ClusterError::Storage(SignerError::Disabled)) => continue,
                Err(err) => return Err(err),
            };
            let text = String::from_utf8_lossy(&contents);
            if is_url {
                cluster.url = Some(text.trim().to_string());
            }
            if is_connect {
                cluster.connect = Some(text.into_owned());
            }
        }
        Ok(())
    }

    /// Resume a run into teardown and record the deletion. Failures are
    /// logged only.
    pub(crate) async fn resume_for_deletion(&self, snapshot: &WorkflowSnapshot) {
        let cluster_id = metadata::cluster_id(snapshot);
        tracing::info!(cluster_id, workflow = %snapshot.name, "resuming workflow for deletion");

        if let Err(err) =
            self.bounded("resume workflow", self.deps.backend.resume_run(&snapshot.name)).await
        {
            tracing::warn!(
                cluster_id,
                workflow = %snapshot.name,
                error = %err,
                "failed to resume workflow for deletion (OK if the workflow is not waiting)"
            );
        }

        self.record_deletion(cluster_id, &snapshot.name).await;
    }

    pub(crate) async fn record_deletion(&self, cluster_id: &str, workflow: &str) {
        let insert = self.deps.audit.insert_cluster_deletion_record(cluster_id, workflow);
        match tokio::time::timeout(self.config.call_timeout, insert).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!(
                cluster_id,
                workflow,
                error = %err,
                "failed to record cluster deletion"
            ),
            Err(_) => tracing::warn!(cluster_id, workflow, "recording cluster deletion timed out"),
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
