// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Argo workflows through the Kubernetes API.

use super::wire::{self, API_GROUP, API_VERSION, KIND};
use super::{most_recent, BackendError, RunHandle, RunRequest, WorkflowBackend};
use async_trait::async_trait;
use infra_core::metadata::LABEL_CLUSTER_ID;
use infra_core::{AnnotationPatch, WorkflowSnapshot};
use kube::api::{Api, DynamicObject, ListParams, Patch, PatchParams, PostParams};
use kube::core::{ApiResource, GroupVersionKind};
use kube::Client;

/// Workflow backend over Argo `Workflow` custom resources in one namespace.
#[derive(Clone)]
pub struct KubeWorkflowBackend {
    api: Api<DynamicObject>,
    namespace: String,
}

impl KubeWorkflowBackend {
    /// Connect using the ambient kubeconfig or in-cluster service account.
    pub async fn connect(namespace: &str) -> Result<Self, BackendError> {
        let client = Client::try_default()
            .await
            .map_err(|e| BackendError::Request(format!("failed to create kube client: {}", e)))?;
        Ok(Self::with_client(client, namespace))
    }

    pub fn with_client(client: Client, namespace: &str) -> Self {
        let gvk = GroupVersionKind::gvk(API_GROUP, API_VERSION, KIND);
        let resource = ApiResource::from_gvk(&gvk);
        Self {
            api: Api::namespaced_with(client, namespace, &resource),
            namespace: namespace.to_string(),
        }
    }

    async fn get(&self, name: &str) -> Result<WorkflowSnapshot, BackendError> {
        let object = self.api.get(name).await.map_err(|e| request_error(e, name))?;
        to_snapshot(&object)
    }
}

fn request_error(err: kube::Error, name: &str) -> BackendError {
    match err {
        kube::Error::Api(response) if response.code == 404 => {
            BackendError::NotFound(name.to_string())
        }
        other => BackendError::Request(other.to_string()),
    }
}

fn to_snapshot(object: &DynamicObject) -> Result<WorkflowSnapshot, BackendError> {
    let value = serde_json::to_value(object).map_err(|e| BackendError::Request(e.to_string()))?;
    Ok(wire::decode(value)?)
}

/// Decode a listing run by run. Runs that fail to decode are logged and left
/// out; the first such error is handed back alongside the decoded runs.
fn decode_listed(items: &[DynamicObject]) -> (Vec<WorkflowSnapshot>, Option<BackendError>) {
    let mut runs = Vec::with_capacity(items.len());
    let mut first_error = None;
    for object in items {
        match to_snapshot(object) {
            Ok(run) => runs.push(run),
            Err(err) => {
                tracing::error!(
                    workflow = %object.metadata.name.as_deref().unwrap_or_default(),
                    error = %err,
                    "failed to decode workflow, skipping"
                );
                first_error.get_or_insert(err);
            }
        }
    }
    (runs, first_error)
}

#[async_trait]
impl WorkflowBackend for KubeWorkflowBackend {
    async fn create_run(&self, request: RunRequest) -> Result<RunHandle, BackendError> {
        let object: DynamicObject = serde_json::from_value(wire::encode_run(&request)?)
            .map_err(|e| BackendError::Request(format!("invalid workflow object: {}", e)))?;

        tracing::info!(
            generate_name = %request.generate_name,
            namespace = %self.namespace,
            "submitting workflow"
        );

        let created = self
            .api
            .create(&PostParams::default(), &object)
            .await
            .map_err(|e| request_error(e, &request.generate_name))?;
        let name = created.metadata.name.unwrap_or_default();
        if name.is_empty() {
            return Err(BackendError::Request("created workflow has no name".to_string()));
        }
        Ok(RunHandle { name })
    }

    async fn most_recent_run_for_cluster(
        &self,
        cluster_id: &str,
    ) -> Result<WorkflowSnapshot, BackendError> {
        let params = ListParams::default().labels(&format!("{LABEL_CLUSTER_ID}={cluster_id}"));
        let list = self.api.list(&params).await.map_err(|e| request_error(e, cluster_id))?;
        let (runs, undecodable) = decode_listed(&list.items);
        if let Some(run) = most_recent(runs) {
            return Ok(run);
        }
        if let Some(err) = undecodable {
            return Err(err);
        }

        // Runs created before the cluster-id label carry the id as their name
        self.get(cluster_id).await
    }

    async fn list_runs(&self) -> Result<Vec<WorkflowSnapshot>, BackendError> {
        let list = self
            .api
            .list(&ListParams::default())
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;
        let (runs, _) = decode_listed(&list.items);
        Ok(runs)
    }

    async fn resume_run(&self, run_name: &str) -> Result<(), BackendError> {
        let snapshot = self.get(run_name).await?;
        let patch = wire::resume_patch(&snapshot, chrono::Utc::now());
        tracing::info!(workflow = %run_name, "resuming workflow");
        self.api
            .patch(run_name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(|e| request_error(e, run_name))?;
        Ok(())
    }

    async fn patch_annotation(
        &self,
        run_name: &str,
        patch: &AnnotationPatch,
    ) -> Result<(), BackendError> {
        let body = wire::annotation_patch(patch)
            .map_err(|e| BackendError::Request(format!("invalid annotation patch: {}", e)))?;
        tracing::debug!(
            workflow = %run_name,
            key = %patch.key,
            value = %patch.value,
            "patching annotation"
        );
        self.api
            .patch(run_name, &PatchParams::default(), &Patch::<()>::Json(body))
            .await
            .map_err(|e| request_error(e, run_name))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "argo_tests.rs"]
mod tests;
