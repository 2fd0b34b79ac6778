// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow backend adapters
//!
//! Every cluster is one workflow run. The backend submits runs, reads them
//! back as [`WorkflowSnapshot`]s, resumes suspended runs into teardown and
//! rewrites single annotations.
//!
//! # Module layout
//!
//! - [`wire`]: decoding of the backend's JSON objects into snapshots
//! - [`argo`]: Argo `Workflow` custom resources through the Kubernetes API

mod argo;
pub mod wire;

pub use argo::KubeWorkflowBackend;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{BackendCall, FakeWorkflowBackend};

use async_trait::async_trait;
use infra_core::{AnnotationPatch, RunMetadata, SnapshotError, WorkflowParameter, WorkflowSnapshot};
use thiserror::Error;

/// Errors from workflow backend operations
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("workflow not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Decode(#[from] SnapshotError),
    #[error("backend request failed: {0}")]
    Request(String),
}

/// A run to submit
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    /// Name prefix; the backend appends a random suffix
    pub generate_name: String,
    pub metadata: RunMetadata,
    pub parameters: Vec<WorkflowParameter>,
    /// Workflow spec of the flavor, submitted as-is apart from arguments
    pub template: serde_json::Value,
}

/// Handle to a submitted run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunHandle {
    pub name: String,
}

/// Adapter over the workflow execution backend
#[async_trait]
pub trait WorkflowBackend: Send + Sync + 'static {
    async fn create_run(&self, request: RunRequest) -> Result<RunHandle, BackendError>;

    /// Newest run labelled with `cluster_id`, falling back to a run named
    /// exactly `cluster_id` for clusters created before labels existed.
    async fn most_recent_run_for_cluster(
        &self,
        cluster_id: &str,
    ) -> Result<WorkflowSnapshot, BackendError>;

    async fn list_runs(&self) -> Result<Vec<WorkflowSnapshot>, BackendError>;

    /// Resume a suspended run. Waiting suspend steps complete and the run
    /// proceeds to teardown.
    async fn resume_run(&self, run_name: &str) -> Result<(), BackendError>;

    /// Replace one annotation. The annotation must already exist.
    async fn patch_annotation(
        &self,
        run_name: &str,
        patch: &AnnotationPatch,
    ) -> Result<(), BackendError>;
}

/// Pick the most recently created of `runs`.
pub fn most_recent(runs: Vec<WorkflowSnapshot>) -> Option<WorkflowSnapshot> {
    runs.into_iter().max_by_key(|run| run.created_at)
}
