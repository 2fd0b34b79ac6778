// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory workflow backend for tests.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{most_recent, BackendError, RunHandle, RunRequest, WorkflowBackend};
use async_trait::async_trait;
use infra_core::metadata::LABEL_CLUSTER_ID;
use infra_core::{
    AnnotationPatch, Clock, FakeClock, NodePhase, NodeType, WorkflowParameter, WorkflowPhase,
    WorkflowSnapshot,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Recorded backend operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    CreateRun { name: String, parameters: Vec<WorkflowParameter> },
    Get { cluster_id: String },
    List,
    Resume { run: String },
    Patch { run: String, key: String, value: String },
}

#[derive(Default)]
struct FakeBackendState {
    runs: Vec<WorkflowSnapshot>,
    calls: Vec<BackendCall>,
    created: u32,
    fail_creates: bool,
    fail_lists: bool,
    fail_resumes: bool,
    fail_patches: bool,
}

/// Fake workflow backend holding runs in memory.
///
/// Patches follow JSON-Patch `replace` rules: the annotation must exist.
#[derive(Clone)]
pub struct FakeWorkflowBackend {
    inner: Arc<Mutex<FakeBackendState>>,
    clock: FakeClock,
}

impl Default for FakeWorkflowBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeWorkflowBackend {
    pub fn new() -> Self {
        Self::with_clock(FakeClock::new())
    }

    /// Submitted runs are stamped with `clock`'s time.
    pub fn with_clock(clock: FakeClock) -> Self {
        Self { inner: Arc::new(Mutex::new(FakeBackendState::default())), clock }
    }

    /// Add a run, replacing any run with the same name.
    pub fn insert(&self, run: WorkflowSnapshot) {
        let mut state = self.inner.lock();
        state.runs.retain(|existing| existing.name != run.name);
        state.runs.push(run);
    }

    /// Mutate a stored run in place.
    pub fn update(&self, name: &str, f: impl FnOnce(&mut WorkflowSnapshot)) {
        if let Some(run) = self.inner.lock().runs.iter_mut().find(|run| run.name == name) {
            f(run);
        }
    }

    pub fn run(&self, name: &str) -> Option<WorkflowSnapshot> {
        self.inner.lock().runs.iter().find(|run| run.name == name).cloned()
    }

    pub fn runs(&self) -> Vec<WorkflowSnapshot> {
        self.inner.lock().runs.clone()
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.inner.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    pub fn fail_creates(&self, fail: bool) {
        self.inner.lock().fail_creates = fail;
    }

    pub fn fail_lists(&self, fail: bool) {
        self.inner.lock().fail_lists = fail;
    }

    pub fn fail_resumes(&self, fail: bool) {
        self.inner.lock().fail_resumes = fail;
    }

    pub fn fail_patches(&self, fail: bool) {
        self.inner.lock().fail_patches = fail;
    }
}

#[async_trait]
impl WorkflowBackend for FakeWorkflowBackend {
    async fn create_run(&self, request: RunRequest) -> Result<RunHandle, BackendError> {
        let mut state = self.inner.lock();
        if state.fail_creates {
            return Err(BackendError::Request("injected create failure".to_string()));
        }
        state.created += 1;
        let name = format!("{}{:05}", request.generate_name, state.created);
        state.calls.push(BackendCall::CreateRun {
            name: name.clone(),
            parameters: request.parameters.clone(),
        });

        let now = self.clock.now();
        state.runs.push(WorkflowSnapshot {
            name: name.clone(),
            phase: WorkflowPhase::Unset,
            nodes: Vec::new(),
            annotations: request.metadata.annotations,
            labels: request.metadata.labels,
            created_at: now,
            started_at: Some(now),
            finished_at: None,
            artifact_bucket: None,
            parameters: request.parameters,
        });
        Ok(RunHandle { name })
    }

    async fn most_recent_run_for_cluster(
        &self,
        cluster_id: &str,
    ) -> Result<WorkflowSnapshot, BackendError> {
        let mut state = self.inner.lock();
        state.calls.push(BackendCall::Get { cluster_id: cluster_id.to_string() });

        let labelled: Vec<WorkflowSnapshot> = state
            .runs
            .iter()
            .filter(|run| run.labels.get(LABEL_CLUSTER_ID).map(String::as_str) == Some(cluster_id))
            .cloned()
            .collect();
        if let Some(run) = most_recent(labelled) {
            return Ok(run);
        }
        state
            .runs
            .iter()
            .find(|run| run.name == cluster_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(cluster_id.to_string()))
    }

    async fn list_runs(&self) -> Result<Vec<WorkflowSnapshot>, BackendError> {
        let mut state = self.inner.lock();
        state.calls.push(BackendCall::List);
        if state.fail_lists {
            return Err(BackendError::Request("injected list failure".to_string()));
        }
        Ok(state.runs.clone())
    }

    async fn resume_run(&self, run_name: &str) -> Result<(), BackendError> {
        let mut state = self.inner.lock();
        state.calls.push(BackendCall::Resume { run: run_name.to_string() });
        if state.fail_resumes {
            return Err(BackendError::Request("injected resume failure".to_string()));
        }
        let run = state
            .runs
            .iter_mut()
            .find(|run| run.name == run_name)
            .ok_or_else(|| BackendError::NotFound(run_name.to_string()))?;
        for node in run.nodes.iter_mut().filter(|node| node.node_type == NodeType::Suspend) {
            if matches!(node.phase, NodePhase::Running | NodePhase::Pending) {
                node.phase = NodePhase::Succeeded;
            }
        }
        Ok(())
    }

    async fn patch_annotation(
        &self,
        run_name: &str,
        patch: &AnnotationPatch,
    ) -> Result<(), BackendError> {
        let mut state = self.inner.lock();
        state.calls.push(BackendCall::Patch {
            run: run_name.to_string(),
            key: patch.key.clone(),
            value: patch.value.clone(),
        });
        if state.fail_patches {
            return Err(BackendError::Request("injected patch failure".to_string()));
        }
        let run = state
            .runs
            .iter_mut()
            .find(|run| run.name == run_name)
            .ok_or_else(|| BackendError::NotFound(run_name.to_string()))?;
        match run.annotations.get_mut(&patch.key) {
            Some(value) => {
                *value = patch.value.clone();
                Ok(())
            }
            None => Err(BackendError::Request(format!(
                "replace operation does not apply: doc is missing path: {}",
                patch.path()
            ))),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
