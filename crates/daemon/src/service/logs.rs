// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-step log collection.

use super::{ClusterError, ClusterService};
use chrono::{DateTime, Utc};
use infra_adapters::PodLogs;
use infra_core::{format_duration, Clock, WorkflowSnapshot};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Log output of one workflow step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepLog {
    pub name: String,
    /// Log stream, or the error that prevented reading it
    pub body: Vec<u8>,
    pub started: Option<DateTime<Utc>>,
    pub message: String,
}

impl<C: Clock> ClusterService<C> {
    /// Logs of every pod step of the cluster's most recent run, oldest
    /// step first.
    pub async fn logs(&self, cluster_id: &str) -> Result<Vec<StepLog>, ClusterError> {
        let snapshot = self.most_recent_run(cluster_id).await?;
        Ok(aggregate_logs(Arc::clone(&self.deps.pod_logs), &snapshot, self.config.call_timeout)
            .await)
    }
}

/// Fetch the log of each pod step concurrently.
///
/// Returns one entry per pod step, sorted by step start time. A fetch that
/// fails or exceeds `timeout` yields its error text as the body.
pub async fn aggregate_logs(
    pod_logs: Arc<dyn PodLogs>,
    snapshot: &WorkflowSnapshot,
    timeout: Duration,
) -> Vec<StepLog> {
    let steps: Vec<_> = snapshot.pod_nodes().cloned().collect();
    if steps.is_empty() {
        return Vec::new();
    }

    let (tx, mut rx) = mpsc::channel(steps.len());
    for step in steps {
        let tx = tx.clone();
        let pod_logs = Arc::clone(&pod_logs);
        tokio::spawn(async move {
            let body = match tokio::time::timeout(timeout, pod_logs.logs(&step.id)).await {
                Ok(Ok(body)) => body,
                Ok(Err(err)) => err.to_string().into_bytes(),
                Err(_) => format!("log fetch timed out after {}", format_duration(timeout))
                    .into_bytes(),
            };
            let log = StepLog {
                name: step.display_name,
                body,
                started: step.started_at,
                message: step.message,
            };
            if tx.send(log).await.is_err() {
                tracing::debug!(pod = %step.id, "log receiver dropped");
            }
        });
    }
    drop(tx);

    let mut logs = Vec::with_capacity(rx.max_capacity());
    while let Some(log) = rx.recv().await {
        logs.push(log);
    }
    logs.sort_by_key(|log| log.started);
    logs
}

#[cfg(test)]
#[path = "logs_tests.rs"]
mod tests;
