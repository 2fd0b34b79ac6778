// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Audit records of cluster creation and deletion.
//!
//! Records are appended to a JSONL file, one object per line. Writers are
//! best-effort: callers log failures and carry on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors from audit sinks
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("audit encode failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("audit writer task failed: {0}")]
    Join(String),
}

/// One audit record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditRecord {
    ClusterCreated {
        environment: String,
        cluster_id: String,
        workflow_name: String,
        flavor: String,
        actor: String,
        timestamp: DateTime<Utc>,
    },
    ClusterDeleted {
        environment: String,
        cluster_id: String,
        workflow_name: String,
        timestamp: DateTime<Utc>,
    },
}

/// Adapter for audit records
#[async_trait]
pub trait AuditSink: Send + Sync + 'static {
    async fn insert_cluster_creation_record(
        &self,
        cluster_id: &str,
        workflow_name: &str,
        flavor: &str,
        actor: &str,
    ) -> Result<(), AuditError>;

    async fn insert_cluster_deletion_record(
        &self,
        cluster_id: &str,
        workflow_name: &str,
    ) -> Result<(), AuditError>;
}

/// Append-only JSONL audit file
#[derive(Clone)]
pub struct JsonlAuditSink {
    path: Arc<PathBuf>,
    environment: String,
}

impl JsonlAuditSink {
    pub fn new(path: impl Into<PathBuf>, environment: &str) -> Self {
        Self { path: Arc::new(path.into()), environment: environment.to_string() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    async fn append(&self, record: AuditRecord) -> Result<(), AuditError> {
        let line = serde_json::to_string(&record)?;
        let path = Arc::clone(&self.path);
        tokio::task::spawn_blocking(move || -> Result<(), AuditError> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut file = OpenOptions::new().create(true).append(true).open(path.as_path())?;
            writeln!(file, "{}", line)?;
            file.sync_all()?;
            Ok(())
        })
        .await
        .map_err(|e| AuditError::Join(e.to_string()))?
    }
}

#[async_trait]
impl AuditSink for JsonlAuditSink {
    async fn insert_cluster_creation_record(
        &self,
        cluster_id: &str,
        workflow_name: &str,
        flavor: &str,
        actor: &str,
    ) -> Result<(), AuditError> {
        self.append(AuditRecord::ClusterCreated {
            environment: self.environment.clone(),
            cluster_id: cluster_id.to_string(),
            workflow_name: workflow_name.to_string(),
            flavor: flavor.to_string(),
            actor: actor.to_string(),
            timestamp: Utc::now(),
        })
        .await
    }

    async fn insert_cluster_deletion_record(
        &self,
        cluster_id: &str,
        workflow_name: &str,
    ) -> Result<(), AuditError> {
        self.append(AuditRecord::ClusterDeleted {
            environment: self.environment.clone(),
            cluster_id: cluster_id.to_string(),
            workflow_name: workflow_name.to_string(),
            timestamp: Utc::now(),
        })
        .await
    }
}

/// Sink used when auditing is off (no configuration, or test mode)
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledAuditSink;

#[async_trait]
impl AuditSink for DisabledAuditSink {
    async fn insert_cluster_creation_record(
        &self,
        _cluster_id: &str,
        _workflow_name: &str,
        _flavor: &str,
        _actor: &str,
    ) -> Result<(), AuditError> {
        Ok(())
    }

    async fn insert_cluster_deletion_record(
        &self,
        _cluster_id: &str,
        _workflow_name: &str,
    ) -> Result<(), AuditError> {
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{AuditError, AuditSink};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Recorded audit insert
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum AuditCall {
        Created { cluster_id: String, workflow_name: String, flavor: String, actor: String },
        Deleted { cluster_id: String, workflow_name: String },
    }

    #[derive(Default)]
    struct FakeAuditState {
        calls: Vec<AuditCall>,
        fail: bool,
    }

    /// Fake audit sink for testing
    #[derive(Clone, Default)]
    pub struct FakeAuditSink {
        inner: Arc<Mutex<FakeAuditState>>,
    }

    impl FakeAuditSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn fail(&self, fail: bool) {
            self.inner.lock().fail = fail;
        }

        /// Every attempted insert, including failed ones
        pub fn calls(&self) -> Vec<AuditCall> {
            self.inner.lock().calls.clone()
        }

        fn record(&self, call: AuditCall) -> Result<(), AuditError> {
            let mut state = self.inner.lock();
            state.calls.push(call);
            if state.fail {
                return Err(AuditError::Join("injected audit failure".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl AuditSink for FakeAuditSink {
        async fn insert_cluster_creation_record(
            &self,
            cluster_id: &str,
            workflow_name: &str,
            flavor: &str,
            actor: &str,
        ) -> Result<(), AuditError> {
            self.record(AuditCall::Created {
                cluster_id: cluster_id.to_string(),
                workflow_name: workflow_name.to_string(),
                flavor: flavor.to_string(),
                actor: actor.to_string(),
            })
        }

        async fn insert_cluster_deletion_record(
            &self,
            cluster_id: &str,
            workflow_name: &str,
        ) -> Result<(), AuditError> {
            self.record(AuditCall::Deleted {
                cluster_id: cluster_id.to_string(),
                workflow_name: workflow_name.to_string(),
            })
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{AuditCall, FakeAuditSink};

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
