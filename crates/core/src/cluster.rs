// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The cluster view reconstructed from a workflow snapshot.

use crate::lifespan;
use crate::metadata;
use crate::notification::NotificationPhase;
use crate::status::{infer_status, ClusterStatus, StatusError};
use crate::workflow::{WorkflowParameter, WorkflowSnapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A self-service cluster. Never stored; rebuilt from its run on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: String,
    pub flavor: String,
    pub owner: String,
    pub description: String,
    pub status: ClusterStatus,
    pub created_on: DateTime<Utc>,
    /// Set once the run reached a terminal phase
    pub destroyed_on: Option<DateTime<Utc>>,
    #[serde(with = "crate::duration::serde_str")]
    pub lifespan: Duration,
    pub url: Option<String>,
    pub connect: Option<String>,
    pub parameters: Vec<WorkflowParameter>,
}

impl Cluster {
    pub fn from_snapshot(snapshot: &WorkflowSnapshot) -> Result<Self, StatusError> {
        Ok(Self {
            id: metadata::cluster_id(snapshot).to_string(),
            flavor: metadata::flavor(snapshot).to_string(),
            owner: metadata::owner(snapshot).to_string(),
            description: metadata::description(snapshot).to_string(),
            status: infer_status(snapshot)?,
            created_on: snapshot.start_time(),
            destroyed_on: snapshot.finished_at,
            lifespan: metadata::lifespan(snapshot),
            url: None,
            connect: None,
            parameters: snapshot.parameters.clone(),
        })
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        lifespan::expires_at(self.created_on, self.lifespan)
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        lifespan::remaining(self.created_on, self.lifespan, now)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        lifespan::is_expired(self.created_on, self.lifespan, now)
    }

    pub fn is_nearing_expiry(&self, now: DateTime<Utc>) -> bool {
        lifespan::is_nearing_expiry(self.created_on, self.lifespan, now)
    }
}

/// A cluster together with the bookkeeping the background sweeps need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedCluster {
    pub cluster: Cluster,
    pub run_name: String,
    pub expired: bool,
    pub nearing_expiry: bool,
    pub notification: Option<NotificationPhase>,
    pub direct_message: bool,
}

impl TrackedCluster {
    pub fn from_snapshot(
        snapshot: &WorkflowSnapshot,
        now: DateTime<Utc>,
    ) -> Result<Self, StatusError> {
        let cluster = Cluster::from_snapshot(snapshot)?;
        Ok(Self {
            run_name: snapshot.name.clone(),
            expired: cluster.is_expired(now),
            nearing_expiry: cluster.is_nearing_expiry(now),
            notification: metadata::notification_phase(snapshot),
            direct_message: metadata::wants_direct_message(snapshot),
            cluster,
        })
    }
}

#[cfg(test)]
#[path = "cluster_tests.rs"]
mod tests;
