// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background sweeps over every workflow run.
//!
//! Each sweep runs as its own task: sleep for the interval, scan, repeat.
//! A failed scan is logged and the loop carries on. The loops stop when the
//! service shuts down.

mod expiration;
mod notification;

use crate::service::{ClusterError, ClusterService};
use infra_core::{format_duration, Clock};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Sweeps slower than this are logged as a warning
pub const SLOW_SWEEP: Duration = Duration::from_secs(5);

/// A recurring background job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SweepJob {
    /// Resume expired, ready clusters into teardown
    ExpirationSweep,
    /// Send lifecycle chat notifications
    NotificationSweep,
}

infra_core::simple_display! {
    SweepJob {
        ExpirationSweep => "expiration",
        NotificationSweep => "notification",
    }
}

/// Outcome of one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Runs examined
    pub scanned: usize,
    /// Clusters resumed, or messages sent
    pub acted: usize,
    /// Clusters whose processing failed
    pub failed: usize,
}

impl SweepJob {
    /// Run one pass of the job.
    pub async fn run<C: Clock>(
        self,
        service: &ClusterService<C>,
    ) -> Result<SweepReport, ClusterError> {
        match self {
            Self::ExpirationSweep => service.sweep_expired().await,
            Self::NotificationSweep => service.sweep_notifications().await,
        }
    }
}

/// Owns the sweep tasks of a service
pub struct Scheduler<C: Clock> {
    service: Arc<ClusterService<C>>,
    tasks: Vec<(SweepJob, JoinHandle<()>)>,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(service: Arc<ClusterService<C>>) -> Self {
        Self { service, tasks: Vec::new() }
    }

    /// Start `job` on a fixed interval. The first pass runs one interval
    /// from now.
    pub fn schedule(&mut self, job: SweepJob, every: Duration) {
        tracing::info!(job = %job, interval = %format_duration(every), "scheduling sweep");
        let service = Arc::clone(&self.service);
        let cancel = service.shutdown_token();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(every) => {}
                }

                let started = tokio::time::Instant::now();
                match job.run(&service).await {
                    Ok(report) => tracing::debug!(
                        job = %job,
                        scanned = report.scanned,
                        acted = report.acted,
                        failed = report.failed,
                        "sweep complete"
                    ),
                    Err(err) => tracing::error!(job = %job, error = %err, "sweep failed"),
                }

                let elapsed = started.elapsed();
                if elapsed > SLOW_SWEEP {
                    tracing::warn!(
                        job = %job,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "sweep took longer than expected"
                    );
                }
            }
            tracing::debug!(job = %job, "sweep stopped");
        });
        self.tasks.push((job, handle));
    }

    pub fn jobs(&self) -> Vec<SweepJob> {
        self.tasks.iter().map(|(job, _)| *job).collect()
    }

    /// Wait for every sweep to stop. Call after the service shuts down.
    pub async fn join(self) {
        for (job, handle) in self.tasks {
            if let Err(err) = handle.await {
                tracing::error!(job = %job, error = %err, "sweep task panicked");
            }
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
