// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::SweepReport;
use crate::service::{ClusterError, ClusterService};
use infra_core::{infer_status, lifespan, metadata, Clock, ClusterStatus};

impl<C: Clock> ClusterService<C> {
    /// Resume every ready cluster whose lifespan has run out.
    pub async fn sweep_expired(&self) -> Result<SweepReport, ClusterError> {
        let runs = self.list_runs().await?;
        let now = self.clock.now();
        let mut report = SweepReport { scanned: runs.len(), ..SweepReport::default() };

        for snapshot in &runs {
            let status = match infer_status(snapshot) {
                Ok(status) => status,
                Err(err) => {
                    tracing::error!(workflow = %snapshot.name, error = %err, "skipping workflow");
                    report.failed += 1;
                    continue;
                }
            };
            if status != ClusterStatus::Ready {
                continue;
            }
            if !lifespan::is_expired(snapshot.start_time(), metadata::lifespan(snapshot), now) {
                continue;
            }

            tracing::info!(workflow = %snapshot.name, "resuming a workflow that has expired");
            self.resume_for_deletion(snapshot).await;
            report.acted += 1;
        }
        Ok(report)
    }
}

#[cfg(test)]
#[path = "expiration_tests.rs"]
mod tests;
