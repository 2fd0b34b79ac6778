// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::SweepReport;
use crate::service::{ClusterError, ClusterService};
use chrono::{DateTime, Utc};
use infra_adapters::{ChatMessage, ChatUser};
use infra_core::{
    failure_details, format_expiration, metadata, next_notification, template, AnnotationPatch,
    Clock, ClusterStatus, MessageKind, NotificationPhase, TemplateData, TrackedCluster,
    WorkflowSnapshot,
};

impl<C: Clock> ClusterService<C> {
    /// Send the lifecycle message each cluster is due, if any, and record
    /// the new notification phase.
    pub async fn sweep_notifications(&self) -> Result<SweepReport, ClusterError> {
        let runs = self.list_runs().await?;
        let now = self.clock.now();
        let mut report = SweepReport { scanned: runs.len(), ..SweepReport::default() };

        for snapshot in &runs {
            match self.notify(snapshot, now).await {
                Ok(true) => report.acted += 1,
                Ok(false) => {}
                Err(err) => {
                    tracing::error!(
                        workflow = %snapshot.name,
                        error = %err,
                        "failed to process cluster notification"
                    );
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }

    /// Returns whether a message was sent. The phase is only persisted once
    /// any message is delivered.
    async fn notify(
        &self,
        snapshot: &WorkflowSnapshot,
        now: DateTime<Utc>,
    ) -> Result<bool, ClusterError> {
        let current = metadata::notification_phase(snapshot);
        if current == Some(NotificationPhase::Skip) {
            return Ok(false);
        }

        let mut tracked = TrackedCluster::from_snapshot(snapshot, now)?;
        let transition =
            next_notification(tracked.cluster.status, tracked.nearing_expiry, tracked.notification);

        let mut sent = false;
        if let Some(kind) = transition.message {
            self.fill_artifact_fields(&mut tracked.cluster, snapshot).await?;
            let owner = self.deps.chat.lookup_user(&tracked.cluster.owner);
            let data = self.template_data(&tracked, owner.as_ref(), snapshot, now);
            let message = ChatMessage::new(template::render(kind, &data));

            self.deliver(&tracked, owner.as_ref(), kind, &message).await?;
            sent = true;

            if tracked.cluster.status == ClusterStatus::Failed {
                self.record_deletion(&tracked.cluster.id, &tracked.run_name).await;
            }
        }

        if let Some(phase) = transition.phase.filter(|_| transition.changes(current)) {
            let patch = AnnotationPatch::notification(phase);
            let update = self.deps.backend.patch_annotation(&tracked.run_name, &patch);
            self.bounded("patch workflow", update).await?;
            tracing::debug!(
                cluster_id = %tracked.cluster.id,
                workflow = %tracked.run_name,
                phase = %phase,
                "updated notification phase"
            );
        }
        Ok(sent)
    }

    fn template_data(
        &self,
        tracked: &TrackedCluster,
        owner: Option<&ChatUser>,
        snapshot: &WorkflowSnapshot,
        now: DateTime<Utc>,
    ) -> TemplateData {
        let cluster = &tracked.cluster;
        TemplateData {
            description: cluster.description.clone(),
            flavor: cluster.flavor.clone(),
            id: cluster.id.clone(),
            remaining: format_expiration(cluster.expires_at() - now),
            url: cluster.url.clone().unwrap_or_default(),
            owner_email: cluster.owner.clone(),
            owner_chat_id: owner.map(|user| user.id.clone()).unwrap_or_default(),
            failure_details: failure_details(snapshot),
            portal_url: self.config.portal_url.clone(),
        }
    }

    /// Direct message when requested and the owner is known, falling back
    /// to the broadcast channel.
    async fn deliver(
        &self,
        tracked: &TrackedCluster,
        owner: Option<&ChatUser>,
        kind: MessageKind,
        message: &ChatMessage,
    ) -> Result<(), ClusterError> {
        let cluster_id = tracked.cluster.id.as_str();

        if let Some(user) = owner.filter(|_| tracked.direct_message) {
            match self
                .bounded("send direct message", self.deps.chat.post_message_to_user(user, message))
                .await
            {
                Ok(()) => {
                    tracing::info!(cluster_id, message = %kind, "sent direct notification");
                    return Ok(());
                }
                Err(err) => tracing::error!(
                    cluster_id,
                    user_email = %user.email,
                    error = %err,
                    "failed to send chat message directly to user"
                ),
            }
        }

        self.bounded("send chat message", self.deps.chat.post_message(message)).await?;
        tracing::info!(cluster_id, message = %kind, "sent notification");
        Ok(())
    }
}

#[cfg(test)]
#[path = "notification_tests.rs"]
mod tests;
