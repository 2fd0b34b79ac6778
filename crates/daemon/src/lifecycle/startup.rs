// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup: build the adapters from configuration and start the sweeps.

use std::sync::Arc;

use infra_adapters::{
    AuditSink, ChatClient, DisabledAuditSink, DisabledChatClient, DisabledSigner, GcsSigner,
    JsonlAuditSink, KubePodLogs, KubeWorkflowBackend, SlackChatClient, UrlSigner,
};
use infra_core::{Clock, SystemClock};
use tracing::info;

use super::{Daemon, LifecycleError};
use crate::config::Config;
use crate::service::{ClusterService, ServiceConfig, ServiceDeps};
use crate::sweep::{Scheduler, SweepJob};

/// Start the daemon against the configured cluster and chat workspace.
pub async fn startup(config: &Config) -> Result<Daemon, LifecycleError> {
    if config.server.test_mode {
        info!("server is running in test mode");
    }
    let timeout = config.server.call_timeout;
    let namespace = config.server.namespace.as_str();

    let flavors = Arc::new(config.flavor_registry()?);
    let backend = Arc::new(KubeWorkflowBackend::connect(namespace).await?);
    let pod_logs = Arc::new(KubePodLogs::connect(namespace).await?);

    let mut background = Vec::new();
    let chat: Arc<dyn ChatClient> = match &config.slack {
        Some(slack) => {
            let api_base = crate::env::slack_api_base();
            let client =
                SlackChatClient::connect(&slack.token, &slack.channel, api_base.as_deref(), timeout)
                    .await?;
            background.push(client.spawn_user_refresh());
            Arc::new(client)
        }
        None => {
            info!("chat notifications disabled");
            Arc::new(DisabledChatClient)
        }
    };

    let signer: Arc<dyn UrlSigner> = match &config.storage {
        Some(storage) => Arc::new(GcsSigner::new(
            &storage.access_id,
            &storage.secret,
            storage.host.as_deref(),
            timeout,
        )?),
        None => {
            info!("artifact storage disabled");
            Arc::new(DisabledSigner)
        }
    };

    let audit: Arc<dyn AuditSink> = match &config.audit {
        Some(audit) if !config.server.test_mode => {
            info!(
                path = %audit.path.display(),
                environment = %audit.environment,
                "auditing cluster lifecycle"
            );
            Arc::new(JsonlAuditSink::new(&audit.path, &audit.environment))
        }
        _ => {
            info!("audit records disabled");
            Arc::new(DisabledAuditSink)
        }
    };

    let deps = ServiceDeps { backend, pod_logs, chat, signer, audit, flavors };
    let service = Arc::new(ClusterService::new(deps, SystemClock, service_config(config)));
    Ok(launch(service, config).with_background(background))
}

/// Start the sweeps of an assembled service.
pub fn launch<C: Clock>(service: Arc<ClusterService<C>>, config: &Config) -> Daemon<C> {
    let mut scheduler = Scheduler::new(Arc::clone(&service));
    scheduler.schedule(SweepJob::ExpirationSweep, config.expiration_interval());
    scheduler.schedule(SweepJob::NotificationSweep, config.server.notification_interval);
    info!(namespace = %config.server.namespace, flavors = config.flavors.len(), "daemon started");
    Daemon::new(service, scheduler)
}

pub(crate) fn service_config(config: &Config) -> ServiceConfig {
    ServiceConfig {
        call_timeout: config.server.call_timeout,
        portal_url: config.server.portal_url.clone(),
    }
}
