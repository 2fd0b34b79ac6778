// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup and shutdown.

mod startup;
pub use startup::{launch, startup};

use std::sync::Arc;

use infra_adapters::{BackendError, ChatError, SignerError};
use infra_core::{Clock, SystemClock};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::ConfigError;
use crate::service::ClusterService;
use crate::sweep::Scheduler;

/// A running daemon
pub struct Daemon<C: Clock = SystemClock> {
    pub service: Arc<ClusterService<C>>,
    scheduler: Scheduler<C>,
    /// Adapter maintenance tasks, aborted on shutdown
    background: Vec<JoinHandle<()>>,
}

impl<C: Clock> Daemon<C> {
    pub fn new(service: Arc<ClusterService<C>>, scheduler: Scheduler<C>) -> Self {
        Self { service, scheduler, background: Vec::new() }
    }

    pub(crate) fn with_background(mut self, tasks: Vec<JoinHandle<()>>) -> Self {
        self.background = tasks;
        self
    }

    pub fn scheduler(&self) -> &Scheduler<C> {
        &self.scheduler
    }

    /// Stop the sweeps and wait for them to finish their current pass.
    pub async fn shutdown(self) {
        info!("shutting down daemon...");
        self.service.shutdown();
        for task in &self.background {
            task.abort();
        }
        self.scheduler.join().await;
        info!("daemon shutdown complete");
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to connect to the workflow backend: {0}")]
    Backend(#[from] BackendError),

    #[error("failed to initialise chat notifications: {0}")]
    Chat(#[from] ChatError),

    #[error("failed to initialise artifact storage: {0}")]
    Storage(#[from] SignerError),
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
