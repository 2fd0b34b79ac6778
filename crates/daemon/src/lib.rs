// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Infra daemon library
//!
//! The cluster service, its background sweeps, configuration and startup.
//! The `infrad` binary is a thin wrapper around [`lifecycle::startup`].

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod env;
pub mod lifecycle;
pub mod service;
pub mod sweep;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::{Config, ConfigError};
pub use lifecycle::{launch, startup, Daemon, LifecycleError};
pub use service::{
    ClusterError, ClusterService, CreateRequest, ListFilter, ServiceConfig, ServiceDeps, StepLog,
};
pub use sweep::{Scheduler, SweepJob, SweepReport};
