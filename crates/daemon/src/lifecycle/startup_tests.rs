// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::config::{Config, ServerConfig};
use crate::lifecycle::startup::service_config;
use crate::sweep::SweepJob;
use crate::test_support::TestHarness;
use infra_adapters::{BackendCall, RegistryError};
use infra_core::test_support::ready_run;
use std::time::Duration;

fn config(test_mode: bool) -> Config {
    Config {
        server: ServerConfig {
            namespace: "infra".to_string(),
            call_timeout: Duration::from_secs(10),
            expiration_interval: Duration::from_secs(120),
            notification_interval: Duration::from_secs(90),
            portal_url: "https://portal.test".to_string(),
            test_mode,
        },
        ..Config::default()
    }
}

#[test]
fn service_config_follows_server_settings() {
    let service = service_config(&config(false));

    assert_eq!(service.call_timeout, Duration::from_secs(10));
    assert_eq!(service.portal_url, "https://portal.test");
}

#[tokio::test]
async fn startup_rejects_an_empty_flavor_catalogue() {
    let result = startup(&config(false)).await;

    assert!(matches!(
        result,
        Err(LifecycleError::Config(ConfigError::Registry(RegistryError::NoDefault)))
    ));
}

#[tokio::test(start_paused = true)]
async fn launch_schedules_both_sweeps() {
    let harness = TestHarness::new();

    let daemon = launch(Arc::clone(&harness.service), &config(false));

    assert_eq!(
        daemon.scheduler().jobs(),
        vec![SweepJob::ExpirationSweep, SweepJob::NotificationSweep]
    );
    daemon.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_mode_sweeps_for_expiry_every_few_seconds() {
    let harness = TestHarness::new();
    harness.backend.insert(ready_run("demo"));
    harness.advance(Duration::from_secs(4 * 3600));

    let daemon = launch(Arc::clone(&harness.service), &config(true));
    tokio::time::sleep(Duration::from_secs(6)).await;

    let resume = BackendCall::Resume { run: "demo-x7k2p".to_string() };
    assert!(harness.backend.calls().contains(&resume));
    daemon.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn configured_interval_applies_outside_test_mode() {
    let harness = TestHarness::new();
    harness.backend.insert(ready_run("demo"));
    harness.advance(Duration::from_secs(4 * 3600));

    let daemon = launch(Arc::clone(&harness.service), &config(false));
    tokio::time::sleep(Duration::from_secs(60)).await;

    assert!(harness.backend.calls().is_empty());
    daemon.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_sweeps() {
    let harness = TestHarness::new();
    let daemon = launch(Arc::clone(&harness.service), &config(true));

    daemon.shutdown().await;
    tokio::time::sleep(Duration::from_secs(600)).await;

    assert!(harness.backend.calls().is_empty());
}
