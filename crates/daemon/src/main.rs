// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! infrad: self-service cluster lifecycle daemon

use anyhow::Result;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use infra_daemon::{env, startup, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = init_tracing();

    info!(version = env!("CARGO_PKG_VERSION"), "starting infrad");

    let config = Config::load().map_err(|e| {
        error!("configuration error: {}", e);
        e
    })?;
    info!(
        namespace = %config.server.namespace,
        flavors = config.flavors.len(),
        test_mode = config.server.test_mode,
        "configuration loaded"
    );

    let daemon = startup(&config).await.map_err(|e| {
        error!("startup failed: {}", e);
        e
    })?;

    tokio::signal::ctrl_c().await?;
    daemon.shutdown().await;
    Ok(())
}

/// Log to stderr, or to a daily rolling file under `INFRA_LOG_DIR`.
///
/// The returned guard flushes the file writer when dropped.
fn init_tracing() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match env::log_dir() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "infrad.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}
