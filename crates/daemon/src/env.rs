// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "infra.toml";

/// Resolve the configuration file: INFRA_CONFIG > ./infra.toml
pub fn config_path() -> PathBuf {
    std::env::var("INFRA_CONFIG")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Test mode shortens the expiration sweep and turns off audit records.
///
/// `INFRA_TEST_MODE` takes any truthy value; the legacy `TEST_MODE=true` is
/// also honoured.
pub fn test_mode() -> bool {
    let truthy = |s: String| matches!(s.as_str(), "1" | "true" | "yes");
    std::env::var("INFRA_TEST_MODE").ok().is_some_and(truthy)
        || std::env::var("TEST_MODE").ok().is_some_and(|s| s == "true")
}

/// Directory for rolling daemon logs. Logs go to stderr when unset.
pub fn log_dir() -> Option<PathBuf> {
    std::env::var("INFRA_LOG_DIR").ok().filter(|s| !s.is_empty()).map(PathBuf::from)
}

/// Kubernetes namespace override for workflow runs
pub fn namespace() -> Option<String> {
    std::env::var("INFRA_NAMESPACE").ok().filter(|s| !s.is_empty())
}

/// Slack Web API base URL override
pub fn slack_api_base() -> Option<String> {
    std::env::var("INFRA_SLACK_API_BASE").ok().filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
