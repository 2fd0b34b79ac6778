// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration file.
//!
//! ```toml
//! [server]
//! namespace = "infra"
//! call_timeout = "30s"
//!
//! [slack]
//! token = "xoxb-..."
//! channel = "C0123456"
//!
//! [[flavor]]
//! id = "gke-default"
//! name = "GKE Default"
//! availability = "default"
//! workflow = "workflows/gke-default.yaml"
//! ```
//!
//! Workflow paths are resolved relative to the configuration file.

use infra_adapters::{FlavorEntry, RegistryError, StaticFlavorRegistry};
use infra_core::template::DEFAULT_PORTAL_URL;
use infra_core::Flavor;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Expiration sweep interval used in test mode
pub const TEST_MODE_EXPIRATION_INTERVAL: Duration = Duration::from_secs(5);

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid workflow template {path}: {message}")]
    Template { path: PathBuf, message: String },

    #[error("invalid flavor catalogue: {0}")]
    Registry(#[from] RegistryError),

    #[error("{section}: {message}")]
    Invalid { section: &'static str, message: String },
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    /// Chat notifications are disabled when absent
    pub slack: Option<SlackConfig>,
    /// Artifact downloads are disabled when absent
    pub storage: Option<StorageConfig>,
    /// Audit records are disabled when absent
    pub audit: Option<AuditConfig>,
    #[serde(default, rename = "flavor")]
    pub flavors: Vec<FlavorConfig>,
    /// Directory workflow paths are relative to
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Namespace workflow runs live in
    pub namespace: String,
    /// Upper bound on every outbound call
    #[serde(with = "infra_core::duration::serde_str")]
    pub call_timeout: Duration,
    #[serde(with = "infra_core::duration::serde_str")]
    pub expiration_interval: Duration,
    #[serde(with = "infra_core::duration::serde_str")]
    pub notification_interval: Duration,
    /// Base URL linked from chat messages
    pub portal_url: String,
    pub test_mode: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            call_timeout: Duration::from_secs(30),
            expiration_interval: Duration::from_secs(60),
            notification_interval: Duration::from_secs(60),
            portal_url: DEFAULT_PORTAL_URL.to_string(),
            test_mode: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlackConfig {
    pub token: String,
    pub channel: String,
}

/// HMAC credentials for Cloud Storage
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub access_id: String,
    pub secret: String,
    /// Storage endpoint host, for emulators
    #[serde(default)]
    pub host: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    pub path: PathBuf,
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_environment() -> String {
    "development".to_string()
}

/// A `[[flavor]]` entry: the flavor itself plus its workflow file
#[derive(Debug, Clone, Deserialize)]
pub struct FlavorConfig {
    #[serde(flatten)]
    pub flavor: Flavor,
    pub workflow: PathBuf,
}

impl Config {
    /// Load from `INFRA_CONFIG` (or `./infra.toml`) and apply environment
    /// overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_path(&crate::env::config_path())?;
        if let Some(namespace) = crate::env::namespace() {
            config.server.namespace = namespace;
        }
        if crate::env::test_mode() {
            config.server.test_mode = true;
        }
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::parse(&text, base_dir)
    }

    pub fn parse(text: &str, base_dir: PathBuf) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(text)?;
        config.base_dir = base_dir;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.namespace.is_empty() {
            return Err(ConfigError::Invalid {
                section: "server",
                message: "namespace must not be empty".to_string(),
            });
        }
        for (name, interval) in [
            ("call_timeout", self.server.call_timeout),
            ("expiration_interval", self.server.expiration_interval),
            ("notification_interval", self.server.notification_interval),
        ] {
            if interval.is_zero() {
                return Err(ConfigError::Invalid {
                    section: "server",
                    message: format!("{name} must be positive"),
                });
            }
        }
        if let Some(slack) = &self.slack {
            if slack.token.is_empty() || slack.channel.is_empty() {
                return Err(ConfigError::Invalid {
                    section: "slack",
                    message: "token and channel are required".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Interval of the expiration sweep, shortened in test mode
    pub fn expiration_interval(&self) -> Duration {
        if self.server.test_mode {
            TEST_MODE_EXPIRATION_INTERVAL
        } else {
            self.server.expiration_interval
        }
    }

    /// Read every flavor's workflow template and build the catalogue.
    pub fn flavor_registry(&self) -> Result<StaticFlavorRegistry, ConfigError> {
        let entries = self
            .flavors
            .iter()
            .map(|entry| {
                let template = load_template(&self.base_dir.join(&entry.workflow))?;
                Ok(FlavorEntry { flavor: entry.flavor.clone(), template })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(StaticFlavorRegistry::new(entries)?)
    }
}

/// Parse a workflow template. `.json` files are JSON, anything else YAML.
pub fn load_template(path: &Path) -> Result<serde_json::Value, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    let invalid = |message: String| ConfigError::Template { path: path.to_path_buf(), message };

    let template: serde_json::Value = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&text).map_err(|e| invalid(e.to_string()))?
    } else {
        serde_yaml::from_str(&text).map_err(|e| invalid(e.to_string()))?
    };

    if !template.is_object() {
        return Err(invalid("expected a mapping at the top level".to_string()));
    }
    Ok(template)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
