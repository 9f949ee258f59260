//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.fleetwatch.toml` files.

use crate::cli::OutputFormat;
use crate::client::DEFAULT_VERSION_URL;
use crate::models::NodeEndpoint;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = ".fleetwatch.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Polling settings.
    #[serde(default)]
    pub polling: PollingConfig,

    /// Version check settings.
    #[serde(default)]
    pub version: VersionConfig,

    /// Node registry file.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Inline node definitions.
    #[serde(default)]
    pub nodes: Vec<NodeEndpoint>,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,
}

/// Node polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Per-node budget in seconds, satellite calls included.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Nodes polled at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Satellite detail calls in flight per node.
    #[serde(default = "default_satellite_concurrency")]
    pub satellite_concurrency: usize,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            concurrency: default_concurrency(),
            satellite_concurrency: default_satellite_concurrency(),
        }
    }
}

impl PollingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn default_timeout() -> u64 {
    10
}

fn default_concurrency() -> usize {
    8
}

fn default_satellite_concurrency() -> usize {
    4
}

/// Minimum version lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionConfig {
    /// Version service URL.
    #[serde(default = "default_version_url")]
    pub url: String,

    /// Fixed minimum version. Skips the lookup when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<String>,
}

impl Default for VersionConfig {
    fn default() -> Self {
        Self {
            url: default_version_url(),
            minimum: None,
        }
    }
}

fn default_version_url() -> String {
    DEFAULT_VERSION_URL.to_string()
}

/// Registry file settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// JSON registry path. Defaults to `/etc/storj-utils/nodes.json` when
    /// that file exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(timeout) = args.timeout {
            self.polling.timeout_seconds = timeout;
        }
        if let Some(concurrency) = args.concurrency {
            self.polling.concurrency = concurrency;
        }

        if let Some(ref path) = args.nodes {
            self.registry.path = Some(path.clone());
        }

        if let Some(ref url) = args.version_url {
            self.version.url = url.clone();
        }
        if let Some(ref minimum) = args.minimum_version {
            self.version.minimum = Some(minimum.clone());
        }

        if let Some(format) = args.format {
            self.general.format = format;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let mut config = Config::default();
        config.nodes.push(NodeEndpoint::new("node-1", "localhost", 14002));
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
