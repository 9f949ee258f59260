//! HTTP clients for node dashboards and the version service.

pub mod node;
pub mod version_source;
pub mod wire;

pub use node::NodeClient;
pub use version_source::{VersionSource, DEFAULT_VERSION_URL};

use anyhow::{Context, Result};

/// Build the shared HTTP client.
///
/// Timeouts are applied per call, so none is configured here.
pub fn build_http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("fleetwatch/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")
}
