//! Node registry loading.
//!
//! The registry is a JSON array of `{ "name", "address", "port" }`
//! records. Inline `[[nodes]]` entries from the config file are appended
//! after the file's records.

use crate::config::Config;
use crate::models::NodeEndpoint;
use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Registry location used by the original node utilities.
pub const DEFAULT_REGISTRY_PATH: &str = "/etc/storj-utils/nodes.json";

/// Read a JSON registry file.
pub fn load_registry(path: &Path) -> Result<Vec<NodeEndpoint>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read node registry: {}", path.display()))?;

    let endpoints: Vec<NodeEndpoint> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse node registry: {}", path.display()))?;

    debug!("Loaded {} nodes from {}", endpoints.len(), path.display());
    Ok(endpoints)
}

/// Assemble the fleet from the configured registry file and inline nodes.
///
/// An explicitly configured registry must exist. The default location is
/// only read when present.
pub fn build_fleet(config: &Config) -> Result<Vec<NodeEndpoint>> {
    let mut endpoints = match &config.registry.path {
        Some(path) => load_registry(path)?,
        None => {
            let default_path = Path::new(DEFAULT_REGISTRY_PATH);
            if default_path.exists() {
                load_registry(default_path)?
            } else {
                debug!("No registry at {}", DEFAULT_REGISTRY_PATH);
                Vec::new()
            }
        }
    };

    endpoints.extend(config.nodes.iter().cloned());
    validate(&endpoints)?;

    info!("Fleet has {} nodes", endpoints.len());
    Ok(endpoints)
}

/// Check that the fleet is non-empty with unique names and usable ports.
pub fn validate(endpoints: &[NodeEndpoint]) -> Result<()> {
    if endpoints.is_empty() {
        bail!(
            "No nodes configured. Add [[nodes]] to the config or provide a registry with --nodes"
        );
    }

    let mut seen = HashSet::new();
    for endpoint in endpoints {
        if endpoint.name.trim().is_empty() {
            bail!("Node with address {} has an empty name", endpoint.address);
        }
        if endpoint.address.trim().is_empty() {
            bail!("Node {} has an empty address", endpoint.name);
        }
        if endpoint.api_port == 0 {
            bail!("Node {} has port 0", endpoint.name);
        }
        if !seen.insert(endpoint.name.as_str()) {
            bail!("Duplicate node name: {}", endpoint.name);
        }
    }

    Ok(())
}
