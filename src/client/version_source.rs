//! Authoritative minimum version lookup.

use crate::error::VersionSourceError;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Default public version endpoint.
pub const DEFAULT_VERSION_URL: &str = "https://version.storj.io";

const MINIMUM_VERSION_POINTER: &str = "/processes/storagenode/minimum/version";

/// Client for the version service.
#[derive(Debug, Clone)]
pub struct VersionSource {
    http: reqwest::Client,
    url: String,
}

impl VersionSource {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    /// Fetch `processes.storagenode.minimum.version`.
    pub async fn fetch_minimum(&self, timeout: Duration) -> Result<String, VersionSourceError> {
        debug!("Fetching minimum version from {}", self.url);

        let response = self
            .http
            .get(&self.url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| VersionSourceError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VersionSourceError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|_| VersionSourceError::Parse)?;

        minimum_from_document(&body).ok_or(VersionSourceError::Parse)
    }
}

fn minimum_from_document(body: &Value) -> Option<String> {
    body.pointer(MINIMUM_VERSION_POINTER)
        .and_then(Value::as_str)
        .map(String::from)
}
