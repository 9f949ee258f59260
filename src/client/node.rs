//! Storage node dashboard client.
//!
//! One primary call to `/api/sno/`, then one call per listed satellite.
//! Both phases share a single deadline so a node never costs more than
//! its timeout, however many satellites it reports.

use crate::client::wire::{SatelliteListing, SatelliteResponse, SnoResponse};
use crate::error::{NodeError, SatelliteError};
use crate::models::{NodeEndpoint, NodeTelemetry, SatelliteSnapshot};
use futures::stream::{self, StreamExt};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Stateless dashboard client. Cheap to share by reference across tasks.
#[derive(Debug, Clone)]
pub struct NodeClient {
    http: reqwest::Client,
    satellite_concurrency: usize,
}

impl NodeClient {
    pub fn new(http: reqwest::Client, satellite_concurrency: usize) -> Self {
        Self {
            http,
            satellite_concurrency: satellite_concurrency.max(1),
        }
    }

    /// Read one node's telemetry.
    ///
    /// Fails with `NodeError::Unavailable` if the primary status call
    /// cannot be completed and parsed before `timeout`. Satellite
    /// failures are logged and leave that satellite out of
    /// `satellite_details`.
    pub async fn fetch_snapshot(
        &self,
        endpoint: &NodeEndpoint,
        timeout: Duration,
    ) -> Result<NodeTelemetry, NodeError> {
        let deadline = Instant::now() + timeout;
        let url = format!("{}/sno/", endpoint.api_base());

        debug!("Fetching status for {}", endpoint);
        let sno: SnoResponse = self
            .get_json(&url, deadline)
            .await
            .map_err(|reason| NodeError::unavailable(&endpoint.name, reason))?;

        let satellite_details = self
            .fetch_satellites(endpoint, &sno.satellites, deadline)
            .await;

        debug!(
            "{}: {} of {} satellites answered",
            endpoint.name,
            satellite_details.len(),
            sno.satellites.len()
        );

        Ok(NodeTelemetry {
            node_id: sno.node_id,
            version: sno.version,
            disk_used: sno.disk_space.used,
            disk_allocated: sno.disk_space.available,
            bandwidth_used: sno.bandwidth.used,
            started_at: sno.started_at,
            up_to_date: sno.up_to_date,
            satellites: sno.satellites.into_iter().map(|s| s.id).collect(),
            satellite_details,
        })
    }

    /// Fetch satellite details in listing order, dropping failures.
    async fn fetch_satellites(
        &self,
        endpoint: &NodeEndpoint,
        listings: &[SatelliteListing],
        deadline: Instant,
    ) -> Vec<SatelliteSnapshot> {
        stream::iter(listings)
            .map(|listing| self.fetch_satellite(endpoint, listing, deadline))
            .buffered(self.satellite_concurrency)
            .filter_map(|result| async move {
                match result {
                    Ok(snapshot) => Some(snapshot),
                    Err(e) => {
                        warn!("{}: {}", endpoint.name, e);
                        None
                    }
                }
            })
            .collect()
            .await
    }

    async fn fetch_satellite(
        &self,
        endpoint: &NodeEndpoint,
        listing: &SatelliteListing,
        deadline: Instant,
    ) -> Result<SatelliteSnapshot, SatelliteError> {
        let url = format!("{}/sno/satellite/{}", endpoint.api_base(), listing.id);

        let detail: SatelliteResponse =
            self.get_json(&url, deadline)
                .await
                .map_err(|reason| SatelliteError::Unavailable {
                    satellite: listing.id.clone(),
                    reason,
                })?;

        Ok(SatelliteSnapshot {
            satellite_id: listing.id.clone(),
            audit_success_count: detail.audit.success_count,
            disqualified: listing.disqualified,
            suspended: listing.suspended,
            node_joined_at: detail.node_joined_at,
            egress_summary: detail.egress_summary,
            ingress_summary: detail.ingress_summary,
        })
    }

    /// GET a JSON document, giving up at `deadline`.
    async fn get_json<T: DeserializeOwned>(&self, url: &str, deadline: Instant) -> Result<T, String> {
        let request = async {
            let response = self.http.get(url).send().await.map_err(|e| {
                if e.is_timeout() {
                    "request timed out".to_string()
                } else if e.is_connect() {
                    format!("cannot connect to {}", url)
                } else {
                    format!("request failed: {}", e)
                }
            })?;

            let status = response.status();
            if !status.is_success() {
                return Err(format!("HTTP {} from {}", status, url));
            }

            response
                .json::<T>()
                .await
                .map_err(|e| format!("unexpected response from {}: {}", url, e))
        };

        match tokio::time::timeout_at(deadline, request).await {
            Ok(result) => result,
            Err(_) => Err(format!("timed out waiting for {}", url)),
        }
    }
}
