//! Concurrent fleet scan.
//!
//! Nodes are polled in parallel up to a concurrency limit. Results are
//! collected in full before anything is aggregated; a cancelled scan
//! yields nothing.

use crate::client::NodeClient;
use crate::error::ScanError;
use crate::models::{NodeEndpoint, NodeSnapshot};
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Scan settings.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Budget for one node, satellite calls included.
    pub timeout: Duration,
    /// Maximum nodes polled at once.
    pub concurrency: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            concurrency: 8,
        }
    }
}

pub struct FleetScanner {
    client: NodeClient,
    options: ScanOptions,
}

impl FleetScanner {
    pub fn new(client: NodeClient, options: ScanOptions) -> Self {
        Self { client, options }
    }

    /// Poll every endpoint. Snapshots come back in registry order.
    ///
    /// A node that cannot be read becomes an offline snapshot; this never
    /// fails.
    pub async fn scan(&self, endpoints: &[NodeEndpoint]) -> Vec<NodeSnapshot> {
        info!(
            "Scanning {} nodes (concurrency {}, timeout {:?})",
            endpoints.len(),
            self.options.concurrency,
            self.options.timeout
        );

        let mut indexed: Vec<(usize, NodeSnapshot)> = stream::iter(endpoints.iter().enumerate())
            .map(|(index, endpoint)| async move { (index, self.poll_node(endpoint).await) })
            .buffer_unordered(self.options.concurrency.max(1))
            .collect()
            .await;

        indexed.sort_by_key(|(index, _)| *index);
        let snapshots: Vec<NodeSnapshot> = indexed.into_iter().map(|(_, s)| s).collect();

        let online = snapshots.iter().filter(|s| s.is_available()).count();
        info!("Scan complete: {}/{} nodes online", online, snapshots.len());
        snapshots
    }

    /// Poll every endpoint unless `shutdown` resolves first.
    ///
    /// On cancellation in-flight requests are dropped and no partial
    /// results are returned.
    pub async fn scan_until<F>(
        &self,
        endpoints: &[NodeEndpoint],
        shutdown: F,
    ) -> Result<Vec<NodeSnapshot>, ScanError>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            snapshots = self.scan(endpoints) => Ok(snapshots),
            _ = shutdown => {
                warn!("Fleet scan cancelled");
                Err(ScanError::Cancelled)
            }
        }
    }

    async fn poll_node(&self, endpoint: &NodeEndpoint) -> NodeSnapshot {
        match self.client.fetch_snapshot(endpoint, self.options.timeout).await {
            Ok(telemetry) => {
                debug!("{} online, version {}", endpoint.name, telemetry.version);
                NodeSnapshot::online(endpoint.clone(), telemetry)
            }
            Err(e) => {
                warn!("{}", e);
                NodeSnapshot::offline(endpoint.clone(), e.reason())
            }
        }
    }
}
