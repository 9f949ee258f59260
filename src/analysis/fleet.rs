//! Fleet-wide totals and the oldest running version.

use crate::analysis::satellites::bandwidth;
use crate::error::StatsError;
use crate::models::NodeSnapshot;
use crate::version::Version;
use serde::Serialize;

/// Totals across all configured nodes.
///
/// Only online nodes contribute disk and bandwidth figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FleetStatistics {
    pub total_nodes: usize,
    pub online_nodes: usize,
    pub up_to_date_nodes: usize,
    pub disk_allocated: u64,
    pub disk_used: u64,
    pub bandwidth_egress: u64,
    pub bandwidth_ingress: u64,
    pub bandwidth_utilization: u64,
}

impl FleetStatistics {
    /// Add one node to the running totals. Byte totals saturate.
    pub fn record(&mut self, snapshot: &NodeSnapshot) {
        self.total_nodes += 1;

        let Some(node) = snapshot.telemetry() else {
            return;
        };

        let bw = bandwidth(node);
        self.online_nodes += 1;
        self.disk_allocated = self.disk_allocated.saturating_add(node.disk_allocated);
        self.disk_used = self.disk_used.saturating_add(node.disk_used);
        self.bandwidth_egress = self.bandwidth_egress.saturating_add(bw.egress);
        self.bandwidth_ingress = self.bandwidth_ingress.saturating_add(bw.ingress);
        self.bandwidth_utilization = self.bandwidth_utilization.saturating_add(bw.utilization);
        if node.up_to_date {
            self.up_to_date_nodes += 1;
        }
    }

    /// Combine two partial aggregates.
    pub fn merge(self, other: Self) -> Self {
        Self {
            total_nodes: self.total_nodes + other.total_nodes,
            online_nodes: self.online_nodes + other.online_nodes,
            up_to_date_nodes: self.up_to_date_nodes + other.up_to_date_nodes,
            disk_allocated: self.disk_allocated.saturating_add(other.disk_allocated),
            disk_used: self.disk_used.saturating_add(other.disk_used),
            bandwidth_egress: self.bandwidth_egress.saturating_add(other.bandwidth_egress),
            bandwidth_ingress: self.bandwidth_ingress.saturating_add(other.bandwidth_ingress),
            bandwidth_utilization: self
                .bandwidth_utilization
                .saturating_add(other.bandwidth_utilization),
        }
    }

    /// Allocated minus used, floored at zero.
    pub fn disk_free(&self) -> u64 {
        self.disk_allocated.saturating_sub(self.disk_used)
    }
}

/// Fold snapshots into fleet totals. The result does not depend on order.
pub fn aggregate(snapshots: &[NodeSnapshot]) -> FleetStatistics {
    snapshots
        .iter()
        .fold(FleetStatistics::default(), |mut stats, snapshot| {
            stats.record(snapshot);
            stats
        })
}

/// The lowest version among online nodes.
///
/// Any malformed version among them makes the answer unknowable and is
/// returned as an error rather than skipped.
pub fn worst_version(snapshots: &[NodeSnapshot]) -> Result<Version, StatsError> {
    let mut worst: Option<Version> = None;

    for node in snapshots.iter().filter_map(NodeSnapshot::telemetry) {
        let version = Version::parse(&node.version)?;
        worst = match worst {
            Some(current) if current <= version => Some(current),
            _ => Some(version),
        };
    }

    worst.ok_or(StatsError::NoAvailableNodes)
}
