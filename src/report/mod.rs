//! Fleet report assembly and rendering.

pub mod generator;

pub use generator::{render_json, render_text};

use crate::analysis::{
    aggregate, bandwidth, node_age, satellite_counts, vetting_progress, FleetStatistics,
    SatelliteCounts,
};
use crate::models::{ComplianceVerdict, NodeSnapshot};
use chrono::{DateTime, Duration, Utc};
use serde::{Serialize, Serializer};

/// One row of the node table. Every field but the name is `None` for an
/// offline node, or when the value cannot be derived.
#[derive(Debug, Clone, Serialize)]
pub struct NodeReport {
    pub name: String,
    pub online: bool,
    pub node_id: Option<String>,
    #[serde(serialize_with = "serialize_secs")]
    pub uptime: Option<Duration>,
    #[serde(serialize_with = "serialize_secs")]
    pub age: Option<Duration>,
    pub version: Option<String>,
    pub up_to_date: Option<bool>,
    pub disk_allocated: Option<u64>,
    pub disk_used_percent: Option<f64>,
    pub bandwidth_utilization: Option<u64>,
    pub satellites: Option<SatelliteCounts>,
    pub vetting_progress: Option<f64>,
}

impl NodeReport {
    pub fn from_snapshot(snapshot: &NodeSnapshot, now: DateTime<Utc>) -> Self {
        let Some(node) = snapshot.telemetry() else {
            return Self {
                name: snapshot.name().to_string(),
                online: false,
                node_id: None,
                uptime: None,
                age: None,
                version: None,
                up_to_date: None,
                disk_allocated: None,
                disk_used_percent: None,
                bandwidth_utilization: None,
                satellites: None,
                vetting_progress: None,
            };
        };

        let details = &node.satellite_details;
        let disk_used_percent = (node.disk_allocated > 0)
            .then(|| node.disk_used as f64 / node.disk_allocated as f64 * 100.0);

        Self {
            name: snapshot.name().to_string(),
            online: true,
            node_id: Some(node.node_id.clone()),
            uptime: Some(now - node.started_at),
            age: node_age(details, now).ok(),
            version: Some(node.version.clone()),
            up_to_date: Some(node.up_to_date),
            disk_allocated: Some(node.disk_allocated),
            disk_used_percent,
            bandwidth_utilization: Some(bandwidth(node).utilization),
            satellites: Some(satellite_counts(details)),
            vetting_progress: vetting_progress(details).ok(),
        }
    }
}

fn serialize_secs<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(d) => serializer.serialize_some(&d.num_seconds()),
        None => serializer.serialize_none(),
    }
}

/// Everything a report needs from one scan.
#[derive(Debug, Clone, Serialize)]
pub struct FleetReport {
    pub generated_at: DateTime<Utc>,
    pub statistics: FleetStatistics,
    pub nodes: Vec<NodeReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compliance: Option<ComplianceVerdict>,
}

impl FleetReport {
    /// Aggregate a completed scan. Rows are sorted by node name.
    pub fn build(
        snapshots: &[NodeSnapshot],
        now: DateTime<Utc>,
        compliance: Option<ComplianceVerdict>,
    ) -> Self {
        let mut nodes: Vec<NodeReport> = snapshots
            .iter()
            .map(|s| NodeReport::from_snapshot(s, now))
            .collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name));

        Self {
            generated_at: now,
            statistics: aggregate(snapshots),
            nodes,
            compliance,
        }
    }
}
