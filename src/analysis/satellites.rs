//! Per-node statistics derived from satellite details.

use crate::error::StatsError;
use crate::models::{NodeTelemetry, SatelliteSnapshot};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;

/// Successful audits a satellite needs before it considers a node vetted.
pub const AUDITS_REQUIRED_FOR_VETTING: u64 = 100;

/// Mean vetting progress across satellites, as a percentage in [0, 100].
///
/// Each satellite contributes `min(successCount / 100, 1.0)`.
pub fn vetting_progress(satellites: &[SatelliteSnapshot]) -> Result<f64, StatsError> {
    if satellites.is_empty() {
        return Err(StatsError::NoSatellites);
    }

    let total: f64 = satellites
        .iter()
        .map(|s| {
            let ratio = s.audit_success_count as f64 / AUDITS_REQUIRED_FOR_VETTING as f64;
            ratio.min(1.0)
        })
        .sum();

    Ok(total / satellites.len() as f64 * 100.0)
}

/// Time since the node first joined any satellite.
pub fn node_age(satellites: &[SatelliteSnapshot], now: DateTime<Utc>) -> Result<Duration, StatsError> {
    satellites
        .iter()
        .map(|s| s.node_joined_at)
        .min()
        .map(|joined| now - joined)
        .ok_or(StatsError::NoSatellites)
}

/// Connected/suspended/disqualified satellite counts.
///
/// `connected` is every satellite, including suspended and disqualified
/// ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SatelliteCounts {
    pub connected: usize,
    pub suspended: usize,
    pub disqualified: usize,
}

impl fmt::Display for SatelliteCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.connected, self.suspended, self.disqualified)
    }
}

pub fn satellite_counts(satellites: &[SatelliteSnapshot]) -> SatelliteCounts {
    SatelliteCounts {
        connected: satellites.len(),
        suspended: satellites.iter().filter(|s| s.suspended.is_some()).count(),
        disqualified: satellites.iter().filter(|s| s.disqualified.is_some()).count(),
    }
}

/// Bandwidth of one node.
///
/// `utilization` is the node's own total and is not expected to equal
/// `egress + ingress`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BandwidthSummary {
    pub egress: u64,
    pub ingress: u64,
    pub utilization: u64,
}

pub fn bandwidth(node: &NodeTelemetry) -> BandwidthSummary {
    let (egress, ingress) = node
        .satellite_details
        .iter()
        .fold((0u64, 0u64), |(e, i), s| {
            (
                e.saturating_add(s.egress_summary),
                i.saturating_add(s.ingress_summary),
            )
        });

    BandwidthSummary {
        egress,
        ingress,
        utilization: node.bandwidth_used,
    }
}
