//! Data models for fleet telemetry.
//!
//! This module contains the core data structures passed between the
//! node client, the aggregators, the compliance check and the report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a satellite as reported by a node.
pub type SatelliteId = String;

/// Identity of one node in the fleet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeEndpoint {
    /// Fleet-unique display name.
    pub name: String,
    /// Host name or IP address of the dashboard.
    pub address: String,
    /// Dashboard API port.
    #[serde(rename = "port")]
    pub api_port: u16,
}

impl NodeEndpoint {
    pub fn new(name: impl Into<String>, address: impl Into<String>, api_port: u16) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            api_port,
        }
    }

    /// Base URL of the node's dashboard API.
    pub fn api_base(&self) -> String {
        format!("http://{}:{}/api", self.address, self.api_port)
    }
}

impl fmt::Display for NodeEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.name, self.address, self.api_port)
    }
}

/// Per-(node, satellite) read.
#[derive(Debug, Clone, Serialize)]
pub struct SatelliteSnapshot {
    pub satellite_id: SatelliteId,
    pub audit_success_count: u64,
    /// Presence means the node is disqualified on this satellite.
    pub disqualified: Option<DateTime<Utc>>,
    /// Presence means the node is suspended on this satellite.
    pub suspended: Option<DateTime<Utc>>,
    pub node_joined_at: DateTime<Utc>,
    pub egress_summary: u64,
    pub ingress_summary: u64,
}

/// Telemetry read from a reachable node.
///
/// `disk_used` may exceed `disk_allocated`; the dashboard does not
/// guarantee otherwise.
#[derive(Debug, Clone, Serialize)]
pub struct NodeTelemetry {
    pub node_id: String,
    pub version: String,
    pub disk_used: u64,
    pub disk_allocated: u64,
    pub bandwidth_used: u64,
    pub started_at: DateTime<Utc>,
    pub up_to_date: bool,
    /// Satellite IDs in the order the node listed them.
    pub satellites: Vec<SatelliteId>,
    /// Details for the satellites that answered. Failed ones are absent.
    pub satellite_details: Vec<SatelliteSnapshot>,
}

/// Point-in-time read of one node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot {
    pub endpoint: NodeEndpoint,
    #[serde(flatten)]
    pub state: NodeState,
}

/// Whether a node answered its primary status call.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum NodeState {
    Online(NodeTelemetry),
    Offline { reason: String },
}

impl NodeSnapshot {
    pub fn online(endpoint: NodeEndpoint, telemetry: NodeTelemetry) -> Self {
        Self {
            endpoint,
            state: NodeState::Online(telemetry),
        }
    }

    pub fn offline(endpoint: NodeEndpoint, reason: impl Into<String>) -> Self {
        Self {
            endpoint,
            state: NodeState::Offline {
                reason: reason.into(),
            },
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, NodeState::Online(_))
    }

    /// Telemetry if the node is online.
    pub fn telemetry(&self) -> Option<&NodeTelemetry> {
        match &self.state {
            NodeState::Online(t) => Some(t),
            NodeState::Offline { .. } => None,
        }
    }

    pub fn name(&self) -> &str {
        &self.endpoint.name
    }
}

/// Fleet health verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthState {
    Ok,
    #[allow(dead_code)] // Not produced by the version check
    Warning,
    Critical,
    Unknown,
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthState::Ok => write!(f, "OK"),
            HealthState::Warning => write!(f, "WARNING"),
            HealthState::Critical => write!(f, "CRITICAL"),
            HealthState::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl HealthState {
    /// Nagios plugin exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            HealthState::Ok => 0,
            HealthState::Warning => 1,
            HealthState::Critical => 2,
            HealthState::Unknown => 3,
        }
    }
}

/// Result of a version compliance evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceVerdict {
    pub state: HealthState,
    /// Authoritative minimum version, if it was obtained.
    pub minimum: Option<String>,
    /// Oldest version observed across available nodes, if any.
    pub observed: Option<String>,
    /// Why the verdict is `UNKNOWN`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ComplianceVerdict {
    /// One-line status message in the Nagios plugin style.
    ///
    /// The version check has no WARNING tier; a `Warning` state shares the
    /// outdated wording.
    pub fn message(&self) -> String {
        let min = self.minimum.as_deref().unwrap_or("N/A");
        let nodes = self.observed.as_deref().unwrap_or("N/A");
        match self.state {
            HealthState::Ok => format!("Nodes are up to date. Minimum: {} ; Nodes: {}", min, nodes),
            HealthState::Critical | HealthState::Warning => {
                format!("Nodes are OUTDATED. Minimum: {} ; Nodes: {}", min, nodes)
            }
            HealthState::Unknown => format!(
                "Unable to determine node versions: {}",
                self.reason.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_api_base() {
        let endpoint = NodeEndpoint::new("alpha", "10.0.0.5", 14002);
        assert_eq!(endpoint.api_base(), "http://10.0.0.5:14002/api");
        assert_eq!(endpoint.to_string(), "alpha (10.0.0.5:14002)");
    }

    #[test]
    fn test_endpoint_deserializes_registry_record() {
        let endpoint: NodeEndpoint =
            serde_json::from_str(r#"{"name": "alpha", "address": "localhost", "port": 14002}"#)
                .unwrap();
        assert_eq!(endpoint.api_port, 14002);
    }

    #[test]
    fn test_offline_snapshot() {
        let snapshot = NodeSnapshot::offline(NodeEndpoint::new("a", "h", 1), "timed out");
        assert!(!snapshot.is_available());
        assert!(snapshot.telemetry().is_none());
        assert_eq!(snapshot.name(), "a");
    }

    #[test]
    fn test_health_exit_codes() {
        assert_eq!(HealthState::Ok.exit_code(), 0);
        assert_eq!(HealthState::Warning.exit_code(), 1);
        assert_eq!(HealthState::Critical.exit_code(), 2);
        assert_eq!(HealthState::Unknown.exit_code(), 3);
    }

    #[test]
    fn test_verdict_message() {
        let verdict = ComplianceVerdict {
            state: HealthState::Critical,
            minimum: Some("1.3.0".to_string()),
            observed: Some("1.2.9".to_string()),
            reason: None,
        };
        assert_eq!(
            verdict.message(),
            "Nodes are OUTDATED. Minimum: 1.3.0 ; Nodes: 1.2.9"
        );

        let unknown = ComplianceVerdict {
            state: HealthState::Unknown,
            minimum: None,
            observed: None,
            reason: Some("no available nodes in the fleet".to_string()),
        };
        assert!(unknown.message().contains("no available nodes"));
    }

    #[test]
    fn test_warning_has_no_message_of_its_own() {
        let verdict = |state| ComplianceVerdict {
            state,
            minimum: Some("1.3.0".to_string()),
            observed: Some("1.2.9".to_string()),
            reason: None,
        };
        assert_eq!(
            verdict(HealthState::Warning).message(),
            verdict(HealthState::Critical).message()
        );
    }
}
