//! Version compliance check.
//!
//! Produces OK, CRITICAL or UNKNOWN. There is no warning tier for
//! versions.

use crate::analysis::worst_version;
use crate::error::VersionSourceError;
use crate::models::{ComplianceVerdict, HealthState, NodeSnapshot};
use crate::version::{compare, Version};
use std::cmp::Ordering;
use tracing::debug;

/// Compare the oldest observed version against the required minimum.
///
/// `None` on either side means the value could not be obtained.
pub fn evaluate(minimum_required: Option<&str>, observed_worst: Option<&str>) -> ComplianceVerdict {
    let unknown = |reason: String| ComplianceVerdict {
        state: HealthState::Unknown,
        minimum: minimum_required.map(String::from),
        observed: observed_worst.map(String::from),
        reason: Some(reason),
    };

    let (Some(minimum), Some(observed)) = (minimum_required, observed_worst) else {
        let missing = if minimum_required.is_none() {
            "minimum required version unavailable"
        } else {
            "no node version observed"
        };
        return unknown(missing.to_string());
    };

    let state = match compare(observed, minimum) {
        Ok(Ordering::Less) => HealthState::Critical,
        Ok(_) => HealthState::Ok,
        Err(e) => return unknown(e.to_string()),
    };
    debug!("Version check: minimum {} observed {} -> {}", minimum, observed, state);

    ComplianceVerdict {
        state,
        minimum: Some(minimum.to_string()),
        observed: Some(observed.to_string()),
        reason: None,
    }
}

/// Evaluate a completed scan against the result of the minimum lookup.
pub fn evaluate_fleet(
    minimum: &Result<String, VersionSourceError>,
    snapshots: &[NodeSnapshot],
) -> ComplianceVerdict {
    let observed = worst_version(snapshots);
    let mut verdict = evaluate(
        minimum.as_deref().ok(),
        observed.as_ref().ok().map(Version::as_str),
    );

    // Report the underlying cause rather than the generic one.
    if verdict.state == HealthState::Unknown {
        if let Err(e) = minimum {
            verdict.reason = Some(e.to_string());
        } else if let Err(e) = &observed {
            verdict.reason = Some(e.to_string());
        }
    }

    verdict
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NodeEndpoint, NodeTelemetry};
    use chrono::Utc;

    fn node(name: &str, version: &str) -> NodeSnapshot {
        NodeSnapshot::online(
            NodeEndpoint::new(name, "127.0.0.1", 14002),
            NodeTelemetry {
                node_id: name.to_string(),
                version: version.to_string(),
                disk_used: 0,
                disk_allocated: 0,
                bandwidth_used: 0,
                started_at: Utc::now(),
                up_to_date: true,
                satellites: Vec::new(),
                satellite_details: Vec::new(),
            },
        )
    }

    #[test]
    fn test_equal_versions_ok() {
        let verdict = evaluate(Some("1.2.0"), Some("1.2.0"));
        assert_eq!(verdict.state, HealthState::Ok);
        assert_eq!(verdict.minimum.as_deref(), Some("1.2.0"));
        assert_eq!(verdict.observed.as_deref(), Some("1.2.0"));
    }

    #[test]
    fn test_older_node_critical() {
        assert_eq!(evaluate(Some("1.3.0"), Some("1.2.9")).state, HealthState::Critical);
    }

    #[test]
    fn test_numeric_comparison() {
        assert_eq!(evaluate(Some("1.9.0"), Some("1.10.0")).state, HealthState::Ok);
        assert_eq!(evaluate(Some("1.10.0"), Some("1.9.9")).state, HealthState::Critical);
    }

    #[test]
    fn test_unobtainable_inputs_unknown() {
        assert_eq!(evaluate(Some("1.2.0"), None).state, HealthState::Unknown);
        assert_eq!(evaluate(None, Some("1.2.0")).state, HealthState::Unknown);
        assert_eq!(evaluate(None, None).state, HealthState::Unknown);
    }

    #[test]
    fn test_malformed_is_unknown_not_critical() {
        let verdict = evaluate(Some("1.2.0"), Some("1.x"));
        assert_eq!(verdict.state, HealthState::Unknown);
        assert!(verdict.reason.unwrap().contains("1.x"));
        assert_eq!(evaluate(Some("latest"), Some("1.2.0")).state, HealthState::Unknown);
    }

    #[test]
    fn test_evaluate_fleet_no_nodes() {
        let verdict = evaluate_fleet(&Ok("1.2.0".to_string()), &[]);
        assert_eq!(verdict.state, HealthState::Unknown);
        assert_eq!(verdict.reason.as_deref(), Some("no available nodes in the fleet"));
    }

    #[test]
    fn test_evaluate_fleet_source_failure() {
        let snapshots = vec![node("a", "1.2.0")];
        let verdict = evaluate_fleet(&Err(VersionSourceError::Status(503)), &snapshots);
        assert_eq!(verdict.state, HealthState::Unknown);
        assert_eq!(verdict.observed.as_deref(), Some("1.2.0"));
        assert!(verdict.reason.unwrap().contains("503"));
    }

    #[test]
    fn test_evaluate_fleet_uses_oldest_node() {
        let snapshots = vec![node("a", "1.3.0"), node("b", "1.2.0")];
        let verdict = evaluate_fleet(&Ok("1.2.5".to_string()), &snapshots);
        assert_eq!(verdict.state, HealthState::Critical);
        assert_eq!(verdict.observed.as_deref(), Some("1.2.0"));
    }
}
