//! Error types for fleet polling and evaluation.
//!
//! Nothing in here is fatal to the process. Every variant maps to a
//! reportable state: an offline node, an excluded satellite, or an
//! `UNKNOWN` verdict.

use thiserror::Error;

/// A version string that is not dot-separated non-negative integers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("malformed version string: {input:?}")]
    Malformed { input: String },
}

/// Failure to read a node's primary status endpoint.
#[derive(Error, Debug, Clone)]
pub enum NodeError {
    #[error("node {node} unavailable: {reason}")]
    Unavailable { node: String, reason: String },
}

impl NodeError {
    pub fn unavailable(node: &str, reason: impl Into<String>) -> Self {
        NodeError::Unavailable {
            node: node.to_string(),
            reason: reason.into(),
        }
    }

    /// Human-readable failure reason without the node prefix.
    pub fn reason(&self) -> &str {
        match self {
            NodeError::Unavailable { reason, .. } => reason,
        }
    }
}

/// Failure to read one satellite's detail endpoint.
#[derive(Error, Debug, Clone)]
pub enum SatelliteError {
    #[error("satellite {satellite} unavailable: {reason}")]
    Unavailable { satellite: String, reason: String },
}

/// Empty-input and version edge cases in the aggregators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    #[error("node reports no satellites")]
    NoSatellites,

    #[error("no available nodes in the fleet")]
    NoAvailableNodes,

    #[error(transparent)]
    Version(#[from] VersionError),
}

/// Failure to obtain the authoritative minimum version.
#[derive(Error, Debug)]
pub enum VersionSourceError {
    #[error("version source request failed: {0}")]
    Request(String),

    #[error("version source returned HTTP {0}")]
    Status(u16),

    #[error("version source response is missing processes.storagenode.minimum.version")]
    Parse,
}

/// The fleet scan was abandoned before it completed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("fleet scan cancelled")]
    Cancelled,
}
