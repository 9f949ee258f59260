//! Aggregation modules.
//!
//! `satellites` derives per-node figures from satellite details and
//! `fleet` folds node snapshots into fleet totals.

pub mod fleet;
pub mod satellites;

pub use fleet::{aggregate, worst_version, FleetStatistics};
pub use satellites::{bandwidth, node_age, satellite_counts, vetting_progress, SatelliteCounts};
