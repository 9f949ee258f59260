//! Dashboard API response shapes.
//!
//! These mirror the JSON returned by `/api/sno/` and
//! `/api/sno/satellite/{id}` and are converted into the models in
//! `crate::models` once parsed.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Response of `GET /api/sno/`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnoResponse {
    #[serde(rename = "nodeID")]
    pub node_id: String,
    pub version: String,
    pub up_to_date: bool,
    #[serde(deserialize_with = "de_timestamp")]
    pub started_at: DateTime<Utc>,
    pub disk_space: DiskSpace,
    pub bandwidth: Bandwidth,
    #[serde(default)]
    pub satellites: Vec<SatelliteListing>,
}

#[derive(Debug, Deserialize)]
pub struct DiskSpace {
    #[serde(deserialize_with = "de_count")]
    pub used: u64,
    /// Space allocated to the node.
    #[serde(deserialize_with = "de_count")]
    pub available: u64,
}

#[derive(Debug, Deserialize)]
pub struct Bandwidth {
    #[serde(deserialize_with = "de_count")]
    pub used: u64,
}

#[derive(Debug, Deserialize)]
pub struct SatelliteListing {
    pub id: String,
    #[serde(default, deserialize_with = "de_timestamp_opt")]
    pub disqualified: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_timestamp_opt")]
    pub suspended: Option<DateTime<Utc>>,
}

/// Response of `GET /api/sno/satellite/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SatelliteResponse {
    pub audit: Audit,
    #[serde(deserialize_with = "de_count")]
    pub egress_summary: u64,
    #[serde(deserialize_with = "de_count")]
    pub ingress_summary: u64,
    #[serde(deserialize_with = "de_timestamp")]
    pub node_joined_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    #[serde(deserialize_with = "de_count")]
    pub success_count: u64,
}

/// Parse a dashboard timestamp.
///
/// RFC 3339 is tried first. Otherwise the trailing zone marker is
/// stripped and the rest is read as naive UTC with fractional seconds.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(ts.with_timezone(&Utc));
    }

    let naive = input
        .strip_suffix('Z')
        .or_else(|| input.strip_suffix("UTC"))
        .unwrap_or(input)
        .trim_end();
    NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|ts| ts.and_utc())
}

fn de_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

fn de_timestamp_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw))),
    }
}

/// Counters are integers, but some dashboard versions emit floats.
///
/// Floats that do not fit in a `u64` are rejected rather than clamped.
fn de_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(u64),
        Float(f64),
    }

    // 2^64, the first float past u64::MAX.
    const LIMIT: f64 = 18_446_744_073_709_551_616.0;

    match Number::deserialize(deserializer)? {
        Number::Int(n) => Ok(n),
        Number::Float(f) if f.is_finite() && f >= 0.0 && f < LIMIT => Ok(f as u64),
        Number::Float(f) => Err(serde::de::Error::custom(format!("invalid count: {}", f))),
    }
}
