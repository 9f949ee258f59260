//! Semantic version comparison.
//!
//! Versions are compared component by component as integers, so
//! `1.10.0` sorts after `1.9.0`. Missing trailing components count as 0.

use crate::error::VersionError;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A parsed dot-separated version such as `1.14.7`.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    components: Vec<u64>,
}

impl Version {
    /// Parse a version string. A single leading `v` is accepted.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let malformed = || VersionError::Malformed {
            input: input.to_string(),
        };

        let trimmed = input.trim();
        let body = trimmed.strip_prefix('v').unwrap_or(trimmed);
        if body.is_empty() {
            return Err(malformed());
        }

        let components = body
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(malformed());
                }
                part.parse::<u64>().map_err(|_| malformed())
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: trimmed.to_string(),
            components,
        })
    }

    /// The string this version was parsed from.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn component(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Equality follows the numeric ordering: `1.2` == `1.2.0`.
impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// Compare two version strings numerically.
pub fn compare(a: &str, b: &str) -> Result<Ordering, VersionError> {
    Ok(Version::parse(a)?.cmp(&Version::parse(b)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_not_lexical() {
        assert_eq!(compare("1.9.0", "1.10.0"), Ok(Ordering::Less));
        assert_eq!(compare("1.10.0", "1.9.0"), Ok(Ordering::Greater));
    }

    #[test]
    fn test_missing_components_are_zero() {
        assert_eq!(compare("1.2", "1.2.0"), Ok(Ordering::Equal));
        assert_eq!(compare("1.2", "1.2.1"), Ok(Ordering::Less));
        assert_eq!(compare("2", "1.99.99"), Ok(Ordering::Greater));
    }

    #[test]
    fn test_leading_v_accepted() {
        assert_eq!(compare("v1.14.7", "1.14.7"), Ok(Ordering::Equal));
        assert_eq!(Version::parse("v1.14.7").unwrap().as_str(), "v1.14.7");
    }

    #[test]
    fn test_malformed_versions() {
        for bad in ["", "v", "1..2", "1.x.0", "1.2.-3", "1.2.3-rc1", " . "] {
            assert!(
                matches!(Version::parse(bad), Err(VersionError::Malformed { .. })),
                "expected {:?} to be malformed",
                bad
            );
        }
        assert!(compare("1.2.0", "abc").is_err());
    }

    #[test]
    fn test_antisymmetric_and_transitive() {
        let versions = [
            "0.9", "1.0.0", "1.2", "1.2.0", "1.2.9", "1.9.0", "1.10.0", "1.10.1", "2",
        ];

        for a in versions {
            for b in versions {
                let ab = compare(a, b).unwrap();
                let ba = compare(b, a).unwrap();
                assert_eq!(ab, ba.reverse(), "antisymmetry broken for {} / {}", a, b);

                for c in versions {
                    let bc = compare(b, c).unwrap();
                    if ab != Ordering::Greater && bc != Ordering::Greater {
                        assert_ne!(
                            compare(a, c).unwrap(),
                            Ordering::Greater,
                            "transitivity broken for {} <= {} <= {}",
                            a,
                            b,
                            c
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_min_picks_oldest() {
        let versions: Vec<Version> = ["1.10.0", "1.9.3", "1.12.1"]
            .iter()
            .map(|v| v.parse().unwrap())
            .collect();
        let oldest = versions.iter().min().unwrap();
        assert_eq!(oldest.as_str(), "1.9.3");
    }
}
