use serde::Serialize;

use super::error::LookupError;

/// Canonical form of an address used for cache keys.
///
/// Leading/trailing whitespace is dropped, inner whitespace runs collapse to
/// a single space and letters are lowercased. Accents and punctuation are
/// kept as-is, so "Gare de Chartres" and "gare  de chartres " share a key but
/// "Gare de Chartres" and "Gare de Chârtres" do not.
pub fn normalize_address(address: &str) -> String {
    address
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Ordered (origin, destination) pair. Direction matters: routes can be
/// asymmetric, so (A, B) and (B, A) are different queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DistanceQuery {
    origin: String,
    destination: String,
}

impl DistanceQuery {
    pub fn new(origin: &str, destination: &str) -> Self {
        Self {
            origin: normalize_address(origin),
            destination: normalize_address(destination),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }
}

/// Travel distance and duration between two addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Distance {
    pub meters: u64,
    pub seconds: u64,
}

impl Distance {
    pub fn new(meters: u64, seconds: u64) -> Self {
        Self { meters, seconds }
    }

    /// Distance in kilometers, rounded to 2 decimals
    pub fn km(&self) -> f64 {
        (self.meters as f64 / 10.0).round() / 100.0
    }

    /// Duration in whole minutes, rounded to nearest
    pub fn minutes(&self) -> u64 {
        (self.seconds as f64 / 60.0).round() as u64
    }
}

/// Outcome of a distance lookup. Failures are values, not errors: callers
/// decide how to degrade.
#[derive(Debug, Clone, PartialEq)]
pub enum DistanceResult {
    Found(Distance),
    Failed(LookupError),
}

impl DistanceResult {
    pub fn is_success(&self) -> bool {
        matches!(self, DistanceResult::Found(_))
    }

    pub fn distance(&self) -> Option<Distance> {
        match self {
            DistanceResult::Found(distance) => Some(*distance),
            DistanceResult::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&LookupError> {
        match self {
            DistanceResult::Found(_) => None,
            DistanceResult::Failed(err) => Some(err),
        }
    }
}
