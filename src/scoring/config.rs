use serde::{Deserialize, Serialize};

/// Upper bound of the distance sub-score
pub const MAX_DISTANCE_POINTS: u32 = 40;
/// Upper bound of the workload sub-score
pub const MAX_WORKLOAD_POINTS: u32 = 30;
/// Upper bound of the availability sub-score
pub const MAX_AVAILABILITY_POINTS: u32 = 30;

/// Main scoring configuration.
///
/// A driver's score is the sum of three independently capped sub-scores:
/// distance (0-40), workload (0-30) and availability (0-30). Every section is
/// optional; missing sections keep their defaults.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   distance:
///     brackets:
///       - { up_to_km: 10, points: 40 }
///       - { up_to_km: 20, points: 30 }
///     lookup_failed_points: 20
///   workload:
///     brackets:
///       - { up_to: 2, points: 30 }
///   availability_points: 30
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    pub distance: DistanceScoring,
    pub workload: WorkloadScoring,
    /// Awarded while a driver is available
    pub availability_points: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            distance: DistanceScoring::default(),
            workload: WorkloadScoring::default(),
            availability_points: 30,
        }
    }
}

/// Distance sub-score: how far the driver's last drop-off is from the pickup.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DistanceScoring {
    /// Checked in order; the first bracket whose bound covers the distance wins
    pub brackets: Vec<DistanceBracket>,
    /// Farther than every bracket
    pub beyond_points: u32,
    /// Lookup failed: distance unknown, neither penalize nor reward
    pub lookup_failed_points: u32,
    /// Driver has not driven yet today and is assumed at base
    pub no_previous_course_points: u32,
    /// Driver has a previous course without a recorded drop-off
    pub no_drop_off_points: u32,
}

impl Default for DistanceScoring {
    fn default() -> Self {
        Self {
            brackets: vec![
                DistanceBracket::new(10.0, 40),
                DistanceBracket::new(20.0, 30),
                DistanceBracket::new(30.0, 20),
                DistanceBracket::new(50.0, 10),
            ],
            beyond_points: 0,
            lookup_failed_points: 20,
            no_previous_course_points: 25,
            no_drop_off_points: 20,
        }
    }
}

/// Distances up to and including `up_to_km` earn `points`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DistanceBracket {
    pub up_to_km: f64,
    pub points: u32,
}

impl DistanceBracket {
    pub fn new(up_to_km: f64, points: u32) -> Self {
        Self { up_to_km, points }
    }
}

/// Workload sub-score: fewer courses today means more points.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WorkloadScoring {
    pub brackets: Vec<WorkloadBracket>,
    pub beyond_points: u32,
}

impl Default for WorkloadScoring {
    fn default() -> Self {
        Self {
            brackets: vec![
                WorkloadBracket::new(2, 30),
                WorkloadBracket::new(4, 20),
                WorkloadBracket::new(6, 10),
            ],
            beyond_points: 0,
        }
    }
}

/// Up to and including `up_to` courses today earn `points`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WorkloadBracket {
    pub up_to: u32,
    pub points: u32,
}

impl WorkloadBracket {
    pub fn new(up_to: u32, points: u32) -> Self {
        Self { up_to, points }
    }
}
