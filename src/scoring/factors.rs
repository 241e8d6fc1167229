use super::config::{DistanceScoring, WorkloadScoring};

/// Points of the first bracket whose inclusive upper bound covers `value`,
/// or `beyond` when none does.
fn bracket_points<T, V, F1, F2>(value: V, brackets: &[T], beyond: u32, upper: F1, points: F2) -> u32
where
    V: PartialOrd + Copy,
    F1: Fn(&T) -> V,
    F2: Fn(&T) -> u32,
{
    brackets
        .iter()
        .find(|bracket| value <= upper(bracket))
        .map(points)
        .unwrap_or(beyond)
}

/// Distance sub-score for a known distance in kilometers
pub fn distance_points(km: f64, scoring: &DistanceScoring) -> u32 {
    bracket_points(
        km,
        &scoring.brackets,
        scoring.beyond_points,
        |b| b.up_to_km,
        |b| b.points,
    )
}

/// Workload sub-score for the number of courses already driven today
pub fn workload_points(courses_today: u32, scoring: &WorkloadScoring) -> u32 {
    bracket_points(
        courses_today,
        &scoring.brackets,
        scoring.beyond_points,
        |b| b.up_to,
        |b| b.points,
    )
}
