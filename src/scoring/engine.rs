use serde::Serialize;
use std::fmt;
use tracing::debug;

use super::config::ScoringConfig;
use super::factors::{distance_points, workload_points};
use crate::credentials::ApiKey;
use crate::dispatch::types::{Course, Driver};
use crate::distance::{Distance, DistanceOracle, DistanceResult};

/// Separator used when a breakdown is rendered on one line
pub const BREAKDOWN_SEPARATOR: &str = " | ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Distance,
    Workload,
    Availability,
}

/// What a component's points were based on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Basis {
    /// Distance from the last drop-off, in km
    Measured { km: f64 },
    /// Distance lookup failed; fallback points awarded
    LookupFailed { reason: String },
    /// Last course has no drop-off address
    NoDropOff,
    /// No course driven yet
    NoPreviousCourse,
    Courses { count: u32 },
    Available,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentScore {
    pub component: Component,
    pub basis: Basis,
    pub points: u32,
}

impl fmt::Display for ComponentScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let points = self.points;
        match &self.basis {
            Basis::Measured { km } => write!(f, "Distance: {} km ({} pts)", km, points),
            Basis::LookupFailed { .. } => {
                write!(f, "Distance: not computed ({} pts default)", points)
            }
            Basis::NoDropOff => write!(f, "Distance: no previous drop-off ({} pts)", points),
            Basis::NoPreviousCourse => write!(f, "No previous course ({} pts)", points),
            Basis::Courses { count } => write!(f, "Workload: {} courses ({} pts)", count, points),
            Basis::Available => write!(f, "Availability: OK ({} pts)", points),
            Basis::Unavailable => write!(f, "Availability: unavailable ({} pts)", points),
        }
    }
}

/// Ordered per-component justification of a score.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub components: Vec<ComponentScore>,
}

impl ScoreBreakdown {
    pub fn points_for(&self, component: Component) -> Option<u32> {
        self.components
            .iter()
            .find(|c| c.component == component)
            .map(|c| c.points)
    }

    /// One-line text form, e.g. "Distance: 5 km (40 pts) | Workload: ..."
    pub fn render(&self) -> String {
        self.components
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(BREAKDOWN_SEPARATOR)
    }
}

/// One driver's suitability for one course.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverScore {
    pub driver_id: String,
    pub driver_name: String,
    /// 0-100
    pub score: u32,
    /// Resolved travel from the last drop-off, when it was looked up successfully
    pub distance: Option<Distance>,
    pub courses_today: u32,
    pub available: bool,
    pub breakdown: ScoreBreakdown,
}

impl DriverScore {
    pub fn distance_km(&self) -> Option<f64> {
        self.distance.map(|d| d.km())
    }

    pub fn duration_minutes(&self) -> Option<u64> {
        self.distance.map(|d| d.minutes())
    }

    pub fn details(&self) -> String {
        self.breakdown.render()
    }
}

/// Scores drivers against a course, consulting the distance oracle.
///
/// Scoring never fails: a failed distance lookup degrades to the configured
/// fallback points so every driver stays rankable.
pub struct Scorer {
    oracle: DistanceOracle,
    config: ScoringConfig,
}

impl Scorer {
    /// `config` is used as given; run it through `validate_scoring` first to
    /// keep totals within 0-100.
    pub fn new(oracle: DistanceOracle, config: ScoringConfig) -> Self {
        Self { oracle, config }
    }

    pub fn oracle(&self) -> &DistanceOracle {
        &self.oracle
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub async fn score(&self, driver: &Driver, course: &Course, key: &ApiKey) -> DriverScore {
        let (distance_component, distance) = self.distance_component(driver, course, key).await;

        let workload_component = ComponentScore {
            component: Component::Workload,
            basis: Basis::Courses {
                count: driver.courses_today,
            },
            points: workload_points(driver.courses_today, &self.config.workload),
        };

        let availability_component = if driver.available {
            ComponentScore {
                component: Component::Availability,
                basis: Basis::Available,
                points: self.config.availability_points,
            }
        } else {
            ComponentScore {
                component: Component::Availability,
                basis: Basis::Unavailable,
                points: 0,
            }
        };

        let components = vec![distance_component, workload_component, availability_component];
        let score: u32 = components.iter().map(|c| c.points).sum();

        debug!(driver = %driver.id, score, "Driver scored");

        DriverScore {
            driver_id: driver.id.clone(),
            driver_name: driver.name.clone(),
            score,
            distance,
            courses_today: driver.courses_today,
            available: driver.available,
            breakdown: ScoreBreakdown { components },
        }
    }

    async fn distance_component(
        &self,
        driver: &Driver,
        course: &Course,
        key: &ApiKey,
    ) -> (ComponentScore, Option<Distance>) {
        let scoring = &self.config.distance;

        if driver.last_course.is_none() {
            return (
                ComponentScore {
                    component: Component::Distance,
                    basis: Basis::NoPreviousCourse,
                    points: scoring.no_previous_course_points,
                },
                None,
            );
        }

        let Some(drop_off) = driver.last_drop_off() else {
            return (
                ComponentScore {
                    component: Component::Distance,
                    basis: Basis::NoDropOff,
                    points: scoring.no_drop_off_points,
                },
                None,
            );
        };

        match self.oracle.lookup(drop_off, &course.pickup, key).await {
            DistanceResult::Found(distance) => {
                let km = distance.km();
                (
                    ComponentScore {
                        component: Component::Distance,
                        basis: Basis::Measured { km },
                        points: distance_points(km, scoring),
                    },
                    Some(distance),
                )
            }
            DistanceResult::Failed(err) => (
                ComponentScore {
                    component: Component::Distance,
                    basis: Basis::LookupFailed {
                        reason: err.to_string(),
                    },
                    points: scoring.lookup_failed_points,
                },
                None,
            ),
        }
    }
}
