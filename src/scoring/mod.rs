pub mod config;
pub mod engine;
pub mod factors;
pub mod validation;

pub use config::*;
pub use engine::{Basis, Component, ComponentScore, DriverScore, ScoreBreakdown, Scorer};
pub use factors::{distance_points, workload_points};
pub use validation::validate_scoring;
