pub mod assistant;
pub mod error;
pub mod ranker;
pub mod types;

pub use assistant::{validate_course, validate_drivers, DispatchAssistant};
pub use error::AssignmentError;
pub use ranker::{sort_by_score, Ranker};
pub use types::{Course, Driver, LastCourse};
