use thiserror::Error;

/// Failures that stop a ranking call outright.
///
/// Distance lookup problems never show up here: they are absorbed into the
/// distance sub-score.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssignmentError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid course: {0}")]
    InvalidCourse(String),

    #[error("Invalid driver at position {index}: {reason}")]
    InvalidDriver { index: usize, reason: String },
}

impl AssignmentError {
    /// True for setup problems the operator has to fix (as opposed to bad input)
    pub fn is_configuration(&self) -> bool {
        matches!(self, AssignmentError::Configuration(_))
    }
}

pub type Result<T> = std::result::Result<T, AssignmentError>;
