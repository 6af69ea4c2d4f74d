use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("cyclic prerequisites: {}", cycle.join(" -> "))]
    CyclicPrerequisites { cycle: Vec<String> },
    #[error("content {content_id} requires {prerequisite_id}, which is not part of the assembled path")]
    UnresolvedPrerequisite {
        content_id: String,
        prerequisite_id: String,
    },
    #[error("index {index} out of range for path of length {len}")]
    OutOfRange { index: usize, len: usize },
    #[error("invalid state: expected {expected}, found {actual}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },
    #[error("student id {requested} does not match profile {profile}")]
    StudentMismatch { requested: String, profile: String },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid progress value for {field}: {value}")]
    InvalidProgress { field: &'static str, value: f64 },
}

pub type EngineResult<T> = Result<T, EngineError>;
