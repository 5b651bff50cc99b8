/// Core error types for the judgebox pipeline
use thiserror::Error;

/// Custom error types for judgebox
#[derive(Error, Debug)]
pub enum JudgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    #[error("{0}")]
    Validation(String),

    #[error("request throttled")]
    Throttled,

    #[error("sandbox unavailable: {0}")]
    SandboxUnavailable(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl JudgeError {
    /// Submission-caused failures become verdicts; everything else is an
    /// infrastructure fault the caller surfaces as a 5xx.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            JudgeError::Io(_) | JudgeError::SandboxUnavailable(_) | JudgeError::Config(_)
        )
    }
}

/// Result type alias for judgebox operations
pub type Result<T> = std::result::Result<T, JudgeError>;
