// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Execution error: {0}")]
    Execution(#[from] crate::port::ExecutionError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True when the error is an unknown job id lookup
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::Domain(crate::domain::DomainError::JobNotFound(_))
        )
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
