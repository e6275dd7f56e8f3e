//! Error types for secreview

use thiserror::Error;

/// Main error type for secreview operations
#[derive(Error, Debug)]
pub enum ReviewError {
    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error with context
    #[error("Parse error in {context}: {message}")]
    Parse { context: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Result store error
    #[error("Database error: {0}")]
    Database(String),

    /// A check did not finish in time
    #[error("Timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A check failed while running
    #[error("Check {check} faulted: {message}")]
    CheckFault { check: String, message: String },

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for ReviewError {
    fn from(err: serde_json::Error) -> Self {
        ReviewError::Serialization(err.to_string())
    }
}

/// Result type alias for secreview operations
pub type Result<T> = std::result::Result<T, ReviewError>;
