//! Core error types for Barkeep.

use thiserror::Error;

/// Core error type for Barkeep operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A query parameter was out of range.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Invalid data from an API response.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
