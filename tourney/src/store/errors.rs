//! Storage error types.

use thiserror::Error;

/// Errors raised by storage collaborators
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Snapshot could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend unreachable or refused the operation
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;
