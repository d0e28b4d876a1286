//! Store error types.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("invalid blob name: {0:?}")]
    InvalidName(String),

    /// One half of the signing key pair exists without the other.
    /// Fatal at startup — issuing or verifying with a partial pair would
    /// silently invalidate outstanding tokens.
    #[error("signing key pair is corrupt: {0} half is missing")]
    KeyPairCorrupt(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
