//! Account registry error types.

use holdfast_store::StoreError;
use thiserror::Error;

/// Result type for account operations.
pub type AccountResult<T> = Result<T, AccountError>;

/// Errors that can occur in the account registry.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("account id {0:?} is reserved")]
    ReservedId(String),

    #[error("account {0:?} already exists")]
    AlreadyExists(String),

    #[error("account {0:?} not found")]
    NotFound(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A stored record failed to parse or holds an unparseable balance.
    #[error("corrupt account record: {0}")]
    Corrupt(String),

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),

    #[error("crypto failure: {0}")]
    Crypto(String),
}
