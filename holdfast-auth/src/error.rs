//! Authentication error taxonomy.
//!
//! A closed set of failure kinds with structured fields. The distinction
//! between [`AuthError::InvalidCredentials`] and everything else is
//! load-bearing: callers map it to a different externally-visible status
//! so a mistyped password never invalidates a valid session.

use holdfast_store::StoreError;
use thiserror::Error;

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors that can occur in the credential core.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong password, token, or one-time code.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("an operator is already registered")]
    AlreadyRegistered,

    #[error("no operator is registered")]
    NotRegistered,

    /// Missing, short, or wrongly-typed input. Rejected before any
    /// mutation begins.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Underlying persistence failure — always surfaced, never swallowed.
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),

    /// Cryptographic failure after credentials were already verified.
    /// Indicates stored-data corruption rather than operator error.
    #[error("crypto failure: {0}")]
    CryptoFailure(String),

    /// A password rotation is already in flight.
    #[error("a password change is already in progress")]
    Conflict,

    /// Signing-key generation or loading failed.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),
}
