//! Crypto error types.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    /// AEAD authentication failure. With a password-derived key this means
    /// the password was wrong or the ciphertext was tampered with; the two
    /// cases are indistinguishable at this layer.
    #[error("wrong password or tampered ciphertext")]
    WrongPassword,

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("malformed TOTP secret")]
    MalformedSecret,
}
