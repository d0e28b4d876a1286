//! One-way password hashing.
//!
//! Hashes are Argon2id PHC strings with a random salt. Verification goes
//! through the algorithm's own constant-time check, never a byte compare
//! of re-hashed input.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;

use crate::error::{CryptoError, CryptoResult};

/// Hashes a password into a self-describing PHC string.
pub fn hash_password(plaintext: &str) -> CryptoResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verifies a password against a stored PHC string.
///
/// A malformed stored hash verifies as `false` rather than erroring —
/// callers treat it like any other failed login.
pub fn verify_password(plaintext: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("password1234").unwrap();
        assert!(verify_password("password1234", &hash));
    }

    #[test]
    fn wrong_password_rejected() {
        let hash = hash_password("password1234").unwrap();
        assert!(!verify_password("password12345", &hash));
    }

    #[test]
    fn malformed_hash_verifies_false() {
        assert!(!verify_password("password1234", "not-a-phc-string"));
        assert!(!verify_password("password1234", ""));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("password1234").unwrap();
        let b = hash_password("password1234").unwrap();
        assert_ne!(a, b);
    }
}
