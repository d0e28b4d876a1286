//! Time-based one-time passwords (RFC 6238).
//!
//! Codes are HMAC-SHA-1 over the 30-second counter with dynamic
//! truncation to 6 digits. Verification accepts only the current window —
//! no skew tolerance.

use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha1::Sha1;
use std::time::{SystemTime, UNIX_EPOCH};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptoError, CryptoResult};

/// Time step in seconds.
pub const TOTP_STEP: u64 = 30;

/// Number of code digits.
pub const TOTP_DIGITS: u32 = 6;

/// Shared-secret size in bytes (160 bits).
pub const SECRET_SIZE: usize = 20;

const BASE32_ALPHABET: base32::Alphabet = base32::Alphabet::Rfc4648 { padding: false };

/// A TOTP shared secret. Zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct TotpSecret(Vec<u8>);

impl TotpSecret {
    /// Generates a fresh random 160-bit secret.
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; SECRET_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Encodes the secret for display as a scannable authenticator key.
    pub fn to_base32(&self) -> String {
        base32::encode(BASE32_ALPHABET, &self.0)
    }

    /// Decodes a base32-encoded secret.
    pub fn from_base32(encoded: &str) -> CryptoResult<Self> {
        base32::decode(BASE32_ALPHABET, encoded)
            .map(Self)
            .ok_or(CryptoError::MalformedSecret)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Computes the code for the window containing `unix_time`.
pub fn code_at(secret: &TotpSecret, unix_time: u64) -> CryptoResult<String> {
    let counter = unix_time / TOTP_STEP;

    let mut mac = Hmac::<Sha1>::new_from_slice(secret.as_bytes())
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    // Dynamic truncation (RFC 4226 §5.3)
    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let binary = u32::from_be_bytes([
        digest[offset] & 0x7f,
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]);
    let code = binary % 10u32.pow(TOTP_DIGITS);

    Ok(format!("{code:06}"))
}

/// Computes the code for the current window.
pub fn current_code(secret: &TotpSecret) -> CryptoResult<String> {
    code_at(secret, unix_now())
}

/// Verifies a submitted code against the current window only.
pub fn verify_code(secret: &TotpSecret, code: &str) -> bool {
    match current_code(secret) {
        Ok(expected) => expected == code,
        Err(_) => false,
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
