//! RSA-signed bearer tokens.
//!
//! Tokens are RS256 JWTs carrying `{sub, iat, exp}`. The signing key pair
//! is generated once at startup through an explicit [`TokenService::
//! ensure_key_pair`] call and persisted as two PEM blobs; nothing here
//! generates keys lazily on first use.

use jsonwebtoken::{
    decode, encode, get_current_timestamp, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use rand::rngs::OsRng;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use std::sync::{mpsc, RwLock};
use std::thread;
use std::time::Duration;

use holdfast_store::{KeyPair, KeyPairStore};

use crate::error::{AuthError, AuthResult};

/// Distinguished subject of the short-lived credential issued for the
/// 2FA-enrollment step. Never accepted for privileged operations.
pub const TEMPORARY_SUBJECT: &str = "temporary";

/// Default token lifetime in seconds.
pub const DEFAULT_TTL_SECONDS: u64 = 3600;

/// Lifetime of enrollment-only temporary tokens.
pub const TEMPORARY_TTL_SECONDS: u64 = 600;

/// Default RSA modulus size in bits.
pub const DEFAULT_KEY_BITS: usize = 3072;

/// Ceiling on key-pair generation. Generation is startup-only; exceeding
/// this is a fatal startup condition.
pub const DEFAULT_KEYGEN_TIMEOUT: Duration = Duration::from_secs(60);

/// Payload carried by every bearer token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated subject.
    pub sub: String,
    /// Issued at (Unix timestamp).
    pub iat: u64,
    /// Expiration time (Unix timestamp).
    pub exp: u64,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Issues and verifies RSA-signed bearer tokens.
pub struct TokenService {
    store: KeyPairStore,
    keys: RwLock<Option<SigningKeys>>,
    ttl_seconds: u64,
    key_bits: usize,
    keygen_timeout: Duration,
}

impl TokenService {
    pub fn new(store: KeyPairStore) -> Self {
        Self::with_config(store, DEFAULT_TTL_SECONDS, DEFAULT_KEY_BITS, DEFAULT_KEYGEN_TIMEOUT)
    }

    pub fn with_config(
        store: KeyPairStore,
        ttl_seconds: u64,
        key_bits: usize,
        keygen_timeout: Duration,
    ) -> Self {
        Self {
            store,
            keys: RwLock::new(None),
            ttl_seconds,
            key_bits,
            keygen_timeout,
        }
    }

    /// Loads the persisted key pair, generating and persisting one if
    /// neither half exists. Idempotent; an orphaned half is fatal (the
    /// store refuses to load it). Concurrent first boots race benignly —
    /// last writer wins and both halves stay consistent.
    pub fn ensure_key_pair(&self) -> AuthResult<()> {
        if self.keys.read().unwrap().is_some() {
            return Ok(());
        }

        let pair = match self.store.load()? {
            Some(pair) => pair,
            None => {
                let pair = generate_key_pair(self.key_bits, self.keygen_timeout)?;
                self.store.save(&pair)?;
                pair
            }
        };

        let signing = SigningKeys {
            encoding: EncodingKey::from_rsa_pem(pair.private_pem.as_bytes())
                .map_err(|e| AuthError::KeyGeneration(format!("bad private key: {e}")))?,
            decoding: DecodingKey::from_rsa_pem(pair.public_pem.as_bytes())
                .map_err(|e| AuthError::KeyGeneration(format!("bad public key: {e}")))?,
        };

        *self.keys.write().unwrap() = Some(signing);
        Ok(())
    }

    /// Issues a token for `subject` with the default lifetime.
    pub fn issue(&self, subject: &str) -> AuthResult<String> {
        self.issue_with_ttl(subject, self.ttl_seconds)
    }

    /// Issues the enrollment-only temporary credential.
    pub fn issue_temporary(&self) -> AuthResult<String> {
        self.issue_with_ttl(TEMPORARY_SUBJECT, TEMPORARY_TTL_SECONDS)
    }

    /// Issues a token with an explicit lifetime in seconds.
    pub fn issue_with_ttl(&self, subject: &str, ttl_seconds: u64) -> AuthResult<String> {
        let guard = self.keys.read().unwrap();
        let keys = guard.as_ref().ok_or_else(uninitialized)?;

        let now = get_current_timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp: now + ttl_seconds,
        };

        encode(&Header::new(Algorithm::RS256), &claims, &keys.encoding)
            .map_err(|e| AuthError::KeyGeneration(format!("token signing failed: {e}")))
    }

    /// Verifies signature and expiry, returning the validated subject.
    ///
    /// Expiry is checked with zero leeway. Malformed tokens fail closed:
    /// every decode failure maps to `InvalidCredentials`.
    pub fn verify(&self, token: &str) -> AuthResult<String> {
        let guard = self.keys.read().unwrap();
        let keys = guard.as_ref().ok_or_else(uninitialized)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = 0;

        match decode::<Claims>(token, &keys.decoding, &validation) {
            Ok(data) => Ok(data.claims.sub),
            Err(_) => Err(AuthError::InvalidCredentials),
        }
    }

    /// Like [`verify`](Self::verify), additionally rejecting the
    /// enrollment-only temporary subject.
    pub fn verify_privileged(&self, token: &str) -> AuthResult<String> {
        let subject = self.verify(token)?;
        if subject == TEMPORARY_SUBJECT {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(subject)
    }
}

fn uninitialized() -> AuthError {
    AuthError::KeyGeneration("key pair not initialized; call ensure_key_pair at startup".into())
}

/// Generates an RSA key pair on a worker thread, bounded by `timeout`.
fn generate_key_pair(bits: usize, timeout: Duration) -> AuthResult<KeyPair> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(generate(bits));
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(_) => Err(AuthError::KeyGeneration(format!(
            "RSA key generation exceeded {}s",
            timeout.as_secs()
        ))),
    }
}

fn generate(bits: usize) -> AuthResult<KeyPair> {
    let private = RsaPrivateKey::new(&mut OsRng, bits)
        .map_err(|e| AuthError::KeyGeneration(e.to_string()))?;
    let public = RsaPublicKey::from(&private);

    let private_pem = private
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| AuthError::KeyGeneration(e.to_string()))?
        .to_string();
    let public_pem = public
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| AuthError::KeyGeneration(e.to_string()))?;

    Ok(KeyPair {
        private_pem,
        public_pem,
    })
}
