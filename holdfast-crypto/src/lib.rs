//! Cryptographic primitives for Holdfast.
//!
//! Provides the credential-core building blocks:
//! - Argon2id password hashing with constant-time verification
//! - Password-sealed recovery seeds (Argon2id KDF + ChaCha20-Poly1305),
//!   self-describing ciphertexts that embed salt, KDF params, and nonce
//! - Deterministic application-seed derivation from a BIP39 mnemonic
//! - TOTP secrets and codes (RFC 6238)
//!
//! No I/O happens here; persistence lives in `holdfast-store`.

mod cipher;
mod error;
mod key;
pub mod password;
pub mod seed;
pub mod totp;

pub use cipher::{decrypt, encrypt, EncryptedData, NONCE_SIZE, TAG_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use key::{
    derive_key, generate_random_key, DerivedKey, KdfParams, Salt, KEY_SIZE, SALT_SIZE,
};
pub use password::{hash_password, verify_password};
pub use seed::{
    derive_application_seed, generate_mnemonic, open_seed, seal_seed, seal_seed_with_params,
    SealedSeed,
};
pub use totp::{code_at, current_code, verify_code, TotpSecret, TOTP_DIGITS, TOTP_STEP};
