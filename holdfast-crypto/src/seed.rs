//! Password-sealed recovery seed and application-seed derivation.
//!
//! The recovery mnemonic is stored encrypted under a key derived from the
//! operator's password. The ciphertext is self-describing: it bundles the
//! Argon2id salt, the KDF parameters, and the AEAD nonce, so the password
//! is the only input needed to open it.

use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::cipher::{decrypt, encrypt, EncryptedData};
use crate::error::{CryptoError, CryptoResult};
use crate::key::{derive_key, KdfParams, Salt};

/// Delimiter used when flattening the word list for encryption.
const WORD_DELIMITER: &str = ",";

/// Domain-separation string for application-seed derivation.
const SEED_DOMAIN: &[u8] = b"holdfast-seed";

/// Recovery seed sealed under a password-derived key.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SealedSeed {
    pub salt: Salt,
    pub kdf: KdfParams,
    pub data: EncryptedData,
}

/// Seals a mnemonic word list under a password (default KDF cost).
pub fn seal_seed(words: &[String], password: &str) -> CryptoResult<SealedSeed> {
    seal_seed_with_params(words, password, &KdfParams::default())
}

/// Seals a mnemonic word list under a password with explicit KDF cost.
pub fn seal_seed_with_params(
    words: &[String],
    password: &str,
    params: &KdfParams,
) -> CryptoResult<SealedSeed> {
    let salt = Salt::random();
    let key = derive_key(password, &salt, params)?;

    let joined = Zeroizing::new(words.join(WORD_DELIMITER));
    let data = encrypt(&key, joined.as_bytes())?;

    Ok(SealedSeed {
        salt,
        kdf: params.clone(),
        data,
    })
}

/// Opens a sealed seed, returning the mnemonic word list.
///
/// A wrong password surfaces as [`CryptoError::WrongPassword`]; the AEAD
/// tag guarantees it can never yield a different-looking valid mnemonic.
pub fn open_seed(sealed: &SealedSeed, password: &str) -> CryptoResult<Vec<String>> {
    let key = derive_key(password, &sealed.salt, &sealed.kdf)?;
    let plaintext = Zeroizing::new(decrypt(&key, &sealed.data)?);

    let joined = std::str::from_utf8(&plaintext).map_err(|_| CryptoError::WrongPassword)?;
    Ok(joined.split(WORD_DELIMITER).map(str::to_owned).collect())
}

/// Derives the downstream application seed from a recovery mnemonic.
///
/// Decodes the mnemonic to its raw entropy, then computes
/// HMAC-SHA-256(key = entropy, message = domain string), hex-encoded.
/// Deterministic: the same mnemonic always yields the same seed.
pub fn derive_application_seed(words: &[String]) -> CryptoResult<String> {
    let mnemonic: bip39::Mnemonic = words
        .join(" ")
        .parse()
        .map_err(|e: bip39::Error| CryptoError::InvalidMnemonic(e.to_string()))?;
    let entropy = Zeroizing::new(mnemonic.to_entropy());

    let mut mac = Hmac::<Sha256>::new_from_slice(&entropy)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    mac.update(SEED_DOMAIN);
    let digest = mac.finalize().into_bytes();

    Ok(hex_encode(digest))
}

/// Generates a fresh 24-word recovery mnemonic from 256 bits of entropy.
pub fn generate_mnemonic() -> CryptoResult<Vec<String>> {
    let mut entropy = [0u8; 32];
    OsRng.fill_bytes(&mut entropy);

    let mnemonic = bip39::Mnemonic::from_entropy(&entropy)
        .map_err(|e| CryptoError::InvalidMnemonic(e.to_string()))?;

    Ok(mnemonic
        .to_string()
        .split_whitespace()
        .map(str::to_owned)
        .collect())
}

fn hex_encode(bytes: impl AsRef<[u8]>) -> String {
    bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
}
