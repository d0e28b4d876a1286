//! Persistence of the token-signing key pair.
//!
//! Two PEM text blobs, named distinctly for the private and public half.
//! Both halves are written together; finding only one at load time is a
//! fatal condition, never silently repaired.

use crate::error::{StoreError, StoreResult};
use crate::files::FileStore;

/// Blob name of the PKCS#8 private key PEM.
pub const PRIVATE_KEY_BLOB: &str = "jwt.key";

/// Blob name of the public key PEM.
pub const PUBLIC_KEY_BLOB: &str = "jwt.pem";

/// A PEM-encoded signing key pair.
#[derive(Clone, Debug)]
pub struct KeyPair {
    pub private_pem: String,
    pub public_pem: String,
}

/// Read/write access to the key pair blobs.
#[derive(Clone, Debug)]
pub struct KeyPairStore {
    files: FileStore,
}

impl KeyPairStore {
    pub fn new(files: FileStore) -> Self {
        Self { files }
    }

    /// Loads the stored pair.
    ///
    /// Returns `None` when neither half exists (first boot), and
    /// [`StoreError::KeyPairCorrupt`] when exactly one half is present.
    pub fn load(&self) -> StoreResult<Option<KeyPair>> {
        match (
            self.files.exists(PRIVATE_KEY_BLOB),
            self.files.exists(PUBLIC_KEY_BLOB),
        ) {
            (false, false) => Ok(None),
            (true, false) => Err(StoreError::KeyPairCorrupt("public")),
            (false, true) => Err(StoreError::KeyPairCorrupt("private")),
            (true, true) => Ok(Some(KeyPair {
                private_pem: self.files.read_text(PRIVATE_KEY_BLOB)?,
                public_pem: self.files.read_text(PUBLIC_KEY_BLOB)?,
            })),
        }
    }

    /// Persists both halves. Each write is individually atomic; a crash
    /// between the two leaves an orphan, which `load` reports as fatal
    /// rather than proceeding with a partial pair.
    pub fn save(&self, pair: &KeyPair) -> StoreResult<()> {
        self.files.write_text(PRIVATE_KEY_BLOB, &pair.private_pem)?;
        self.files.write_text(PUBLIC_KEY_BLOB, &pair.public_pem)?;
        Ok(())
    }
}
