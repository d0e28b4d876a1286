//! The derived application seed file.
//!
//! Written at most once. Downstream services derive further key material
//! from this file, so overwriting it would silently rotate everything
//! they hold — the write is a no-op whenever the file already exists.

use crate::error::StoreResult;
use crate::files::FileStore;

/// Blob name of the application seed.
pub const SEED_BLOB: &str = "seed";

/// Write-once access to the application seed blob.
#[derive(Clone, Debug)]
pub struct SeedFileStore {
    files: FileStore,
}

impl SeedFileStore {
    pub fn new(files: FileStore) -> Self {
        Self { files }
    }

    pub fn exists(&self) -> bool {
        self.files.exists(SEED_BLOB)
    }

    /// Persists the seed unless one already exists. Idempotent by
    /// construction.
    pub fn write_once(&self, seed: &str) -> StoreResult<()> {
        if self.exists() {
            return Ok(());
        }
        self.files.write_text(SEED_BLOB, seed)
    }

    pub fn read(&self) -> StoreResult<String> {
        self.files.read_text(SEED_BLOB)
    }
}
