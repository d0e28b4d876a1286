//! Named-blob file store with atomic writes.
//!
//! The rest of the system treats this as an opaque durable key-value
//! surface keyed by fixed names. Every write goes through a temp file in
//! the same directory followed by a rename, so a crash mid-write can
//! never leave a half-updated blob.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};

/// File-backed blob store rooted at a data directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    base_dir: PathBuf,
}

/// Blob names are plain file names: ASCII alphanumerics, `_`, `-`, `.`,
/// no leading dot. Anything else (path separators included) is rejected
/// before it reaches the filesystem.
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
}

impl FileStore {
    /// Opens a store rooted at `base_dir`, creating the directory if needed.
    pub fn open(base_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn blob_path(&self, name: &str) -> StoreResult<PathBuf> {
        if !is_valid_name(name) {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.base_dir.join(name))
    }

    /// Whether a blob exists. Invalid names simply do not exist.
    pub fn exists(&self, name: &str) -> bool {
        self.blob_path(name).map(|p| p.exists()).unwrap_or(false)
    }

    /// Reads a blob as UTF-8 text.
    pub fn read_text(&self, name: &str) -> StoreResult<String> {
        let path = self.blob_path(name)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(contents),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StoreError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Writes a blob atomically (temp file + rename).
    pub fn write_text(&self, name: &str, contents: &str) -> StoreResult<()> {
        let path = self.blob_path(name)?;
        let tmp = self.base_dir.join(format!(".{name}.tmp"));
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Reads and deserializes a JSON blob.
    pub fn read_json<T: DeserializeOwned>(&self, name: &str) -> StoreResult<T> {
        let contents = self.read_text(name)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Serializes and writes a JSON blob atomically.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> StoreResult<()> {
        let contents = serde_json::to_string_pretty(value)?;
        self.write_text(name, &contents)
    }

    /// Deletes a blob. Deleting a missing blob is an error.
    pub fn delete(&self, name: &str) -> StoreResult<()> {
        let path = self.blob_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StoreError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
