//! The operator credential record.
//!
//! One JSON blob per installation holding the display name, the Argon2
//! password hash, the sealed recovery seed, the installed-app references,
//! and the two-factor settings. The password hash and sealed seed are
//! never returned to clients; `holdfast-auth` strips them before exposing
//! account info.

use holdfast_crypto::SealedSeed;
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::files::FileStore;

/// Blob name of the credential record.
pub const CREDENTIALS_BLOB: &str = "user.json";

/// Two-factor authentication state.
///
/// A secret with `enabled == false` is a pending enrollment: it has been
/// handed to the operator for scanning but no code has confirmed it yet.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TotpSettings {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub two_factor: TotpSettings,
}

/// The per-installation credential record.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CredentialRecord {
    /// Display name, arbitrary.
    pub name: String,
    /// Argon2id PHC string. Never logged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Recovery seed sealed under the operator's password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<SealedSeed>,
    /// App identifiers owned by the apps subsystem; referenced, not
    /// managed, here.
    pub installed_apps: Vec<String>,
    pub settings: Settings,
}

/// Read/write access to the credential record blob.
#[derive(Clone, Debug)]
pub struct CredentialStore {
    files: FileStore,
}

impl CredentialStore {
    pub fn new(files: FileStore) -> Self {
        Self { files }
    }

    /// Whether a credential record has been persisted.
    pub fn exists(&self) -> bool {
        self.files.exists(CREDENTIALS_BLOB)
    }

    pub fn read(&self) -> StoreResult<CredentialRecord> {
        self.files.read_json(CREDENTIALS_BLOB)
    }

    /// Persists the record atomically.
    pub fn write(&self, record: &CredentialRecord) -> StoreResult<()> {
        self.files.write_json(CREDENTIALS_BLOB, record)
    }

    /// Removes the record (registration rollback).
    pub fn delete(&self) -> StoreResult<()> {
        self.files.delete(CREDENTIALS_BLOB)
    }
}
