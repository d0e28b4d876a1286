//! File-backed persistence for Holdfast key material.
//!
//! Everything durable lives as a named blob in a data directory:
//! the credential record (JSON), the token-signing key pair (two PEM
//! blobs), and the derived application seed (write-once). Writes are
//! atomic — temp file in the same directory, then rename — so partial
//! blobs cannot survive a crash.
//!
//! The control-socket and status-file collaborators used for downstream
//! signaling live here too; they are strictly best-effort.

mod credentials;
mod error;
mod files;
mod keypair;
mod seedfile;
mod signals;

pub use credentials::{
    CredentialRecord, CredentialStore, Settings, TotpSettings, CREDENTIALS_BLOB,
};
pub use error::{StoreError, StoreResult};
pub use files::FileStore;
pub use keypair::{KeyPair, KeyPairStore, PRIVATE_KEY_BLOB, PUBLIC_KEY_BLOB};
pub use seedfile::{SeedFileStore, SEED_BLOB};
pub use signals::{ControlSocket, StatusDir};
