//! The password-rotation state machine.
//!
//! `Idle(0) → InProgress(1) → Done(100) | Failed(100, error)`. The status
//! lives on the coordinator instance — not in a module global — so
//! multiple coordinators can coexist and tests stay deterministic. At
//! most one rotation is in flight per coordinator; a second request while
//! one runs is rejected with a conflict, never interleaved.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use holdfast_crypto::{hash_password, open_seed, seal_seed_with_params, verify_password};
use holdfast_store::{ControlSocket, CredentialStore, StatusDir};

use crate::error::{AuthError, AuthResult};

const COMPLETE: u8 = 100;

/// Progress of a password rotation, polled by callers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangePasswordStatus {
    pub percent: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<bool>,
}

/// Serializes password rotations and reseals the recovery seed under the
/// new password.
pub struct PasswordChangeCoordinator {
    creds: CredentialStore,
    statuses: StatusDir,
    socket: ControlSocket,
    status: Mutex<ChangePasswordStatus>,
}

impl PasswordChangeCoordinator {
    pub fn new(creds: CredentialStore, statuses: StatusDir, socket: ControlSocket) -> Self {
        Self {
            creds,
            statuses,
            socket,
            status: Mutex::new(ChangePasswordStatus::default()),
        }
    }

    /// Rotates the operator password.
    ///
    /// Validation failures surface before any mutation; a failure in the
    /// reseal or persist steps leaves the stored record exactly as it
    /// was (the record is written once, atomically).
    pub fn change_password(&self, current: &str, new: &str) -> AuthResult<()> {
        // 1. Conflict check, then transition to InProgress
        {
            let mut status = self.status.lock().unwrap();
            if status.percent > 0 && status.percent != COMPLETE {
                return Err(AuthError::Conflict);
            }
            *status = ChangePasswordStatus {
                percent: 1,
                error: None,
            };
        }

        match self.rotate(current, new) {
            Ok(()) => {
                *self.status.lock().unwrap() = ChangePasswordStatus {
                    percent: COMPLETE,
                    error: None,
                };
                Ok(())
            }
            Err(e) => {
                *self.status.lock().unwrap() = ChangePasswordStatus {
                    percent: COMPLETE,
                    error: Some(true),
                };
                Err(e)
            }
        }
    }

    fn rotate(&self, current: &str, new: &str) -> AuthResult<()> {
        // 2. Verify the current password against the stored hash
        if !self.creds.exists() {
            return Err(AuthError::NotRegistered);
        }
        let mut record = self.creds.read()?;
        let stored = record.password.as_deref().ok_or(AuthError::NotRegistered)?;
        if !verify_password(current, stored) {
            return Err(AuthError::InvalidCredentials);
        }

        // 3. Reseal the seed under the new password. The password was
        // just verified, so a decryption failure here means the stored
        // ciphertext is corrupt — not an operator mistake.
        let sealed = record.seed.as_ref().ok_or_else(|| {
            AuthError::CryptoFailure("credential record has no sealed seed".into())
        })?;
        let words =
            open_seed(sealed, current).map_err(|e| AuthError::CryptoFailure(e.to_string()))?;
        let resealed = seal_seed_with_params(&words, new, &sealed.kdf)
            .map_err(|e| AuthError::CryptoFailure(e.to_string()))?;

        // 4. Persist the new hash and ciphertext in one atomic write
        record.password =
            Some(hash_password(new).map_err(|e| AuthError::CryptoFailure(e.to_string()))?);
        record.seed = Some(resealed);
        self.creds.write(&record)?;

        // 5. Hand the new password to the host system (best-effort; the
        // credential rotation above is already committed)
        self.statuses.write("password", new);
        self.socket.notify("change-password");

        Ok(())
    }

    /// Current status; a pure read, safe to poll concurrently, stable
    /// after a rotation completes.
    pub fn status(&self) -> ChangePasswordStatus {
        self.status.lock().unwrap().clone()
    }
}
