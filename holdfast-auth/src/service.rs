//! The composed credential service.
//!
//! Wires the gate, token service, TOTP service, and password-change
//! coordinator over one credential store, and exposes the operator-facing
//! operations: register, login, seed retrieval, info, refresh.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use holdfast_crypto::{
    derive_application_seed, open_seed, seal_seed_with_params, verify_password, CryptoError,
    KdfParams,
};
use holdfast_store::{
    ControlSocket, CredentialRecord, CredentialStore, FileStore, KeyPairStore, SeedFileStore,
    StatusDir,
};

use crate::coordinator::{ChangePasswordStatus, PasswordChangeCoordinator};
use crate::error::{AuthError, AuthResult};
use crate::gate::{AuthGate, Credentials, Principal, SYSTEM_SUBJECT};
use crate::token::{TokenService, DEFAULT_KEYGEN_TIMEOUT, DEFAULT_KEY_BITS, DEFAULT_TTL_SECONDS};
use crate::totp::TotpService;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 12;

/// Required recovery-seed length in words.
pub const SEED_WORD_COUNT: usize = 24;

/// Service configuration.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// Bearer-token lifetime in seconds.
    pub token_ttl_seconds: u64,
    /// RSA modulus size for the signing key pair.
    pub key_bits: usize,
    /// Ceiling on startup key generation.
    pub keygen_timeout: Duration,
    /// Argon2id cost for sealing the recovery seed.
    pub kdf: KdfParams,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl_seconds: DEFAULT_TTL_SECONDS,
            key_bits: DEFAULT_KEY_BITS,
            keygen_timeout: DEFAULT_KEYGEN_TIMEOUT,
            kdf: KdfParams::default(),
        }
    }
}

/// Account info with secrets stripped — safe to return to clients.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub name: String,
    pub installed_apps: Vec<String>,
    pub two_factor_enabled: bool,
}

/// The composed single-operator credential service.
pub struct AuthService {
    pub tokens: Arc<TokenService>,
    pub totp: TotpService,
    pub gate: AuthGate,
    pub coordinator: PasswordChangeCoordinator,
    creds: CredentialStore,
    seeds: SeedFileStore,
    statuses: StatusDir,
    socket: ControlSocket,
    kdf: KdfParams,
}

impl AuthService {
    pub fn new(
        files: FileStore,
        statuses: StatusDir,
        socket: ControlSocket,
        config: AuthConfig,
    ) -> Self {
        let creds = CredentialStore::new(files.clone());
        let keys = KeyPairStore::new(files.clone());
        let seeds = SeedFileStore::new(files);

        let tokens = Arc::new(TokenService::with_config(
            keys,
            config.token_ttl_seconds,
            config.key_bits,
            config.keygen_timeout,
        ));
        let totp = TotpService::new(creds.clone());
        let gate = AuthGate::new(creds.clone(), tokens.clone(), totp.clone());
        let coordinator =
            PasswordChangeCoordinator::new(creds.clone(), statuses.clone(), socket.clone());

        Self {
            tokens,
            totp,
            gate,
            coordinator,
            creds,
            seeds,
            statuses,
            socket,
            kdf: config.kdf,
        }
    }

    /// One-time startup initialization. Nothing issues or verifies
    /// tokens before this has run.
    pub fn ensure_key_pair(&self) -> AuthResult<()> {
        self.tokens.ensure_key_pair()
    }

    pub fn is_registered(&self) -> bool {
        self.creds.exists()
    }

    /// Registers the operator: seals the seed under the password, derives
    /// the application seed, persists the credential record, and returns
    /// a bearer token.
    ///
    /// The application seed is derived and persisted *before* the record,
    /// so a record with a password can never be observed without its seed
    /// derivation having happened. A token-issuance failure rolls the
    /// record back — a failed registration leaves no partial state.
    pub fn register(
        &self,
        name: &str,
        password: &str,
        seed_words: &[String],
    ) -> AuthResult<String> {
        validate_password(password)?;
        if name.is_empty() {
            return Err(AuthError::MalformedInput("name must not be empty".into()));
        }
        if seed_words.len() != SEED_WORD_COUNT {
            return Err(AuthError::MalformedInput(format!(
                "seed must be {SEED_WORD_COUNT} words, got {}",
                seed_words.len()
            )));
        }
        if self.is_registered() {
            return Err(AuthError::AlreadyRegistered);
        }

        let app_seed = derive_application_seed(seed_words).map_err(|e| match e {
            CryptoError::InvalidMnemonic(m) => AuthError::MalformedInput(format!("invalid seed: {m}")),
            other => AuthError::CryptoFailure(other.to_string()),
        })?;
        self.seeds.write_once(&app_seed)?;

        let sealed = seal_seed_with_params(seed_words, password, &self.kdf)
            .map_err(|e| AuthError::CryptoFailure(e.to_string()))?;
        let hash = holdfast_crypto::hash_password(password)
            .map_err(|e| AuthError::CryptoFailure(e.to_string()))?;

        let record = CredentialRecord {
            name: name.to_string(),
            password: Some(hash),
            seed: Some(sealed),
            ..Default::default()
        };
        self.creds.write(&record)?;

        // Hand the password to the host system (best-effort)
        self.statuses.write("password", password);
        self.socket.notify("change-password");

        match self.tokens.issue(SYSTEM_SUBJECT) {
            Ok(token) => Ok(token),
            Err(e) => {
                if let Err(rollback) = self.creds.delete() {
                    warn!(error = %rollback, "registration rollback failed");
                }
                Err(e)
            }
        }
    }

    /// Logs the operator in and issues a bearer token. With 2FA enabled
    /// the code must be present and valid in the same request.
    pub fn login(&self, password: &str, totp_code: Option<&str>) -> AuthResult<String> {
        let credentials = Credentials::from_password(SYSTEM_SUBJECT, password);
        let principal = self.gate.authenticate_basic(&credentials, totp_code)?;

        // Re-derive the application seed if the file went missing; the
        // write is a no-op whenever it exists.
        if !self.seeds.exists() {
            match self.open_record_seed(password) {
                Ok(words) => match derive_application_seed(&words) {
                    Ok(app_seed) => self.seeds.write_once(&app_seed)?,
                    Err(e) => warn!(error = %e, "application seed re-derivation failed"),
                },
                Err(e) => warn!(error = %e, "could not open sealed seed for re-derivation"),
            }
        }

        // Keep the host system password in sync (best-effort)
        self.statuses.write("password", password);

        self.tokens.issue(&principal.subject)
    }

    /// Returns the recovery mnemonic.
    ///
    /// The password is verified against the stored hash before any
    /// decryption: a wrong password is `InvalidCredentials`, while a
    /// decryption failure after a successful verify is `CryptoFailure`
    /// (stored-data corruption, not operator error).
    pub fn seed(&self, password: &str) -> AuthResult<Vec<String>> {
        if !self.is_registered() {
            return Err(AuthError::NotRegistered);
        }
        let record = self.creds.read()?;
        let stored = record.password.as_deref().ok_or(AuthError::NotRegistered)?;
        if !verify_password(password, stored) {
            return Err(AuthError::InvalidCredentials);
        }

        let sealed = record.seed.as_ref().ok_or_else(|| {
            AuthError::CryptoFailure("credential record has no sealed seed".into())
        })?;
        open_seed(sealed, password).map_err(|e| AuthError::CryptoFailure(e.to_string()))
    }

    /// Account info with the password hash and sealed seed stripped.
    pub fn info(&self) -> AuthResult<AccountInfo> {
        if !self.is_registered() {
            return Err(AuthError::NotRegistered);
        }
        let record = self.creds.read()?;
        Ok(AccountInfo {
            name: record.name,
            installed_apps: record.installed_apps,
            two_factor_enabled: record.settings.two_factor.enabled,
        })
    }

    /// Issues a fresh token for an already-authenticated principal.
    pub fn refresh(&self, principal: &Principal) -> AuthResult<String> {
        self.tokens.issue(&principal.subject)
    }

    /// Validates and starts a password rotation.
    pub fn change_password(&self, current: &str, new: &str) -> AuthResult<()> {
        validate_password(current)?;
        validate_password(new)?;
        if current == new {
            return Err(AuthError::MalformedInput(
                "the new password must not match the current password".into(),
            ));
        }
        self.coordinator.change_password(current, new)
    }

    /// Rotation progress for polling.
    pub fn change_password_status(&self) -> ChangePasswordStatus {
        self.coordinator.status()
    }

    fn open_record_seed(&self, password: &str) -> AuthResult<Vec<String>> {
        let record = self.creds.read()?;
        let sealed = record.seed.as_ref().ok_or_else(|| {
            AuthError::CryptoFailure("credential record has no sealed seed".into())
        })?;
        open_seed(sealed, password).map_err(|e| AuthError::CryptoFailure(e.to_string()))
    }
}

fn validate_password(password: &str) -> AuthResult<()> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::MalformedInput(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}
