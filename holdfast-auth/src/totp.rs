//! Two-factor enrollment and verification over the credential record.
//!
//! Enrollment is two-phase: `enroll` persists a pending secret (not yet
//! enabled) and returns it for display; `confirm_enable` flips the flag
//! only after a valid code proves the authenticator holds the secret.

use holdfast_crypto::{verify_code, TotpSecret};
use holdfast_store::{CredentialRecord, CredentialStore, TotpSettings};

use crate::error::{AuthError, AuthResult};

/// TOTP enrollment state machine over the stored credential record.
#[derive(Clone, Debug)]
pub struct TotpService {
    creds: CredentialStore,
}

impl TotpService {
    pub fn new(creds: CredentialStore) -> Self {
        Self { creds }
    }

    /// Starts (or resumes) enrollment, returning the base32 secret for
    /// display. Idempotent: while a secret exists — pending or enabled —
    /// the same secret is returned.
    pub fn enroll(&self) -> AuthResult<String> {
        let mut record = self.load()?;

        if let Some(secret) = &record.settings.two_factor.secret {
            return Ok(secret.clone());
        }

        let secret = TotpSecret::generate().to_base32();
        record.settings.two_factor = TotpSettings {
            enabled: false,
            secret: Some(secret.clone()),
        };
        self.creds.write(&record)?;

        Ok(secret)
    }

    /// Verifies a code against the pending secret and, on success, marks
    /// 2FA enabled. On failure the stored state is left untouched.
    pub fn confirm_enable(&self, code: &str) -> AuthResult<bool> {
        let mut record = self.load()?;

        let Some(encoded) = record.settings.two_factor.secret.clone() else {
            return Err(AuthError::MalformedInput(
                "no pending two-factor enrollment".into(),
            ));
        };

        if !code_matches(&encoded, code)? {
            return Ok(false);
        }

        record.settings.two_factor.enabled = true;
        self.creds.write(&record)?;
        Ok(true)
    }

    /// Verifies a code, then clears both the enabled flag and the secret.
    pub fn disable(&self, code: &str) -> AuthResult<bool> {
        let mut record = self.load()?;

        let Some(encoded) = record.settings.two_factor.secret.clone() else {
            return Ok(false);
        };

        if !code_matches(&encoded, code)? {
            return Ok(false);
        }

        record.settings.two_factor = TotpSettings::default();
        self.creds.write(&record)?;
        Ok(true)
    }

    /// Whether 2FA is fully enabled (not merely pending).
    pub fn is_enabled(&self) -> AuthResult<bool> {
        if !self.creds.exists() {
            return Ok(false);
        }
        Ok(self.creds.read()?.settings.two_factor.enabled)
    }

    /// Login-time check. With 2FA enabled, a currently-valid code must
    /// accompany the request; a missing or wrong code fails the whole
    /// attempt — no partial session issuance.
    pub fn check_login(&self, code: Option<&str>) -> AuthResult<()> {
        if !self.creds.exists() {
            return Ok(());
        }
        let record = self.creds.read()?;
        if !record.settings.two_factor.enabled {
            return Ok(());
        }

        let encoded = record.settings.two_factor.secret.as_deref().ok_or_else(|| {
            AuthError::CryptoFailure("two-factor enabled without a stored secret".into())
        })?;

        match code {
            Some(code) if code_matches(encoded, code)? => Ok(()),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    fn load(&self) -> AuthResult<CredentialRecord> {
        if !self.creds.exists() {
            return Err(AuthError::NotRegistered);
        }
        Ok(self.creds.read()?)
    }
}

fn code_matches(encoded: &str, code: &str) -> AuthResult<bool> {
    let secret = TotpSecret::from_base32(encoded)
        .map_err(|e| AuthError::CryptoFailure(e.to_string()))?;
    Ok(verify_code(&secret, code))
}
