//! Credential extraction and the authentication gate.
//!
//! Every inbound request is reduced to a single normalized
//! [`Credentials`] value before any authentication strategy runs — the
//! header and the request body are never merged implicitly.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::sync::Arc;

use holdfast_crypto::verify_password;
use holdfast_store::CredentialStore;

use crate::error::{AuthError, AuthResult};
use crate::token::TokenService;
use crate::totp::TotpService;

/// Subject issued to the single-operator installation.
pub const SYSTEM_SUBJECT: &str = "admin";

/// A normalized inbound credential.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
    /// Password credential; `id` is the claimed account.
    Basic { id: String, password: String },
    /// Bearer token credential.
    Bearer(String),
}

impl Credentials {
    /// Parses an `Authorization` header value (`Basic <b64 id:password>`
    /// or `Bearer <token>`).
    pub fn from_authorization_header(header: &str) -> AuthResult<Self> {
        let mut parts = header.splitn(2, ' ');
        let scheme = parts.next().unwrap_or("");
        let value = parts.next().unwrap_or("").trim();

        if value.is_empty() {
            return Err(AuthError::MalformedInput(
                "empty authorization value".into(),
            ));
        }

        match scheme {
            "Basic" => {
                let decoded = BASE64.decode(value).map_err(|_| {
                    AuthError::MalformedInput("basic credentials are not valid base64".into())
                })?;
                let text = String::from_utf8(decoded).map_err(|_| {
                    AuthError::MalformedInput("basic credentials are not valid UTF-8".into())
                })?;
                let (id, password) = text.split_once(':').ok_or_else(|| {
                    AuthError::MalformedInput("basic credentials are missing the ':'".into())
                })?;
                Ok(Self::Basic {
                    id: id.to_string(),
                    password: password.to_string(),
                })
            }
            "Bearer" => Ok(Self::Bearer(value.to_string())),
            other => Err(AuthError::MalformedInput(format!(
                "unsupported authorization scheme {other:?}"
            ))),
        }
    }

    /// Normalizes a body-supplied password into the same shape the
    /// header path produces.
    pub fn from_password(id: &str, password: &str) -> Self {
        Self::Basic {
            id: id.to_string(),
            password: password.to_string(),
        }
    }
}

/// An authenticated caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub subject: String,
}

/// Validates inbound credentials and yields an authenticated principal.
pub struct AuthGate {
    creds: CredentialStore,
    tokens: Arc<TokenService>,
    totp: TotpService,
}

impl AuthGate {
    pub fn new(creds: CredentialStore, tokens: Arc<TokenService>, totp: TotpService) -> Self {
        Self {
            creds,
            tokens,
            totp,
        }
    }

    /// Password authentication. With 2FA enabled the code must be valid
    /// in the same request. A wrong password is `InvalidCredentials`,
    /// kept distinct from every other failure end-to-end.
    pub fn authenticate_basic(
        &self,
        credentials: &Credentials,
        totp_code: Option<&str>,
    ) -> AuthResult<Principal> {
        let Credentials::Basic { password, .. } = credentials else {
            return Err(AuthError::MalformedInput(
                "expected basic credentials".into(),
            ));
        };

        if !self.creds.exists() {
            return Err(AuthError::NotRegistered);
        }
        let record = self.creds.read()?;
        let stored = record.password.as_deref().ok_or(AuthError::NotRegistered)?;

        if !verify_password(password, stored) {
            return Err(AuthError::InvalidCredentials);
        }

        self.totp.check_login(totp_code)?;

        Ok(Principal {
            subject: SYSTEM_SUBJECT.to_string(),
        })
    }

    /// Bearer authentication for privileged operations. Rejects the
    /// enrollment-only temporary subject.
    pub fn authenticate_bearer(&self, token: &str) -> AuthResult<Principal> {
        let subject = self.tokens.verify_privileged(token)?;
        Ok(Principal { subject })
    }

    /// Bearer authentication for the 2FA-enrollment step only — the
    /// temporary subject is accepted here and nowhere else.
    pub fn authenticate_enrollment(&self, token: &str) -> AuthResult<Principal> {
        let subject = self.tokens.verify(token)?;
        Ok(Principal { subject })
    }
}
