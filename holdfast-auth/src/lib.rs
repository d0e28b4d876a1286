//! Credential lifecycle core for Holdfast.
//!
//! Authenticates the operator (password or RSA-signed bearer token, with
//! optional TOTP second factor), protects the recovery seed, and
//! serializes password rotation behind a small state machine. The HTTP
//! layer, wallet middleware, and host supervisor are external
//! collaborators — this crate exposes the operations they call and
//! nothing transport-shaped.

mod coordinator;
mod error;
mod gate;
mod service;
mod token;
mod totp;

pub use coordinator::{ChangePasswordStatus, PasswordChangeCoordinator};
pub use error::{AuthError, AuthResult};
pub use gate::{AuthGate, Credentials, Principal, SYSTEM_SUBJECT};
pub use service::{
    AccountInfo, AuthConfig, AuthService, MIN_PASSWORD_LENGTH, SEED_WORD_COUNT,
};
pub use token::{
    Claims, TokenService, DEFAULT_KEY_BITS, DEFAULT_TTL_SECONDS, TEMPORARY_SUBJECT,
    TEMPORARY_TTL_SECONDS,
};
pub use totp::TotpService;
