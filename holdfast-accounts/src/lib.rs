//! Multi-user account registry for Holdfast.
//!
//! Extends the single-operator core with per-account records: profile,
//! permission set, and satoshi balances. Records persist through the same
//! file-backed blob store as the operator credential record; bearer
//! tokens come from the `holdfast-auth` token service, where the verified
//! token subject is the identity claim.

mod account;
mod error;
mod registry;

pub use account::{Account, AccountInfo, AccountRecord, Permission};
pub use error::{AccountError, AccountResult};
pub use registry::{AccountRegistry, LoginMethod, RESERVED_IDS};
