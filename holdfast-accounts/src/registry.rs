//! The account registry: creation, lookup, and login strategies.

use std::sync::Arc;

use holdfast_auth::{AuthError, TokenService};
use holdfast_crypto::hash_password;
use holdfast_store::FileStore;

use crate::account::{Account, AccountRecord, Permission};
use crate::error::{AccountError, AccountResult};

/// Identifiers that can never name an account: the single-operator
/// system subject and the enrollment-only token subject.
pub const RESERVED_IDS: &[&str] = &["admin", "temporary"];

/// Blob holding the global account-id index.
const INDEX_BLOB: &str = "accounts.json";

/// How a caller proves who they are.
#[derive(Clone, Copy, Debug)]
pub enum LoginMethod<'a> {
    /// Password strategy — the caller must claim an id.
    Password { id: &'a str, password: &'a str },
    /// Token strategy — the verified subject *is* the identity claim,
    /// no separate id needed.
    Token(&'a str),
}

/// Maps account identifiers to records, layered on the blob store.
pub struct AccountRegistry {
    files: FileStore,
    tokens: Arc<TokenService>,
}

impl AccountRegistry {
    pub fn new(files: FileStore, tokens: Arc<TokenService>) -> Self {
        Self { files, tokens }
    }

    /// Creates an account with zeroed balances and a hashed password,
    /// and registers the id in the global index. Reserved identifiers
    /// and duplicates are rejected.
    pub fn create(
        &self,
        id: &str,
        name: &str,
        permissions: Vec<Permission>,
        password: &str,
    ) -> AccountResult<Account> {
        validate_id(id)?;
        if RESERVED_IDS.contains(&id) {
            return Err(AccountError::ReservedId(id.to_string()));
        }
        if self.exists(id) {
            return Err(AccountError::AlreadyExists(id.to_string()));
        }

        let record = AccountRecord {
            name: name.to_string(),
            password: Some(
                hash_password(password).map_err(|e| AccountError::Crypto(e.to_string()))?,
            ),
            permissions,
            ..Default::default()
        };

        let account = self.handle(id);
        account.write(&record)?;

        let mut index = self.list_ids()?;
        if !index.contains(&id.to_string()) {
            index.push(id.to_string());
            self.files.write_json(INDEX_BLOB, &index)?;
        }

        Ok(account)
    }

    /// Looks an account up by id.
    pub fn get(&self, id: &str) -> AccountResult<Account> {
        validate_id(id)?;
        if !self.exists(id) {
            return Err(AccountError::NotFound(id.to_string()));
        }
        Ok(self.handle(id))
    }

    /// Authenticates with one of the two strategies and returns the
    /// account. Every failure that stems from what the caller presented
    /// maps to `InvalidCredentials`.
    pub fn login(&self, method: LoginMethod<'_>) -> AccountResult<Account> {
        match method {
            LoginMethod::Password { id, password } => {
                let account = self
                    .get(id)
                    .map_err(|_| AccountError::InvalidCredentials)?;
                if !account.validate_password(password)? {
                    return Err(AccountError::InvalidCredentials);
                }
                Ok(account)
            }
            LoginMethod::Token(token) => {
                let subject = self.tokens.verify_privileged(token).map_err(|e| match e {
                    AuthError::InvalidCredentials => AccountError::InvalidCredentials,
                    other => AccountError::Crypto(other.to_string()),
                })?;
                self.get(&subject)
                    .map_err(|_| AccountError::InvalidCredentials)
            }
        }
    }

    /// Issues a bearer token whose subject is the account id.
    pub fn issue_token(&self, account: &Account) -> AccountResult<String> {
        self.tokens
            .issue(account.id())
            .map_err(|e| AccountError::Crypto(e.to_string()))
    }

    pub fn exists(&self, id: &str) -> bool {
        validate_id(id).is_ok() && self.files.exists(&account_blob(id))
    }

    /// All registered account ids, in creation order.
    pub fn list_ids(&self) -> AccountResult<Vec<String>> {
        if !self.files.exists(INDEX_BLOB) {
            return Ok(Vec::new());
        }
        self.files.read_json(INDEX_BLOB).map_err(AccountError::from)
    }

    fn handle(&self, id: &str) -> Account {
        Account::new(id, account_blob(id), self.files.clone())
    }
}

fn account_blob(id: &str) -> String {
    format!("account-{id}.json")
}

/// Account ids double as blob-name components, so they are restricted to
/// lowercase alphanumerics, `-`, and `_`.
fn validate_id(id: &str) -> AccountResult<()> {
    let ok = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(AccountError::MalformedInput(format!(
            "invalid account id {id:?}"
        )))
    }
}
