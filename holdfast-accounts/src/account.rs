//! A single account: profile, permissions, balances.
//!
//! Balances are satoshi-denominated and stored as decimal strings;
//! arithmetic goes through `BigInt`, never floating point. Decrementing
//! below zero is not clamped here — it is a caller-checked precondition,
//! kept explicit rather than silently corrected.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use holdfast_crypto::{hash_password, verify_password};
use holdfast_store::FileStore;

use crate::error::{AccountError, AccountResult};

/// Grantable capabilities, checked after authentication succeeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Permission {
    OpenChannel,
    CloseChannels,
    InstallApps,
    ManageUsers,
}

/// The persisted per-account record.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountRecord {
    pub name: String,
    /// Argon2id PHC string. Never logged or returned to clients.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub permissions: Vec<Permission>,
    /// Satoshis, decimal string.
    pub on_chain_balance: String,
    /// Satoshis, decimal string.
    pub lightning_balance: String,
    pub installed_apps: Vec<String>,
}

impl Default for AccountRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            password: None,
            permissions: Vec::new(),
            on_chain_balance: "0".to_string(),
            lightning_balance: "0".to_string(),
            installed_apps: Vec::new(),
        }
    }
}

/// Account info with the password hash stripped — safe for clients.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub name: String,
    pub permissions: Vec<Permission>,
    pub on_chain_balance: String,
    pub lightning_balance: String,
    pub installed_apps: Vec<String>,
}

/// Handle to one account's persisted record.
#[derive(Clone, Debug)]
pub struct Account {
    id: String,
    blob: String,
    files: FileStore,
}

impl Account {
    pub(crate) fn new(id: &str, blob: String, files: FileStore) -> Self {
        Self {
            id: id.to_string(),
            blob,
            files,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn read(&self) -> AccountResult<AccountRecord> {
        self.files
            .read_json(&self.blob)
            .map_err(AccountError::from)
    }

    pub(crate) fn write(&self, record: &AccountRecord) -> AccountResult<()> {
        self.files.write_json(&self.blob, record)?;
        Ok(())
    }

    /// Full profile minus the password hash.
    pub fn info(&self) -> AccountResult<AccountInfo> {
        let record = self.read()?;
        Ok(AccountInfo {
            name: record.name,
            permissions: record.permissions,
            on_chain_balance: record.on_chain_balance,
            lightning_balance: record.lightning_balance,
            installed_apps: record.installed_apps,
        })
    }

    /// Pure permission lookup. Authorization middleware calls this only
    /// after authentication has succeeded.
    pub fn has_permission(&self, permission: Permission) -> AccountResult<bool> {
        Ok(self.read()?.permissions.contains(&permission))
    }

    pub fn add_permission(&self, permission: Permission) -> AccountResult<()> {
        let mut record = self.read()?;
        if !record.permissions.contains(&permission) {
            record.permissions.push(permission);
            self.write(&record)?;
        }
        Ok(())
    }

    pub fn remove_permission(&self, permission: Permission) -> AccountResult<()> {
        let mut record = self.read()?;
        record.permissions.retain(|p| *p != permission);
        self.write(&record)
    }

    pub fn name(&self) -> AccountResult<String> {
        Ok(self.read()?.name)
    }

    pub fn set_name(&self, name: &str) -> AccountResult<()> {
        let mut record = self.read()?;
        record.name = name.to_string();
        self.write(&record)
    }

    /// Verifies a password against this account's stored hash.
    pub fn validate_password(&self, password: &str) -> AccountResult<bool> {
        let record = self.read()?;
        Ok(record
            .password
            .as_deref()
            .is_some_and(|stored| verify_password(password, stored)))
    }

    /// Replaces the password hash. Multi-user accounts carry no sealed
    /// seed, so rotation is a single record write.
    pub fn change_password(&self, new_password: &str) -> AccountResult<()> {
        let mut record = self.read()?;
        record.password =
            Some(hash_password(new_password).map_err(|e| AccountError::Crypto(e.to_string()))?);
        self.write(&record)
    }

    pub fn on_chain_balance(&self) -> AccountResult<BigInt> {
        parse_balance(&self.read()?.on_chain_balance)
    }

    pub fn lightning_balance(&self) -> AccountResult<BigInt> {
        parse_balance(&self.read()?.lightning_balance)
    }

    pub fn set_on_chain_balance(&self, amount: &BigInt) -> AccountResult<()> {
        let mut record = self.read()?;
        record.on_chain_balance = amount.to_string();
        self.write(&record)
    }

    pub fn set_lightning_balance(&self, amount: &BigInt) -> AccountResult<()> {
        let mut record = self.read()?;
        record.lightning_balance = amount.to_string();
        self.write(&record)
    }

    pub fn increment_on_chain_balance(&self, amount: &BigInt) -> AccountResult<()> {
        self.adjust(amount, false, true)
    }

    /// May take the balance negative; preventing that is the caller's
    /// responsibility.
    pub fn decrement_on_chain_balance(&self, amount: &BigInt) -> AccountResult<()> {
        self.adjust(amount, true, true)
    }

    pub fn increment_lightning_balance(&self, amount: &BigInt) -> AccountResult<()> {
        self.adjust(amount, false, false)
    }

    /// May take the balance negative; preventing that is the caller's
    /// responsibility.
    pub fn decrement_lightning_balance(&self, amount: &BigInt) -> AccountResult<()> {
        self.adjust(amount, true, false)
    }

    fn adjust(&self, amount: &BigInt, negate: bool, on_chain: bool) -> AccountResult<()> {
        let mut record = self.read()?;
        let field = if on_chain {
            &mut record.on_chain_balance
        } else {
            &mut record.lightning_balance
        };
        let current = parse_balance(field)?;
        let next = if negate {
            current - amount
        } else {
            current + amount
        };
        *field = next.to_string();
        self.write(&record)
    }
}

fn parse_balance(raw: &str) -> AccountResult<BigInt> {
    raw.parse()
        .map_err(|_| AccountError::Corrupt(format!("unparseable balance {raw:?}")))
}
