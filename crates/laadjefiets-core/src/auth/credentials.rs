use anyhow::{Context, Result};
use keyring::Entry;

use super::session::TokenStore;

const SERVICE_NAME: &str = "laadjefiets";

/// Keychain account the bearer token is stored under.
const TOKEN_ACCOUNT: &str = "api-token";

/// Token store backed by the OS keychain.
pub struct KeyringTokenStore {
    account: String,
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new(TOKEN_ACCOUNT)
    }
}

impl KeyringTokenStore {
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(SERVICE_NAME, &self.account).context("Failed to create keyring entry")
    }
}

impl TokenStore for KeyringTokenStore {
    fn load(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    fn save(&self, token: &str) -> Result<()> {
        self.entry()?
            .set_password(token)
            .context("Failed to store token in keychain")
    }

    fn clear(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}
