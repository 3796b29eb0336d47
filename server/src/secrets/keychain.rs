use anyhow::Result;
use keyring::{Entry, Error as KeyringError};

/// Keychain account holding the AssemblyAI API key.
pub const API_KEY_ACCOUNT: &str = "assemblyai:api_key";

#[derive(Clone)]
pub struct KeychainStore {
    service_name: String,
}

impl KeychainStore {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    pub fn save_secret(&self, account: &str, value: &str) -> Result<()> {
        let entry = self.entry(account)?;
        entry.set_password(value)?;
        Ok(())
    }

    pub fn get_secret(&self, account: &str) -> Result<Option<String>> {
        let entry = self.entry(account)?;
        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(KeyringError::NoEntry) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn entry(&self, account: &str) -> Result<Entry> {
        Entry::new(&self.service_name, account)
            .map_err(|error| anyhow::anyhow!("keychain entry creation failed: {error}"))
    }
}
