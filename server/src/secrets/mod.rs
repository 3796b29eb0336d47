use anyhow::{Context, Result};

pub mod keychain;

use keychain::{KeychainStore, API_KEY_ACCOUNT};

pub const DEFAULT_KEYCHAIN_SERVICE: &str = "live-transcribe";

#[derive(Clone)]
pub struct SecretService {
    store: KeychainStore,
}

impl SecretService {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            store: KeychainStore::new(service_name),
        }
    }

    pub fn save_api_key(&self, api_key: &str) -> Result<()> {
        self.store
            .save_secret(API_KEY_ACCOUNT, api_key.trim())
            .context("failed to save AssemblyAI API key")
    }

    pub fn get_api_key(&self) -> Result<Option<String>> {
        self.store.get_secret(API_KEY_ACCOUNT)
    }

    /// Environment value first, keychain second. Keychain failures are logged
    /// and treated as "not configured".
    pub fn resolve_api_key(&self, from_env: Option<&str>) -> Option<String> {
        if let Some(key) = from_env.map(str::trim).filter(|key| !key.is_empty()) {
            tracing::debug!("assemblyai_api_key_from_env");
            return Some(key.to_string());
        }

        match self.get_api_key() {
            Ok(Some(key)) if !key.trim().is_empty() => {
                tracing::debug!("assemblyai_api_key_from_keychain");
                Some(key)
            }
            Ok(_) => None,
            Err(error) => {
                tracing::warn!(error = %error, "keychain lookup failed");
                None
            }
        }
    }
}
