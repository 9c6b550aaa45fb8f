//! Secure Credential Storage using OS Keychain

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bridge_traits::{
    error::{BridgeError, Result},
    storage::SecureStore,
};
use keyring::Entry;
use std::collections::BTreeSet;
use tracing::{debug, error};

/// Keyring entry holding the JSON list of keys written through this store.
const KEY_INDEX_ENTRY: &str = "__key_index__";

/// Keyring-based secure storage implementation
///
/// Uses platform-specific secure storage:
/// - macOS: Keychain
/// - Windows: Credential Manager
/// - Linux: Secret Service (libsecret)
///
/// Keyring backends cannot enumerate entries, so the store keeps its own index
/// of written keys under a reserved entry. `list_keys` and `clear_all` work
/// from that index.
pub struct KeyringSecureStore {
    service_name: String,
}

impl KeyringSecureStore {
    /// Create a new secure store with default service name
    pub fn new() -> Self {
        Self::with_service_name("social-client")
    }

    /// Create a new secure store with custom service name
    pub fn with_service_name(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service_name, key).map_err(Self::map_keyring_error)
    }

    fn map_keyring_error(e: keyring::Error) -> BridgeError {
        BridgeError::OperationFailed(format!("Keyring error: {}", e))
    }

    fn read_index(&self) -> Result<BTreeSet<String>> {
        match self.entry(KEY_INDEX_ENTRY)?.get_password() {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                error!(error = %e, "Keyring key index is corrupt");
                BridgeError::OperationFailed(format!("Corrupt keyring index: {}", e))
            }),
            Err(keyring::Error::NoEntry) => Ok(BTreeSet::new()),
            Err(e) => Err(Self::map_keyring_error(e)),
        }
    }

    fn write_index(&self, index: &BTreeSet<String>) -> Result<()> {
        let entry = self.entry(KEY_INDEX_ENTRY)?;
        if index.is_empty() {
            return match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(Self::map_keyring_error(e)),
            };
        }

        let raw = serde_json::to_string(index)
            .map_err(|e| BridgeError::OperationFailed(format!("Index encoding failed: {}", e)))?;
        entry.set_password(&raw).map_err(Self::map_keyring_error)
    }

    fn delete_entry(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) => {
                debug!(key = key, "Deleted secret from keyring");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => {
                debug!(key = key, "Secret not found (already deleted)");
                Ok(())
            }
            Err(e) => Err(Self::map_keyring_error(e)),
        }
    }
}

impl Default for KeyringSecureStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecureStore for KeyringSecureStore {
    async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()> {
        // Keyring only stores strings
        let encoded = STANDARD.encode(value);
        self.entry(key)?
            .set_password(&encoded)
            .map_err(Self::map_keyring_error)?;

        let mut index = self.read_index()?;
        if index.insert(key.to_string()) {
            self.write_index(&index)?;
        }

        debug!(key = key, "Stored secret in keyring");
        Ok(())
    }

    async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.entry(key)?.get_password() {
            Ok(encoded) => {
                let decoded = STANDARD.decode(&encoded).map_err(|e| {
                    error!(key = key, error = %e, "Failed to decode secret");
                    BridgeError::OperationFailed(format!("Failed to decode secret: {}", e))
                })?;
                Ok(Some(decoded))
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(Self::map_keyring_error(e)),
        }
    }

    async fn delete_secret(&self, key: &str) -> Result<()> {
        self.delete_entry(key)?;

        let mut index = self.read_index()?;
        if index.remove(key) {
            self.write_index(&index)?;
        }
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        Ok(self.read_index()?.into_iter().collect())
    }

    async fn clear_all(&self) -> Result<()> {
        let index = self.read_index()?;
        for key in &index {
            self.delete_entry(key)?;
        }
        self.write_index(&BTreeSet::new())?;

        debug!(count = index.len(), "Cleared keyring secrets");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_service_name() {
        let store = KeyringSecureStore::new();
        assert_eq!(store.service_name, "social-client");
    }

    #[test]
    fn test_custom_service_name() {
        let store = KeyringSecureStore::with_service_name("social-client-test");
        assert_eq!(store.service_name, "social-client-test");
    }

    #[tokio::test]
    async fn test_set_and_get_secret() {
        // Keyring may be unavailable on headless systems; treat that as a skip.
        let store = KeyringSecureStore::with_service_name("social-client-keyring-test");
        let key = "session-token-test";

        if let Err(e) = store.set_secret(key, b"opaque-token").await {
            println!("Keyring not available ({}), skipping test", e);
            return;
        }

        if let Ok(Some(retrieved)) = store.get_secret(key).await {
            assert_eq!(retrieved, b"opaque-token".to_vec());
        }

        let _ = store.delete_secret(key).await;
    }
}
