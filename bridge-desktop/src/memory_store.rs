//! In-memory `SecureStore` for tests and ephemeral sessions.

use async_trait::async_trait;
use bridge_traits::{error::Result, storage::SecureStore};
use std::collections::HashMap;
use std::sync::Mutex;

/// Secure store that keeps secrets in process memory only.
///
/// Nothing survives a restart, which makes it a good fit for tests and for
/// "do not remember me" sessions.
#[derive(Debug, Default)]
pub struct MemorySecureStore {
    secrets: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemorySecureStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_secrets<R>(&self, f: impl FnOnce(&mut HashMap<String, Vec<u8>>) -> R) -> R {
        let mut guard = self
            .secrets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

#[async_trait]
impl SecureStore for MemorySecureStore {
    async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()> {
        self.with_secrets(|secrets| {
            secrets.insert(key.to_string(), value.to_vec());
        });
        Ok(())
    }

    async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.with_secrets(|secrets| secrets.get(key).cloned()))
    }

    async fn delete_secret(&self, key: &str) -> Result<()> {
        self.with_secrets(|secrets| {
            secrets.remove(key);
        });
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let mut keys = self.with_secrets(|secrets| secrets.keys().cloned().collect::<Vec<_>>());
        keys.sort();
        Ok(keys)
    }

    async fn clear_all(&self) -> Result<()> {
        self.with_secrets(|secrets| secrets.clear());
        Ok(())
    }
}
