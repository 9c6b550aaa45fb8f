//! `localStorage`-backed implementation of the `SecureStore` bridge.
//!
//! The browser offers no keychain, so secrets are kept in `localStorage`
//! (base64 encoded, namespaced per host shell). This matches what a web
//! front-end does with its session token; hosts with stricter requirements
//! should inject their own `SecureStore`.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    storage::SecureStore,
};

use crate::js_error;

const SECURE_PREFIX: &str = "secure";

fn local_storage() -> BridgeResult<web_sys::Storage> {
    let window = web_sys::window().ok_or_else(|| BridgeError::NotAvailable("window".into()))?;
    window
        .local_storage()
        .map_err(|err| js_error("localStorage", err))?
        .ok_or_else(|| BridgeError::NotAvailable("localStorage".into()))
}

fn namespaced_prefix(namespace: &str) -> String {
    format!("{namespace}::{SECURE_PREFIX}::")
}

/// Secure store persisting values in the browser's `localStorage`.
#[derive(Clone)]
pub struct LocalStorageSecureStore {
    storage: web_sys::Storage,
    namespace: String,
}

impl LocalStorageSecureStore {
    /// Construct a new store scoped to the provided namespace.
    pub fn new(namespace: impl Into<String>) -> BridgeResult<Self> {
        Ok(Self {
            storage: local_storage()?,
            namespace: namespace.into(),
        })
    }

    fn key_for(&self, key: &str) -> String {
        format!("{}{key}", namespaced_prefix(&self.namespace))
    }
}

#[async_trait(?Send)]
impl SecureStore for LocalStorageSecureStore {
    async fn set_secret(&self, key: &str, value: &[u8]) -> BridgeResult<()> {
        self.storage
            .set_item(&self.key_for(key), &BASE64.encode(value))
            .map_err(|err| js_error("set_item", err))
    }

    async fn get_secret(&self, key: &str) -> BridgeResult<Option<Vec<u8>>> {
        let Some(stored) = self
            .storage
            .get_item(&self.key_for(key))
            .map_err(|err| js_error("get_item", err))?
        else {
            return Ok(None);
        };

        BASE64
            .decode(stored)
            .map(Some)
            .map_err(|err| BridgeError::OperationFailed(format!("decode secret: {err}")))
    }

    async fn delete_secret(&self, key: &str) -> BridgeResult<()> {
        self.storage
            .remove_item(&self.key_for(key))
            .map_err(|err| js_error("remove_item", err))
    }

    async fn list_keys(&self) -> BridgeResult<Vec<String>> {
        let prefix = namespaced_prefix(&self.namespace);
        let length = self
            .storage
            .length()
            .map_err(|err| js_error("storage length", err))?;

        let mut keys = Vec::new();
        for index in 0..length {
            let key = self
                .storage
                .key(index)
                .map_err(|err| js_error("storage key", err))?;
            if let Some(stripped) = key.as_deref().and_then(|k| k.strip_prefix(&prefix)) {
                keys.push(stripped.to_string());
            }
        }
        Ok(keys)
    }

    async fn clear_all(&self) -> BridgeResult<()> {
        for key in self.list_keys().await? {
            self.delete_secret(&key).await?;
        }
        Ok(())
    }
}
