//! Session Token Storage
//!
//! Persists the bearer token through the platform [`SecureStore`] so a
//! session survives restarts.
//!
//! The token is stored as JSON under `{namespace}:session-token`. Entries that
//! fail to decode are deleted and reported as absent. Token values are never
//! logged.
//!
//! ## Example
//!
//! ```no_run
//! use core_auth::{SessionStore, SessionToken};
//! use std::sync::Arc;
//! # use bridge_traits::storage::SecureStore;
//! # async fn example(secure_store: Arc<dyn SecureStore>) -> core_auth::Result<()> {
//! let store = SessionStore::new(secure_store, "social-client");
//!
//! store.save(&SessionToken::new("eyJhbGciOi...", chrono::Utc::now())).await?;
//! let restored = store.load().await?;
//! store.clear().await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::types::SessionToken;
use bridge_traits::storage::SecureStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

const SESSION_KEY_SUFFIX: &str = "session-token";

/// Secure storage for the session token.
#[derive(Clone)]
pub struct SessionStore {
    secure_store: Arc<dyn SecureStore>,
    key: String,
}

impl SessionStore {
    pub fn new(secure_store: Arc<dyn SecureStore>, namespace: &str) -> Self {
        debug!(namespace, "Initializing SessionStore");
        Self {
            secure_store,
            key: format!("{}:{}", namespace, SESSION_KEY_SUFFIX),
        }
    }

    /// Key the token is stored under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Store the token, overwriting any previous one.
    pub async fn save(&self, token: &SessionToken) -> Result<()> {
        let json = serde_json::to_vec(token).map_err(|e| {
            warn!(error = %e, "Failed to serialize session token");
            AuthError::Serialization(e.to_string())
        })?;

        self.secure_store
            .set_secret(&self.key, &json)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to store session token");
                AuthError::SecureStorageUnavailable(e.to_string())
            })?;

        info!(issued_at = %token.issued_at, "Session token stored");
        Ok(())
    }

    /// Load the stored token.
    ///
    /// Returns `Ok(None)` when nothing is stored or the stored entry is
    /// corrupt. Only storage failures are errors.
    pub async fn load(&self) -> Result<Option<SessionToken>> {
        let bytes = self
            .secure_store
            .get_secret(&self.key)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to read session token");
                AuthError::SecureStorageUnavailable(e.to_string())
            })?;

        let Some(bytes) = bytes else {
            debug!("No stored session token");
            return Ok(None);
        };

        match serde_json::from_slice::<SessionToken>(&bytes) {
            Ok(token) if !token.token.is_empty() => {
                debug!(issued_at = %token.issued_at, "Session token loaded");
                Ok(Some(token))
            }
            Ok(_) | Err(_) => {
                warn!("Stored session token is corrupt, deleting it");
                if let Err(e) = self.secure_store.delete_secret(&self.key).await {
                    warn!(error = %e, "Failed to delete corrupt session token");
                }
                Ok(None)
            }
        }
    }

    /// Delete the stored token. Clearing an empty store is not an error.
    pub async fn clear(&self) -> Result<()> {
        self.secure_store
            .delete_secret(&self.key)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to delete session token");
                AuthError::SecureStorageUnavailable(e.to_string())
            })?;
        info!("Session token cleared");
        Ok(())
    }

    pub async fn exists(&self) -> Result<bool> {
        self.secure_store
            .has_secret(&self.key)
            .await
            .map_err(|e| AuthError::SecureStorageUnavailable(e.to_string()))
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_desktop::MemorySecureStore;
    use chrono::{TimeZone, Utc};

    fn token() -> SessionToken {
        SessionToken::new("abc.def.ghi", Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = SessionStore::new(Arc::new(MemorySecureStore::new()), "test");

        assert_eq!(store.load().await.unwrap(), None);
        store.save(&token()).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(token()));
        assert!(store.exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_key_is_namespaced() {
        let secure = Arc::new(MemorySecureStore::new());
        let store = SessionStore::new(secure.clone(), "acme");
        store.save(&token()).await.unwrap();

        assert_eq!(store.key(), "acme:session-token");
        assert!(secure.has_secret("acme:session-token").await.unwrap());
        let other = SessionStore::new(secure, "other");
        assert_eq!(other.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_deleted() {
        let secure = Arc::new(MemorySecureStore::new());
        secure
            .set_secret("test:session-token", b"not json")
            .await
            .unwrap();
        let store = SessionStore::new(secure.clone(), "test");

        assert_eq!(store.load().await.unwrap(), None);
        assert!(!secure.has_secret("test:session-token").await.unwrap());
    }

    #[tokio::test]
    async fn test_clear() {
        let store = SessionStore::new(Arc::new(MemorySecureStore::new()), "test");
        store.clear().await.unwrap();

        store.save(&token()).await.unwrap();
        store.clear().await.unwrap();

        assert!(!store.exists().await.unwrap());
    }
}
