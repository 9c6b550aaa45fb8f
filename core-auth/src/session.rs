//! Session Management
//!
//! [`SessionManager`] owns the active bearer token and the signed-in account.
//! It persists the token through [`SessionStore`], publishes
//! [`SessionEvent`]s on the event bus and hands the token to
//! [`ApiTransport`](core_resources::ApiTransport) as its
//! [`AccessTokenSource`].

use crate::error::Result;
use crate::session_store::SessionStore;
use crate::types::{AuthState, SessionToken, UserSummary};
use bridge_traits::time::{Clock, SystemClock};
use core_resources::AccessTokenSource;
use core_runtime::events::{CoreEvent, EventBus, SessionEvent};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

#[derive(Default)]
struct SessionState {
    token: Option<SessionToken>,
    user: Option<UserSummary>,
}

/// Active session shared by the auth client and the transport.
#[derive(Clone)]
pub struct SessionManager {
    store: SessionStore,
    event_bus: EventBus,
    clock: Arc<dyn Clock>,
    state: Arc<RwLock<SessionState>>,
}

impl SessionManager {
    pub fn new(store: SessionStore, event_bus: EventBus) -> Self {
        Self {
            store,
            event_bus,
            clock: Arc::new(SystemClock),
            state: Arc::new(RwLock::new(SessionState::default())),
        }
    }

    /// Stamp issued tokens with `clock` instead of the system time.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Load a previously stored token into memory.
    ///
    /// Returns whether a token was found. The account stays unknown until
    /// the caller fetches it.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Result<bool> {
        let stored = self.store.load().await?;
        let found = stored.is_some();
        let mut state = self.state.write().await;
        state.token = stored;
        state.user = None;
        debug!(found, "Session restore finished");
        Ok(found)
    }

    /// Start a session for `user` with a freshly issued token.
    #[instrument(skip(self, token, user), fields(user_id = user.id))]
    pub async fn sign_in(&self, token: String, user: UserSummary) -> Result<()> {
        let token = SessionToken::new(token, self.clock.now());
        self.store.save(&token).await?;

        let event = SessionEvent::SignedIn {
            user_id: user.id,
            username: user.username.clone(),
        };
        {
            let mut state = self.state.write().await;
            state.token = Some(token);
            state.user = Some(user);
        }

        info!("Signed in");
        let _ = self.event_bus.emit(CoreEvent::Session(event));
        Ok(())
    }

    /// Swap the bearer token while keeping the signed-in account.
    #[instrument(skip(self, token))]
    pub async fn replace_token(&self, token: String) -> Result<()> {
        let token = SessionToken::new(token, self.clock.now());
        self.store.save(&token).await?;
        self.state.write().await.token = Some(token);

        info!("Session token replaced");
        let _ = self.event_bus.emit(CoreEvent::Session(SessionEvent::TokenReplaced));
        Ok(())
    }

    /// End the session at the user's request.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<()> {
        let result = self.end(SessionEvent::SignedOut).await;
        info!("Signed out");
        result
    }

    /// End the session because the server rejected its token.
    #[instrument(skip(self))]
    pub async fn expire(&self) -> Result<()> {
        let result = self.end(SessionEvent::SessionExpired).await;
        warn!("Session expired");
        result
    }

    /// Memory is cleared and the event published even if the stored token
    /// cannot be deleted. The storage error is still returned.
    async fn end(&self, event: SessionEvent) -> Result<()> {
        {
            let mut state = self.state.write().await;
            state.token = None;
            state.user = None;
        }
        let cleared = self.store.clear().await;
        let _ = self.event_bus.emit(CoreEvent::Session(event));
        cleared
    }

    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token.as_ref().map(|t| t.token.clone())
    }

    pub async fn issued_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.state.read().await.token.as_ref().map(|t| t.issued_at)
    }

    pub async fn current_user(&self) -> Option<UserSummary> {
        self.state.read().await.user.clone()
    }

    /// Remember the account fetched for the current token.
    pub async fn set_current_user(&self, user: UserSummary) {
        self.state.write().await.user = Some(user);
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.token.is_some()
    }

    pub async fn state(&self) -> AuthState {
        if self.is_authenticated().await {
            AuthState::SignedIn
        } else {
            AuthState::SignedOut
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl AccessTokenSource for SessionManager {
    async fn access_token(&self) -> Option<String> {
        self.token().await
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use bridge_desktop::MemorySecureStore;
    use bridge_traits::storage::SecureStore;
    use bridge_traits::time::FixedClock;
    use chrono::{TimeZone, Utc};

    fn user() -> UserSummary {
        UserSummary {
            id: 42,
            username: "ada".to_string(),
            email: Some("ada@example.com".to_string()),
            role: Role::User,
        }
    }

    fn manager(secure: Arc<MemorySecureStore>, bus: EventBus) -> SessionManager {
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        SessionManager::new(SessionStore::new(secure, "test"), bus).with_clock(Arc::new(clock))
    }

    #[tokio::test]
    async fn test_sign_in_persists_and_emits() {
        let secure = Arc::new(MemorySecureStore::new());
        let bus = EventBus::new(8);
        let mut events = bus.subscribe();
        let session = manager(secure.clone(), bus);

        session.sign_in("tok-1".to_string(), user()).await.unwrap();

        assert_eq!(session.access_token().await.as_deref(), Some("tok-1"));
        assert_eq!(session.current_user().await, Some(user()));
        assert_eq!(session.state().await, AuthState::SignedIn);
        assert_eq!(
            session.issued_at().await,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
        );
        assert!(secure.has_secret("test:session-token").await.unwrap());
        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Session(SessionEvent::SignedIn {
                user_id: 42,
                username: "ada".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_restore_reads_stored_token() {
        let secure = Arc::new(MemorySecureStore::new());
        manager(secure.clone(), EventBus::new(8))
            .sign_in("tok-1".to_string(), user())
            .await
            .unwrap();

        let restored = manager(secure, EventBus::new(8));
        assert!(!restored.is_authenticated().await);
        assert!(restored.restore().await.unwrap());

        assert_eq!(restored.token().await.as_deref(), Some("tok-1"));
        assert_eq!(restored.current_user().await, None);
    }

    #[tokio::test]
    async fn test_restore_without_token() {
        let session = manager(Arc::new(MemorySecureStore::new()), EventBus::new(8));
        assert!(!session.restore().await.unwrap());
        assert_eq!(session.access_token().await, None);
    }

    #[tokio::test]
    async fn test_replace_token_keeps_user() {
        let bus = EventBus::new(8);
        let session = manager(Arc::new(MemorySecureStore::new()), bus.clone());
        session.sign_in("tok-1".to_string(), user()).await.unwrap();
        let mut events = bus.subscribe();

        session.replace_token("tok-2".to_string()).await.unwrap();

        assert_eq!(session.token().await.as_deref(), Some("tok-2"));
        assert_eq!(session.current_user().await, Some(user()));
        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Session(SessionEvent::TokenReplaced)
        );
    }

    #[tokio::test]
    async fn test_sign_out_and_expire_clear_everything() {
        let secure = Arc::new(MemorySecureStore::new());
        let bus = EventBus::new(8);
        let session = manager(secure.clone(), bus.clone());
        let mut events = bus.subscribe();

        session.sign_in("tok-1".to_string(), user()).await.unwrap();
        session.sign_out().await.unwrap();
        assert!(!session.is_authenticated().await);
        assert!(!secure.has_secret("test:session-token").await.unwrap());

        session.sign_in("tok-2".to_string(), user()).await.unwrap();
        session.expire().await.unwrap();
        assert_eq!(session.current_user().await, None);

        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[1], CoreEvent::Session(SessionEvent::SignedOut));
        assert_eq!(seen[3], CoreEvent::Session(SessionEvent::SessionExpired));
    }
}
