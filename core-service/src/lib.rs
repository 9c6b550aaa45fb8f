//! Core service façade and bootstrap helpers.
//!
//! [`SocialService`] wires a validated [`CoreConfig`] into the shared core:
//! one transport, one session, one event bus. Feature wrappers are created
//! fresh on every call, so each screen gets its own isolated mirror.
//!
//! Desktop apps typically enable the `desktop-shims` feature, which lets the
//! config fall back to `bridge-desktop`. WebAssembly builds enable `wasm` and
//! start through [`bootstrap_wasm`].
//!
//! ```no_run
//! # async fn example() -> core_service::Result<()> {
//! use core_runtime::config::CoreConfig;
//! use core_service::SocialService;
//!
//! let config = CoreConfig::builder()
//!     .api_base_url("https://social.example.com/api")
//!     .build()?;
//! let service = SocialService::new(config)?;
//!
//! service.restore_session().await?;
//! let posts = service.posts();
//! posts.feed(&service.first_page()).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use core_auth::{AuthClient, SessionManager, SessionStore};
use core_resources::{ApiTransport, PageRequest};
use core_runtime::config::CoreConfig;
use core_runtime::events::{EventBus, EventStream};
use core_social::{
    CommentService, FollowService, NotificationService, PostService, ReactionService,
    ReportService, UserService,
};
use tracing::{debug, info};

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct SocialService {
    config: Arc<CoreConfig>,
    event_bus: EventBus,
    transport: ApiTransport,
    session: SessionManager,
    auth: AuthClient,
}

impl SocialService {
    /// Build the service from a configuration. The configuration is
    /// validated again, so hand-assembled configs fail here rather than on
    /// the first request.
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;

        let event_bus = EventBus::new(config.event_buffer_size);
        let store = SessionStore::new(Arc::clone(&config.secure_store), &config.session_namespace);
        let session = SessionManager::new(store, event_bus.clone());

        let mut transport = ApiTransport::new(Arc::clone(&config.http_client), &config.api_base_url)
            .with_token_source(Arc::new(session.clone()));
        if let Some(timeout) = config.request_timeout {
            transport = transport.with_timeout(timeout);
        }

        let auth = AuthClient::new(transport.clone(), session.clone());

        info!(
            api_base_url = %config.api_base_url,
            namespace = %config.session_namespace,
            "Social service ready"
        );

        Ok(Self {
            config: Arc::new(config),
            event_bus,
            transport,
            session,
            auth,
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Subscribe to session and resource events.
    pub fn events(&self) -> EventStream {
        EventStream::new(self.event_bus.subscribe())
    }

    /// First page at the configured default size.
    pub fn first_page(&self) -> PageRequest {
        PageRequest::first(self.config.default_page_size)
    }

    /// Load a persisted token, if any. Returns whether one was found.
    pub async fn restore_session(&self) -> Result<bool> {
        let restored = self.session.restore().await?;
        debug!(restored, "Session restore requested");
        Ok(restored)
    }

    pub fn posts(&self) -> PostService {
        PostService::new(self.transport.clone()).with_event_bus(self.event_bus.clone())
    }

    pub fn comments(&self) -> CommentService {
        CommentService::new(self.transport.clone()).with_event_bus(self.event_bus.clone())
    }

    pub fn reactions(&self) -> ReactionService {
        ReactionService::new(self.transport.clone()).with_event_bus(self.event_bus.clone())
    }

    pub fn follows(&self) -> FollowService {
        FollowService::new(self.transport.clone()).with_event_bus(self.event_bus.clone())
    }

    pub fn notifications(&self) -> NotificationService {
        NotificationService::new(self.transport.clone()).with_event_bus(self.event_bus.clone())
    }

    pub fn reports(&self) -> ReportService {
        ReportService::new(self.transport.clone()).with_event_bus(self.event_bus.clone())
    }

    /// Users wrapper wired to the session, so tokens issued by an
    /// administrative update take effect immediately.
    pub fn users(&self) -> UserService {
        UserService::new(self.transport.clone())
            .with_event_bus(self.event_bus.clone())
            .with_session(self.session.clone())
    }
}

impl std::fmt::Debug for SocialService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocialService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Convenience bootstrapper for WebAssembly hosts.
///
/// Uses the browser's `fetch` and `localStorage`, both scoped to `namespace`.
///
/// ```ignore
/// let core = core_service::bootstrap_wasm("my-app", "https://social.example.com/api").await?;
/// core.restore_session().await?;
/// ```
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub async fn bootstrap_wasm(namespace: &str, api_base_url: &str) -> Result<SocialService> {
    use bridge_wasm::{LocalStorageSecureStore, WasmHttpClient};

    let http_client =
        WasmHttpClient::new().map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
    let secure_store = LocalStorageSecureStore::new(namespace)
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;

    let config = CoreConfig::builder()
        .api_base_url(api_base_url)
        .http_client(Arc::new(http_client))
        .secure_store(Arc::new(secure_store))
        .session_namespace(namespace)
        .build()?;

    let service = SocialService::new(config)?;
    service.restore_session().await?;
    Ok(service)
}
