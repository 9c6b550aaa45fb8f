//! # Core Configuration Module
//!
//! Provides configuration management for the social client core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds the bridge dependencies and settings needed to talk to
//! the remote API. It enforces fail-fast validation so a misconfigured host
//! finds out at startup rather than on the first request.
//!
//! ## Required Settings
//!
//! - `api_base_url` - Root of the remote REST API (`http://` or `https://`)
//!
//! ## Bridges (with platform defaults)
//!
//! - `HttpClient` - HTTP transport (desktop default: reqwest)
//! - `SecureStore` - Session token persistence (desktop default: OS keychain)
//!
//! When the `desktop-shims` feature is enabled, desktop-ready defaults are
//! injected automatically if not provided. Without it (e.g. in the browser)
//! both bridges must be supplied.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder()
//!     .api_base_url("https://api.example.com/api")
//!     .default_page_size(10)
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{HttpClient, SecureStore};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Page size used when a caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page size the API accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default secure-store namespace for the session token.
pub const DEFAULT_SESSION_NAMESPACE: &str = "social-client";

/// Default event bus capacity.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Core configuration for the social client.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// API root without trailing slash, e.g. `https://api.example.com/api`
    pub api_base_url: String,

    /// HTTP transport used for every API call
    pub http_client: Arc<dyn HttpClient>,

    /// Storage for the session token
    pub secure_store: Arc<dyn SecureStore>,

    /// Page size applied by list helpers that take no explicit size
    pub default_page_size: u32,

    /// Optional per-request timeout forwarded to the transport
    pub request_timeout: Option<Duration>,

    /// Prefix for keys written to the secure store
    pub session_namespace: String,

    /// Capacity of the event bus channel
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("api_base_url", &self.api_base_url)
            .field("http_client", &"HttpClient { ... }")
            .field("secure_store", &"SecureStore { ... }")
            .field("default_page_size", &self.default_page_size)
            .field("request_timeout", &self.request_timeout)
            .field("session_namespace", &self.session_namespace)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - The base URL parses and uses http/https
    /// - The default page size is within `1..=MAX_PAGE_SIZE`
    /// - The session namespace is not empty
    /// - The event buffer can hold at least one event
    pub fn validate(&self) -> Result<()> {
        validate_base_url(&self.api_base_url)?;

        if self.default_page_size == 0 || self.default_page_size > MAX_PAGE_SIZE {
            return Err(Error::Config(format!(
                "Default page size must be between 1 and {} (got {})",
                MAX_PAGE_SIZE, self.default_page_size
            )));
        }

        if self.session_namespace.trim().is_empty() {
            return Err(Error::Config(
                "Session namespace cannot be empty".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout == Some(Duration::ZERO) {
            return Err(Error::Config(
                "Request timeout must be greater than zero when set".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_base_url(raw: &str) -> Result<()> {
    let parsed = Url::parse(raw)
        .map_err(|e| Error::Config(format!("Invalid API base URL '{}': {}", raw, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "API base URL must use http or https (got '{}')",
            parsed.scheme()
        )));
    }

    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(Error::Config(
            "API base URL must not carry a query string or fragment".to_string(),
        ));
    }

    Ok(())
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "No HTTP client implementation provided. \
                 Desktop: ensure the 'desktop-shims' feature is enabled. \
                 Web: inject the fetch-based WasmHttpClient."
            .to_string(),
    })
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::new()
        .map_err(|e| Error::Internal(format!("Failed to create default HttpClient: {}", e)))?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_secure_store(_namespace: &str) -> Result<Arc<dyn SecureStore>> {
    Err(Error::CapabilityMissing {
        capability: "SecureStore".to_string(),
        message: "SecureStore implementation is required for session persistence. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use the default KeyringSecureStore. \
                 Web: inject the localStorage-based secure store."
            .to_string(),
    })
}

#[cfg(feature = "desktop-shims")]
fn provide_default_secure_store(namespace: &str) -> Result<Arc<dyn SecureStore>> {
    use bridge_desktop::KeyringSecureStore;

    Ok(Arc::new(KeyringSecureStore::with_service_name(namespace)))
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    api_base_url: Option<String>,
    http_client: Option<Arc<dyn HttpClient>>,
    secure_store: Option<Arc<dyn SecureStore>>,
    default_page_size: Option<u32>,
    request_timeout: Option<Duration>,
    session_namespace: Option<String>,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    /// Sets the API root. A trailing slash is removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_runtime::config::CoreConfig;
    ///
    /// let builder = CoreConfig::builder()
    ///     .api_base_url("https://api.example.com/api/");
    /// ```
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Sets the HTTP client implementation.
    ///
    /// If not provided, the desktop default (reqwest-based) is used when the
    /// `desktop-shims` feature is enabled.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the secure store used for the session token.
    ///
    /// If not provided, the OS keychain store is used when the
    /// `desktop-shims` feature is enabled.
    pub fn secure_store(mut self, store: Arc<dyn SecureStore>) -> Self {
        self.secure_store = Some(store);
        self
    }

    /// Sets the default page size for list helpers.
    ///
    /// Default: 20
    pub fn default_page_size(mut self, size: u32) -> Self {
        self.default_page_size = Some(size);
        self
    }

    /// Sets a per-request timeout. No timeout is applied by default.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the namespace used for secure-store keys.
    ///
    /// Default: `social-client`
    pub fn session_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.session_namespace = Some(namespace.into());
        self
    }

    /// Sets the event bus capacity.
    ///
    /// Default: 100
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns `Ok(CoreConfig)` on success, or an error if:
    /// - The API base URL is missing or invalid
    /// - A bridge is missing and no platform default exists
    /// - A numeric setting is out of range
    pub fn build(self) -> Result<CoreConfig> {
        let api_base_url = self
            .api_base_url
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .ok_or_else(|| {
                Error::Config(
                    "API base URL is required. Use .api_base_url() to set it.".to_string(),
                )
            })?;

        let session_namespace = self
            .session_namespace
            .unwrap_or_else(|| DEFAULT_SESSION_NAMESPACE.to_string());

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let secure_store = match self.secure_store {
            Some(store) => store,
            None => provide_default_secure_store(&session_namespace)?,
        };

        let config = CoreConfig {
            api_base_url,
            http_client,
            secure_store,
            default_page_size: self.default_page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            request_timeout: self.request_timeout,
            session_namespace,
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;

        Ok(config)
    }
}
