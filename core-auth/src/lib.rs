//! # Authentication Module
//!
//! Account registration, login and the persisted session.
//!
//! ## Overview
//!
//! - [`SessionStore`] keeps the bearer token in the platform
//!   [`SecureStore`](bridge_traits::storage::SecureStore).
//! - [`SessionManager`] holds the active token and account in memory, emits
//!   session events and supplies the token to every outgoing request.
//! - [`AuthClient`] calls `/auth/register`, `/auth/login` and `/auth/me`.
//!
//! ## Example
//!
//! ```no_run
//! use core_auth::{AuthClient, Credentials, SessionManager, SessionStore};
//! use core_resources::ApiTransport;
//! use core_runtime::events::EventBus;
//! use std::sync::Arc;
//! # use bridge_traits::{http::HttpClient, storage::SecureStore};
//! # async fn example(http: Arc<dyn HttpClient>, secure: Arc<dyn SecureStore>) -> core_auth::Result<()> {
//! let session = SessionManager::new(SessionStore::new(secure, "social-client"), EventBus::new(100));
//! let transport = ApiTransport::new(http, "https://social.example.com/api")
//!     .with_token_source(Arc::new(session.clone()));
//! let auth = AuthClient::new(transport, session);
//!
//! let response = auth.login(&Credentials::new("ada", "secret1")).await?;
//! println!("signed in as {}", response.user.username);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod session;
pub mod session_store;
pub mod types;

pub use client::AuthClient;
pub use error::{AuthError, Result};
pub use session::SessionManager;
pub use session_store::SessionStore;
pub use types::{AuthResponse, AuthState, Credentials, RegisterRequest, Role, SessionToken, UserSummary};
