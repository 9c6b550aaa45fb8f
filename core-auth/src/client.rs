//! Account endpoints
//!
//! [`AuthClient`] talks to `/auth/*` and keeps the [`SessionManager`] in step
//! with the server's answers. Form fields are validated locally first, so an
//! obviously bad submission never reaches the network.

use crate::error::{AuthError, Result};
use crate::session::SessionManager;
use crate::types::{AuthResponse, Credentials, RegisterRequest, UserSummary};
use core_resources::ApiTransport;
use tracing::{info, instrument, warn};

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 50;
pub const PASSWORD_MIN_LEN: usize = 6;

const REGISTER_PATH: &str = "/auth/register";
const LOGIN_PATH: &str = "/auth/login";
const ME_PATH: &str = "/auth/me";

#[derive(Debug, Clone)]
pub struct AuthClient {
    transport: ApiTransport,
    session: SessionManager,
}

impl AuthClient {
    /// `transport` should use `session` as its token source so `/auth/me`
    /// is sent with the current token.
    pub fn new(transport: ApiTransport, session: SessionManager) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Create an account. The returned token starts a session immediately.
    ///
    /// The account exists once the server answers. A
    /// [`AuthError::SecureStorageUnavailable`] error means only that no local
    /// session was started; [`login`](Self::login) can be retried once
    /// storage is available again.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        validate_username(&request.username)?;
        validate_password(&request.password)?;
        validate_email(&request.email)?;

        let response: AuthResponse = self
            .transport
            .post(REGISTER_PATH, request)
            .await
            .map_err(|e| match e.status() {
                Some(409) => AuthError::UsernameTaken,
                _ => AuthError::from(e),
            })?;

        self.start_session(&response).await?;
        info!(user_id = response.user.id, "Account registered");
        Ok(response)
    }

    /// Sign in. Fails with [`AuthError::SecureStorageUnavailable`] when the
    /// issued token cannot be persisted, leaving the client signed out.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        validate_username(&credentials.username)?;
        validate_password(&credentials.password)?;

        let response: AuthResponse = self
            .transport
            .post(LOGIN_PATH, credentials)
            .await
            .map_err(|e| {
                if e.is_unauthorized() {
                    warn!("Login rejected");
                    AuthError::InvalidCredentials
                } else {
                    AuthError::from(e)
                }
            })?;

        self.start_session(&response).await?;
        Ok(response)
    }

    async fn start_session(&self, response: &AuthResponse) -> Result<()> {
        self.session
            .sign_in(response.token.clone(), response.user.clone())
            .await
            .inspect_err(|err| {
                warn!(
                    user_id = response.user.id,
                    error = %err,
                    "Server accepted credentials but no session was started"
                );
            })
    }

    /// Drop the local session. The API keeps no server-side session state.
    pub async fn logout(&self) -> Result<()> {
        self.session.sign_out().await
    }

    /// Fetch the account behind the current token.
    ///
    /// A `401` means the token is no longer accepted: the session is expired
    /// and [`AuthError::NotAuthenticated`] is returned.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<UserSummary> {
        if !self.session.is_authenticated().await {
            return Err(AuthError::NotAuthenticated);
        }

        match self.transport.get::<UserSummary>(ME_PATH, &[]).await {
            Ok(user) => {
                self.session.set_current_user(user.clone()).await;
                Ok(user)
            }
            Err(e) if e.is_unauthorized() => {
                self.session.expire().await?;
                Err(AuthError::NotAuthenticated)
            }
            Err(e) => Err(AuthError::from(e)),
        }
    }

    /// Install a token issued outside the login flow.
    pub async fn replace_token(&self, token: impl Into<String>) -> Result<()> {
        let token = token.into();
        if token.is_empty() {
            return Err(AuthError::invalid("token", "must not be empty"));
        }
        self.session.replace_token(token).await
    }
}

pub fn validate_username(username: &str) -> Result<()> {
    let len = username.trim().chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(AuthError::invalid(
            "username",
            format!(
                "must be between {} and {} characters",
                USERNAME_MIN_LEN, USERNAME_MAX_LEN
            ),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(AuthError::invalid(
            "password",
            format!("must be at least {} characters", PASSWORD_MIN_LEN),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<()> {
    if !email.contains('@') {
        return Err(AuthError::invalid("email", "must contain '@'"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session_store::SessionStore;
    use bridge_desktop::MemorySecureStore;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
    use bridge_traits::storage::SecureStore;
    use core_runtime::events::{CoreEvent, EventBus, SessionEvent};
    use mockall::mock;
    use std::sync::Arc;

    mock! {
        Http {}

        #[async_trait::async_trait]
        impl HttpClient for Http {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    const AUTH_BODY: &str =
        r#"{"token":"tok-1","user":{"id":42,"username":"ada","email":"ada@example.com","role":"USER"}}"#;

    fn client(mock: MockHttp, bus: EventBus) -> AuthClient {
        client_with_store(mock, bus, Arc::new(MemorySecureStore::new()))
    }

    fn client_with_store(mock: MockHttp, bus: EventBus, store: Arc<dyn SecureStore>) -> AuthClient {
        let session = SessionManager::new(SessionStore::new(store, "test"), bus);
        let transport = ApiTransport::new(Arc::new(mock), "http://localhost:8080/api")
            .with_token_source(Arc::new(session.clone()));
        AuthClient::new(transport, session)
    }

    fn register_request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            full_name: None,
        }
    }

    #[test]
    fn test_validation_rules() {
        assert!(validate_username("ab").is_err());
        assert!(validate_username("abc").is_ok());
        assert!(validate_username(&"a".repeat(50)).is_ok());
        assert!(validate_username(&"a".repeat(51)).is_err());
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
        assert!(validate_email("ada.example.com").is_err());
        assert!(validate_email("ada@example.com").is_ok());
    }

    #[tokio::test]
    async fn test_invalid_input_never_hits_network() {
        let mut mock = MockHttp::new();
        mock.expect_execute().times(0);
        let auth = client(mock, EventBus::new(8));

        let err = auth
            .register(&register_request("ada", "no-at-sign", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidInput { field: "email", .. }));

        let err = auth
            .login(&Credentials::new("ada", "short"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidInput { field: "password", .. }));
    }

    #[tokio::test]
    async fn test_login_starts_session() {
        let mut mock = MockHttp::new();
        mock.expect_execute()
            .withf(|req| {
                req.method == HttpMethod::Post
                    && req.url == "http://localhost:8080/api/auth/login"
                    && req.headers.get("Authorization").is_none()
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, AUTH_BODY)));
        let bus = EventBus::new(8);
        let mut events = bus.subscribe();
        let auth = client(mock, bus);

        let response = auth.login(&Credentials::new("ada", "secret1")).await.unwrap();

        assert_eq!(response.user.id, 42);
        assert_eq!(auth.session().token().await.as_deref(), Some("tok-1"));
        assert!(matches!(
            events.recv().await.unwrap(),
            CoreEvent::Session(SessionEvent::SignedIn { user_id: 42, .. })
        ));
    }

    #[tokio::test]
    async fn test_login_401_is_invalid_credentials() {
        let mut mock = MockHttp::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(401, r#"{"message":"Bad credentials"}"#)));
        let auth = client(mock, EventBus::new(8));

        let err = auth.login(&Credentials::new("ada", "wrong-pass")).await.unwrap_err();

        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(!auth.session().is_authenticated().await);
    }

    #[tokio::test]
    async fn test_register_conflict_is_username_taken() {
        let mut mock = MockHttp::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(409, r#"{"message":"Username already exists"}"#)));
        let auth = client(mock, EventBus::new(8));

        let err = auth
            .register(&register_request("ada", "ada@example.com", "secret1"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::UsernameTaken));
    }

    #[tokio::test]
    async fn test_register_signs_in() {
        let mut mock = MockHttp::new();
        mock.expect_execute()
            .withf(|req| req.url == "http://localhost:8080/api/auth/register")
            .times(1)
            .returning(|_| Ok(HttpResponse::new(201, AUTH_BODY)));
        let auth = client(mock, EventBus::new(8));

        auth.register(&register_request("ada", "ada@example.com", "secret1"))
            .await
            .unwrap();

        assert!(auth.session().is_authenticated().await);
    }

    #[tokio::test]
    async fn test_current_user_requires_session() {
        let mut mock = MockHttp::new();
        mock.expect_execute().times(0);
        let auth = client(mock, EventBus::new(8));

        let err = auth.current_user().await.unwrap_err();
        assert!(matches!(err, AuthError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_current_user_sends_token() {
        let mut mock = MockHttp::new();
        mock.expect_execute()
            .withf(|req| req.method == HttpMethod::Post)
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, AUTH_BODY)));
        mock.expect_execute()
            .withf(|req| {
                req.method == HttpMethod::Get
                    && req.url == "http://localhost:8080/api/auth/me"
                    && req.headers.get("Authorization").map(String::as_str) == Some("Bearer tok-1")
            })
            .times(1)
            .returning(|_| {
                Ok(HttpResponse::new(
                    200,
                    r#"{"id":42,"username":"ada","role":"ADMIN"}"#,
                ))
            });
        let auth = client(mock, EventBus::new(8));
        auth.login(&Credentials::new("ada", "secret1")).await.unwrap();

        let user = auth.current_user().await.unwrap();

        assert!(user.role.is_admin());
        assert_eq!(auth.session().current_user().await, Some(user));
    }

    #[tokio::test]
    async fn test_current_user_401_expires_session() {
        let mut mock = MockHttp::new();
        mock.expect_execute()
            .withf(|req| req.method == HttpMethod::Post)
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, AUTH_BODY)));
        mock.expect_execute()
            .withf(|req| req.method == HttpMethod::Get)
            .times(1)
            .returning(|_| Ok(HttpResponse::new(401, "")));
        let bus = EventBus::new(8);
        let auth = client(mock, bus.clone());
        auth.login(&Credentials::new("ada", "secret1")).await.unwrap();
        let mut events = bus.subscribe();

        let err = auth.current_user().await.unwrap_err();

        assert!(matches!(err, AuthError::NotAuthenticated));
        assert!(!auth.session().is_authenticated().await);
        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Session(SessionEvent::SessionExpired)
        );
    }

    #[tokio::test]
    async fn test_transport_failure_maps_to_transport() {
        let mut mock = MockHttp::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Err(BridgeError::Timeout));
        let auth = client(mock, EventBus::new(8));

        let err = auth.login(&Credentials::new("ada", "secret1")).await.unwrap_err();
        assert!(matches!(err, AuthError::Transport(_)));
    }

    #[tokio::test]
    async fn test_logout_and_replace_token() {
        let mut mock = MockHttp::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, AUTH_BODY)));
        let auth = client(mock, EventBus::new(8));
        auth.login(&Credentials::new("ada", "secret1")).await.unwrap();

        auth.replace_token("tok-2").await.unwrap();
        assert_eq!(auth.session().token().await.as_deref(), Some("tok-2"));
        assert!(auth.replace_token("").await.is_err());

        auth.logout().await.unwrap();
        assert!(!auth.session().is_authenticated().await);
    }

    struct ReadOnlyStore;

    #[async_trait::async_trait]
    impl SecureStore for ReadOnlyStore {
        async fn set_secret(&self, _key: &str, _value: &[u8]) -> BridgeResult<()> {
            Err(BridgeError::OperationFailed("read-only keychain".into()))
        }

        async fn get_secret(&self, _key: &str) -> BridgeResult<Option<Vec<u8>>> {
            Ok(None)
        }

        async fn delete_secret(&self, _key: &str) -> BridgeResult<()> {
            Ok(())
        }

        async fn list_keys(&self) -> BridgeResult<Vec<String>> {
            Ok(Vec::new())
        }

        async fn clear_all(&self) -> BridgeResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_unstorable_token_leaves_client_signed_out() {
        let mut mock = MockHttp::new();
        mock.expect_execute()
            .times(2)
            .returning(|_| Ok(HttpResponse::new(200, AUTH_BODY)));
        let bus = EventBus::new(8);
        let mut events = bus.subscribe();
        let auth = client_with_store(mock, bus, Arc::new(ReadOnlyStore));

        let err = auth.login(&Credentials::new("ada", "secret1")).await.unwrap_err();
        assert!(matches!(err, AuthError::SecureStorageUnavailable(_)));

        let err = auth
            .register(&register_request("ada", "ada@example.com", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::SecureStorageUnavailable(_)));

        assert!(!auth.session().is_authenticated().await);
        assert_eq!(auth.session().current_user().await, None);
        assert!(events.try_recv().is_err());
    }
}
