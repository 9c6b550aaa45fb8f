//! JSON-over-HTTP transport shared by every resource client.
//!
//! `ApiTransport` turns a path, query and optional body into a single
//! [`HttpRequest`], attaches the bearer token when one is available, and maps
//! the [`HttpResponse`] into either a decoded value or a [`ResourceError`].
//! It never retries.

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::platform::PlatformSendSync;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::error::{ResourceError, Result};

/// Query string as ordered key/value pairs.
pub type Query = Vec<(String, String)>;

/// Supplies the bearer token for outgoing requests.
///
/// Returning `None` sends the request unauthenticated.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait AccessTokenSource: PlatformSendSync {
    async fn access_token(&self) -> Option<String>;
}

/// Shared HTTP plumbing for the API.
#[derive(Clone)]
pub struct ApiTransport {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    token_source: Option<Arc<dyn AccessTokenSource>>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for ApiTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiTransport")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token_source.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ApiTransport {
    /// Create a transport rooted at `base_url` (trailing `/` is ignored).
    pub fn new(http_client: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http_client,
            base_url,
            token_source: None,
            timeout: None,
        }
    }

    pub fn with_token_source(mut self, source: Arc<dyn AccessTokenSource>) -> Self {
        self.token_source = Some(source);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `path` with `query` URL-encoded.
    ///
    /// ```
    /// # use std::sync::Arc;
    /// # use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
    /// # use bridge_traits::error::Result;
    /// # struct Noop;
    /// # #[async_trait::async_trait]
    /// # impl HttpClient for Noop {
    /// #     async fn execute(&self, _r: HttpRequest) -> Result<HttpResponse> { unreachable!() }
    /// # }
    /// use core_resources::transport::ApiTransport;
    ///
    /// let transport = ApiTransport::new(Arc::new(Noop), "https://api.example.com/api/");
    /// let url = transport
    ///     .url_for("/users/search", &[("q".to_string(), "ada lovelace".to_string())])
    ///     .unwrap();
    /// assert_eq!(url, "https://api.example.com/api/users/search?q=ada+lovelace");
    /// ```
    pub fn url_for(&self, path: &str, query: &[(String, String)]) -> Result<String> {
        let mut url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));

        if !query.is_empty() {
            let encoded = serde_urlencoded::to_string(query)
                .map_err(|e| ResourceError::Encode(format!("Invalid query: {}", e)))?;
            url.push('?');
            url.push_str(&encoded);
        }

        Ok(url)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(String, String)]) -> Result<T> {
        self.send_json(HttpMethod::Get, path, query, None::<&()>).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(HttpMethod::Post, path, &[], Some(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(HttpMethod::Put, path, &[], Some(body)).await
    }

    /// `DELETE path`, ignoring any response body.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send_empty(HttpMethod::Delete, path, &[], None::<&()>).await
    }

    /// Send a request and decode the JSON response.
    ///
    /// An empty success body decodes as JSON `null`, so `()` and `Option<_>`
    /// targets accept `204 No Content`.
    pub async fn send_json<B, T>(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(String, String)],
        body: Option<&B>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(method, path, query, body).await?;
        decode_body(&response)
    }

    /// Send a request and discard the response body.
    pub async fn send_empty<B>(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(String, String)],
        body: Option<&B>,
    ) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.send(method, path, query, body).await.map(|_| ())
    }

    #[instrument(skip_all, fields(method = %method, path = %path))]
    async fn send<B>(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(String, String)],
        body: Option<&B>,
    ) -> Result<HttpResponse>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url_for(path, query)?;
        let request_id = Uuid::new_v4().to_string();

        let mut request = HttpRequest::new(method, url)
            .header("Accept", "application/json")
            .header("X-Request-Id", request_id.as_str());

        if let Some(body) = body {
            let bytes = serde_json::to_vec(body)
                .map_err(|e| ResourceError::Encode(e.to_string()))?;
            request = request
                .header("Content-Type", "application/json")
                .body(bytes.into());
        }

        if let Some(source) = &self.token_source {
            if let Some(token) = source.access_token().await {
                request = request.bearer_token(token);
            }
        }

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = self.http_client.execute(request).await.map_err(|e| {
            warn!(request_id = %request_id, error = %e, "Request failed without a response");
            ResourceError::from(e)
        })?;

        if !response.is_success() {
            let error = ResourceError::from_response(&response);
            warn!(
                request_id = %request_id,
                status = response.status,
                "Request rejected: {}",
                error
            );
            return Err(error);
        }

        debug!(request_id = %request_id, status = response.status, "Request succeeded");
        Ok(response)
    }
}

fn decode_body<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    let body: &[u8] = if response.body.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        &response.body
    };

    serde_json::from_slice(body).map_err(|e| {
        ResourceError::Decode(format!("status {}: {}", response.status, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use mockall::mock;
    use serde::Deserialize;

    mock! {
        Http {}

        #[async_trait::async_trait]
        impl HttpClient for Http {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    struct StaticToken(&'static str);

    #[async_trait::async_trait]
    impl AccessTokenSource for StaticToken {
        async fn access_token(&self) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: i64,
    }

    fn transport(mock: MockHttp) -> ApiTransport {
        ApiTransport::new(Arc::new(mock), "http://localhost:8080/api/")
    }

    #[test]
    fn test_url_for_joins_paths() {
        let transport = transport(MockHttp::new());
        assert_eq!(
            transport.url_for("posts", &[]).unwrap(),
            "http://localhost:8080/api/posts"
        );
        assert_eq!(
            transport.url_for("/posts/7", &[]).unwrap(),
            "http://localhost:8080/api/posts/7"
        );
        assert_eq!(
            transport
                .url_for(
                    "/posts",
                    &[
                        ("page".to_string(), "0".to_string()),
                        ("sort".to_string(), "createdAt,desc".to_string()),
                    ]
                )
                .unwrap(),
            "http://localhost:8080/api/posts?page=0&sort=createdAt%2Cdesc"
        );
    }

    #[tokio::test]
    async fn test_get_sends_headers_and_token() {
        let mut mock = MockHttp::new();
        mock.expect_execute()
            .withf(|req| {
                req.method == HttpMethod::Get
                    && req.url == "http://localhost:8080/api/posts/7"
                    && req.headers.get("Accept").map(String::as_str) == Some("application/json")
                    && req.headers.get("Authorization").map(String::as_str) == Some("Bearer abc")
                    && req.headers.contains_key("X-Request-Id")
                    && req.body.is_none()
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, r#"{"id":7}"#)));

        let transport = transport(mock).with_token_source(Arc::new(StaticToken("abc")));
        let item: Item = transport.get("/posts/7", &[]).await.unwrap();
        assert_eq!(item, Item { id: 7 });
    }

    #[tokio::test]
    async fn test_post_serializes_body_and_applies_timeout() {
        let mut mock = MockHttp::new();
        mock.expect_execute()
            .withf(|req| {
                req.method == HttpMethod::Post
                    && req.headers.get("Content-Type").map(String::as_str) == Some("application/json")
                    && req.body.as_deref() == Some(br#"{"content":"hello"}"#.as_slice())
                    && req.timeout == Some(Duration::from_secs(5))
                    && !req.headers.contains_key("Authorization")
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::new(201, r#"{"id":1}"#)));

        let transport = transport(mock).with_timeout(Duration::from_secs(5));
        let item: Item = transport
            .post("/posts", &serde_json::json!({"content": "hello"}))
            .await
            .unwrap();
        assert_eq!(item.id, 1);
    }

    #[tokio::test]
    async fn test_non_success_maps_to_error() {
        let mut mock = MockHttp::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(500, r#"{"message":"boom"}"#)));

        let err = transport(mock).get::<Item>("/posts/1", &[]).await.unwrap_err();
        assert!(matches!(err, ResourceError::Server { status: 500, .. }));
        assert_eq!(err.message(), Some("boom"));
    }

    #[tokio::test]
    async fn test_transport_failure_is_not_retried() {
        let mut mock = MockHttp::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Err(BridgeError::Network("connection refused".to_string())));

        let err = transport(mock).get::<Item>("/posts", &[]).await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_empty_body_decodes_as_unit() {
        let mut mock = MockHttp::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(204, "")));

        let result: Result<()> = transport(mock)
            .send_json(HttpMethod::Put, "/notifications/1/read", &[], None::<&()>)
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_delete_ignores_body() {
        let mut mock = MockHttp::new();
        mock.expect_execute()
            .withf(|req| req.method == HttpMethod::Delete)
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, "Post deleted successfully")));

        assert!(transport(mock).delete("/posts/3").await.is_ok());
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let mut mock = MockHttp::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, "<html>")));

        let err = transport(mock).get::<Item>("/posts/1", &[]).await.unwrap_err();
        assert!(matches!(err, ResourceError::Decode(_)));
    }
}
