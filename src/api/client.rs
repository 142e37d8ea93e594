//! Backend HTTP client
//!
//! Centralizes request construction (base URL, JSON content type, bearer
//! token from persisted storage, timeout) and response normalization into
//! [`ClientError`]. With a [`NotificationCenter`] attached, every failed
//! request also queues an error toast carrying the display message.

use crate::config::Config;
use crate::error::ClientError;
use crate::notifications::NotificationCenter;
use crate::state::persistence::{keys, Storage};
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::agents::AgentsApi;
use super::auth::AuthApi;
use super::context::ContextApi;
use super::plugins::PluginsApi;
use super::stocks::StocksApi;
use super::tasks::TasksApi;

/// HTTP client for the dashboard backend
///
/// Cheap to clone; clones share the connection pool and storage.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    storage: Arc<dyn Storage>,
    notifications: Option<Arc<NotificationCenter>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("notifies", &self.notifications.is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client rooted at `base_url` (e.g. `http://localhost:8080/api`)
    ///
    /// # Errors
    /// * `ClientError::InvalidRequest` if the URL does not parse or cannot carry a path
    pub fn new(
        base_url: &str,
        timeout: Duration,
        storage: Arc<dyn Storage>,
    ) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::InvalidRequest(format!("invalid base URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidRequest(format!(
                "base URL cannot carry a path: {}",
                base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self {
            http,
            base_url,
            storage,
            notifications: None,
        })
    }

    /// Surface request failures as error toasts on `center`
    pub fn with_notifications(mut self, center: Arc<NotificationCenter>) -> Self {
        self.notifications = Some(center);
        self
    }

    /// Toast queue request failures are pushed to, if any
    pub fn notifications(&self) -> Option<&NotificationCenter> {
        self.notifications.as_deref()
    }

    /// Create a client from application configuration
    pub fn from_config(config: &Config, storage: Arc<dyn Storage>) -> Result<Self, ClientError> {
        Self::new(&config.api.base_url, config.request_timeout(), storage)
    }

    /// Base URL requests are built from
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Agent endpoints
    pub fn agents(&self) -> AgentsApi<'_> {
        AgentsApi::new(self)
    }

    /// Task endpoints
    pub fn tasks(&self) -> TasksApi<'_> {
        TasksApi::new(self)
    }

    /// Stock data endpoints
    pub fn stocks(&self) -> StocksApi<'_> {
        StocksApi::new(self)
    }

    /// Context publish/subscribe passthroughs
    pub fn context(&self) -> ContextApi<'_> {
        ContextApi::new(self)
    }

    /// Plugin management endpoints
    pub fn plugins(&self) -> PluginsApi<'_> {
        PluginsApi::new(self)
    }

    /// Authentication endpoints
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    /// Build the URL for `segments` below the base URL, percent-encoding each segment
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidRequest("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request with the standard headers
    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        self.authorize(builder)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.storage.get(keys::TOKEN) {
            Some(token) if !token.is_empty() => builder.bearer_auth(token),
            _ => builder,
        }
    }

    /// GET and decode
    pub(crate) async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        let url = self.endpoint(segments)?;
        self.send(self.request(Method::GET, url)).await
    }

    /// GET with query parameters and decode
    pub(crate) async fn get_with_query<T, Q>(
        &self,
        segments: &[&str],
        query: &Q,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.endpoint(segments)?;
        self.send(self.request(Method::GET, url).query(query)).await
    }

    /// Send `body` as JSON with `method` and decode
    pub(crate) async fn send_json<T, B>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(segments)?;
        self.send(self.request(method, url).json(body)).await
    }

    /// POST `body` as JSON and decode
    pub(crate) async fn post<T, B>(&self, segments: &[&str], body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::POST, segments, body).await
    }

    /// POST without a body and decode
    pub(crate) async fn post_empty<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<T, ClientError> {
        let url = self.endpoint(segments)?;
        self.send(self.request(Method::POST, url)).await
    }

    /// DELETE and decode
    pub(crate) async fn delete<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<T, ClientError> {
        let url = self.endpoint(segments)?;
        self.send(self.request(Method::DELETE, url)).await
    }

    /// Send `body` as JSON with `method`; the reply is a plain-text acknowledgement
    pub(crate) async fn send_json_text<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<String, ClientError> {
        let url = self.endpoint(segments)?;
        self.execute(self.request(method, url).json(body)).await
    }

    /// DELETE; the reply is a plain-text acknowledgement
    pub(crate) async fn delete_text(&self, segments: &[&str]) -> Result<String, ClientError> {
        let url = self.endpoint(segments)?;
        self.execute(self.request(Method::DELETE, url)).await
    }

    /// Send a prepared request and decode its JSON body
    ///
    /// Every request goes out with `Content-Type: application/json` unless
    /// the builder already set one (multipart uploads).
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ClientError> {
        let body = self.execute(builder).await?;
        decode(&body)
    }

    /// Send a prepared request and return the raw body text
    ///
    /// Failures are pushed to the attached notification center before
    /// they are returned.
    pub(crate) async fn execute(&self, builder: RequestBuilder) -> Result<String, ClientError> {
        let result = self.dispatch(builder).await;
        if let (Err(e), Some(center)) = (&result, &self.notifications) {
            center.error(e.user_message());
        }
        result
    }

    async fn dispatch(&self, builder: RequestBuilder) -> Result<String, ClientError> {
        let mut request = builder.build().map_err(|e| {
            ClientError::InvalidRequest(format!("failed to build request: {}", e))
        })?;
        if !request.headers().contains_key(CONTENT_TYPE) {
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!(
            method = %method,
            url = %url,
            authorized = request.headers().contains_key(AUTHORIZATION),
            "Sending API request"
        );

        let response = self.http.execute(request).await.map_err(transport_error)?;
        self.check_status(&method, &url, response).await
    }

    async fn check_status(
        &self,
        method: &Method,
        url: &Url,
        response: Response,
    ) -> Result<String, ClientError> {
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if status.is_success() {
            return Ok(body);
        }

        let status_code = status.as_u16();
        let server_message = server_message(&body);
        tracing::error!(
            method = %method,
            url = %url,
            status_code = status_code,
            server_message = ?server_message,
            "API returned error status"
        );

        if status_code == 401 {
            // Stale or revoked token: drop it so the next request goes out anonymous
            if let Err(e) = self.storage.remove(keys::TOKEN) {
                tracing::warn!(error = %e, "Failed to clear persisted token after 401");
            }
        }

        Err(ClientError::from_status(status_code, server_message))
    }
}

fn transport_error(error: reqwest::Error) -> ClientError {
    if error.is_timeout() {
        ClientError::Timeout
    } else {
        ClientError::Network(error)
    }
}

/// Pull a human-readable message out of an error body
fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .filter_map(|field| value.get(field).and_then(Value::as_str))
        .map(str::trim)
        .find(|m| !m.is_empty())
        .map(str::to_string)
}

/// Decode a JSON body; an empty body decodes as `null`
fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| {
        ClientError::Decode(format!("{} - Response body: {}", e, truncate(body, 200)))
    })
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::persistence::MemoryStorage;
    use mockito::Server;

    fn client(base_url: &str, storage: Arc<dyn Storage>) -> ApiClient {
        ApiClient::new(base_url, Duration::from_secs(5), storage).unwrap()
    }

    #[test]
    fn test_invalid_base_url() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let err = ApiClient::new("not a url", Duration::from_secs(1), storage).unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let api = client("http://localhost:8080/api", storage);
        let url = api.endpoint(&["context", "shared-data", "a b/c"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/context/shared-data/a%20b%2Fc"
        );

        let api = client("http://localhost:8080/api/", Arc::new(MemoryStorage::new()));
        let url = api.endpoint(&["agents"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/agents");
    }

    #[test]
    fn test_server_message_extraction() {
        assert_eq!(
            server_message(r#"{"message": "Invalid symbol"}"#).as_deref(),
            Some("Invalid symbol")
        );
        assert_eq!(
            server_message(r#"{"message": "", "error": "Bad Request"}"#).as_deref(),
            Some("Bad Request")
        );
        assert!(server_message("<html>oops</html>").is_none());
    }

    #[test]
    fn test_decode_empty_body() {
        let value: Value = decode("").unwrap();
        assert!(value.is_null());
        let unit: Option<String> = decode("  ").unwrap();
        assert!(unit.is_none());
        assert!(matches!(
            decode::<Vec<String>>("not json"),
            Err(ClientError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_sends_json_and_bearer_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/agents")
            .match_header("content-type", "application/json")
            .match_header("authorization", "Bearer secret-token")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage.set(keys::TOKEN, "secret-token").unwrap();
        let api = client(&format!("{}/api", server.url()), storage);

        let agents: Vec<Value> = api.get(&["agents"]).await.unwrap();
        mock.assert_async().await;
        assert!(agents.is_empty());
    }

    #[tokio::test]
    async fn test_no_authorization_without_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/agents")
            .match_header("authorization", mockito::Matcher::Missing)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let api = client(&format!("{}/api", server.url()), Arc::new(MemoryStorage::new()));
        let _: Vec<Value> = api.get(&["agents"]).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_clears_persisted_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/tasks/metrics")
            .with_status(401)
            .with_body(r#"{"message": "Token expired"}"#)
            .create_async()
            .await;

        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage.set(keys::TOKEN, "stale").unwrap();
        let api = client(&format!("{}/api", server.url()), storage.clone());

        let err = api.get::<Value>(&["tasks", "metrics"]).await.unwrap_err();
        mock.assert_async().await;
        assert!(matches!(err, ClientError::Unauthorized { .. }));
        assert_eq!(err.user_message(), "Token expired");
        assert!(storage.get(keys::TOKEN).is_none());
    }

    #[tokio::test]
    async fn test_server_error_mapping() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/agents")
            .with_status(503)
            .with_body("Service Unavailable")
            .create_async()
            .await;

        let api = client(&format!("{}/api", server.url()), Arc::new(MemoryStorage::new()));
        let err = api.get::<Value>(&["agents"]).await.unwrap_err();
        mock.assert_async().await;
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.user_message(), crate::error::SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_server_timeout_is_not_transport() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/stocks/AAPL/analysis/complete")
            .with_status(408)
            .with_body(r#"{"error": "Analysis took too long"}"#)
            .create_async()
            .await;

        let api = client(&format!("{}/api", server.url()), Arc::new(MemoryStorage::new()));
        let err = api
            .get::<Value>(&["stocks", "AAPL", "analysis", "complete"])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::RequestTimeout { .. }));
        assert_eq!(err.status(), Some(408));
        assert!(!err.is_transport());
        assert_eq!(err.user_message(), "Analysis took too long");
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Nothing listens on port 9 (discard) in the test environment
        let api = client("http://127.0.0.1:9/api", Arc::new(MemoryStorage::new()));
        let err = api.get::<Value>(&["agents"]).await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_failures_queue_error_toasts() {
        let mut server = Server::new_async().await;
        let _quote = server
            .mock("GET", "/api/stocks/ZZZZ/quote")
            .with_status(404)
            .with_body(r#"{"message": "Unknown symbol ZZZZ"}"#)
            .create_async()
            .await;
        let _agents = server
            .mock("GET", "/api/agents")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let center = Arc::new(NotificationCenter::new(Duration::from_millis(5000)));
        let api = client(&format!("{}/api", server.url()), Arc::new(MemoryStorage::new()))
            .with_notifications(center.clone());

        let _: Vec<Value> = api.get(&["agents"]).await.unwrap();
        assert!(center.list().is_empty());

        api.get::<Value>(&["stocks", "ZZZZ", "quote"])
            .await
            .unwrap_err();
        let toasts = center.list();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].level, crate::notifications::NotificationLevel::Error);
        assert_eq!(toasts[0].message, "Unknown symbol ZZZZ");
    }

    #[tokio::test]
    async fn test_transport_failure_toast_uses_network_message() {
        let center = Arc::new(NotificationCenter::new(Duration::from_millis(5000)));
        let api = client("http://127.0.0.1:9/api", Arc::new(MemoryStorage::new()))
            .with_notifications(center.clone());

        api.get::<Value>(&["agents"]).await.unwrap_err();
        let toasts = center.list();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].message, crate::error::NETWORK_ERROR);
    }

    #[tokio::test]
    async fn test_plain_text_acknowledgement() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/api/context/shared-data/stockData")
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body("Shared data cleared: stockData")
            .create_async()
            .await;

        let api = client(&format!("{}/api", server.url()), Arc::new(MemoryStorage::new()));
        let reply = api
            .delete_text(&["context", "shared-data", "stockData"])
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(reply, "Shared data cleared: stockData");
    }
}
