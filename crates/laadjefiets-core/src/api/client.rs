//! API client for the Laadjefiets REST backend.
//!
//! `ApiClient` owns the HTTP connection pool, the token store, the response
//! cache and the debouncer. Endpoint facades borrow it (`client.sockets()`,
//! `client.status()`, ...) and compose `request` with cache reads and writes.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::TokenStore;
use crate::cache::{Debouncer, TtlCache};
use crate::config::{Config, DEFAULT_TIMEOUT_SECS};

use super::endpoints::{
    CreditsApi, LocationsApi, SessionsApi, SocketsApi, StatusApi, UserApi, UsersApi,
};
use super::error::{ApiError, ApiResult};

/// Per-call options, mirroring what a fetch call would take.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: HeaderMap,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post() -> Self {
        Self::with_method(Method::POST)
    }

    pub fn put() -> Self {
        Self::with_method(Method::PUT)
    }

    pub fn delete() -> Self {
        Self::with_method(Method::DELETE)
    }

    pub fn with_method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> ApiResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn header(mut self, name: header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Merge caller headers over the defaults; caller values win on collision.
pub fn merge_headers(mut defaults: HeaderMap, overrides: HeaderMap) -> HeaderMap {
    for name in overrides.keys() {
        defaults.remove(name);
    }
    for (name, value) in overrides.iter() {
        defaults.append(name.clone(), value.clone());
    }
    defaults
}

/// Decode a JSON payload into its typed record.
pub fn decode<T: DeserializeOwned>(endpoint: &str, value: &Value) -> ApiResult<T> {
    <T as serde::Deserialize>::deserialize(value).map_err(|e| ApiError::Decode(format!("{}: {}", endpoint, e)))
}

/// API client for the charging-socket backend.
/// Clone is cheap and clones share the same cache, debouncer and token store.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Arc<str>,
    tokens: Arc<dyn TokenStore>,
    cache: Arc<TtlCache>,
    debouncer: Arc<Debouncer>,
}

impl ApiClient {
    /// Create a client with the default request timeout
    pub fn new(base_url: &str, tokens: Arc<dyn TokenStore>) -> ApiResult<Self> {
        Self::with_timeout(base_url, tokens, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(
        base_url: &str,
        tokens: Arc<dyn TokenStore>,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            tokens,
            cache: Arc::new(TtlCache::new()),
            debouncer: Arc::new(Debouncer::default()),
        })
    }

    /// Build a client from the loaded configuration and its token store.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let tokens = config.token_store().context("Failed to open token store")?;
        let client = Self::with_timeout(
            &config.normalized_base_url(),
            tokens,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &TtlCache {
        &self.cache
    }

    pub fn tokens(&self) -> &dyn TokenStore {
        self.tokens.as_ref()
    }

    /// Collapse bursts of the same operation into one trailing call.
    pub fn debounce<F, Fut>(&self, key: &str, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.debouncer.debounce(key, f);
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    // ===== Token =====

    /// Current token, read from storage on every call.
    pub fn token(&self) -> ApiResult<Option<String>> {
        let token = self
            .tokens
            .load()
            .map_err(|e| ApiError::TokenStore(format!("{:#}", e)))?;
        Ok(token.filter(|t| !t.is_empty()))
    }

    pub fn has_token(&self) -> bool {
        matches!(self.token(), Ok(Some(_)))
    }

    pub(crate) fn store_token(&self, token: &str) -> ApiResult<()> {
        self.tokens
            .save(token)
            .map_err(|e| ApiError::TokenStore(format!("{:#}", e)))
    }

    pub(crate) fn clear_token(&self) -> ApiResult<()> {
        self.tokens
            .clear()
            .map_err(|e| ApiError::TokenStore(format!("{:#}", e)))
    }

    /// Drop the stored token and every cached payload without calling the backend.
    /// Used when the backend has already rejected the token.
    pub fn discard_session(&self) -> ApiResult<()> {
        self.cache.clear_all();
        self.clear_token()
    }

    fn default_headers(&self) -> ApiResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        if let Some(token) = self.token()? {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::InvalidHeader(e.to_string()))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    // ===== Requests =====

    /// Send a request relative to the base URL and return the JSON body.
    ///
    /// Non-2xx responses fail with the server's `message` (or a fallback).
    /// An empty 2xx body is returned as `Value::Null`. Never touches the cache.
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> ApiResult<Value> {
        let url = format!("{}{}", self.base_url, endpoint);
        let headers = merge_headers(self.default_headers()?, options.headers);
        let method = options.method;

        debug!(method = %method, endpoint, "API request");

        let mut builder = self.http.request(method.clone(), &url).headers(headers);
        if let Some(ref body) = options.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(method = %method, endpoint, error = %e, "API request failed to send");
            ApiError::Network(e)
        })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let err = ApiError::from_status(status, &text);
            warn!(method = %method, endpoint, status = status.as_u16(), error = %err, "API request rejected");
            return Err(err);
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| ApiError::Decode(format!("{}: {}", endpoint, e)))
    }

    /// `request` followed by a typed decode.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> ApiResult<T> {
        let value = self.request(endpoint, options).await?;
        decode(endpoint, &value)
    }

    /// Read-through cache: serve `key` if fresh, otherwise fetch and store it for `ttl`.
    ///
    /// Payloads that fail to decode are not cached.
    pub(crate) async fn cached<T: DeserializeOwned>(
        &self,
        key: &str,
        ttl: Duration,
        endpoint: &str,
        options: RequestOptions,
    ) -> ApiResult<T> {
        if let Some(value) = self.cache.get(key) {
            return decode(endpoint, &value);
        }

        let value = self.request(endpoint, options).await?;
        let decoded = decode(endpoint, &value)?;
        self.cache.set(key, value, ttl);
        Ok(decoded)
    }

    // ===== Facades =====

    pub fn user(&self) -> UserApi<'_> {
        UserApi::new(self)
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }

    pub fn sockets(&self) -> SocketsApi<'_> {
        SocketsApi::new(self)
    }

    pub fn sessions(&self) -> SessionsApi<'_> {
        SessionsApi::new(self)
    }

    pub fn locations(&self) -> LocationsApi<'_> {
        LocationsApi::new(self)
    }

    pub fn credits(&self) -> CreditsApi<'_> {
        CreditsApi::new(self)
    }

    pub fn status(&self) -> StatusApi<'_> {
        StatusApi::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;

    fn client_with(store: MemoryTokenStore) -> ApiClient {
        ApiClient::new("http://127.0.0.1:8000/api/", Arc::new(store)).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = client_with(MemoryTokenStore::new());
        assert_eq!(client.base_url(), "http://127.0.0.1:8000/api");
    }

    #[test]
    fn test_default_headers_without_token() {
        let client = client_with(MemoryTokenStore::new());
        let headers = client.default_headers().unwrap();
        assert_eq!(headers.get(header::ACCEPT).unwrap(), "application/json");
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/json");
        assert!(headers.get(header::AUTHORIZATION).is_none());
    }

    #[test]
    fn test_default_headers_with_token() {
        let client = client_with(MemoryTokenStore::with_token("abc"));
        let headers = client.default_headers().unwrap();
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Bearer abc");
    }

    #[test]
    fn test_empty_token_is_treated_as_absent() {
        let client = client_with(MemoryTokenStore::with_token(""));
        assert!(!client.has_token());
        assert!(client.default_headers().unwrap().get(header::AUTHORIZATION).is_none());
    }

    #[test]
    fn test_token_with_newline_is_invalid_header() {
        let client = client_with(MemoryTokenStore::with_token("abc\ndef"));
        assert!(matches!(client.default_headers(), Err(ApiError::InvalidHeader(_))));
    }

    #[test]
    fn test_merge_headers_caller_wins() {
        let mut defaults = HeaderMap::new();
        defaults.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        defaults.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer stored"));

        let mut overrides = HeaderMap::new();
        overrides.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer override"));
        overrides.insert("x-client", HeaderValue::from_static("console"));

        let merged = merge_headers(defaults, overrides);
        assert_eq!(merged.get_all(header::AUTHORIZATION).iter().count(), 1);
        assert_eq!(merged.get(header::AUTHORIZATION).unwrap(), "Bearer override");
        assert_eq!(merged.get(header::ACCEPT).unwrap(), "application/json");
        assert_eq!(merged.get("x-client").unwrap(), "console");
    }

    #[test]
    fn test_request_options_json_body() {
        let options = RequestOptions::post()
            .json(&serde_json::json!({"include_details": true}))
            .unwrap();
        assert_eq!(options.method, Method::POST);
        assert_eq!(options.body.unwrap()["include_details"], true);
    }

    #[test]
    fn test_decode_error_names_endpoint() {
        let err = decode::<Vec<i64>>("/sockets", &serde_json::json!({"oops": 1})).unwrap_err();
        match err {
            ApiError::Decode(msg) => assert!(msg.starts_with("/sockets:")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
