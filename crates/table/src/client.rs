//! REST transport seam.
//!
//! Controllers receive their client explicitly; tests swap in an in-memory fake.

use std::sync::Arc;
use std::time::Duration;

use bizdash_auth::SessionToken;
use serde_json::Value;

use crate::error::{ConfigError, RemoteError};

/// Minimal JSON-over-HTTP capability a table needs.
///
/// Paths are relative to the client's base URL (e.g. `/branches/42`).
#[async_trait::async_trait]
pub trait RestClient: Send + Sync {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, RemoteError>;
    async fn post(&self, path: &str, body: &Value) -> Result<Value, RemoteError>;
    async fn put(&self, path: &str, body: &Value) -> Result<Value, RemoteError>;
    async fn patch(&self, path: &str, body: &Value) -> Result<Value, RemoteError>;
    async fn delete(&self, path: &str) -> Result<(), RemoteError>;
}

#[async_trait::async_trait]
impl<C> RestClient for Arc<C>
where
    C: RestClient + ?Sized,
{
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, RemoteError> {
        (**self).get(path, query).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, RemoteError> {
        (**self).post(path, body).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value, RemoteError> {
        (**self).put(path, body).await
    }

    async fn patch(&self, path: &str, body: &Value) -> Result<Value, RemoteError> {
        (**self).patch(path, body).await
    }

    async fn delete(&self, path: &str) -> Result<(), RemoteError> {
        (**self).delete(path).await
    }
}

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:4000/api";

/// Settings for [`HttpRestClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// No timeout unless set.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Read `API_BASE_URL` and `API_TIMEOUT_MS`; unset variables keep defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(base_url) = lookup("API_BASE_URL") {
            if url::Url::parse(&base_url).is_err() {
                return Err(ConfigError::Invalid {
                    key: "API_BASE_URL",
                    value: base_url,
                });
            }
            config.base_url = base_url;
        }

        if let Some(raw) = lookup("API_TIMEOUT_MS") {
            let millis: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "API_TIMEOUT_MS",
                value: raw.clone(),
            })?;
            config.timeout = Some(Duration::from_millis(millis));
        }

        Ok(config)
    }
}

/// `reqwest`-backed [`RestClient`].
#[derive(Debug, Clone)]
pub struct HttpRestClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<SessionToken>,
}

impl HttpRestClient {
    pub fn new(config: ClientConfig) -> Result<Self, RemoteError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(map_transport)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Forward the session token as a bearer credential.
    pub fn with_token(mut self, token: SessionToken) -> Self {
        self.token = Some(token);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let req = self.http.request(method, self.url(path));
        match &self.token {
            Some(token) => req.bearer_auth(token.as_str()),
            None => req,
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<Value, RemoteError> {
        let resp = req.send().await.map_err(map_transport)?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(RemoteError::server(status.as_u16(), message));
        }

        let bytes = resp.bytes().await.map_err(map_transport)?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| RemoteError::InvalidResponse(e.to_string()))
    }
}

fn map_transport(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Timeout
    } else if err.is_decode() {
        RemoteError::InvalidResponse(err.to_string())
    } else {
        RemoteError::Network(err.to_string())
    }
}

#[async_trait::async_trait]
impl RestClient for HttpRestClient {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, RemoteError> {
        self.send(self.request(reqwest::Method::GET, path).query(query))
            .await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, RemoteError> {
        self.send(self.request(reqwest::Method::POST, path).json(body))
            .await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value, RemoteError> {
        self.send(self.request(reqwest::Method::PUT, path).json(body))
            .await
    }

    async fn patch(&self, path: &str, body: &Value) -> Result<Value, RemoteError> {
        self.send(self.request(reqwest::Method::PATCH, path).json(body))
            .await
    }

    async fn delete(&self, path: &str) -> Result<(), RemoteError> {
        self.send(self.request(reqwest::Method::DELETE, path))
            .await
            .map(|_| ())
    }
}
