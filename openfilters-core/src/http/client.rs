//! HTTP client trait and implementations.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::FetchError;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "openfilters/0.1";

/// Trait for HTTP clients, enabling mockability in tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Fetch a text body from a URL.
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}

/// Configuration for ReqwestClient.
#[derive(Debug, Clone)]
pub struct ReqwestClientBuilder {
    timeout: Duration,
    user_agent: String,
}

impl Default for ReqwestClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReqwestClientBuilder {
    /// Create a new builder with default settings.
    ///
    /// Environment variables:
    /// - `OPENFILTERS_HTTP_TIMEOUT_SECS`: request timeout (default: 30)
    /// - `OPENFILTERS_HTTP_USER_AGENT`: user agent string
    pub fn new() -> Self {
        let timeout_secs = std::env::var("OPENFILTERS_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let user_agent = std::env::var("OPENFILTERS_HTTP_USER_AGENT")
            .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());

        Self {
            timeout: Duration::from_secs(timeout_secs),
            user_agent,
        }
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> Result<ReqwestClient, reqwest::Error> {
        let inner = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()?;

        Ok(ReqwestClient { inner })
    }
}

/// Production HTTP client backed by reqwest.
#[derive(Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    /// Create a new client with configuration from the environment.
    pub fn new() -> Result<Self, reqwest::Error> {
        ReqwestClientBuilder::new().build()
    }

    pub fn builder() -> ReqwestClientBuilder {
        ReqwestClientBuilder::new()
    }

    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let parsed = url::Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        tracing::debug!(url, "network: fetching");
        let response = self.inner.get(parsed).send().await?;
        let status = response.status();

        let response = response.error_for_status().inspect_err(|_| {
            tracing::debug!(url, %status, "network: request failed");
        })?;

        tracing::debug!(url, %status, "network: fetched successfully");
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let bytes = self.get(url).await?;
        String::from_utf8(bytes)
            .map_err(|e| FetchError::InvalidEncoding(format!("Invalid UTF-8 in response: {}", e)))
    }
}

/// Mock response for testing.
#[derive(Clone)]
pub enum MockResponse {
    Text(String),
    /// Fails the fetch with [`FetchError::Unavailable`].
    Error(String),
}

/// Mock HTTP client for testing.
#[derive(Default)]
pub struct MockClient {
    responses: HashMap<String, MockResponse>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a response for a URL.
    pub fn with_response(mut self, url: &str, response: MockResponse) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    pub fn with_text(self, url: &str, body: &str) -> Self {
        self.with_response(url, MockResponse::Text(body.to_string()))
    }

    pub fn with_error(self, url: &str, error: &str) -> Self {
        self.with_response(url, MockResponse::Error(error.to_string()))
    }
}

#[async_trait]
impl HttpClient for MockClient {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        match self.responses.get(url) {
            Some(MockResponse::Text(body)) => Ok(body.clone()),
            Some(MockResponse::Error(e)) => Err(FetchError::Unavailable(e.clone())),
            None => Err(FetchError::NotFound(url.to_string())),
        }
    }
}
