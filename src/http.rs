//! Rate-limited HTTP access layer
//!
//! [`HttpClient`] owns one pooled `reqwest` connection, waits on its
//! [`RateLimiter`] before every request and classifies transport failures into
//! [`FetchError`]. It never retries; a caller that wants backoff layers it on
//! top. Extractors depend on the [`Fetcher`] capability rather than on the
//! concrete client, so tests can hand them canned pages.
//!
//! # Examples
//!
//! ```ignore
//! use tickerscrape::{HttpClient, Fetcher};
//! use std::time::Duration;
//!
//! let mut client = HttpClient::builder()
//!     .timeout(Duration::from_secs(10))
//!     .delay(Duration::from_secs(1))
//!     .user_agent("Acme Research ops@acme.test")
//!     .build()?;
//!
//! let body = client.get("https://www.sec.gov").await?;
//! client.close();
//! ```

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Method, StatusCode};
use tracing::{debug, error};

use crate::config::HttpConfig;
use crate::limiter::{DelayLimiter, RateLimiter};
use crate::{ConfigError, FetchError};

const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";
const MAX_REDIRECTS: usize = 10;

/// Per-call request options
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub query: Vec<(String, String)>,
    /// Url-encoded body; only sent with POST
    pub form: Option<Vec<(String, String)>>,
    pub headers: Vec<(String, String)>,
    /// Overrides the client's timeout for this call
    pub timeout: Option<Duration>,
}

impl FetchOptions {
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.form = Some(fields);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Capability shared by everything that can retrieve a remote page
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Retrieve `url` and return its body, or the reason it failed
    ///
    /// Implementations pace themselves before every call and never retry.
    async fn fetch(
        &self,
        url: &str,
        method: Method,
        options: FetchOptions,
    ) -> Result<String, FetchError>;

    /// Plain GET with default options
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        self.fetch(url, Method::GET, FetchOptions::default()).await
    }

    /// Best-effort reachability probe; any failure reports `false`
    async fn test_connectivity(&self, url: &str) -> bool;

    /// Release the underlying connection; calling it again is a no-op
    fn close(&mut self);
}

/// Pooled, paced HTTP client
pub struct HttpClient {
    client: Option<reqwest::Client>,
    limiter: Arc<dyn RateLimiter>,
    timeout: Duration,
    probe_timeout: Duration,
}

impl HttpClient {
    /// Create a client builder with default settings
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Build a client straight from an [`HttpConfig`]
    pub fn from_config(config: &HttpConfig) -> Result<Self, ConfigError> {
        HttpClientBuilder::from_config(config).build()
    }

    pub fn is_closed(&self) -> bool {
        self.client.is_none()
    }

    fn classify(url: &str, timeout: Duration, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout,
            }
        } else if err.is_connect() {
            FetchError::Connection {
                url: url.to_string(),
                error: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            FetchError::Unexpected {
                url: url.to_string(),
                error: err.to_string(),
            }
        }
    }

    async fn send(
        &self,
        client: &reqwest::Client,
        url: &str,
        method: Method,
        options: FetchOptions,
    ) -> Result<String, FetchError> {
        let timeout = options.timeout.unwrap_or(self.timeout);

        let mut request = match method {
            Method::GET => client.get(url),
            Method::POST => client.post(url),
            other => {
                return Err(FetchError::UnsupportedMethod {
                    url: url.to_string(),
                    method: other.to_string(),
                });
            }
        };

        request = request.timeout(timeout);
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(fields) = &options.form {
            request = request.form(fields);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Self::classify(url, timeout, e))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| Self::classify(url, timeout, e))?;

        debug!(url = %url, status = status.as_u16(), bytes = body.len(), "Request successful");
        Ok(body)
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpClient {
    async fn fetch(
        &self,
        url: &str,
        method: Method,
        options: FetchOptions,
    ) -> Result<String, FetchError> {
        self.limiter.acquire().await;

        let result = match &self.client {
            Some(client) => self.send(client, url, method, options).await,
            None => Err(FetchError::Closed {
                url: url.to_string(),
            }),
        };

        if let Err(e) = &result {
            error!(url = %url, error = %e, "Request failed");
        }
        result
    }

    async fn test_connectivity(&self, url: &str) -> bool {
        let Some(client) = &self.client else {
            return false;
        };

        match client.get(url).timeout(self.probe_timeout).send().await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                debug!(url = %url, error = %e, "Connectivity probe failed");
                false
            }
        }
    }

    fn close(&mut self) {
        if self.client.take().is_some() {
            debug!("HTTP client closed");
        }
    }
}

/// Builder for configuring an [`HttpClient`]
pub struct HttpClientBuilder {
    config: HttpConfig,
    limiter: Option<Arc<dyn RateLimiter>>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::from_config(&HttpConfig::default())
    }
}

impl HttpClientBuilder {
    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            config: config.clone(),
            limiter: None,
        }
    }

    /// Set the per-request timeout (default: 10s)
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the timeout used by connectivity probes (default: 5s)
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.config.probe_timeout = timeout;
        self
    }

    /// Set the fixed pause before each request (default: 1s)
    pub fn delay(mut self, delay: Duration) -> Self {
        self.config.delay = delay;
        self
    }

    /// Replace the identity sent in the `User-Agent` header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Add or override a default header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.push((name.into(), value.into()));
        self
    }

    /// Use a custom pacing strategy instead of the fixed delay
    pub fn rate_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Validate the settings and open the connection pool
    pub fn build(self) -> Result<HttpClient, ConfigError> {
        self.config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE));
        for (name, value) in &self.config.headers {
            let invalid = || ConfigError::InvalidHeader { name: name.clone() };
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
            let value = HeaderValue::from_str(value).map_err(|_| invalid())?;
            headers.insert(name, value);
        }
        // Inserted last so a `User-Agent` entry in `headers` cannot replace it
        let user_agent = HeaderValue::from_str(&self.config.user_agent).map_err(|_| {
            ConfigError::InvalidHeader {
                name: USER_AGENT.to_string(),
            }
        })?;
        headers.insert(USER_AGENT, user_agent);

        let client = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .default_headers(headers)
            .build()
            .map_err(|e| ConfigError::ClientBuild(e.to_string()))?;

        let limiter = self
            .limiter
            .unwrap_or_else(|| Arc::new(DelayLimiter::new(self.config.delay)));
        debug!(
            timeout = ?self.config.timeout,
            delay = ?limiter.delay(),
            "HTTP client built"
        );

        Ok(HttpClient {
            client: Some(client),
            limiter,
            timeout: self.config.timeout,
            probe_timeout: self.config.probe_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limiter::NoDelay;

    #[test]
    fn builder_rejects_zero_timeout() {
        let result = HttpClient::builder().timeout(Duration::ZERO).build();
        assert!(matches!(result, Err(ConfigError::ZeroTimeout)));
    }

    #[test]
    fn builder_rejects_invalid_header() {
        let result = HttpClient::builder().header("bad header", "x").build();
        match result {
            Err(ConfigError::InvalidHeader { name }) => assert_eq!(name, "bad header"),
            _ => panic!("Expected InvalidHeader error"),
        }
    }

    #[test]
    fn close_is_idempotent() {
        let mut client = HttpClient::builder()
            .rate_limiter(Arc::new(NoDelay))
            .build()
            .unwrap();
        assert!(!client.is_closed());
        client.close();
        client.close();
        assert!(client.is_closed());
    }

    #[tokio::test]
    async fn fetch_after_close_reports_closed() {
        let mut client = HttpClient::builder()
            .rate_limiter(Arc::new(NoDelay))
            .build()
            .unwrap();
        client.close();

        let result = client.get("http://127.0.0.1:9/").await;
        assert!(matches!(result, Err(FetchError::Closed { .. })));
        assert!(!client.test_connectivity("http://127.0.0.1:9/").await);
    }
}
