//! Testing utilities
//!
//! [`MockFetcher`] serves canned pages by exact URL and records every call, so
//! the extractors can be exercised without a network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use reqwest::Method;

use crate::FetchError;
use crate::http::{FetchOptions, Fetcher};

#[derive(Debug, Clone)]
enum CannedResponse {
    Body(String),
    Status(u16),
    Timeout,
}

/// Record of a call made to the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub url: String,
    pub method: Method,
}

/// A [`Fetcher`] that answers from a fixed URL-to-page table
///
/// Unknown URLs answer with HTTP 404.
///
/// # Example
///
/// ```ignore
/// use tickerscrape::testing::MockFetcher;
///
/// let mock = MockFetcher::new()
///     .with_page("https://example.com/news", "<div class=\"link-block\">...</div>")
///     .with_status("https://example.com/down", 503);
/// ```
#[derive(Default, Clone)]
pub struct MockFetcher {
    responses: Arc<RwLock<HashMap<String, CannedResponse>>>,
    calls: Arc<RwLock<Vec<MockCall>>>,
    closed: Arc<AtomicBool>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`
    pub fn with_page(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.insert(url.into(), CannedResponse::Body(body.into()));
        self
    }

    /// Fail `url` with the given HTTP status
    pub fn with_status(self, url: impl Into<String>, status: u16) -> Self {
        self.insert(url.into(), CannedResponse::Status(status));
        self
    }

    /// Fail `url` with a timeout
    pub fn with_timeout(self, url: impl Into<String>) -> Self {
        self.insert(url.into(), CannedResponse::Timeout);
        self
    }

    fn insert(&self, url: String, response: CannedResponse) {
        self.responses.write().expect("mock responses lock").insert(url, response);
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.read().expect("mock calls lock").clone()
    }

    /// URLs requested so far, in order
    pub fn requested_urls(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.url).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().expect("mock calls lock").len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(
        &self,
        url: &str,
        method: Method,
        _options: FetchOptions,
    ) -> Result<String, FetchError> {
        self.calls.write().expect("mock calls lock").push(MockCall {
            url: url.to_string(),
            method: method.clone(),
        });

        if self.is_closed() {
            return Err(FetchError::Closed {
                url: url.to_string(),
            });
        }
        if method != Method::GET && method != Method::POST {
            return Err(FetchError::UnsupportedMethod {
                url: url.to_string(),
                method: method.to_string(),
            });
        }

        let response = self.responses.read().expect("mock responses lock").get(url).cloned();
        match response {
            Some(CannedResponse::Body(body)) => Ok(body),
            Some(CannedResponse::Status(status)) => Err(FetchError::HttpStatus {
                url: url.to_string(),
                status,
            }),
            Some(CannedResponse::Timeout) => Err(FetchError::Timeout {
                url: url.to_string(),
                timeout: std::time::Duration::from_secs(10),
            }),
            None => Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: 404,
            }),
        }
    }

    async fn test_connectivity(&self, url: &str) -> bool {
        !self.is_closed()
            && matches!(
                self.responses.read().expect("mock responses lock").get(url),
                Some(CannedResponse::Body(_))
            )
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
