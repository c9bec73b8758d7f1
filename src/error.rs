//! Error types for fetching, extraction and configuration
//!
//! None of these escape a batch operation. Transport failures are logged and
//! turned into empty results by the scrapers, extraction failures skip the
//! offending row or entry, and configuration errors surface at construction
//! time before any request is made.

use std::time::Duration;

/// Failures returned by a single [`Fetcher::fetch`](crate::Fetcher::fetch) call
///
/// Every variant is terminal for that call; the HTTP layer never retries.
///
/// # Examples
///
/// ```ignore
/// use tickerscrape::{FetchError, Fetcher, FetchOptions};
/// use reqwest::Method;
///
/// match client.fetch(url, Method::GET, FetchOptions::default()).await {
///     Ok(body) => println!("{} bytes", body.len()),
///     Err(FetchError::HttpStatus { status, .. }) if status == 404 => {
///         eprintln!("not found");
///     }
///     Err(e) => eprintln!("fetch failed: {}", e),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request did not complete within the timeout
    #[error("Request to '{url}' timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    /// Connection refused, reset, or DNS failure
    #[error("Connection to '{url}' failed: {error}")]
    Connection { url: String, error: String },

    /// The final response carried a 4xx or 5xx status
    #[error("Request to '{url}' returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// Any other failure (invalid URL, body decoding, builder errors)
    #[error("Unexpected error requesting '{url}': {error}")]
    Unexpected { url: String, error: String },

    /// Only GET and POST are supported
    #[error("Unsupported HTTP method '{method}' for '{url}'")]
    UnsupportedMethod { url: String, method: String },

    /// The client was released with `close()` before this call
    #[error("HTTP client is closed; cannot request '{url}'")]
    Closed { url: String },
}

impl FetchError {
    /// The URL the failed call targeted
    pub fn url(&self) -> &str {
        match self {
            FetchError::Timeout { url, .. }
            | FetchError::Connection { url, .. }
            | FetchError::HttpStatus { url, .. }
            | FetchError::Unexpected { url, .. }
            | FetchError::UnsupportedMethod { url, .. }
            | FetchError::Closed { url } => url,
        }
    }

    /// Whether the failure came from the caller rather than the transport
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            FetchError::UnsupportedMethod { .. } | FetchError::Closed { .. }
        )
    }
}

/// Structural failures while turning one entry or row into a record
///
/// These never leave the extractor: the row is logged at debug level and
/// skipped, and extraction carries on with the remaining input.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// An element the record needs was not found
    #[error("Required element '{selector}' not found")]
    MissingElement { selector: String },

    /// A table row had fewer cells than required
    #[error("Row has {found} columns, expected at least {expected}")]
    TooFewColumns { found: usize, expected: usize },

    /// A date cell did not hold a strict YYYY-MM-DD date
    #[error("Invalid date '{text}': {error}")]
    InvalidDate { text: String, error: ParseError },

    /// A link could not be resolved to an absolute URL
    #[error("Cannot resolve link '{href}' against '{base}': {error}")]
    InvalidUrl {
        href: String,
        base: String,
        error: url::ParseError,
    },

    /// Headline text was below the minimum informative length
    #[error("Headline '{text}' is shorter than {min} characters")]
    ShortHeadline { text: String, min: usize },
}

/// Errors that can occur when parsing text into Rust types
///
/// Returned by [`FromHtml`](crate::FromHtml) implementations. Each variant keeps
/// the original text so a skipped row can be logged with its content.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Text did not match the expected date layout
    #[error("Invalid date: {text}")]
    InvalidDate {
        text: String,
        #[source]
        error: chrono::ParseError,
    },

    /// Text had the wrong shape before any conversion was attempted
    #[error("Malformed value '{text}', expected {expected}")]
    Malformed { text: String, expected: &'static str },
}

/// Errors raised while validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Request timeout must be greater than zero
    #[error("Request timeout must be greater than 0")]
    ZeroTimeout,

    /// Lookback windows must be greater than zero
    #[error("Lookback window '{0}' must be greater than 0")]
    ZeroLookback(&'static str),

    /// Limits such as max entries or max text length must be greater than zero
    #[error("Limit '{0}' must be greater than 0")]
    ZeroLimit(&'static str),

    /// A configured URL did not parse
    #[error("Invalid URL for '{field}': '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    /// A configured CSS selector did not parse
    #[error("Invalid selector '{selector}': {error}")]
    InvalidSelector { selector: String, error: String },

    /// At least one entry selection strategy is needed
    #[error("At least one entry selection strategy is required")]
    NoStrategies,

    /// A header name or value was not valid HTTP
    #[error("Invalid header '{name}'")]
    InvalidHeader { name: String },

    /// An environment value could not be parsed
    #[error("Invalid value '{value}' for environment variable '{key}'")]
    InvalidEnvValue { key: &'static str, value: String },

    /// The underlying HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}
