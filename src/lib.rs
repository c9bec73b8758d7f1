//! News and SEC filing ingestion for ticker scoring
//!
//! Fetches public listing and filing pages at a polite, fixed pace and turns
//! them into [`NewsItem`] and [`Filing`] records. Malformed markup never
//! aborts a batch: bad rows are skipped, failed fetches yield empty results,
//! and the reason is logged through `tracing`.

// Core modules
mod backend;
pub mod config;
mod error;
mod extract;
pub mod filings;
pub mod http;
pub mod limiter;
mod model;
pub mod news;
pub mod testing;
pub mod text;
pub mod ticker;
pub mod timeparse;

// Public exports
pub use backend::ElementRef;
pub use config::{FilingConfig, HttpConfig, NewsConfig, ScraperConfig};
pub use error::{ConfigError, ExtractionError, FetchError, ParseError};
pub use extract::FromHtml;
pub use filings::FilingScraper;
pub use http::{FetchOptions, Fetcher, HttpClient, HttpClientBuilder};
pub use limiter::{DelayLimiter, NoDelay, RateLimiter};
pub use model::{Filing, FilingText, NewsItem, Source};
pub use news::{EntryStrategy, NewsScraper, extract_entries};
pub use ticker::{TickerDenylist, TickerExtractor};
pub use timeparse::parse_relative_time;
