//! Configuration for the HTTP layer and both extractors
//!
//! Every struct carries working defaults and a `validate` method; the
//! scrapers validate their configuration at construction so a bad value
//! fails before the first request rather than in the middle of a batch.
//! [`ScraperConfig::from_env`] reads the same settings from the process
//! environment.

use std::str::FromStr;
use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue};
use url::Url;

use crate::model::Source;
use crate::news::EntryStrategy;
use crate::ticker::TickerDenylist;
use crate::ConfigError;

pub const DEFAULT_NEWS_URL: &str = "https://www.stocktitan.net/news/live.html";
pub const DEFAULT_SEC_SEARCH_URL: &str = "https://www.sec.gov/cgi-bin/browse-edgar";
pub const DEFAULT_SEC_BASE_URL: &str = "https://www.sec.gov";
/// SEC EDGAR rejects anonymous clients; the identity must carry a contact address.
pub const DEFAULT_SEC_USER_AGENT: &str = "tickerscrape research@example.com";
pub const DEFAULT_USER_AGENT: &str = concat!("tickerscrape/", env!("CARGO_PKG_VERSION"));

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_DELAY_MS: u64 = 1000;
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_NEWS_LOOKBACK_HOURS: u32 = 24;
const DEFAULT_FILING_LOOKBACK_DAYS: u32 = 30;
const DEFAULT_MAX_ENTRIES: usize = 50;
const DEFAULT_INDEX_COUNT: u32 = 40;
const DEFAULT_MAX_TEXT_CHARS: usize = 50_000;

/// Settings shared by every [`HttpClient`](crate::HttpClient)
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Per-request timeout
    pub timeout: Duration,
    /// Pause before every request
    pub delay: Duration,
    /// Timeout for connectivity probes, independent of `timeout`
    pub probe_timeout: Duration,
    pub user_agent: String,
    /// Extra default headers, applied after the built-in `Accept` headers.
    /// A `User-Agent` entry here is ignored in favour of `user_agent`.
    pub headers: Vec<(String, String)>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: Vec::new(),
        }
    }
}

impl HttpConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout.is_zero() || self.probe_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        validate_header("user-agent", &self.user_agent)?;
        for (name, value) in &self.headers {
            validate_header(name, value)?;
        }
        Ok(())
    }
}

/// Settings for the news listing extractor
#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub listing_url: String,
    /// Entries published before `now - lookback_hours` are dropped
    pub lookback_hours: u32,
    /// Candidate entries processed per pass
    pub max_entries: usize,
    /// Tried in order; the first one that selects anything wins
    pub strategies: Vec<EntryStrategy>,
    pub denylist: TickerDenylist,
    pub source: Source,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_NEWS_URL.to_string(),
            lookback_hours: DEFAULT_NEWS_LOOKBACK_HOURS,
            max_entries: DEFAULT_MAX_ENTRIES,
            strategies: EntryStrategy::defaults(),
            denylist: TickerDenylist::default(),
            source: Source::StockTitan,
        }
    }
}

impl NewsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url("listing_url", &self.listing_url)?;
        if self.lookback_hours == 0 {
            return Err(ConfigError::ZeroLookback("lookback_hours"));
        }
        if self.max_entries == 0 {
            return Err(ConfigError::ZeroLimit("max_entries"));
        }
        if self.strategies.is_empty() {
            return Err(ConfigError::NoStrategies);
        }
        for strategy in &self.strategies {
            strategy.validate()?;
        }
        Ok(())
    }
}

/// Settings for the SEC filing extractor
#[derive(Debug, Clone)]
pub struct FilingConfig {
    /// Company browse endpoint queried per ticker
    pub search_url: String,
    /// Origin that relative filing links are resolved against
    pub base_url: String,
    /// Filings dated before `today - lookback_days` are dropped
    pub lookback_days: u32,
    /// Contact-bearing identity sent instead of the generic user agent
    pub user_agent: String,
    /// Rows requested from the index page
    pub index_count: u32,
    /// Filing text is cut to this many characters
    pub max_text_chars: usize,
}

impl Default for FilingConfig {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEC_SEARCH_URL.to_string(),
            base_url: DEFAULT_SEC_BASE_URL.to_string(),
            lookback_days: DEFAULT_FILING_LOOKBACK_DAYS,
            user_agent: DEFAULT_SEC_USER_AGENT.to_string(),
            index_count: DEFAULT_INDEX_COUNT,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
        }
    }
}

impl FilingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url("search_url", &self.search_url)?;
        validate_url("base_url", &self.base_url)?;
        if self.lookback_days == 0 {
            return Err(ConfigError::ZeroLookback("lookback_days"));
        }
        if self.index_count == 0 {
            return Err(ConfigError::ZeroLimit("index_count"));
        }
        if self.max_text_chars == 0 {
            return Err(ConfigError::ZeroLimit("max_text_chars"));
        }
        validate_header("user-agent", &self.user_agent)
    }
}

/// Complete configuration for one ingestion pass
#[derive(Debug, Clone, Default)]
pub struct ScraperConfig {
    pub http: HttpConfig,
    pub news: NewsConfig,
    pub filings: FilingConfig,
}

impl ScraperConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.http.validate()?;
        self.news.validate()?;
        self.filings.validate()
    }

    /// Read overrides from the process environment
    ///
    /// Unset variables keep their defaults. Recognised keys:
    /// `REQUEST_TIMEOUT` (seconds), `REQUEST_DELAY` (fractional seconds),
    /// `TIME_WINDOW_HOURS`, `FILING_LOOKBACK_DAYS`, `STOCKTITAN_NEWS_URL`,
    /// `SEC_SEARCH_URL`, `SEC_BASE_URL`, `SEC_USER_AGENT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(secs) = parse_var::<u64, _>(&lookup, "REQUEST_TIMEOUT")? {
            config.http.timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup("REQUEST_DELAY") {
            config.http.delay = raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                .ok_or(ConfigError::InvalidEnvValue {
                    key: "REQUEST_DELAY",
                    value: raw,
                })?;
        }
        if let Some(hours) = parse_var(&lookup, "TIME_WINDOW_HOURS")? {
            config.news.lookback_hours = hours;
        }
        if let Some(days) = parse_var(&lookup, "FILING_LOOKBACK_DAYS")? {
            config.filings.lookback_days = days;
        }
        if let Some(url) = lookup("STOCKTITAN_NEWS_URL") {
            config.news.listing_url = url;
        }
        if let Some(url) = lookup("SEC_SEARCH_URL") {
            config.filings.search_url = url;
        }
        if let Some(url) = lookup("SEC_BASE_URL") {
            config.filings.base_url = url;
        }
        if let Some(agent) = lookup("SEC_USER_AGENT") {
            config.filings.user_agent = agent;
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnvValue { key, value: raw }),
    }
}

fn validate_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    match Url::parse(value) {
        Ok(url) if url.has_host() => Ok(()),
        _ => Err(ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
        }),
    }
}

fn validate_header(name: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidHeader {
        name: name.to_string(),
    };
    HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
    HeaderValue::from_str(value).map_err(|_| invalid())?;
    Ok(())
}
