//! News listing extraction
//!
//! Turns a live-news listing page into [`NewsItem`]s. The page markup is not
//! under our control, so entry selection walks an ordered list of
//! [`EntryStrategy`]s and every entry is parsed in isolation: a broken entry
//! is logged and skipped, never fatal to the pass.
//!
//! # Examples
//!
//! ```ignore
//! use tickerscrape::{HttpConfig, NewsConfig, NewsScraper};
//!
//! let mut scraper = NewsScraper::new(&HttpConfig::default(), NewsConfig::default())?;
//! for item in scraper.get_recent_news().await {
//!     println!("{} {}", item.ticker, item.headline);
//! }
//! scraper.close();
//! ```

use std::collections::HashSet;

use chrono::{DateTime, TimeDelta, Utc};
use scraper::Html;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::backend::ElementRef;
use crate::config::{HttpConfig, NewsConfig};
use crate::http::{Fetcher, HttpClient};
use crate::model::NewsItem;
use crate::ticker::TickerExtractor;
use crate::timeparse::parse_relative_time;
use crate::{ConfigError, ExtractionError};

/// Headlines shorter than this are navigation noise, not news
pub const MIN_HEADLINE_CHARS: usize = 10;

const HEADLINE_SELECTORS: &[&str] = &["div.title", "h3"];
const TIME_SELECTORS: &[&str] = &["time", "span.time"];
const NESTED_LINK_SELECTOR: &str = "a[href]";

/// A named CSS selector for locating listing entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryStrategy {
    pub name: String,
    pub selector: String,
}

impl EntryStrategy {
    pub fn new(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
        }
    }

    /// Link blocks first, then any anchor pointing into `/news/`
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("link-block", "div.link-block"),
            Self::new("news-anchor", r#"a[href*="/news/"]"#),
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        scraper::Selector::parse(&self.selector)
            .map(|_| ())
            .map_err(|e| ConfigError::InvalidSelector {
                selector: self.selector.clone(),
                error: e.to_string(),
            })
    }
}

/// Select listing entries with the first strategy that matches anything
pub fn extract_entries<E: ElementRef>(root: &E, strategies: &[EntryStrategy]) -> Vec<E> {
    for (index, strategy) in strategies.iter().enumerate() {
        let entries = root.select_all(&strategy.selector);
        if entries.is_empty() {
            warn!(
                strategy = %strategy.name,
                "No entries matched; page structure may have changed"
            );
            continue;
        }
        if index > 0 {
            info!(strategy = %strategy.name, "Using fallback entry selector");
        }
        return entries;
    }
    Vec::new()
}

/// Scraper for a live news listing page
pub struct NewsScraper<F: Fetcher = HttpClient> {
    fetcher: F,
    config: NewsConfig,
    tickers: TickerExtractor,
    origin: Url,
}

impl NewsScraper<HttpClient> {
    /// Create a scraper with its own HTTP client
    pub fn new(http: &HttpConfig, config: NewsConfig) -> Result<Self, ConfigError> {
        let client = HttpClient::from_config(http)?;
        Self::with_fetcher(client, config)
    }
}

impl<F: Fetcher> NewsScraper<F> {
    /// Create a scraper on top of an existing fetcher
    pub fn with_fetcher(fetcher: F, config: NewsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let origin = Url::parse(&config.listing_url)
            .and_then(|url| url.join("/"))
            .map_err(|_| ConfigError::InvalidUrl {
                field: "listing_url",
                value: config.listing_url.clone(),
            })?;
        let tickers = TickerExtractor::new(config.denylist.clone());

        info!(url = %config.listing_url, "News scraper initialized");
        Ok(Self {
            fetcher,
            config,
            tickers,
            origin,
        })
    }

    /// Fetch the listing page and extract fresh, ticker-bearing items
    ///
    /// A failed fetch is logged and yields no items.
    pub async fn get_recent_news(&self) -> Vec<NewsItem> {
        info!(source = %self.config.source, "Fetching news listing");

        let html = match self.fetcher.get(&self.config.listing_url).await {
            Ok(html) => html,
            Err(e) => {
                error!(url = %self.config.listing_url, error = %e, "Failed to fetch news listing");
                return Vec::new();
            }
        };

        self.parse_listing(&html, Utc::now())
    }

    /// Extract items from listing markup as of `now`
    ///
    /// Pure with respect to its inputs: the same markup and `now` always give
    /// the same items in the same order.
    pub fn parse_listing(&self, html: &str, now: DateTime<Utc>) -> Vec<NewsItem> {
        let document = Html::parse_document(html);
        let entries = extract_entries(&document.root_element(), &self.config.strategies);
        info!(count = entries.len(), "Found candidate news entries");

        let cutoff = TimeDelta::try_hours(i64::from(self.config.lookback_hours))
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let mut seen = HashSet::new();
        let mut items = Vec::new();
        for entry in entries.iter().take(self.config.max_entries) {
            match self.parse_entry(entry, now, cutoff) {
                Ok(parsed) => {
                    items.extend(parsed.into_iter().filter(|item| seen.insert(item.clone())));
                }
                Err(e) => debug!(error = %e, "Skipping news entry"),
            }
        }

        info!(count = items.len(), "Extracted news items with tickers");
        items
    }

    fn parse_entry<E: ElementRef>(
        &self,
        entry: &E,
        now: DateTime<Utc>,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<NewsItem>, ExtractionError> {
        let headline = HEADLINE_SELECTORS
            .iter()
            .find_map(|selector| entry.select_one(selector))
            .map(|el| el.stripped_text())
            .unwrap_or_else(|| entry.stripped_text());

        if headline.chars().count() < MIN_HEADLINE_CHARS {
            return Err(ExtractionError::ShortHeadline {
                text: headline,
                min: MIN_HEADLINE_CHARS,
            });
        }

        let url = self.entry_url(entry)?;

        let published_time = TIME_SELECTORS
            .iter()
            .find_map(|selector| entry.select_one(selector))
            .map(|el| parse_relative_time(&el.stripped_text(), now))
            .unwrap_or(now);

        if published_time < cutoff {
            debug!(url = %url, published = %published_time, "Entry older than lookback window");
            return Ok(Vec::new());
        }

        let tickers = self.tickers.extract(&headline);
        if tickers.is_empty() {
            debug!(headline = %preview(&headline), "No tickers found");
            return Ok(Vec::new());
        }

        Ok(tickers
            .into_iter()
            .map(|ticker| {
                debug!(ticker = %ticker, headline = %preview(&headline), "Found news");
                NewsItem {
                    ticker,
                    headline: headline.clone(),
                    url: url.clone(),
                    published_time,
                    source: self.config.source.clone(),
                }
            })
            .collect())
    }

    /// The entry's own link, else its first nested link, else the listing page
    fn entry_url<E: ElementRef>(&self, entry: &E) -> Result<String, ExtractionError> {
        let href = entry
            .attr("href")
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .map(str::to_string)
            .or_else(|| {
                entry
                    .select_one(NESTED_LINK_SELECTOR)
                    .and_then(|a| a.attr("href").map(|href| href.trim().to_string()))
                    .filter(|href| !href.is_empty())
            });

        let Some(href) = href else {
            return Ok(self.config.listing_url.clone());
        };

        self.origin
            .join(&href)
            .map(String::from)
            .map_err(|error| ExtractionError::InvalidUrl {
                href,
                base: self.origin.to_string(),
                error,
            })
    }

    /// Probe the listing page
    pub async fn test_connection(&self) -> bool {
        info!(source = %self.config.source, "Testing connection");
        let reachable = self.fetcher.test_connectivity(&self.config.listing_url).await;
        if reachable {
            info!(source = %self.config.source, "Listing is accessible");
        } else {
            error!(source = %self.config.source, "Listing connection failed");
        }
        reachable
    }

    /// Release the underlying connection
    pub fn close(&mut self) {
        self.fetcher.close();
        debug!(source = %self.config.source, "News scraper closed");
    }
}

fn preview(text: &str) -> String {
    text.chars().take(60).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_strategy_wins_when_present() {
        let html = Html::parse_document(
            r#"<div class="link-block">one</div><a href="/news/x">two</a>"#,
        );
        let entries = extract_entries(&html.root_element(), &EntryStrategy::defaults());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].value().name(), "div");
    }

    #[test]
    fn falls_back_to_news_anchors() {
        let html = Html::parse_document(
            r#"<a href="/about">About</a><a href="/news/abc">one</a><a href="/news/def">two</a>"#,
        );
        let entries = extract_entries(&html.root_element(), &EntryStrategy::defaults());
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn no_strategy_matching_yields_nothing() {
        let html = Html::parse_document("<p>maintenance</p>");
        assert!(extract_entries(&html.root_element(), &EntryStrategy::defaults()).is_empty());
    }

    #[test]
    fn invalid_selector_fails_validation() {
        let result = EntryStrategy::new("broken", "div[").validate();
        assert!(matches!(result, Err(ConfigError::InvalidSelector { .. })));
    }
}
