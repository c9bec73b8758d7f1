//! Records produced by the extractors
//!
//! All records are plain immutable values. The scoring side consumes them and
//! never mutates them; each batch pass builds a fresh collection.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Site a record was extracted from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    StockTitan,
    Other(String),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::StockTitan => f.write_str("StockTitan"),
            Source::Other(name) => f.write_str(name),
        }
    }
}

/// One ticker-bearing news mention
///
/// A listing entry naming several tickers yields one `NewsItem` per ticker;
/// the headline, URL and time are shared between them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NewsItem {
    /// 1-5 uppercase letters
    pub ticker: String,
    /// At least [`MIN_HEADLINE_CHARS`](crate::news::MIN_HEADLINE_CHARS) characters
    pub headline: String,
    /// Absolute article URL
    pub url: String,
    /// Parsed from the entry, or the extraction time when absent
    pub published_time: DateTime<Utc>,
    pub source: Source,
}

/// One regulatory filing reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filing {
    /// Uppercase symbol as requested
    pub ticker: String,
    /// Trimmed, upper-cased form code such as `8-K` or `10-Q`
    pub filing_type: String,
    pub filing_date: NaiveDate,
    /// Absolute URL of the filing's document index page
    pub filing_url: String,
}

/// Plain text of a filing's primary document, keyed by the filing URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingText {
    pub filing_url: String,
    pub text: String,
}
