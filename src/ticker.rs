//! Ticker symbol detection in free text
//!
//! Detection is tiered, from most to least precise:
//!
//! 1. `$ABC`: dollar-prefixed symbols
//! 2. `(NASDAQ: ABC)`: exchange-qualified symbols in parentheses
//! 3. bare uppercase words of 1-5 letters, minus a denylist of common acronyms
//!
//! Tier 3 runs only when tiers 1 and 2 found nothing anywhere in the text, so
//! a headline with one confident match never mixes in guesses.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

static DOLLAR_TICKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([A-Z]{1,5})\b").expect("dollar ticker pattern"));

static EXCHANGE_TICKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(([A-Z]+):\s*([A-Z]{1,5})\)").expect("exchange ticker pattern")
});

static BARE_TICKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{1,5}\b").expect("bare ticker pattern"));

const DEFAULT_DENYLIST: &[&str] = &[
    "THE", "AND", "FOR", "INC", "LLC", "USA", "CEO", "CFO", "FDA", "SEC", "IPO", "NYSE", "NASDAQ",
    "OTC", "ETF", "NEWS", "STOCK", "MARKET", "ABOUT", "WILL", "HAVE",
];

/// Uppercase words never reported as bare tickers
///
/// Only consulted for bare-word matches; an explicit `$SEC` is still reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerDenylist {
    words: BTreeSet<String>,
}

impl TickerDenylist {
    /// Build a denylist from the given words (stored uppercased)
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_uppercase())
                .collect(),
        }
    }

    /// An empty denylist
    pub fn empty() -> Self {
        Self {
            words: BTreeSet::new(),
        }
    }

    /// Return a copy with `words` added
    pub fn with<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.words
            .extend(words.into_iter().map(|w| w.as_ref().trim().to_uppercase()));
        self
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for TickerDenylist {
    fn default() -> Self {
        Self::new(DEFAULT_DENYLIST)
    }
}

/// Tiered ticker extractor
#[derive(Debug, Clone, Default)]
pub struct TickerExtractor {
    denylist: TickerDenylist,
}

impl TickerExtractor {
    pub fn new(denylist: TickerDenylist) -> Self {
        Self { denylist }
    }

    pub fn denylist(&self) -> &TickerDenylist {
        &self.denylist
    }

    /// Extract the distinct ticker symbols mentioned in `text`
    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        let mut tickers: BTreeSet<String> = DOLLAR_TICKER
            .captures_iter(text)
            .map(|caps| caps[1].to_string())
            .collect();

        tickers.extend(
            EXCHANGE_TICKER
                .captures_iter(text)
                .map(|caps| caps[2].to_string()),
        );

        if tickers.is_empty() {
            tickers.extend(
                BARE_TICKER
                    .find_iter(text)
                    .map(|m| m.as_str())
                    .filter(|word| !self.denylist.contains(word))
                    .map(str::to_string),
            );
        }

        tickers
    }
}
