//! SEC EDGAR filing extraction
//!
//! Two pages are involved: the company browse page, whose `tableFile2` table
//! lists filings one per row, and each filing's document index, whose
//! `tableFile` table links to the primary document. Both are parsed row by
//! row; a row that does not fit is skipped and the rest still count.

use chrono::{NaiveDate, TimeDelta, Utc};
use scraper::Html;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::backend::ElementRef;
use crate::config::{FilingConfig, HttpConfig};
use crate::extract::FromHtml;
use crate::http::{Fetcher, HttpClient, HttpClientBuilder};
use crate::model::{Filing, FilingText};
use crate::text::visible_text;
use crate::{ConfigError, ExtractionError};

const FILINGS_TABLE_SELECTOR: &str = "table.tableFile2";
const DOCUMENTS_TABLE_SELECTOR: &str = "table.tableFile";
const DOCUMENTS_BUTTON_SELECTOR: &str = "a#documentsbutton";
const MIN_COLUMNS: usize = 4;

/// Scraper for SEC EDGAR filing indexes and documents
pub struct FilingScraper<F: Fetcher = HttpClient> {
    fetcher: F,
    config: FilingConfig,
    base: Url,
}

impl FilingScraper<HttpClient> {
    /// Create a scraper whose client identifies itself with
    /// [`FilingConfig::user_agent`] instead of the generic user agent
    pub fn new(http: &HttpConfig, config: FilingConfig) -> Result<Self, ConfigError> {
        let client = HttpClientBuilder::from_config(http)
            .user_agent(config.user_agent.clone())
            .build()?;
        Self::with_fetcher(client, config)
    }
}

impl<F: Fetcher> FilingScraper<F> {
    pub fn with_fetcher(fetcher: F, config: FilingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let base = Url::parse(&config.base_url).map_err(|_| ConfigError::InvalidUrl {
            field: "base_url",
            value: config.base_url.clone(),
        })?;

        info!(url = %config.base_url, "SEC filing scraper initialized");
        Ok(Self {
            fetcher,
            config,
            base,
        })
    }

    /// Company browse URL listing the filings of `ticker`
    pub fn index_url(&self, ticker: &str) -> String {
        let count = self.config.index_count.to_string();
        let params = [
            ("action", "getcompany"),
            ("CIK", ticker),
            ("type", ""),
            ("dateb", ""),
            ("owner", "exclude"),
            ("count", count.as_str()),
        ];
        match Url::parse_with_params(&self.config.search_url, &params) {
            Ok(url) => url.into(),
            // search_url is validated at construction
            Err(_) => self.config.search_url.clone(),
        }
    }

    /// Recent filings for `ticker`
    ///
    /// A failed fetch or a page without a filings table yields no filings, so
    /// one unknown ticker never stops a multi-ticker batch.
    pub async fn get_filings(&self, ticker: &str) -> Vec<Filing> {
        info!(ticker = %ticker, "Fetching SEC filings");

        let url = self.index_url(ticker);
        let html = match self.fetcher.get(&url).await {
            Ok(html) => html,
            Err(e) => {
                error!(ticker = %ticker, error = %e, "Failed to fetch SEC filing index");
                return Vec::new();
            }
        };

        self.parse_filing_index(&html, ticker, Utc::now().date_naive())
    }

    /// Filings for every ticker, fetched one after another
    pub async fn get_filings_for<I, S>(&self, tickers: I) -> Vec<Filing>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filings = Vec::new();
        for ticker in tickers {
            filings.extend(self.get_filings(ticker.as_ref()).await);
        }
        filings
    }

    /// Parse a filing index page as of `today`
    ///
    /// Rows dated on or after `today - lookback_days` are kept.
    pub fn parse_filing_index(&self, html: &str, ticker: &str, today: NaiveDate) -> Vec<Filing> {
        let document = Html::parse_document(html);
        let Some(table) = document.root_element().select_one(FILINGS_TABLE_SELECTOR) else {
            warn!(ticker = %ticker, "No filings table found; ticker may be invalid");
            return Vec::new();
        };

        let rows: Vec<_> = table.select_all("tr").into_iter().skip(1).collect();
        if rows.is_empty() {
            warn!(ticker = %ticker, "No filing rows found");
            return Vec::new();
        }
        info!(ticker = %ticker, count = rows.len(), "Found filing rows");

        let cutoff = TimeDelta::try_days(i64::from(self.config.lookback_days))
            .and_then(|window| today.checked_sub_signed(window))
            .unwrap_or(NaiveDate::MIN);

        let mut filings = Vec::new();
        for row in &rows {
            match self.parse_row(row, ticker, cutoff) {
                Ok(Some(filing)) => filings.push(filing),
                Ok(None) => {}
                Err(e) => debug!(ticker = %ticker, error = %e, "Skipping filing row"),
            }
        }

        info!(ticker = %ticker, count = filings.len(), "Extracted recent filings");
        filings
    }

    fn parse_row<E: ElementRef>(
        &self,
        row: &E,
        ticker: &str,
        cutoff: NaiveDate,
    ) -> Result<Option<Filing>, ExtractionError> {
        let cells = row.select_all("td");
        if cells.len() < MIN_COLUMNS {
            return Err(ExtractionError::TooFewColumns {
                found: cells.len(),
                expected: MIN_COLUMNS,
            });
        }

        let filing_type = cells[0].stripped_text().to_uppercase();

        let date_text = cells[3].stripped_text();
        let filing_date = NaiveDate::from_text(&date_text)
            .map_err(|error| ExtractionError::InvalidDate {
                text: date_text.clone(),
                error,
            })?;

        if filing_date < cutoff {
            return Ok(None);
        }

        let href = cells[1]
            .select_one(DOCUMENTS_BUTTON_SELECTOR)
            .and_then(|link| link.attr("href").map(str::to_string))
            .ok_or_else(|| ExtractionError::MissingElement {
                selector: DOCUMENTS_BUTTON_SELECTOR.to_string(),
            })?;
        let filing_url = self.resolve(&href)?;

        debug!(ticker = %ticker, filing_type = %filing_type, date = %filing_date, "Found filing");
        Ok(Some(Filing {
            ticker: ticker.trim().to_uppercase(),
            filing_type,
            filing_date,
            filing_url,
        }))
    }

    /// Plain text of the filing's primary document
    ///
    /// Fetches the document index at `filing_url`, follows the first document
    /// link in its table, and flattens that document. Any missing piece or
    /// failed fetch along the way yields `None`.
    pub async fn get_filing_text(&self, filing_url: &str) -> Option<String> {
        debug!(url = %filing_url, "Downloading filing");

        let index_html = match self.fetcher.get(filing_url).await {
            Ok(html) => html,
            Err(e) => {
                error!(url = %filing_url, error = %e, "Failed to fetch filing index");
                return None;
            }
        };

        let document_url = self.primary_document_url(&index_html)?;

        let document_html = match self.fetcher.get(&document_url).await {
            Ok(html) => html,
            Err(e) => {
                error!(url = %document_url, error = %e, "Failed to fetch filing document");
                return None;
            }
        };

        let text = visible_text(&document_html, self.config.max_text_chars);
        debug!(url = %document_url, chars = text.chars().count(), "Extracted filing text");
        Some(text)
    }

    /// Absolute URL of the first linked document in a filing index page
    pub fn primary_document_url(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let Some(table) = document.root_element().select_one(DOCUMENTS_TABLE_SELECTOR) else {
            warn!("No document table found in filing page");
            return None;
        };

        // The first row is the column header; take the first row with a link.
        let href = table
            .select_all("tr")
            .into_iter()
            .find_map(|row| row.select_one("a[href]"))
            .and_then(|link| link.attr("href").map(str::to_string));

        let Some(href) = href else {
            debug!("No document link found in filing page");
            return None;
        };

        match self.resolve(&href) {
            Ok(url) => Some(url),
            Err(e) => {
                debug!(error = %e, "Unusable document link");
                None
            }
        }
    }

    /// Texts for a batch of filings, keyed by filing URL
    ///
    /// Filings whose text could not be retrieved are left out.
    pub async fn collect_filing_texts(&self, filings: &[Filing]) -> Vec<FilingText> {
        let mut texts = Vec::new();
        for filing in filings {
            if let Some(text) = self.get_filing_text(&filing.filing_url).await {
                texts.push(FilingText {
                    filing_url: filing.filing_url.clone(),
                    text,
                });
            }
        }
        texts
    }

    /// Probe the filing site
    pub async fn test_connection(&self) -> bool {
        info!("Testing SEC Edgar connection");
        let reachable = self.fetcher.test_connectivity(&self.config.base_url).await;
        if reachable {
            info!("SEC Edgar is accessible");
        } else {
            error!("SEC Edgar connection failed");
        }
        reachable
    }

    /// Release the underlying connection
    pub fn close(&mut self) {
        self.fetcher.close();
        debug!("SEC filing scraper closed");
    }

    fn resolve(&self, href: &str) -> Result<String, ExtractionError> {
        self.base
            .join(href.trim())
            .map(String::from)
            .map_err(|error| ExtractionError::InvalidUrl {
                href: href.to_string(),
                base: self.base.to_string(),
                error,
            })
    }
}
