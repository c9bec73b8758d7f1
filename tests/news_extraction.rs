use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use tickerscrape::config::DEFAULT_NEWS_URL;
use tickerscrape::testing::MockFetcher;
use tickerscrape::*;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 12, 17, 15, 30, 0).unwrap()
}

fn scraper() -> NewsScraper<MockFetcher> {
    NewsScraper::with_fetcher(MockFetcher::new(), NewsConfig::default()).unwrap()
}

const LISTING: &str = r#"
<html><body>
  <div class="link-block">
    <a href="/news/ACME/acme-wins-contract.html">
      <div class="title">Acme Corp (NASDAQ: ACME) Wins $5M Defense Contract</div>
    </a>
    <span class="time">5 minutes ago</span>
  </div>
  <div class="link-block">
    <a href="https://www.stocktitan.net/news/AAA/merger.html">
      <div class="title">$AAA and $BBB announce definitive merger agreement</div>
    </a>
    <time>2 hours ago</time>
  </div>
  <div class="link-block">
    <a href="/news/XYZ/short.html"><div class="title">$XYZ up</div></a>
  </div>
  <div class="link-block">
    <a href="/news/OLD/annual.html"><div class="title">$OLD files annual report late</div></a>
    <span class="time">2 days ago</span>
  </div>
  <div class="link-block">
    <a href="/news/wrap.html"><div class="title">market wrap: stocks close higher</div></a>
  </div>
  <div class="link-block">
    <a href="/news/NOW/undated.html"><h3>Nowco receives FDA clearance for NWCO device</h3></a>
  </div>
</body></html>
"#;

#[test]
fn test_listing_fans_out_and_filters() {
    let items = scraper().parse_listing(LISTING, now());

    let summary: Vec<(&str, &str)> = items
        .iter()
        .map(|item| (item.ticker.as_str(), item.url.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("ACME", "https://www.stocktitan.net/news/ACME/acme-wins-contract.html"),
            ("AAA", "https://www.stocktitan.net/news/AAA/merger.html"),
            ("BBB", "https://www.stocktitan.net/news/AAA/merger.html"),
            ("NWCO", "https://www.stocktitan.net/news/NOW/undated.html"),
        ]
    );
}

#[test]
fn test_multi_ticker_entry_shares_fields() {
    let items = scraper().parse_listing(LISTING, now());
    let merger: Vec<&NewsItem> = items
        .iter()
        .filter(|item| item.headline.contains("merger"))
        .collect();

    assert_eq!(merger.len(), 2);
    assert_eq!(merger[0].headline, merger[1].headline);
    assert_eq!(merger[0].url, merger[1].url);
    assert_eq!(merger[0].published_time, now() - TimeDelta::hours(2));
    assert_eq!(merger[0].published_time, merger[1].published_time);
    assert_ne!(merger[0].ticker, merger[1].ticker);
}

#[test]
fn test_timestamps_and_defaults() {
    let items = scraper().parse_listing(LISTING, now());

    let acme = items.iter().find(|item| item.ticker == "ACME").unwrap();
    assert_eq!(acme.published_time, now() - TimeDelta::minutes(5));
    assert_eq!(acme.source, Source::StockTitan);
    assert_eq!(acme.headline, "Acme Corp (NASDAQ: ACME) Wins $5M Defense Contract");

    let undated = items.iter().find(|item| item.ticker == "NWCO").unwrap();
    assert_eq!(undated.published_time, now());
}

#[test]
fn test_short_headline_dropped_despite_dollar_ticker() {
    let items = scraper().parse_listing(LISTING, now());
    assert!(items.iter().all(|item| item.ticker != "XYZ"));
}

#[test]
fn test_entries_outside_lookback_are_dropped() {
    let items = scraper().parse_listing(LISTING, now());
    assert!(items.iter().all(|item| item.ticker != "OLD"));

    let config = NewsConfig {
        lookback_hours: 72,
        ..NewsConfig::default()
    };
    let wide = NewsScraper::with_fetcher(MockFetcher::new(), config).unwrap();
    let items = wide.parse_listing(LISTING, now());
    let old = items.iter().find(|item| item.ticker == "OLD").unwrap();
    assert_eq!(old.published_time, now() - TimeDelta::days(2));
}

#[test]
fn test_fallback_selector_uses_news_anchors() {
    let html = r#"
        <nav><a href="/about">About us and our mission</a></nav>
        <a href="/news/QRS/offering.html">
          <h3>QRS Holdings (NYSE: QRS) prices public offering</h3>
          <span class="time">3 hours ago</span>
        </a>
        <a href="https://partner.example/news/TUV/deal.html">$TUV signs licensing deal with partner</a>
    "#;

    let items = scraper().parse_listing(html, now());

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].ticker, "QRS");
    assert_eq!(items[0].url, "https://www.stocktitan.net/news/QRS/offering.html");
    assert_eq!(items[0].published_time, now() - TimeDelta::hours(3));
    assert_eq!(items[1].ticker, "TUV");
    assert_eq!(items[1].url, "https://partner.example/news/TUV/deal.html");
}

#[test]
fn test_duplicate_entries_yield_one_record() {
    let html = r#"
        <a href="/news/DUP/a.html">$DUP announces record quarterly revenue</a>
        <a href="/news/DUP/a.html">$DUP announces record quarterly revenue</a>
    "#;
    let items = scraper().parse_listing(html, now());
    assert_eq!(items.len(), 1);
}

#[test]
fn test_entry_volume_is_capped() {
    let mut html = String::new();
    for i in 0..60u8 {
        let ticker = format!("Q{}{}", (b'A' + i / 26) as char, (b'A' + i % 26) as char);
        html.push_str(&format!(
            r#"<div class="link-block"><a href="/news/{ticker}.html">${ticker} jumps on heavy volume</a></div>"#
        ));
    }

    let items = scraper().parse_listing(&html, now());
    assert_eq!(items.len(), 50);
    assert_eq!(items[0].ticker, "QAA");
    assert_eq!(items[49].ticker, "QBX");
}

#[test]
fn test_no_entries_yields_nothing() {
    assert!(scraper().parse_listing("<html><body>Down for maintenance</body></html>", now()).is_empty());
    assert!(scraper().parse_listing("", now()).is_empty());
}

#[test]
fn test_reparsing_is_idempotent() {
    let scraper = scraper();
    let first = scraper.parse_listing(LISTING, now());
    let second = scraper.parse_listing(LISTING, now());
    assert_eq!(first, second);
}

#[test]
fn test_custom_denylist_is_applied() {
    let config = NewsConfig {
        denylist: TickerDenylist::default().with(["NWCO"]),
        ..NewsConfig::default()
    };
    let scraper = NewsScraper::with_fetcher(MockFetcher::new(), config).unwrap();
    let items = scraper.parse_listing(LISTING, now());
    assert!(items.iter().all(|item| item.ticker != "NWCO"));
}

#[tokio::test]
async fn test_get_recent_news_fetches_listing() {
    let mock = MockFetcher::new().with_page(DEFAULT_NEWS_URL, LISTING);
    let scraper = NewsScraper::with_fetcher(mock.clone(), NewsConfig::default()).unwrap();

    let items = scraper.get_recent_news().await;

    assert_eq!(items.len(), 4);
    assert_eq!(mock.requested_urls(), vec![DEFAULT_NEWS_URL.to_string()]);
}

#[tokio::test]
async fn test_failed_fetch_yields_empty_batch() {
    let mock = MockFetcher::new().with_status(DEFAULT_NEWS_URL, 503);
    let scraper = NewsScraper::with_fetcher(mock, NewsConfig::default()).unwrap();
    assert!(scraper.get_recent_news().await.is_empty());
}

#[tokio::test]
async fn test_close_releases_fetcher() {
    let mock = MockFetcher::new().with_page(DEFAULT_NEWS_URL, LISTING);
    let mut scraper = NewsScraper::with_fetcher(mock.clone(), NewsConfig::default()).unwrap();

    assert!(scraper.test_connection().await);
    scraper.close();
    scraper.close();

    assert!(mock.is_closed());
    assert!(!scraper.test_connection().await);
    assert!(scraper.get_recent_news().await.is_empty());
}
