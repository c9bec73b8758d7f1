use std::time::Duration;
use tickerscrape::testing::MockFetcher;
use tickerscrape::*;

#[test]
fn test_zero_timeout_rejected() {
    let result = HttpClient::builder().timeout(Duration::ZERO).build();

    match result {
        Err(ConfigError::ZeroTimeout) => {}
        _ => panic!("Expected ZeroTimeout error"),
    }
}

#[test]
fn test_zero_probe_timeout_rejected() {
    let result = HttpClient::builder().probe_timeout(Duration::ZERO).build();

    assert!(matches!(result, Err(ConfigError::ZeroTimeout)));
}

#[test]
fn test_invalid_user_agent_rejected() {
    let result = HttpClient::builder().user_agent("bad\nagent").build();

    match result {
        Err(ConfigError::InvalidHeader { name }) => assert_eq!(name, "user-agent"),
        _ => panic!("Expected InvalidHeader error"),
    }
}

#[test]
fn test_zero_news_lookback_rejected() {
    let config = NewsConfig {
        lookback_hours: 0,
        ..NewsConfig::default()
    };
    let result = NewsScraper::with_fetcher(MockFetcher::new(), config);

    match result {
        Err(ConfigError::ZeroLookback("lookback_hours")) => {}
        _ => panic!("Expected ZeroLookback error"),
    }
}

#[test]
fn test_zero_max_entries_rejected() {
    let config = NewsConfig {
        max_entries: 0,
        ..NewsConfig::default()
    };

    assert!(matches!(
        config.validate(),
        Err(ConfigError::ZeroLimit("max_entries"))
    ));
}

#[test]
fn test_missing_strategies_rejected() {
    let config = NewsConfig {
        strategies: Vec::new(),
        ..NewsConfig::default()
    };

    assert!(matches!(config.validate(), Err(ConfigError::NoStrategies)));
}

#[test]
fn test_invalid_strategy_selector_rejected() {
    let config = NewsConfig {
        strategies: vec![EntryStrategy::new("broken", "div.link-block[")],
        ..NewsConfig::default()
    };

    match config.validate() {
        Err(ConfigError::InvalidSelector { selector, .. }) => {
            assert_eq!(selector, "div.link-block[")
        }
        _ => panic!("Expected InvalidSelector error"),
    }
}

#[test]
fn test_relative_listing_url_rejected() {
    let config = NewsConfig {
        listing_url: "/news/live.html".to_string(),
        ..NewsConfig::default()
    };

    match NewsScraper::with_fetcher(MockFetcher::new(), config) {
        Err(ConfigError::InvalidUrl { field, value }) => {
            assert_eq!(field, "listing_url");
            assert_eq!(value, "/news/live.html");
        }
        _ => panic!("Expected InvalidUrl error"),
    }
}

#[test]
fn test_invalid_filing_settings_rejected() {
    let zero_days = FilingConfig {
        lookback_days: 0,
        ..FilingConfig::default()
    };
    assert!(matches!(
        zero_days.validate(),
        Err(ConfigError::ZeroLookback("lookback_days"))
    ));

    let bad_base = FilingConfig {
        base_url: "not a url".to_string(),
        ..FilingConfig::default()
    };
    assert!(matches!(
        FilingScraper::with_fetcher(MockFetcher::new(), bad_base),
        Err(ConfigError::InvalidUrl { field: "base_url", .. })
    ));

    let bad_agent = FilingConfig {
        user_agent: "research\r\nX-Injected: 1".to_string(),
        ..FilingConfig::default()
    };
    assert!(matches!(
        bad_agent.validate(),
        Err(ConfigError::InvalidHeader { .. })
    ));
}

#[test]
fn test_default_configuration_valid() {
    let config = ScraperConfig::default();
    assert!(config.validate().is_ok());

    assert!(NewsScraper::new(&config.http, config.news.clone()).is_ok());
    assert!(FilingScraper::new(&config.http, config.filings.clone()).is_ok());
}

#[test]
fn test_environment_overrides() {
    let config = ScraperConfig::from_lookup(|key| match key {
        "REQUEST_TIMEOUT" => Some("15".to_string()),
        "TIME_WINDOW_HOURS" => Some("6".to_string()),
        "STOCKTITAN_NEWS_URL" => Some("http://localhost:9000/news/live.html".to_string()),
        _ => None,
    })
    .unwrap();

    assert_eq!(config.http.timeout, Duration::from_secs(15));
    assert_eq!(config.news.lookback_hours, 6);
    assert_eq!(config.news.listing_url, "http://localhost:9000/news/live.html");
    assert_eq!(config.filings.lookback_days, 30);
}

#[test]
fn test_environment_values_are_validated() {
    let result = ScraperConfig::from_lookup(|key| match key {
        "TIME_WINDOW_HOURS" => Some("0".to_string()),
        _ => None,
    });
    assert!(matches!(result, Err(ConfigError::ZeroLookback(_))));

    let result = ScraperConfig::from_lookup(|key| match key {
        "FILING_LOOKBACK_DAYS" => Some("a month".to_string()),
        _ => None,
    });
    assert!(matches!(
        result,
        Err(ConfigError::InvalidEnvValue { key: "FILING_LOOKBACK_DAYS", .. })
    ));
}
