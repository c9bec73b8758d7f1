//! Relative timestamp normalization
//!
//! Listing pages print times like "5 minutes ago" or "yesterday". These are
//! mapped back to an absolute instant relative to `now`. Anything not
//! understood maps to `now` itself, so an entry is never rejected because of
//! its timestamp text.

use std::sync::LazyLock;

use chrono::{DateTime, TimeDelta, Utc};
use regex::Regex;

static FIRST_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("integer pattern"));

/// Resolve free-form relative time text against `now`
///
/// Checked in order: "minute", "hour", "day" (but not "yesterday"), "today",
/// "yesterday". The first integer in the text is the magnitude.
pub fn parse_relative_time(text: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    let text = text.trim().to_lowercase();

    let offset = if text.contains("minute") {
        first_integer(&text).and_then(TimeDelta::try_minutes)
    } else if text.contains("hour") {
        first_integer(&text).and_then(TimeDelta::try_hours)
    } else if text.contains("day") && !text.contains("yesterday") {
        first_integer(&text).and_then(TimeDelta::try_days)
    } else if text.contains("today") {
        Some(TimeDelta::zero())
    } else if text.contains("yesterday") {
        TimeDelta::try_days(1)
    } else {
        None
    };

    offset
        .and_then(|delta| now.checked_sub_signed(delta))
        .unwrap_or(now)
}

fn first_integer(text: &str) -> Option<i64> {
    FIRST_INTEGER.find(text)?.as_str().parse().ok()
}
