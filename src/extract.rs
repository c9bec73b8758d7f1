//! Type conversion from HTML text into Rust values
//!
//! This module provides the `FromHtml` trait which defines how table cell
//! text is turned into typed record fields.

use chrono::NaiveDate;

use crate::ParseError;

/// Trait for types that can be parsed from HTML cell text
///
/// # Examples
///
/// ```ignore
/// use tickerscrape::FromHtml;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_text(" 2024-03-15 ")?;
/// assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
/// ```
pub trait FromHtml: Sized {
    /// Parse a value from HTML text content
    fn from_text(text: &str) -> Result<Self, ParseError>;
}

/// Strict `YYYY-MM-DD`: exactly four, two and two digits
impl FromHtml for NaiveDate {
    fn from_text(text: &str) -> Result<Self, ParseError> {
        let trimmed = text.trim();
        let bytes = trimmed.as_bytes();
        let well_formed = bytes.len() == 10
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());

        if !well_formed {
            return Err(ParseError::Malformed {
                text: text.to_string(),
                expected: "YYYY-MM-DD",
            });
        }

        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|error| ParseError::InvalidDate {
            text: text.to_string(),
            error,
        })
    }
}
