//! Date + subject permalinks.
//!
//! A post is addressed by the calendar day it was posted and its subject:
//!
//! ```text
//! 2024-03-05/hello+world
//! ^^^^^^^^^^ ^^^^^^^^^^^
//! post day   form-encoded subject
//! ```
//!
//! Subjects are encoded the way HTML forms encode values: ASCII letters,
//! digits and `-_.` pass through, a space becomes `+`, every other byte is
//! `%XX`. Decoding accepts both `+` and `%20` for a space, so links produced
//! by older front ends keep resolving.
//!
//! Two posts with the same subject on the same day share a permalink; only
//! the first match is reachable by URL.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use thiserror::Error;

/// Bytes left as-is in an encoded subject (besides ASCII alphanumerics).
const SUBJECT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Timestamp layouts accepted by [`encode_raw`], tried in order.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PermalinkError {
    #[error("Unrecognized post date: {0:?}")]
    InvalidDate(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Route token has no date/subject separator")]
    MissingSeparator,
    #[error("Route token date is not YYYY-MM-DD: {0:?}")]
    InvalidDate(String),
    #[error("Route token subject is not valid UTF-8 once decoded")]
    InvalidSubject,
}

/// A decoded route token, ready for lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permalink {
    pub date: NaiveDate,
    pub subject: String,
}

/// Build the permalink path for a post.
pub fn encode(post_date: NaiveDateTime, subject: &str) -> String {
    format!("{}/{}", post_date.format("%Y-%m-%d"), encode_subject(subject))
}

/// Build a permalink from a date as it arrives from storage or a caller.
///
/// A purely numeric `raw_date`, optionally signed, is epoch seconds (UTC). Anything else must be
/// a `YYYY-MM-DD HH:MM:SS`, RFC 3339, or bare `YYYY-MM-DD` timestamp.
pub fn encode_raw(raw_date: &str, subject: &str) -> Result<String, PermalinkError> {
    let timestamp = parse_timestamp(raw_date)?;
    Ok(encode(timestamp, subject))
}

/// Split a route token into the lookup date and the raw subject.
///
/// Only the first `/` separates; an encoded subject never contains one.
pub fn decode(route_token: &str) -> Result<Permalink, DecodeError> {
    let (date, subject) = route_token
        .split_once('/')
        .ok_or(DecodeError::MissingSeparator)?;

    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| DecodeError::InvalidDate(date.to_string()))?;

    Ok(Permalink {
        date,
        subject: decode_subject(subject)?,
    })
}

/// Render a timestamp as `3rd Apr, 2024`.
pub fn humanize(timestamp: NaiveDateTime) -> String {
    let day = timestamp.day();
    format!(
        "{day}{} {}",
        ordinal_suffix(day),
        timestamp.format("%b, %Y")
    )
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

fn encode_subject(subject: &str) -> String {
    // '+' itself is encoded as %2B, so swapping the space escape is lossless.
    utf8_percent_encode(subject, SUBJECT)
        .to_string()
        .replace("%20", "+")
}

fn decode_subject(encoded: &str) -> Result<String, DecodeError> {
    let spaced = encoded.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| DecodeError::InvalidSubject)
}

/// Parse a post date in any of the accepted shapes.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, PermalinkError> {
    let raw = raw.trim();
    let invalid = || PermalinkError::InvalidDate(raw.to_string());

    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        let secs: i64 = raw.parse().map_err(|_| invalid())?;
        return DateTime::from_timestamp(secs, 0)
            .map(|dt| dt.naive_utc())
            .ok_or_else(invalid);
    }

    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.naive_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(invalid)
}
