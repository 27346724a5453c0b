//! Publication date parsing
//!
//! Parsing never fails: unreadable date text resolves to the time of
//! extraction.

use crate::extract::overrides::SourceOverrides;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Date-time layouts tried by free-form parsing, interpreted as UTC
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d-%m-%Y %H:%M",
    "%d/%m/%Y %H:%M",
    "%B %d, %Y %H:%M",
    "%B %d, %Y at %H:%M",
    "%d %B %Y %H:%M",
];

/// Date-only layouts tried by free-form parsing, taken as midnight UTC
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%A, %B %d, %Y",
    "%A %d %B %Y",
];

/// Parses the extracted date text of an article
///
/// With a configured pattern the text is first passed through the source's
/// date normalizer (if any) and parsed with that pattern only. Without one,
/// free-form parsing is attempted. Either way an unparsable value yields
/// [`Utc::now`].
pub fn parse_article_date(
    raw: &str,
    pattern: Option<&str>,
    overrides: &SourceOverrides,
) -> DateTime<Utc> {
    let parsed = match pattern.map(str::trim).filter(|p| !p.is_empty()) {
        Some(pattern) => {
            let text = match overrides.date_text {
                Some(normalize) => normalize(raw),
                None => raw.trim().to_string(),
            };
            parse_with_pattern(&text, pattern)
        }
        None => parse_free_form(raw),
    };

    parsed.unwrap_or_else(|| {
        if !raw.trim().is_empty() {
            tracing::debug!(raw = %raw, ?pattern, "Unparsable date, using current time");
        }
        Utc::now()
    })
}

/// Parses with a chrono strftime pattern
///
/// The pattern may describe a full timestamp with offset, a naive timestamp,
/// or a bare date.
pub fn parse_with_pattern(text: &str, pattern: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_str(text, pattern) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(text, pattern) {
        return Some(ndt.and_utc());
    }

    NaiveDate::parse_from_str(text, pattern)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

/// Best-effort parsing of date text in an unknown layout
pub fn parse_free_form(raw: &str) -> Option<DateTime<Utc>> {
    let text = clean_date_text(raw);
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&text) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(&text) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(&text, format) {
            return Some(ndt.and_utc());
        }
    }

    DATE_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(&text, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|ndt| ndt.and_utc())
    })
}

/// Collapses whitespace and drops ordinal suffixes ("May 3rd" -> "May 3")
fn clean_date_text(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let trimmed = word.trim_end_matches(',');
            let digits = trimmed.trim_end_matches(|c: char| c.is_ascii_alphabetic());
            let suffix = &trimmed[digits.len()..];
            let is_ordinal = !digits.is_empty()
                && digits.chars().all(|c| c.is_ascii_digit())
                && matches!(suffix, "st" | "nd" | "rd" | "th");
            if is_ordinal {
                word.replacen(suffix, "", 1)
            } else {
                word.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
