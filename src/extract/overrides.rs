//! Per-source exceptions to the generic extraction rules
//!
//! Some sites need a tweak that does not fit the declarative rule format.
//! Those tweaks live here, keyed by the configured source name, so the
//! extractor itself stays source-agnostic and every exception can be listed
//! and tested on its own.

use url::Url;

/// Formats a class-derived numeric id into the stored entry id
pub type EntryIdFormatter = fn(numeric_id: &str, base_url: &str) -> String;

/// Rewrites raw date text before it is parsed
pub type DateTextNormalizer = fn(raw: &str) -> String;

/// Optional hooks for one source
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceOverrides {
    pub entry_id: Option<EntryIdFormatter>,
    pub date_text: Option<DateTextNormalizer>,
}

/// Every source with special handling, by configured name
const OVERRIDES: &[(&str, SourceOverrides)] = &[
    (
        "Gamekings",
        SourceOverrides {
            entry_id: Some(wordpress_permalink),
            date_text: None,
        },
    ),
    (
        "Power Unlimited",
        SourceOverrides {
            entry_id: None,
            date_text: Some(strip_trailing_periods),
        },
    ),
];

/// Looks up the hooks registered for a source name
///
/// Unknown names get the empty set of hooks.
pub fn overrides_for(source_name: &str) -> SourceOverrides {
    OVERRIDES
        .iter()
        .find(|(name, _)| *name == source_name)
        .map(|(_, overrides)| *overrides)
        .unwrap_or_default()
}

/// Names of all sources with registered hooks
pub fn overridden_sources() -> impl Iterator<Item = &'static str> {
    OVERRIDES.iter().map(|(name, _)| *name)
}

/// `https://site/?p=<id>`, the shortlink form WordPress answers to
fn wordpress_permalink(numeric_id: &str, base_url: &str) -> String {
    match Url::parse(base_url) {
        Ok(mut url) => {
            url.set_path("/");
            url.set_fragment(None);
            url.query_pairs_mut().clear().append_pair("p", numeric_id);
            url.to_string()
        }
        Err(_) => format!("{}/?p={}", base_url.trim_end_matches('/'), numeric_id),
    }
}

/// Drops the trailing period some sites put after a date ("12 March 2024.")
///
/// Only the punctuation is handled. Month names still have to be English for
/// the chrono pattern to read them, so "12 mrt. 2024." falls back to now.
fn strip_trailing_periods(raw: &str) -> String {
    raw.trim().trim_end_matches('.').trim_end().to_string()
}
