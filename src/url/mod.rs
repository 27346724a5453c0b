//! URL handling module for Gamewire
//!
//! Link resolution and filtering for discovered article URLs, plus the path
//! helpers identity derivation relies on.

mod normalize;

use crate::{UrlError, UrlResult};
use url::Url;

pub use normalize::normalize_url;

/// Resolves an `href` against a base URL and validates the result
///
/// Rejected:
/// - empty hrefs
/// - fragment-only links (`#section`)
/// - `javascript:`, `mailto:`, `tel:` and `data:` pseudo-URLs
/// - anything that does not resolve to http or https
///
/// # Examples
///
/// ```
/// use gamewire::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/news/").unwrap();
/// let link = resolve_link("/2024/05/item", &base).unwrap();
/// assert_eq!(link.as_str(), "https://example.com/2024/05/item");
/// assert!(resolve_link("javascript:void(0)", &base).is_err());
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> UrlResult<Url> {
    let href = href.trim();

    if href.is_empty() {
        return Err(UrlError::Rejected("empty href".to_string()));
    }

    if href.starts_with('#') {
        return Err(UrlError::Rejected(format!("fragment-only link {}", href)));
    }

    let lowered = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return Err(UrlError::InvalidScheme(href.to_string()));
    }

    let joined = base_url
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    normalize_url(joined.as_str())
}

/// Checks that a string is an absolute, fetchable article URL
pub fn is_article_url(candidate: &str) -> bool {
    let lowered = candidate.trim().to_ascii_lowercase();
    if lowered.starts_with('#') || lowered.starts_with("javascript:") {
        return false;
    }
    match Url::parse(candidate) {
        Ok(url) => (url.scheme() == "http" || url.scheme() == "https") && url.has_host(),
        Err(_) => false,
    }
}

/// Returns the last non-empty path segment of a URL
///
/// Falls back to splitting on `/` when the string does not parse.
pub fn last_path_segment(url_str: &str) -> String {
    if let Ok(url) = Url::parse(url_str) {
        if let Some(segments) = url.path_segments() {
            if let Some(last) = segments.filter(|s| !s.is_empty()).last() {
                return last.to_string();
            }
        }
        return String::new();
    }

    url_str
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .split('/')
        .filter(|s| !s.is_empty())
        .last()
        .unwrap_or_default()
        .to_string()
}
