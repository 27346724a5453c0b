use crate::UrlError;
use url::Url;

/// Query parameters that only carry campaign tracking
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid", "mc_cid"];

/// Normalizes an absolute article URL
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything that is not http or https
/// 3. Remove the fragment
/// 4. Remove tracking query parameters, keeping the order of the rest
/// 5. Remove an empty query string
///
/// Host case is already folded by the parser. Paths are left alone so the
/// identity fallback, which reads the final path segment, sees what the site
/// published.
///
/// # Examples
///
/// ```
/// use gamewire::url::normalize_url;
///
/// let url = normalize_url("https://Example.com/news/item?utm_source=x#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/news/item");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    url.set_fragment(None);

    if url.query().is_some() {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !is_tracking_param(key))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    Ok(url)
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}
