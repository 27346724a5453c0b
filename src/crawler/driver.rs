//! Listing page drivers
//!
//! Link discovery talks to a [`PageDriver`]: something that holds one open
//! document, can wait for selectors on it and can trigger a pagination
//! control. Drivers hand out markup as plain strings; parsing into a
//! queryable tree happens in synchronous code so the rest of the pipeline is
//! agnostic to which backend produced it.

use crate::config::PaginationMode;
use crate::crawler::fetcher::RetryingFetcher;
use crate::extract::SelectorChain;
use crate::url::resolve_link;
use crate::{FetchError, FetchResult};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

/// One open listing document and the operations pagination needs
#[async_trait]
pub trait PageDriver: Send {
    /// Opens `url` as the current document, discarding any previous one
    async fn open(&mut self, url: &str) -> FetchResult<()>;

    /// Waits up to `timeout` for `selectors` to match; `Ok(false)` when they
    /// never do
    async fn wait_for(&mut self, selectors: &str, timeout: Duration) -> FetchResult<bool>;

    /// Markup of the current document
    async fn html(&mut self) -> FetchResult<String>;

    /// URL of the current document
    async fn current_url(&mut self) -> FetchResult<String>;

    /// Triggers the first element matching `selectors`
    ///
    /// Returns `Ok(false)` when no such control exists. In navigate mode the
    /// call returns once the new page has loaded.
    async fn activate(&mut self, selectors: &str, mode: PaginationMode) -> FetchResult<bool>;

    /// Releases whatever the driver holds
    async fn close(&mut self) -> FetchResult<()> {
        Ok(())
    }
}

/// Page currently held by a [`StaticDriver`]
#[derive(Debug, Clone)]
struct OpenPage {
    url: String,
    html: String,
}

/// Driver backed by plain HTTP fetches
///
/// Activating a pagination control fetches the URL it links to, so both
/// pagination modes become a fetch of the next page.
#[derive(Debug, Clone)]
pub struct StaticDriver {
    fetcher: RetryingFetcher,
    page: Option<OpenPage>,
}

impl StaticDriver {
    pub fn new(fetcher: RetryingFetcher) -> Self {
        Self {
            fetcher,
            page: None,
        }
    }

    fn page(&self) -> FetchResult<&OpenPage> {
        self.page.as_ref().ok_or_else(|| FetchError::Unsupported {
            url: String::new(),
            message: "no document open".to_string(),
        })
    }
}

#[async_trait]
impl PageDriver for StaticDriver {
    async fn open(&mut self, url: &str) -> FetchResult<()> {
        self.page = None;
        let html = self.fetcher.fetch_html(url).await?;
        self.page = Some(OpenPage {
            url: url.to_string(),
            html,
        });
        Ok(())
    }

    async fn wait_for(&mut self, selectors: &str, _timeout: Duration) -> FetchResult<bool> {
        // A static document never changes, so there is nothing to wait for.
        let page = self.page()?;
        Ok(selector_matches(&page.html, selectors))
    }

    async fn html(&mut self) -> FetchResult<String> {
        Ok(self.page()?.html.clone())
    }

    async fn current_url(&mut self) -> FetchResult<String> {
        Ok(self.page()?.url.clone())
    }

    async fn activate(&mut self, selectors: &str, _mode: PaginationMode) -> FetchResult<bool> {
        let page = self.page()?;
        let next = match control_target(&page.html, selectors, &page.url) {
            ControlTarget::Missing => return Ok(false),
            ControlTarget::Unfollowable => {
                return Err(FetchError::Unsupported {
                    url: page.url.clone(),
                    message: format!("pagination control '{}' has no usable href", selectors),
                })
            }
            ControlTarget::Url(next) => next,
        };

        tracing::debug!(from = %page.url, to = %next, "Following pagination control");
        self.open(&next).await?;
        Ok(true)
    }
}

/// What a pagination control points at in static markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlTarget {
    /// No element matches the control selectors
    Missing,
    /// The control exists but carries no followable link
    Unfollowable,
    Url(String),
}

/// Resolves the link behind a pagination control
///
/// The control's own `href` is used, or that of the first anchor inside it.
pub fn control_target(html: &str, selectors: &str, page_url: &str) -> ControlTarget {
    let document = Html::parse_document(html);
    let chain = SelectorChain::parse(selectors);
    let Some(control) = chain.first_element(&document) else {
        return ControlTarget::Missing;
    };

    let href = control.value().attr("href").map(str::to_string).or_else(|| {
        let anchor = Selector::parse("a[href]").ok()?;
        control
            .select(&anchor)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string)
    });

    let base = match Url::parse(page_url) {
        Ok(base) => base,
        Err(_) => return ControlTarget::Unfollowable,
    };

    match href.map(|href| resolve_link(&href, &base)) {
        Some(Ok(url)) => ControlTarget::Url(url.to_string()),
        _ => ControlTarget::Unfollowable,
    }
}

/// Whether any alternative of a selector list matches the markup
pub fn selector_matches(html: &str, selectors: &str) -> bool {
    let document = Html::parse_document(html);
    SelectorChain::parse(selectors)
        .first_element(&document)
        .is_some()
}
