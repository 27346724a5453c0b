//! Paginated article link discovery
//!
//! Discovery walks a source's listing pages as a small state machine:
//!
//! ```text
//! Start -> FetchListing -> ExtractLinks -> CheckNextPage -> { FetchListing | Done }
//! ```
//!
//! The walk ends when the link selector never shows up, when no pagination
//! selector is configured, when the pagination control is gone, or when the
//! page ceiling is reached. A fetch error ends it too, but the links gathered
//! up to that point are still returned.

use crate::config::{CrawlerConfig, PaginationMode, SourceRule};
use crate::crawler::driver::PageDriver;
use crate::extract::SelectorChain;
use crate::url::{is_article_url, resolve_link};
use crate::FetchResult;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// Bounds applied to one source's discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryLimits {
    pub max_pages: u32,
    pub max_articles: usize,
    pub link_wait: Duration,
    pub settle_delay: Duration,
}

impl DiscoveryLimits {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_pages: config.max_pages.max(1),
            max_articles: config.max_articles,
            link_wait: config.link_wait(),
            settle_delay: config.settle_delay(),
        }
    }
}

impl Default for DiscoveryLimits {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

/// Why a discovery walk stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    NoLinks,
    SinglePage,
    NoNextPage,
    PageLimit,
}

/// Collects candidate article URLs from a source's listing pages
#[derive(Debug, Clone)]
pub struct LinkDiscoverer {
    rule: SourceRule,
    limits: DiscoveryLimits,
    links: SelectorChain,
}

impl LinkDiscoverer {
    pub fn new(rule: &SourceRule, limits: DiscoveryLimits) -> Self {
        Self {
            links: SelectorChain::parse(&rule.article_links),
            rule: rule.clone(),
            limits,
        }
    }

    /// Runs discovery through `driver`
    ///
    /// Never fails: an error while processing a listing page is logged and
    /// the links accumulated so far are returned.
    pub async fn discover(&self, driver: &mut dyn PageDriver) -> Vec<String> {
        let mut found = Vec::new();

        match self.walk(driver, &mut found).await {
            Ok(stop) => {
                tracing::debug!(source = %self.rule.name, ?stop, "Listing walk finished");
            }
            Err(e) => {
                tracing::warn!(
                    source = %self.rule.name,
                    error = %e,
                    collected = found.len(),
                    "Discovery aborted, keeping partial results"
                );
            }
        }

        let links = finalize_links(found, self.limits.max_articles);
        tracing::info!(source = %self.rule.name, links = links.len(), "Discovered article links");
        links
    }

    async fn walk(&self, driver: &mut dyn PageDriver, found: &mut Vec<String>) -> FetchResult<Stop> {
        let listing_url = self.rule.listing_url();
        let base = Url::parse(&self.rule.base_url).or_else(|_| Url::parse(&listing_url));
        let pagination = self
            .rule
            .pagination
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());

        // FetchListing
        tracing::info!(source = %self.rule.name, url = %listing_url, "Fetching listing");
        driver.open(&listing_url).await?;

        let mut page: u32 = 1;
        loop {
            // ExtractLinks
            if !driver
                .wait_for(&self.rule.article_links, self.limits.link_wait)
                .await?
            {
                tracing::info!(source = %self.rule.name, page, "No article links on page");
                return Ok(Stop::NoLinks);
            }

            let html = driver.html().await?;
            let page_links = match &base {
                Ok(base) => extract_links(&html, &self.links, base),
                Err(_) => {
                    let current = driver.current_url().await?;
                    match Url::parse(&current) {
                        Ok(base) => extract_links(&html, &self.links, &base),
                        Err(_) => Vec::new(),
                    }
                }
            };
            tracing::debug!(source = %self.rule.name, page, links = page_links.len(), "Extracted links");
            found.extend(page_links);

            // CheckNextPage
            let Some(pagination) = pagination else {
                return Ok(Stop::SinglePage);
            };
            if page >= self.limits.max_pages {
                return Ok(Stop::PageLimit);
            }
            if !driver.activate(pagination, self.rule.pagination_mode).await? {
                return Ok(Stop::NoNextPage);
            }
            if self.rule.pagination_mode == PaginationMode::SamePage {
                tokio::time::sleep(self.limits.settle_delay).await;
            }
            page += 1;
        }
    }
}

/// Collects link targets from listing markup
///
/// The first selector alternative that yields any link wins. Matched
/// elements contribute their own `href`, or that of the first anchor inside
/// them. Relative targets resolve against `base`; rejected targets are
/// dropped.
pub fn extract_links(html: &str, chain: &SelectorChain, base: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let anchor = Selector::parse("a[href]").ok();

    for selector in chain.selectors() {
        let links: Vec<String> = document
            .select(selector)
            .filter_map(|element| {
                element.value().attr("href").or_else(|| {
                    let anchor = anchor.as_ref()?;
                    element.select(anchor).next()?.value().attr("href")
                })
            })
            .filter_map(|href| match resolve_link(href, base) {
                Ok(url) => Some(url.to_string()),
                Err(e) => {
                    tracing::trace!(%href, error = %e, "Dropping link");
                    None
                }
            })
            .collect();

        if !links.is_empty() {
            return links;
        }
    }

    Vec::new()
}

/// Deduplicates by exact string, drops non-article URLs and applies the
/// article ceiling
pub fn finalize_links(links: Vec<String>, max_articles: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    links
        .into_iter()
        .filter(|link| is_article_url(link))
        .filter(|link| seen.insert(link.clone()))
        .take(max_articles)
        .collect()
}
