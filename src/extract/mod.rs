//! Structured field extraction for article pages
//!
//! This module turns one article page into an [`ExtractedArticle`]:
//! - Selector fallback chains for every textual field
//! - Entry identity derivation (class id, URL fallback)
//! - Publication date parsing with a "now" fallback
//! - Per-source override hooks
//!
//! Field-level misses never fail an article; they degrade to empty values.

mod dates;
mod identity;
mod overrides;
mod selectors;

pub use dates::{parse_article_date, parse_free_form, parse_with_pattern};
pub use identity::{class_post_id, derive_entry_id, url_entry_id};
pub use overrides::{overridden_sources, overrides_for, SourceOverrides};
pub use selectors::{element_text, split_selector_list, SelectorChain, JOIN_SEPARATOR};

use crate::config::SourceRule;
use crate::crawler::RetryingFetcher;
use chrono::{DateTime, Utc};
use scraper::Html;
use serde::{Deserialize, Serialize};

/// Structured fields pulled from one article page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedArticle {
    /// Stable deduplication key
    pub entry_id: String,
    pub title: String,
    pub author: String,
    pub summary: String,
    /// Raw HTML of the article body
    pub content: String,
    /// URL the article was fetched from
    pub link: String,
    pub date: DateTime<Utc>,
}

/// Applies one source rule to article pages
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    rule: SourceRule,
    overrides: SourceOverrides,
    title: SelectorChain,
    author: SelectorChain,
    summary: SelectorChain,
    content: SelectorChain,
    date: SelectorChain,
}

impl FieldExtractor {
    /// Prepares the selector chains of a rule
    pub fn new(rule: &SourceRule) -> Self {
        Self {
            overrides: overrides_for(&rule.name),
            title: SelectorChain::parse(&rule.title),
            author: SelectorChain::parse(&rule.author),
            summary: SelectorChain::parse(rule.summary.as_deref().unwrap_or_default()),
            content: SelectorChain::parse(&rule.content),
            date: SelectorChain::parse(&rule.date),
            rule: rule.clone(),
        }
    }

    pub fn rule(&self) -> &SourceRule {
        &self.rule
    }

    /// Extracts every field from a parsed page
    ///
    /// Infallible: a selector that matches nothing leaves its field empty and
    /// an unreadable date becomes the current time.
    pub fn extract(&self, url: &str, document: &Html) -> ExtractedArticle {
        let entry_id = derive_entry_id(url, document, &self.rule, &self.overrides);
        let date = self.date_attribute(document).unwrap_or_else(|| {
            parse_article_date(
                &self.date.first_text(document),
                self.rule.date_format.as_deref(),
                &self.overrides,
            )
        });

        ExtractedArticle {
            entry_id,
            title: self.title.first_text(document),
            author: self.author.first_text(document),
            summary: self.summary.first_text(document),
            content: self.content.joined_html(document),
            link: url.to_string(),
            date,
        }
    }

    /// Parses page markup and extracts from it
    pub fn extract_html(&self, url: &str, html: &str) -> ExtractedArticle {
        let document = Html::parse_document(html);
        self.extract(url, &document)
    }

    /// Fetches an article page and extracts it
    ///
    /// Returns `None` only when the page itself could not be retrieved after
    /// all retries; the failure is logged and the caller skips the article.
    pub async fn fetch_and_extract(
        &self,
        fetcher: &RetryingFetcher,
        url: &str,
    ) -> Option<ExtractedArticle> {
        match fetcher.fetch_html(url).await {
            Ok(html) => Some(self.extract_html(url, &html)),
            Err(e) => {
                tracing::warn!(source = %self.rule.name, %url, error = %e, "Skipping article");
                None
            }
        }
    }

    /// Date from a machine-readable `datetime` attribute on the matched
    /// element
    ///
    /// Only consulted when the rule has no date pattern. An attribute that
    /// does not parse leaves the element text to decide.
    fn date_attribute(&self, document: &Html) -> Option<DateTime<Utc>> {
        if self.rule.date_format.is_some() {
            return None;
        }
        let element = self.date.first_element(document)?;
        let datetime = element.value().attr("datetime")?.trim();
        if datetime.is_empty() {
            return None;
        }
        let parsed = parse_free_form(datetime);
        if parsed.is_none() {
            tracing::debug!(%datetime, "Unparsable datetime attribute, trying element text");
        }
        parsed
    }
}
