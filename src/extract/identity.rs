//! Entry identity derivation
//!
//! The entry id is the deduplication key for an article. It depends only on
//! the page markup and its URL.

use crate::config::SourceRule;
use crate::extract::overrides::SourceOverrides;
use crate::extract::selectors::SelectorChain;
use crate::url::last_path_segment;
use scraper::Html;

/// Class prefix that carries a post's numeric id (`post-12345`)
const POST_CLASS_PREFIX: &str = "post-";

/// Derives the entry id for an article
///
/// 1. The first element matched by the rule's `entry-id` chain is searched
///    for a `post-<digits>` class. A source override may format that number.
/// 2. Otherwise the final path segment of the article URL, stripped of all
///    non-alphanumeric characters.
pub fn derive_entry_id(
    url: &str,
    document: &Html,
    rule: &SourceRule,
    overrides: &SourceOverrides,
) -> String {
    if let Some(numeric) = class_post_id(document, &rule.entry_id) {
        return match overrides.entry_id {
            Some(format) => format(&numeric, &rule.base_url),
            None => numeric,
        };
    }

    url_entry_id(url)
}

/// Numeric suffix of the first `post-<digits>` class on the matched element
pub fn class_post_id(document: &Html, selectors: &str) -> Option<String> {
    if selectors.trim().is_empty() {
        return None;
    }

    let chain = SelectorChain::parse(selectors);
    let element = chain.first_element(document)?;

    element.value().classes().find_map(|class| {
        class
            .strip_prefix(POST_CLASS_PREFIX)
            .filter(|suffix| !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()))
            .map(str::to_string)
    })
}

/// Final path segment of the URL with everything but letters and digits removed
pub fn url_entry_id(url: &str) -> String {
    last_path_segment(url)
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaginationMode;
    use crate::extract::overrides::overrides_for;

    fn rule(name: &str, entry_id: &str) -> SourceRule {
        SourceRule {
            name: name.to_string(),
            base_url: "https://www.gamekings.tv".to_string(),
            listing_path: "/nieuws".to_string(),
            article_links: "a".to_string(),
            title: "h1".to_string(),
            author: String::new(),
            content: ".content".to_string(),
            date: String::new(),
            entry_id: entry_id.to_string(),
            summary: None,
            pagination: None,
            pagination_mode: PaginationMode::Navigate,
            date_format: None,
        }
    }

    const PAGE: &str = r#"<html><body>
        <article class="post type-post post-48213 status-publish">
            <h1>Review</h1>
        </article>
    </body></html>"#;

    #[test]
    fn test_class_id_wins() {
        let document = Html::parse_document(PAGE);
        let rule = rule("Example", "article");
        let id = derive_entry_id(
            "https://example.com/news/some-review/",
            &document,
            &rule,
            &overrides_for(&rule.name),
        );
        assert_eq!(id, "48213");
    }

    #[test]
    fn test_class_id_with_source_override() {
        let document = Html::parse_document(PAGE);
        let rule = rule("Gamekings", "article");
        let id = derive_entry_id(
            "https://www.gamekings.tv/nieuws/some-review/",
            &document,
            &rule,
            &overrides_for(&rule.name),
        );
        assert_eq!(id, "https://www.gamekings.tv/?p=48213");
    }

    #[test]
    fn test_non_numeric_post_classes_are_ignored() {
        let document = Html::parse_document(
            r#"<html><body><article class="post-header post-large">x</article></body></html>"#,
        );
        assert_eq!(class_post_id(&document, "article"), None);
    }

    #[test]
    fn test_fallback_to_url_segment() {
        let document = Html::parse_document("<html><body><p>no ids</p></body></html>");
        let rule = rule("Example", "article");
        let id = derive_entry_id(
            "https://example.com/news/zelda-tears_of-the-kingdom-review/?ref=home",
            &document,
            &rule,
            &overrides_for(&rule.name),
        );
        assert_eq!(id, "zeldatearsofthekingdomreview");
    }

    #[test]
    fn test_fallback_without_entry_selector() {
        let document = Html::parse_document(PAGE);
        let rule = rule("Example", "");
        let id = derive_entry_id(
            "https://example.com/a/b/item-42.html",
            &document,
            &rule,
            &overrides_for(&rule.name),
        );
        assert_eq!(id, "item42html");
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let rule = rule("Gamekings", ".missing, article");
        let url = "https://www.gamekings.tv/nieuws/x/";
        let first = derive_entry_id(
            url,
            &Html::parse_document(PAGE),
            &rule,
            &overrides_for(&rule.name),
        );
        for _ in 0..5 {
            let again = derive_entry_id(
                url,
                &Html::parse_document(PAGE),
                &rule,
                &overrides_for(&rule.name),
            );
            assert_eq!(first, again);
        }
    }
}
