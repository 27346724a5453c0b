//! Selector fallback chains
//!
//! A chain is the parsed form of a comma-separated selector list from a
//! source rule. Alternatives are kept separate so they can be tried one at a
//! time, first match wins.

use scraper::{ElementRef, Html, Selector};

/// Separator used when several matched elements are joined
pub const JOIN_SEPARATOR: &str = "\n\n";

/// Ordered list of alternative CSS selectors
#[derive(Debug, Clone)]
pub struct SelectorChain {
    alternatives: Vec<(String, Selector)>,
}

impl SelectorChain {
    /// Parses a comma-separated selector list
    ///
    /// Alternatives that fail to parse are skipped with a warning, so one typo
    /// in a rule does not disable the rest of the chain.
    pub fn parse(list: &str) -> Self {
        let alternatives = split_selector_list(list)
            .into_iter()
            .filter_map(|raw| {
                let parsed = Selector::parse(&raw).map_err(|e| format!("{:?}", e));
                match parsed {
                    Ok(selector) => Some((raw, selector)),
                    Err(e) => {
                        tracing::warn!(selector = %raw, error = %e, "Skipping unparseable selector");
                        None
                    }
                }
            })
            .collect();

        Self { alternatives }
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    /// Raw selector strings, in evaluation order
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.alternatives.iter().map(|(raw, _)| raw.as_str())
    }

    /// Iterates the parsed alternatives in order
    pub fn selectors(&self) -> impl Iterator<Item = &Selector> {
        self.alternatives.iter().map(|(_, selector)| selector)
    }

    /// First element matched by the first alternative that matches anything
    pub fn first_element<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        self.selectors()
            .find_map(|selector| document.select(selector).next())
    }

    /// Trimmed text of the first matching element, from the first alternative
    /// whose text is non-empty
    pub fn first_text(&self, document: &Html) -> String {
        self.first_non_empty(|selector| {
            document
                .select(selector)
                .next()
                .map(|element| element_text(&element))
                .unwrap_or_default()
        })
    }

    /// Inner markup of every matching element joined by a blank line, from the
    /// first alternative that produces non-empty output
    pub fn joined_html(&self, document: &Html) -> String {
        self.first_non_empty(|selector| {
            document
                .select(selector)
                .map(|element| element.inner_html().trim().to_string())
                .filter(|html| !html.is_empty())
                .collect::<Vec<_>>()
                .join(JOIN_SEPARATOR)
        })
    }

    fn first_non_empty<F>(&self, attempt: F) -> String
    where
        F: Fn(&Selector) -> String,
    {
        self.selectors()
            .map(attempt)
            .find(|value| !value.is_empty())
            .unwrap_or_default()
    }
}

/// Text content of an element with surrounding whitespace removed
pub fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Splits a selector list on top-level commas
///
/// Commas nested in parentheses, brackets or quotes belong to a single
/// selector (`:is(h1, h2)`, `[data-x="a,b"]`) and do not split.
pub fn split_selector_list(list: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in list.chars() {
        match (quote, c) {
            (Some(q), _) if c == q => {
                quote = None;
                current.push(c);
            }
            (Some(_), _) => current.push(c),
            (None, '"') | (None, '\'') => {
                quote = Some(c);
                current.push(c);
            }
            (None, '(') | (None, '[') => {
                depth += 1;
                current.push(c);
            }
            (None, ')') | (None, ']') => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            (None, ',') if depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    parts.push(current);

    parts
        .into_iter()
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}
