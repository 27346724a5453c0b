//! HTML to content block conversion
//!
//! The converter walks the node tree of an article body. Every visit returns
//! the spans and blocks its subtree produced; parents decide how to merge
//! them. Nothing is shared between visits, so each element kind can be
//! checked in isolation.
//!
//! | Element | Effect |
//! |---------|--------|
//! | `p`, `h1`-`h6`, `li`, `blockquote`, ... | new paragraph scope, flushed into paragraph blocks |
//! | `a` | one span carrying the link text and target, plus any images inside |
//! | `img` | standalone image block, emitted in place |
//! | `b`/`strong`, `i`/`em`, `u`/`ins` | children annotated with the matching flag |
//! | `br` | newline span |
//! | `script`, `style`, `noscript`, `template` | dropped |
//! | anything else | transparent |

use crate::blocks::{Annotations, BlockLimits, ContentBlock, RichSpan};
use scraper::node::Node;
use scraper::{ElementRef, Html};
use std::collections::HashSet;
use url::Url;

const PARAGRAPH_TAGS: &[&str] = &[
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "li",
    "blockquote",
    "pre",
    "figcaption",
    "dt",
    "dd",
];

const IGNORED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Nesting level past which a subtree is flattened to its text and images
const MAX_DEPTH: usize = 96;

/// Converts an HTML fragment with the given limits and no base URL
///
/// # Examples
///
/// ```
/// use gamewire::blocks::{convert, BlockLimits, ContentBlock};
///
/// let blocks = convert("<p>Hello <b>world</b></p>", BlockLimits::default());
/// assert_eq!(blocks.len(), 1);
/// assert!(matches!(&blocks[0], ContentBlock::Paragraph { spans } if spans.len() == 2));
/// ```
pub fn convert(html: &str, limits: BlockLimits) -> Vec<ContentBlock> {
    Converter::new(limits).convert(html)
}

/// Output of one node visit
#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Span(RichSpan),
    Block(ContentBlock),
}

/// Pieces collected for one scope, plus the pending-separator flag left
/// behind by the last inline run
#[derive(Debug, Default)]
struct Scope {
    pieces: Vec<Piece>,
    separator_pending: bool,
}

impl Scope {
    fn push_span(&mut self, span: RichSpan) {
        if span.is_empty() {
            return;
        }
        if self.separator_pending {
            self.separate_before(&span.text);
        }
        self.separator_pending = false;
        self.pieces.push(Piece::Span(span));
    }

    fn push_block(&mut self, block: ContentBlock) {
        self.separator_pending = false;
        self.pieces.push(Piece::Block(block));
    }

    fn extend(&mut self, pieces: Vec<Piece>) {
        for piece in pieces {
            match piece {
                Piece::Span(span) => self.push_span(span),
                Piece::Block(block) => self.push_block(block),
            }
        }
    }

    /// Appends a link or emphasis run, keeping it visually apart from the
    /// text on either side
    fn extend_inline_run(&mut self, pieces: Vec<Piece>) {
        let produced_text = pieces.iter().any(|p| matches!(p, Piece::Span(_)));
        if let Some(Piece::Span(first)) = pieces.first() {
            self.separate_before(&first.text);
        }
        self.separator_pending = false;
        self.extend(pieces);
        self.separator_pending = produced_text;
    }

    fn separate_before(&mut self, next: &str) {
        let previous = match self.pieces.last() {
            Some(Piece::Span(span)) => span.text.as_str(),
            _ => return,
        };
        if !ends_with_whitespace(previous) && !starts_with_whitespace(next) {
            self.pieces.push(Piece::Span(RichSpan::plain(" ")));
        }
    }
}

/// HTML fragment to [`ContentBlock`] converter
#[derive(Debug, Clone, Default)]
pub struct Converter {
    limits: BlockLimits,
    base_url: Option<Url>,
}

impl Converter {
    pub fn new(limits: BlockLimits) -> Self {
        Self {
            limits,
            base_url: None,
        }
    }

    /// Resolves relative link and image URLs against `base_url`
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn limits(&self) -> BlockLimits {
        self.limits
    }

    /// Converts an HTML fragment into blocks
    ///
    /// Every paragraph block stays within the rich-text ceiling and the
    /// sequence is cut to the block ceiling, dropping trailing blocks.
    pub fn convert(&self, html: &str) -> Vec<ContentBlock> {
        if html.trim().is_empty() {
            return Vec::new();
        }

        let fragment = Html::parse_fragment(html);
        let pieces = self.visit_children(fragment.root_element(), 0).pieces;
        let mut blocks = self.flush(pieces);

        if blocks.len() > self.limits.max_blocks {
            tracing::debug!(
                produced = blocks.len(),
                kept = self.limits.max_blocks,
                "Truncating converted blocks"
            );
            blocks.truncate(self.limits.max_blocks);
        }
        blocks
    }

    fn visit_children(&self, element: ElementRef<'_>, depth: usize) -> Scope {
        let mut scope = Scope::default();
        for child in element.children() {
            match child.value() {
                Node::Text(text) => scope.push_span(RichSpan::plain(collapse_whitespace(text))),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.visit_element(child, &mut scope, depth + 1);
                    }
                }
                _ => {}
            }
        }
        scope
    }

    /// Visits one element and merges what it produced into the parent scope
    fn visit_element(&self, element: ElementRef<'_>, parent: &mut Scope, depth: usize) {
        let name = element.value().name();

        if IGNORED_TAGS.contains(&name) {
            return;
        }

        if depth > MAX_DEPTH {
            parent.extend(self.flatten(element));
            return;
        }

        if PARAGRAPH_TAGS.contains(&name) {
            let pieces = self.visit_children(element, depth).pieces;
            for block in self.flush(pieces) {
                parent.push_block(block);
            }
            return;
        }

        match name {
            "a" => parent.extend_inline_run(self.visit_link(element, depth)),
            "img" => {
                if let Some(url) = self.image_url(element) {
                    parent.push_block(ContentBlock::Image { url });
                }
            }
            "br" => parent.push_span(RichSpan::plain("\n")),
            _ => match emphasis_for(name) {
                Some(annotations) => {
                    let pieces = self
                        .visit_children(element, depth)
                        .pieces
                        .into_iter()
                        .map(|piece| match piece {
                            Piece::Span(span) => Piece::Span(span.with_annotations(annotations)),
                            block => block,
                        })
                        .collect();
                    parent.extend_inline_run(pieces);
                }
                None => parent.extend(self.visit_children(element, depth).pieces),
            },
        }
    }

    /// A link with text becomes a single span, with the images inside it
    /// kept as blocks on the side of the text they appear on. A link without
    /// text (an image link) is walked like any other container.
    fn visit_link(&self, element: ElementRef<'_>, depth: usize) -> Vec<Piece> {
        let flat = self.flatten(element);
        let text: String = flat
            .iter()
            .filter_map(|piece| match piece {
                Piece::Span(span) => Some(span.text.as_str()),
                Piece::Block(_) => None,
            })
            .collect();
        let text = collapse_whitespace(&text);
        if text.trim().is_empty() {
            return self.visit_children(element, depth).pieces;
        }

        let span = match element.value().attr("href").and_then(|href| self.resolve(href)) {
            Some(target) => RichSpan::linked(text, target),
            None => RichSpan::plain(text),
        };

        let mut before = Vec::new();
        let mut after = Vec::new();
        let mut seen_text = false;
        for piece in flat {
            match piece {
                Piece::Span(part) => seen_text |= !part.text.trim().is_empty(),
                block if seen_text => after.push(block),
                block => before.push(block),
            }
        }

        before.push(Piece::Span(span));
        before.extend(after);
        before
    }

    /// Text, line breaks and images of a subtree in document order, without
    /// recursion and without paragraph or emphasis structure
    fn flatten(&self, element: ElementRef<'_>) -> Vec<Piece> {
        let mut pieces = Vec::new();
        let mut hidden = HashSet::new();

        for node in element.descendants() {
            let in_hidden = node.parent().is_some_and(|p| hidden.contains(&p.id()));
            match node.value() {
                Node::Element(el) if in_hidden || IGNORED_TAGS.contains(&el.name()) => {
                    hidden.insert(node.id());
                }
                _ if in_hidden => {}
                Node::Text(text) => {
                    let span = RichSpan::plain(collapse_whitespace(text));
                    if !span.is_empty() {
                        pieces.push(Piece::Span(span));
                    }
                }
                Node::Element(el) if el.name() == "br" => {
                    pieces.push(Piece::Span(RichSpan::plain("\n")));
                }
                Node::Element(el) if el.name() == "img" => {
                    if let Some(url) = ElementRef::wrap(node).and_then(|img| self.image_url(img)) {
                        pieces.push(Piece::Block(ContentBlock::Image { url }));
                    }
                }
                _ => {}
            }
        }
        pieces
    }

    /// Image source, falling back to lazy-load attributes when `src` is
    /// missing or an inline placeholder
    fn image_url(&self, element: ElementRef<'_>) -> Option<String> {
        ["src", "data-src", "data-lazy-src"]
            .iter()
            .filter_map(|attr| element.value().attr(attr))
            .map(str::trim)
            .filter(|src| !src.is_empty() && !src.to_ascii_lowercase().starts_with("data:"))
            .find_map(|src| self.resolve(src))
    }

    /// Absolute http(s) form of a link or image reference
    fn resolve(&self, reference: &str) -> Option<String> {
        let reference = reference.trim();
        if reference.is_empty() || reference.starts_with('#') {
            return None;
        }

        let url = match &self.base_url {
            Some(base) => base.join(reference).ok()?,
            None => Url::parse(reference).ok()?,
        };

        match url.scheme() {
            "http" | "https" => Some(url.to_string()),
            _ => None,
        }
    }

    /// Turns a scope's pieces into blocks
    ///
    /// Runs of spans become paragraph blocks split at the rich-text ceiling.
    /// Blocks produced inside the scope keep their position between them.
    fn flush(&self, pieces: Vec<Piece>) -> Vec<ContentBlock> {
        let mut blocks = Vec::new();
        let mut spans = Vec::new();

        for piece in pieces {
            match piece {
                Piece::Span(span) => spans.push(span),
                Piece::Block(block) => {
                    blocks.extend(split_paragraph(
                        std::mem::take(&mut spans),
                        self.limits.max_rich_text_length,
                    ));
                    blocks.push(block);
                }
            }
        }
        blocks.extend(split_paragraph(spans, self.limits.max_rich_text_length));
        blocks
    }
}

/// Packs spans into paragraph blocks of at most `ceiling` characters
///
/// A block is flushed whenever the next span would push it over the
/// ceiling. Spans longer than the ceiling on their own are cut on character
/// boundaries first. Whitespace-only paragraphs produce nothing.
fn split_paragraph(spans: Vec<RichSpan>, ceiling: usize) -> Vec<ContentBlock> {
    if spans.iter().all(|span| span.text.trim().is_empty()) {
        return Vec::new();
    }

    let ceiling = ceiling.max(1);
    let mut blocks = Vec::new();
    let mut buffer: Vec<RichSpan> = Vec::new();
    let mut buffered = 0usize;

    for span in spans.into_iter().flat_map(|span| chunk_span(span, ceiling)) {
        let len = span.len();
        if buffered + len > ceiling && !buffer.is_empty() {
            blocks.push(ContentBlock::Paragraph {
                spans: std::mem::take(&mut buffer),
            });
            buffered = 0;
        }
        buffered += len;
        buffer.push(span);
    }

    if !buffer.is_empty() {
        blocks.push(ContentBlock::Paragraph { spans: buffer });
    }
    blocks
}

/// Cuts one span into pieces of at most `ceiling` characters
fn chunk_span(span: RichSpan, ceiling: usize) -> Vec<RichSpan> {
    if span.len() <= ceiling {
        return vec![span];
    }

    let chars: Vec<char> = span.text.chars().collect();
    chars
        .chunks(ceiling)
        .map(|chunk| RichSpan {
            text: chunk.iter().collect(),
            link: span.link.clone(),
            annotations: span.annotations,
        })
        .collect()
}

fn emphasis_for(tag: &str) -> Option<Annotations> {
    match tag {
        "b" | "strong" => Some(Annotations::BOLD),
        "i" | "em" => Some(Annotations::ITALIC),
        "u" | "ins" => Some(Annotations::UNDERLINE),
        _ => None,
    }
}

/// Collapses runs of HTML whitespace into single spaces
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C') {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn starts_with_whitespace(text: &str) -> bool {
    text.chars().next().is_some_and(char::is_whitespace)
}

fn ends_with_whitespace(text: &str) -> bool {
    text.chars().last().is_some_and(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(max_rich_text_length: usize, max_blocks: usize) -> BlockLimits {
        BlockLimits {
            max_rich_text_length,
            max_blocks,
        }
    }

    fn spans_of(block: &ContentBlock) -> &[RichSpan] {
        match block {
            ContentBlock::Paragraph { spans } => spans,
            ContentBlock::Image { .. } => panic!("expected a paragraph, got {:?}", block),
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(convert("", BlockLimits::default()).is_empty());
        assert!(convert("   \n ", BlockLimits::default()).is_empty());
    }

    #[test]
    fn test_bold_followed_by_text() {
        let blocks = convert("<p><b>hello</b> world</p>", BlockLimits::default());
        assert_eq!(blocks.len(), 1);
        let spans = spans_of(&blocks[0]);
        assert_eq!(
            spans,
            &[
                RichSpan::plain("hello").with_annotations(Annotations::BOLD),
                RichSpan::plain(" world"),
            ]
        );
    }

    #[test]
    fn test_nested_emphasis_accumulates() {
        let blocks = convert("<p><strong><em>both</em></strong></p>", BlockLimits::default());
        let spans = spans_of(&blocks[0]);
        assert_eq!(spans.len(), 1);
        assert!(spans[0].annotations.bold);
        assert!(spans[0].annotations.italic);
        assert!(!spans[0].annotations.underline);
    }

    #[test]
    fn test_link_between_words_gets_separators() {
        let blocks = convert(
            r#"<p>Read<a href="https://example.com/review">the review</a>now</p>"#,
            BlockLimits::default(),
        );
        let spans = spans_of(&blocks[0]);
        let texts: Vec<&str> = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Read", " ", "the review", " ", "now"]);
        assert_eq!(spans[2].link.as_deref(), Some("https://example.com/review"));
    }

    #[test]
    fn test_link_with_surrounding_spaces_adds_nothing() {
        let blocks = convert(
            r#"<p>Read <a href="https://example.com/">this</a> now</p>"#,
            BlockLimits::default(),
        );
        assert_eq!(blocks[0].plain_text(), "Read this now");
        assert_eq!(spans_of(&blocks[0]).len(), 3);
    }

    #[test]
    fn test_link_text_flattens_markup() {
        let blocks = convert(
            r#"<p><a href="https://example.com/">Big <i>news</i></a></p>"#,
            BlockLimits::default(),
        );
        let spans = spans_of(&blocks[0]);
        assert_eq!(spans, &[RichSpan::linked("Big news", "https://example.com/")]);
    }

    #[test]
    fn test_relative_link_without_base_is_plain_text() {
        let blocks = convert(r#"<p><a href="/x">rel</a></p>"#, BlockLimits::default());
        assert_eq!(spans_of(&blocks[0]), &[RichSpan::plain("rel")]);
    }

    #[test]
    fn test_relative_urls_resolve_against_base() {
        let converter = Converter::new(BlockLimits::default())
            .with_base_url(Url::parse("https://example.com/news/").unwrap());
        let blocks = converter.convert(r#"<p><a href="/x">rel</a></p><img src="pics/a.png">"#);
        assert_eq!(spans_of(&blocks[0])[0].link.as_deref(), Some("https://example.com/x"));
        assert_eq!(
            blocks[1],
            ContentBlock::Image {
                url: "https://example.com/news/pics/a.png".to_string()
            }
        );
    }

    #[test]
    fn test_image_keeps_document_position() {
        let blocks = convert(
            r#"<p>Before</p><div><img src="https://x/y.png"></div><p>After</p>"#,
            BlockLimits::default(),
        );
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].plain_text(), "Before");
        assert_eq!(
            blocks[1],
            ContentBlock::Image {
                url: "https://x/y.png".to_string()
            }
        );
        assert_eq!(blocks[2].plain_text(), "After");
    }

    #[test]
    fn test_image_inside_paragraph_splits_around_it() {
        let blocks = convert(
            r#"<p>left <img src="https://x/y.png"> right</p>"#,
            BlockLimits::default(),
        );
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].plain_text(), "left ");
        assert!(matches!(blocks[1], ContentBlock::Image { .. }));
        assert_eq!(blocks[2].plain_text(), " right");
    }

    #[test]
    fn test_image_lazy_load_fallback() {
        let blocks = convert(
            r#"<img src="data:image/gif;base64,R0lGOD" data-src="https://x/real.jpg"><img alt="no source">"#,
            BlockLimits::default(),
        );
        assert_eq!(
            blocks,
            vec![ContentBlock::Image {
                url: "https://x/real.jpg".to_string()
            }]
        );
    }

    #[test]
    fn test_image_link_keeps_image() {
        let blocks = convert(
            r#"<a href="https://x/full.jpg"><img src="https://x/thumb.jpg"></a>"#,
            BlockLimits::default(),
        );
        assert_eq!(
            blocks,
            vec![ContentBlock::Image {
                url: "https://x/thumb.jpg".to_string()
            }]
        );
    }

    #[test]
    fn test_captioned_image_link_keeps_image_and_text() {
        let blocks = convert(
            r#"<p><a href="https://x/full"><img src="https://x/y.png"> Read more</a></p>"#,
            BlockLimits::default(),
        );
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[0],
            ContentBlock::Image {
                url: "https://x/y.png".to_string()
            }
        );
        let spans = spans_of(&blocks[1]);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text.trim(), "Read more");
        assert_eq!(spans[0].link.as_deref(), Some("https://x/full"));
    }

    #[test]
    fn test_images_after_link_text_follow_it() {
        let blocks = convert(
            r#"<a href="https://x/gallery">Gallery <img src="https://x/1.png"><noscript><img src="https://x/lazy.png"></noscript><img src="https://x/2.png"></a>"#,
            BlockLimits::default(),
        );
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].plain_text().trim(), "Gallery");
        assert_eq!(
            &blocks[1..],
            &[
                ContentBlock::Image {
                    url: "https://x/1.png".to_string()
                },
                ContentBlock::Image {
                    url: "https://x/2.png".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_deeply_nested_markup_is_flattened() {
        let depth = 50_000;
        let html = format!(
            "<p>{}deep <b>text</b><img src=\"https://x/deep.png\">{}</p><p>after</p>",
            "<span>".repeat(depth),
            "</span>".repeat(depth)
        );
        let blocks = convert(&html, BlockLimits::default());
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].plain_text(), "deep text");
        assert_eq!(
            blocks[1],
            ContentBlock::Image {
                url: "https://x/deep.png".to_string()
            }
        );
        assert_eq!(blocks[2].plain_text(), "after");
    }

    #[test]
    fn test_nesting_below_depth_limit_keeps_structure() {
        let depth = MAX_DEPTH - 4;
        let html = format!(
            "{}<p><b>kept</b></p>{}",
            "<div>".repeat(depth),
            "</div>".repeat(depth)
        );
        let blocks = convert(&html, BlockLimits::default());
        assert_eq!(blocks.len(), 1);
        assert!(spans_of(&blocks[0])[0].annotations.bold);
    }

    #[test]
    fn test_transparent_containers_and_ignored_tags() {
        let blocks = convert(
            r#"<div><span>one</span> <span>two</span><script>var x = 1;</script><style>p{}</style></div>"#,
            BlockLimits::default(),
        );
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].plain_text(), "one two");
    }

    #[test]
    fn test_whitespace_between_paragraphs_is_dropped() {
        let blocks = convert(
            "<p>One</p>\n\n   <p>Two</p>\n<p>&nbsp;</p>",
            BlockLimits::default(),
        );
        let texts: Vec<String> = blocks.iter().map(ContentBlock::plain_text).collect();
        assert_eq!(texts, vec!["One", "Two"]);
    }

    #[test]
    fn test_whitespace_collapses() {
        let blocks = convert("<p>spread\n     over\tlines</p>", BlockLimits::default());
        assert_eq!(blocks[0].plain_text(), "spread over lines");
    }

    #[test]
    fn test_line_break_becomes_newline() {
        let blocks = convert("<p>one<br>two</p>", BlockLimits::default());
        assert_eq!(blocks[0].plain_text(), "one\ntwo");
    }

    #[test]
    fn test_long_paragraph_is_split_within_ceiling() {
        let html = "<p>aaaa<b>bbbb</b> cccc <i>dddd</i> eeee</p>";
        let blocks = convert(html, limits(6, 100));
        assert!(blocks.len() > 1);
        for block in &blocks {
            assert!(block.text_len() <= 6, "{:?} exceeds ceiling", block);
        }
        let rebuilt: String = blocks.iter().map(ContentBlock::plain_text).collect();
        assert_eq!(rebuilt, "aaaa bbbb cccc dddd eeee");
    }

    #[test]
    fn test_oversized_span_is_chunked() {
        let text = "é".repeat(25);
        let blocks = convert(&format!("<p><u>{}</u></p>", text), limits(10, 100));
        assert_eq!(blocks.len(), 3);
        assert_eq!(
            blocks.iter().map(ContentBlock::text_len).collect::<Vec<_>>(),
            vec![10, 10, 5]
        );
        for block in &blocks {
            assert!(spans_of(block).iter().all(|s| s.annotations.underline));
        }
        let rebuilt: String = blocks.iter().map(ContentBlock::plain_text).collect();
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_block_ceiling_drops_trailing_blocks() {
        let html: String = (0..10).map(|i| format!("<p>para {}</p>", i)).collect();
        let blocks = convert(&html, limits(2000, 4));
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].plain_text(), "para 0");
        assert_eq!(blocks[3].plain_text(), "para 3");
    }

    #[test]
    fn test_bounded_output_for_large_input() {
        let html: String = (0..500)
            .map(|i| format!("<p>{} <b>{}</b></p><img src=\"https://x/{}.png\">", "w".repeat(300), i, i))
            .collect();
        let blocks = convert(&html, limits(100, 50));
        assert_eq!(blocks.len(), 50);
        assert!(blocks.iter().all(|b| b.text_len() <= 100));
    }

    #[test]
    fn test_list_items_and_headings_are_paragraphs() {
        let blocks = convert(
            "<h2>Verdict</h2><ul><li>Great combat</li><li>Short campaign</li></ul>",
            BlockLimits::default(),
        );
        let texts: Vec<String> = blocks.iter().map(ContentBlock::plain_text).collect();
        assert_eq!(texts, vec!["Verdict", "Great combat", "Short campaign"]);
    }

    #[test]
    fn test_split_paragraph_keeps_order() {
        let spans = vec![
            RichSpan::plain("abc"),
            RichSpan::plain("de"),
            RichSpan::plain("fghij"),
            RichSpan::plain("k"),
        ];
        let blocks = split_paragraph(spans, 5);
        let texts: Vec<String> = blocks.iter().map(ContentBlock::plain_text).collect();
        assert_eq!(texts, vec!["abcde", "fghij", "k"]);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\n b  "), " a b ");
        assert_eq!(collapse_whitespace("a\u{a0}\u{a0}b"), "a\u{a0}\u{a0}b");
    }
}
