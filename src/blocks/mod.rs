//! Content blocks for the destination document format
//!
//! Article bodies are converted into an ordered list of [`ContentBlock`]s:
//! paragraphs made of annotated [`RichSpan`]s, and images. The converter
//! enforces the destination's per-block text ceiling and per-document block
//! ceiling, so output size is bounded no matter how large the input is.

mod converter;

pub use converter::{convert, Converter};

use crate::config::LimitsConfig;
use serde::{Deserialize, Serialize};

/// Formatting flags carried by a span
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl Annotations {
    pub const BOLD: Self = Self {
        bold: true,
        italic: false,
        underline: false,
    };

    pub const ITALIC: Self = Self {
        bold: false,
        italic: true,
        underline: false,
    };

    pub const UNDERLINE: Self = Self {
        bold: false,
        italic: false,
        underline: true,
    };

    pub fn is_plain(&self) -> bool {
        !(self.bold || self.italic || self.underline)
    }

    /// Union of two flag sets
    pub fn merge(self, other: Self) -> Self {
        Self {
            bold: self.bold || other.bold,
            italic: self.italic || other.italic,
            underline: self.underline || other.underline,
        }
    }
}

/// One run of text inside a paragraph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichSpan {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Annotations::is_plain")]
    pub annotations: Annotations,
}

impl RichSpan {
    /// Unannotated text
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: None,
            annotations: Annotations::default(),
        }
    }

    /// Text pointing at a URL
    pub fn linked(text: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: Some(link.into()),
            annotations: Annotations::default(),
        }
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = self.annotations.merge(annotations);
        self
    }

    /// Length as counted against the rich-text ceiling
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// One unit of the destination document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Paragraph { spans: Vec<RichSpan> },
    Image { url: String },
}

impl ContentBlock {
    /// Total span text length of a paragraph; zero for images
    pub fn text_len(&self) -> usize {
        match self {
            Self::Paragraph { spans } => spans.iter().map(RichSpan::len).sum(),
            Self::Image { .. } => 0,
        }
    }

    /// Concatenated span text of a paragraph
    pub fn plain_text(&self) -> String {
        match self {
            Self::Paragraph { spans } => spans.iter().map(|s| s.text.as_str()).collect(),
            Self::Image { .. } => String::new(),
        }
    }
}

/// Output ceilings applied during conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLimits {
    /// Maximum characters across the spans of one paragraph block
    pub max_rich_text_length: usize,
    /// Maximum blocks per converted document
    pub max_blocks: usize,
}

impl Default for BlockLimits {
    fn default() -> Self {
        LimitsConfig::default().into()
    }
}

impl From<LimitsConfig> for BlockLimits {
    fn from(limits: LimitsConfig) -> Self {
        Self {
            max_rich_text_length: limits.max_rich_text_length.max(1),
            max_blocks: limits.max_blocks,
        }
    }
}
