//! Positioned text tokens, as handed over by the text-extraction collaborator.
//!
//! The core never touches document bytes: a `Document` is an ordered list of
//! pages, each an unordered bag of tokens with a bounding box in page
//! coordinates (origin top-left, y grows downward).

use serde::{Deserialize, Serialize};

/// Axis-aligned box in page coordinates. `y0` is the top edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

impl BoundingBox {
    pub fn new(x0: f64, x1: f64, y0: f64, y1: f64) -> Self {
        Self { x0, x1, y0, y1 }
    }
}

/// A single extracted word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub bbox: BoundingBox,
    /// Zero-based page index.
    #[serde(default)]
    pub page: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, bbox: BoundingBox, page: usize) -> Self {
        Self {
            text: text.into(),
            bbox,
            page,
        }
    }

    /// Horizontal position used for column assignment (left edge).
    pub fn x(&self) -> f64 {
        self.bbox.x0
    }

    /// Vertical position used for line grouping (top edge).
    pub fn y(&self) -> f64 {
        self.bbox.y0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default)]
    pub tokens: Vec<Token>,
}

impl Page {
    pub fn new(index: usize, tokens: Vec<Token>) -> Self {
        Self {
            index,
            width: None,
            height: None,
            tokens,
        }
    }

    /// All token texts joined by a space, in extraction order.
    ///
    /// Good enough for "does this page mention X" probes; not a reading-order
    /// rendition of the page.
    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Whole document, pages in print order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub pages: Vec<Page>,
}

impl Document {
    pub fn new(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    /// Build a document from per-page token lists, assigning page indexes in order.
    pub fn from_page_tokens(pages: Vec<Vec<Token>>) -> Self {
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(index, tokens)| Page::new(index, tokens))
            .collect();
        Self { pages }
    }

    pub fn first_page(&self) -> Option<&Page> {
        self.pages.first()
    }

    pub fn token_count(&self) -> usize {
        self.pages.iter().map(|p| p.tokens.len()).sum()
    }

    /// True when extraction produced no tokens at all (encrypted, image-only, ...).
    pub fn is_empty(&self) -> bool {
        self.token_count() == 0
    }
}
