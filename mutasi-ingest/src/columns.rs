//! Column mapper: assigns a line's tokens to the layout's field bands.
//!
//! No interpretation happens here (no date or amount parsing); the output is
//! the raw text per column for the segmenter.

use std::collections::BTreeMap;

use tracing::trace;

use crate::layout::{FieldBand, FieldKind};
use crate::lines::Line;

/// Per-line text of each column, plus the full line text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFields {
    pub page: usize,
    pub y: f64,
    /// Every token on the line, including those outside all bands.
    pub text: String,
    fields: BTreeMap<FieldKind, String>,
}

impl RawFields {
    /// Column text, empty when nothing landed in the band.
    pub fn get(&self, kind: FieldKind) -> &str {
        self.fields.get(&kind).map(String::as_str).unwrap_or("")
    }

    pub fn is_blank(&self, kind: FieldKind) -> bool {
        self.get(kind).trim().is_empty()
    }

    pub fn set(&mut self, kind: FieldKind, text: impl Into<String>) {
        self.fields.insert(kind, text.into());
    }
}

/// Map one line onto the bands. A token belongs to the first band whose
/// interval holds its left edge; tokens in no band are dropped as page furniture.
pub fn map_line(line: &Line<'_>, bands: &[FieldBand]) -> RawFields {
    let mut raw = RawFields {
        page: line.page,
        y: line.y,
        text: line.text(),
        fields: BTreeMap::new(),
    };

    for token in &line.tokens {
        match bands.iter().find(|b| b.contains(token.x())) {
            Some(band) => {
                let cell = raw.fields.entry(band.kind).or_default();
                if !cell.is_empty() {
                    cell.push(' ');
                }
                cell.push_str(&token.text);
            }
            None => trace!(text = %token.text, x = token.x(), "token outside all bands"),
        }
    }

    raw
}
