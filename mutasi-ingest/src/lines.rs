//! Token grouper: clusters a page's tokens into text lines by vertical position.

use mutasi_core::{Page, Token};

/// Tokens sharing a vertical band, left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Line<'a> {
    pub page: usize,
    /// Top edge of the line's first token; the reference the band is measured from.
    pub y: f64,
    pub tokens: Vec<&'a Token>,
}

impl Line<'_> {
    /// Token texts joined by a single space.
    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Group one page's tokens into lines, top to bottom.
///
/// A token joins the current line while its top edge is within `tolerance`
/// of the line's reference position; a gap of exactly `tolerance` still
/// belongs to the earlier line. An empty page gives no lines.
pub fn group_lines(page: &Page, tolerance: f64) -> Vec<Line<'_>> {
    let mut sorted: Vec<&Token> = page.tokens.iter().collect();
    sorted.sort_by(|a, b| a.y().total_cmp(&b.y()).then(a.x().total_cmp(&b.x())));

    let mut lines: Vec<Line<'_>> = Vec::new();
    for token in sorted {
        match lines.last_mut() {
            Some(line) if token.y() - line.y <= tolerance => line.tokens.push(token),
            _ => lines.push(Line {
                page: page.index,
                y: token.y(),
                tokens: vec![token],
            }),
        }
    }

    for line in &mut lines {
        line.tokens.sort_by(|a, b| a.x().total_cmp(&b.x()));
    }

    lines
}
