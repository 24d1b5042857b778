//! Header locator: finds where the transaction table starts on a page.

use tracing::trace;

use crate::layout::{FieldKind, Layout};
use crate::lines::Line;

/// Vertical position of the table header row: the first line carrying the
/// layout's header label inside the date column's band. Lines holding a
/// metadata label (`Tanggal Laporan`) are not the header even when they
/// start with the same word.
pub fn locate_header(lines: &[Line<'_>], layout: &Layout) -> Option<f64> {
    let date_band = layout.band(FieldKind::Date)?;

    lines.iter().filter(|line| !is_metadata_line(line, layout)).find_map(|line| {
        line.tokens
            .iter()
            .find(|t| t.text.trim() == layout.header_label && date_band.contains(t.x()))
            .map(|t| t.y())
    })
}

fn is_metadata_line(line: &Line<'_>, layout: &Layout) -> bool {
    let text = line.text();
    layout
        .metadata_labels
        .iter()
        .any(|l| text.contains(l.label.as_str()))
}

/// First vertical position holding table rows, or `None` when the page has no table.
///
/// Falls back to the layout's fixed offset, if it has one, when the header is
/// missing.
pub fn table_start(lines: &[Line<'_>], layout: &Layout) -> Option<f64> {
    match locate_header(lines, layout) {
        Some(y) => Some(y + layout.header_margin),
        None => {
            trace!(bank = %layout.bank_name, "table header not found");
            layout.fallback_table_start
        }
    }
}

/// Lines at or below the table start.
pub fn table_lines<'l, 'a>(lines: &'l [Line<'a>], start: f64) -> &'l [Line<'a>] {
    let first = lines.partition_point(|l| l.y < start);
    &lines[first..]
}
