//! Trailer extraction: the declared totals printed after the transaction table.

use mutasi_core::StatementSummary;
use tracing::debug;

use crate::layout::Layout;
use crate::lines::Line;

/// Scan lines in document order (every page, header or not) for the trailer.
///
/// From the first summary-marker line on (the marker line included), the
/// first line carrying at least as many amounts as the layout has summary
/// keys supplies those keys, in order. The words line is kept verbatim.
pub(crate) fn extract_summary<'l, 'a: 'l>(
    lines: impl IntoIterator<Item = &'l Line<'a>>,
    layout: &Layout,
) -> StatementSummary {
    let mut summary = StatementSummary::default();
    let mut in_trailer = false;
    let mut have_values = false;

    for line in lines {
        let text = line.text();

        if !in_trailer {
            in_trailer = layout.is_summary_marker(&text);
            if !in_trailer {
                continue;
            }
        }

        if !have_values {
            let amounts: Vec<_> = line
                .tokens
                .iter()
                .filter_map(|t| layout.number_format.parse(&t.text))
                .collect();
            if !layout.summary_keys.is_empty() && amounts.len() >= layout.summary_keys.len() {
                for (key, value) in layout.summary_keys.iter().zip(amounts) {
                    summary.insert(key.clone(), value);
                }
                have_values = true;
                debug!(page = line.page, "summary values found");
                continue;
            }
        }

        if summary.balance_in_words.is_none()
            && layout
                .words_marker
                .as_deref()
                .is_some_and(|marker| text.contains(marker))
        {
            summary.balance_in_words = Some(text.trim().to_string());
        }
    }

    summary
}
