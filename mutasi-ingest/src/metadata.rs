//! Metadata extractor: label/value pairs from the statement's first page.
//!
//! Labels are matched as whole token sequences, longest label first, so
//! `Alamat Unit Kerja` never reads as `Unit Kerja`. A value runs from the
//! label (past any `:` separator) to the next label on the same line. A label
//! with nothing after it takes its value from the next line, reading tokens
//! that start at or right of the label's left edge.

use chrono::NaiveDate;
use mutasi_core::{MetadataField, StatementMetadata, Token};
use tracing::{debug, trace};

use crate::layout::{Layout, MetadataLabel, Patterns};
use crate::lines::Line;

/// A label found on a line: token span `[start, end)`.
#[derive(Debug, Clone, Copy)]
struct Hit {
    field: MetadataField,
    start: usize,
    end: usize,
    x: f64,
}

pub(crate) fn extract_metadata(
    lines: &[Line<'_>],
    layout: &Layout,
    patterns: &Patterns,
) -> StatementMetadata {
    let mut labels: Vec<(&MetadataLabel, Vec<&str>)> = layout
        .metadata_labels
        .iter()
        .map(|l| (l, l.label.split_whitespace().collect::<Vec<_>>()))
        .filter(|(_, words)| !words.is_empty())
        .collect();
    labels.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    let hits: Vec<Vec<Hit>> = lines.iter().map(|l| find_labels(l, &labels)).collect();

    let mut meta = StatementMetadata {
        bank_name: Some(layout.bank_name.clone()),
        ..Default::default()
    };
    let mut seen: Vec<MetadataField> = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        for (k, hit) in hits[i].iter().enumerate() {
            if seen.contains(&hit.field) {
                continue;
            }

            let next = hits[i].get(k + 1);
            let own_end = next.map(|n| n.start).unwrap_or(line.tokens.len());
            let mut value = value_text(&line.tokens[hit.end..own_end]);

            if value.is_empty() {
                if let (Some(below), Some(below_hits)) = (lines.get(i + 1), hits.get(i + 1)) {
                    value = value_below(hit, next.map(|n| n.x), below, below_hits);
                }
            }

            if value.is_empty() {
                trace!(field = ?hit.field, "label without value");
                continue;
            }

            if assign(&mut meta, hit.field, &value, patterns) {
                seen.push(hit.field);
            } else {
                debug!(field = ?hit.field, %value, "unparsable metadata value");
            }
        }
    }

    debug!(bank = %layout.bank_name, fields = seen.len(), "metadata extracted");
    meta
}

fn find_labels(line: &Line<'_>, labels: &[(&MetadataLabel, Vec<&str>)]) -> Vec<Hit> {
    let mut hits = Vec::new();
    let mut i = 0;

    while i < line.tokens.len() {
        let matched = labels.iter().find(|(_, words)| {
            words.len() <= line.tokens.len() - i
                && words
                    .iter()
                    .zip(&line.tokens[i..])
                    .all(|(w, t)| label_word(&t.text) == *w)
        });

        match matched {
            Some((label, words)) => {
                hits.push(Hit {
                    field: label.field,
                    start: i,
                    end: i + words.len(),
                    x: line.tokens[i].x(),
                });
                i += words.len();
            }
            None => i += 1,
        }
    }

    hits
}

/// Token text as it would appear in a label: `Laporan:` reads as `Laporan`.
fn label_word(text: &str) -> &str {
    text.trim().trim_end_matches(':')
}

fn value_text(tokens: &[&Token]) -> String {
    let words: Vec<&str> = tokens
        .iter()
        .map(|t| t.text.trim().trim_start_matches(':').trim())
        .filter(|s| !s.is_empty())
        .collect();
    words.join(" ")
}

fn value_below(hit: &Hit, right_bound: Option<f64>, below: &Line<'_>, below_hits: &[Hit]) -> String {
    let stop = below_hits
        .iter()
        .map(|h| h.x)
        .filter(|x| *x >= hit.x)
        .chain(right_bound)
        .fold(f64::INFINITY, f64::min);

    let tokens: Vec<&Token> = below
        .tokens
        .iter()
        .copied()
        .filter(|t| t.x() >= hit.x && t.x() < stop)
        .collect();
    value_text(&tokens)
}

/// Fill `field` from `value`. False when a date field did not parse.
fn assign(meta: &mut StatementMetadata, field: MetadataField, value: &str, patterns: &Patterns) -> bool {
    let text = || Some(value.to_string());
    match field {
        MetadataField::StatementDate => {
            meta.statement_date = first_date(value, patterns);
            return meta.statement_date.is_some();
        }
        MetadataField::TransactionPeriod => {
            let (start, end) = period(value, patterns);
            meta.transaction_period_start = start;
            meta.transaction_period_end = end;
            return start.is_some();
        }
        MetadataField::AccountNumber => meta.account_number = text(),
        MetadataField::ProductName => meta.product_name = text(),
        MetadataField::Currency => meta.currency = text(),
        MetadataField::BusinessUnit => meta.business_unit = text(),
        MetadataField::BusinessUnitAddress => meta.business_unit_address = text(),
        MetadataField::RecipientName => meta.recipient_name = text(),
        MetadataField::RecipientAddress => meta.recipient_address = text(),
    }
    true
}

fn first_date(value: &str, patterns: &Patterns) -> Option<NaiveDate> {
    value.split_whitespace().find_map(|w| patterns.parse_date(w))
}

/// `01/05/25 - 31/05/25`, also written without spaces around the dash.
fn period(value: &str, patterns: &Patterns) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let mut dates: Vec<NaiveDate> = value
        .split_whitespace()
        .filter_map(|w| patterns.parse_date(w))
        .collect();

    if dates.len() < 2 {
        if let Some((a, b)) = value.trim().split_once('-') {
            if let (Some(a), Some(b)) = (patterns.parse_date(a), patterns.parse_date(b)) {
                dates = vec![a, b];
            }
        }
    }

    match dates.as_slice() {
        [] => (None, None),
        [only] => (Some(*only), None),
        [first, .., last] => (Some(*first), Some(*last)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layouts;
    use crate::lines::group_lines;
    use mutasi_core::{BoundingBox, Page};

    fn tok(text: &str, x0: f64, y0: f64) -> Token {
        Token::new(text, BoundingBox::new(x0, x0 + 20.0, y0, y0 + 8.0), 0)
    }

    /// Words laid out left to right from `x0`, 25pt apart.
    fn words(text: &str, x0: f64, y0: f64) -> Vec<Token> {
        text.split_whitespace()
            .enumerate()
            .map(|(i, w)| tok(w, x0 + 25.0 * i as f64, y0))
            .collect()
    }

    fn extract(tokens: Vec<Token>) -> StatementMetadata {
        let layout = layouts::bri();
        let patterns = Patterns::compile(&layout).unwrap();
        let page = Page::new(0, tokens);
        let lines = group_lines(&page, layout.line_tolerance);
        extract_metadata(&lines, &layout, &patterns)
    }

    #[test]
    fn test_side_by_side_labels() {
        let mut tokens = words("Tanggal Laporan : 03/06/25", 10.0, 20.0);
        tokens.extend(words("No. Rekening : 0123-01-000000-50-1", 350.0, 20.0));
        tokens.extend(words("Periode Transaksi : 01/05/25 - 31/05/25", 10.0, 35.0));
        tokens.extend(words("Nama Produk : Britama-IDR", 350.0, 35.0));
        tokens.extend(words("Valuta : IDR", 350.0, 50.0));

        let meta = extract(tokens);
        assert_eq!(meta.statement_date, NaiveDate::from_ymd_opt(2025, 6, 3));
        assert_eq!(meta.transaction_period_start, NaiveDate::from_ymd_opt(2025, 5, 1));
        assert_eq!(meta.transaction_period_end, NaiveDate::from_ymd_opt(2025, 5, 31));
        assert_eq!(meta.account_number.as_deref(), Some("0123-01-000000-50-1"));
        assert_eq!(meta.product_name.as_deref(), Some("Britama-IDR"));
        assert_eq!(meta.currency.as_deref(), Some("IDR"));
        assert_eq!(meta.bank_name.as_deref(), Some("BRI"));
        assert_eq!(meta.business_unit, None);
    }

    #[test]
    fn test_longest_label_wins() {
        let mut tokens = words("Unit Kerja : KCP SUCI", 10.0, 20.0);
        tokens.extend(words("Alamat Unit Kerja : JL. SUCI NO. 1", 10.0, 35.0));
        let meta = extract(tokens);
        assert_eq!(meta.business_unit.as_deref(), Some("KCP SUCI"));
        assert_eq!(meta.business_unit_address.as_deref(), Some("JL. SUCI NO. 1"));
    }

    #[test]
    fn test_colon_attached_to_label() {
        let meta = extract(words("Valuta: IDR", 10.0, 20.0));
        assert_eq!(meta.currency.as_deref(), Some("IDR"));
    }

    #[test]
    fn test_value_on_next_line() {
        let mut tokens = words("Kepada Yth.", 10.0, 20.0);
        tokens.extend(words("BUDI SANTOSO", 10.0, 35.0));
        tokens.push(tok("noise", 2.0, 35.0));
        let meta = extract(tokens);
        assert_eq!(meta.recipient_name.as_deref(), Some("BUDI SANTOSO"));
    }

    #[test]
    fn test_unparsable_date_left_absent() {
        let meta = extract(words("Tanggal Laporan : 2025-06-03", 10.0, 20.0));
        assert_eq!(meta.statement_date, None);
    }

    #[test]
    fn test_unparsable_date_does_not_shadow_later_label() {
        let mut tokens = words("Tanggal Laporan : 2025-06-03", 10.0, 20.0);
        tokens.extend(words("Tanggal Laporan : 03/06/25", 10.0, 300.0));
        let meta = extract(tokens);
        assert_eq!(meta.statement_date, NaiveDate::from_ymd_opt(2025, 6, 3));
    }

    #[test]
    fn test_period_without_spaces() {
        let meta = extract(words("Periode Transaksi : 01/05/25-31/05/25", 10.0, 20.0));
        assert_eq!(meta.transaction_period_start, NaiveDate::from_ymd_opt(2025, 5, 1));
        assert_eq!(meta.transaction_period_end, NaiveDate::from_ymd_opt(2025, 5, 31));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let mut tokens = words("Valuta : IDR", 10.0, 20.0);
        tokens.extend(words("Valuta : USD", 10.0, 300.0));
        assert_eq!(extract(tokens).currency.as_deref(), Some("IDR"));
    }

    #[test]
    fn test_empty_page_gives_only_bank_name() {
        let meta = extract(Vec::new());
        assert_eq!(
            meta,
            StatementMetadata {
                bank_name: Some("BRI".to_string()),
                ..Default::default()
            }
        );
    }
}
