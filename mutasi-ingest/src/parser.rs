//! One generic statement parser driven by a [`Layout`].

use mutasi_core::{Document, ParseResult, Reconciler};
use tracing::debug;

use crate::columns::map_line;
use crate::error::{IngestError, IngestResult};
use crate::header::{table_lines, table_start};
use crate::layout::{Layout, Patterns};
use crate::layouts;
use crate::lines::{Line, group_lines};
use crate::metadata::extract_metadata;
use crate::segmenter::Segmenter;
use crate::summary::extract_summary;

#[derive(Debug, Clone)]
pub struct StatementParser {
    layout: Layout,
    patterns: Patterns,
}

impl StatementParser {
    /// Validate the layout and compile its patterns.
    pub fn new(layout: Layout) -> IngestResult<Self> {
        layout.validate()?;
        let patterns = Patterns::compile(&layout)?;
        Ok(Self { layout, patterns })
    }

    pub fn bri() -> IngestResult<Self> {
        Self::new(layouts::bri())
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn bank_name(&self) -> &str {
        &self.layout.bank_name
    }

    /// True when the first page mentions any of the layout's indicators.
    pub fn can_parse(&self, document: &Document) -> bool {
        let Some(first) = document.first_page() else {
            return false;
        };
        let text = first.text();
        self.layout
            .indicators
            .iter()
            .any(|indicator| text.contains(indicator.as_str()))
    }

    /// Parse a tokenized document.
    ///
    /// Pages are segmented as one continuous row stream, so a transaction
    /// that wraps across a page break stays whole. Errors only when the
    /// document has no tokens or no page carries this layout's table.
    pub fn parse(&self, document: &Document) -> IngestResult<ParseResult> {
        if document.token_count() == 0 {
            return Err(IngestError::NoTokens);
        }

        let layout = &self.layout;
        let pages: Vec<Vec<Line<'_>>> = document
            .pages
            .iter()
            .map(|p| group_lines(p, layout.line_tolerance))
            .collect();

        let mut metadata = pages
            .first()
            .map(|lines| extract_metadata(lines, layout, &self.patterns))
            .unwrap_or_default();
        metadata.bank_name = Some(layout.bank_name.clone());

        let mut segmenter = Segmenter::new(layout, &self.patterns);
        let mut table_pages = 0usize;

        for (page, lines) in document.pages.iter().zip(&pages) {
            if segmenter.is_done() {
                break;
            }
            let Some(start) = table_start(lines, layout) else {
                debug!(page = page.index, "no table on page");
                continue;
            };
            table_pages += 1;

            let rows = table_lines(lines, start);
            debug!(page = page.index, rows = rows.len(), start, "table rows");
            for line in rows {
                segmenter.feed(&map_line(line, &layout.bands));
                if segmenter.is_done() {
                    break;
                }
            }
        }

        if table_pages == 0 {
            return Err(IngestError::LayoutMismatch {
                bank: layout.bank_name.clone(),
            });
        }

        let segmentation = segmenter.finish();
        let summary = extract_summary(pages.iter().flatten(), layout);
        let reconciliation = Reconciler::new(layout.reconcile_tolerance.clone())
            .reconcile(&segmentation.transactions, &summary);

        debug!(
            bank = %layout.bank_name,
            pages = document.pages.len(),
            table_pages,
            transactions = segmentation.transactions.len(),
            reached_summary = segmentation.reached_summary,
            reconciled = reconciliation.is_reconciled(),
            "statement parsed"
        );

        Ok(ParseResult {
            metadata,
            transactions: segmentation.transactions,
            summary,
            reconciliation,
        })
    }
}
