//! Layout registry: picks the parser for a document.

use mutasi_core::{Document, ParseResult};
use tracing::{debug, info};

use crate::error::{IngestError, IngestResult};
use crate::layout::Layout;
use crate::layouts;
use crate::parser::StatementParser;

#[derive(Debug, Clone, Default)]
pub struct LayoutRegistry {
    parsers: Vec<StatementParser>,
}

impl LayoutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every layout shipped with the crate.
    pub fn with_builtin() -> IngestResult<Self> {
        let mut registry = Self::new();
        for layout in layouts::builtin() {
            registry.register(layout)?;
        }
        Ok(registry)
    }

    /// Add a layout, replacing any layout with the same bank name.
    pub fn register(&mut self, layout: Layout) -> IngestResult<()> {
        let parser = StatementParser::new(layout)?;
        match self
            .parsers
            .iter_mut()
            .find(|p| p.bank_name().eq_ignore_ascii_case(parser.bank_name()))
        {
            Some(slot) => {
                info!(bank = %parser.bank_name(), "replacing layout");
                *slot = parser;
            }
            None => self.parsers.push(parser),
        }
        Ok(())
    }

    pub fn get(&self, bank: &str) -> Option<&StatementParser> {
        self.parsers
            .iter()
            .find(|p| p.bank_name().eq_ignore_ascii_case(bank))
    }

    /// First registered parser that recognises the document.
    pub fn detect(&self, document: &Document) -> Option<&StatementParser> {
        let found = self.parsers.iter().find(|p| p.can_parse(document));
        debug!(bank = found.map(|p| p.bank_name()), "layout detection");
        found
    }

    pub fn parse(&self, document: &Document) -> IngestResult<ParseResult> {
        if document.token_count() == 0 {
            return Err(IngestError::NoTokens);
        }
        self.detect(document)
            .ok_or(IngestError::NoMatchingLayout)?
            .parse(document)
    }

    pub fn supported_banks(&self) -> Vec<&str> {
        self.parsers.iter().map(|p| p.bank_name()).collect()
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}
