//! Declarative description of one bank's statement layout.
//!
//! A new bank format is a new `Layout` value (built in Rust or read from
//! TOML), not new parsing code. Column positions are fixed per layout and
//! never inferred from the document.

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveTime};
use mutasi_core::{MetadataField, NumberFormat, summary_keys};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{IngestError, IngestResult};

/// Vertical distance (points) within which tokens share a line.
pub const DEFAULT_LINE_TOLERANCE: f64 = 5.0;
/// Gap between the header label's top edge and the first table row.
pub const DEFAULT_HEADER_MARGIN: f64 = 15.0;
pub const DEFAULT_TIME_PATTERN: &str = r"\d{1,2}:\d{2}(?::\d{2})?";
pub const DEFAULT_DESCRIPTION_SEPARATOR: &str = " ";

/// Semantic column of the transaction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Date,
    Time,
    Description,
    Teller,
    Debit,
    Credit,
    Balance,
}

/// Half-open horizontal interval `[x_start, x_end)` mapped to a column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldBand {
    pub kind: FieldKind,
    pub x_start: f64,
    pub x_end: f64,
}

impl FieldBand {
    pub fn new(kind: FieldKind, x_start: f64, x_end: f64) -> Self {
        Self {
            kind,
            x_start,
            x_end,
        }
    }

    pub fn contains(&self, x: f64) -> bool {
        self.x_start <= x && x < self.x_end
    }

    /// Build consecutive bands from `n + 1` boundaries and `n` kinds.
    ///
    /// `[0, 105, 290]` with `[Date, Description]` gives `[0,105)` and `[105,290)`.
    pub fn from_boundaries(boundaries: &[f64], kinds: &[FieldKind]) -> Vec<FieldBand> {
        boundaries
            .windows(2)
            .zip(kinds)
            .map(|(w, kind)| FieldBand::new(*kind, w[0], w[1]))
            .collect()
    }
}

/// A header label recognised by the metadata extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataLabel {
    pub field: MetadataField,
    pub label: String,
}

impl MetadataLabel {
    pub fn new(field: MetadataField, label: impl Into<String>) -> Self {
        Self {
            field,
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub bank_name: String,
    /// Strings whose presence on page one identifies this layout.
    #[serde(default)]
    pub indicators: Vec<String>,

    /// Text of the date column's header cell.
    pub header_label: String,
    #[serde(default = "default_header_margin")]
    pub header_margin: f64,
    /// Table start used on pages where the header is missing. `None` means
    /// such pages carry no table rows.
    #[serde(default)]
    pub fallback_table_start: Option<f64>,
    #[serde(default = "default_line_tolerance")]
    pub line_tolerance: f64,

    /// Ordered, non-overlapping columns. Must include a `Date` band.
    pub bands: Vec<FieldBand>,
    /// Columns whose text is folded into the description on continuation rows.
    #[serde(default = "default_continuation_fields")]
    pub continuation_fields: Vec<FieldKind>,
    #[serde(default = "default_description_separator")]
    pub description_separator: String,

    /// Regex a date cell must match in full, e.g. `\d{2}/\d{2}/\d{2}`.
    pub date_pattern: String,
    /// chrono format the matched date must also parse with, e.g. `%d/%m/%y`.
    pub date_format: String,
    #[serde(default = "default_time_pattern")]
    pub time_pattern: String,
    #[serde(default)]
    pub number_format: NumberFormat,

    /// Line text that ends the transaction table and opens the trailer. The
    /// trailer's values may sit on the marker line itself or on a later line.
    #[serde(default)]
    pub summary_markers: Vec<String>,
    /// Keys assigned, in order, to the amounts of the trailer's value row.
    #[serde(default = "default_summary_keys")]
    pub summary_keys: Vec<String>,
    #[serde(default)]
    pub words_marker: Option<String>,

    #[serde(default)]
    pub metadata_labels: Vec<MetadataLabel>,

    #[serde(default)]
    pub reconcile_tolerance: BigDecimal,
}

fn default_header_margin() -> f64 {
    DEFAULT_HEADER_MARGIN
}

fn default_line_tolerance() -> f64 {
    DEFAULT_LINE_TOLERANCE
}

fn default_time_pattern() -> String {
    DEFAULT_TIME_PATTERN.to_string()
}

fn default_description_separator() -> String {
    DEFAULT_DESCRIPTION_SEPARATOR.to_string()
}

fn default_continuation_fields() -> Vec<FieldKind> {
    vec![FieldKind::Description]
}

fn default_summary_keys() -> Vec<String> {
    [
        summary_keys::OPENING_BALANCE,
        summary_keys::TOTAL_DEBIT,
        summary_keys::TOTAL_CREDIT,
        summary_keys::CLOSING_BALANCE,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Layout {
    pub fn band(&self, kind: FieldKind) -> Option<&FieldBand> {
        self.bands.iter().find(|b| b.kind == kind)
    }

    pub fn has_band(&self, kind: FieldKind) -> bool {
        self.band(kind).is_some()
    }

    /// Structural checks that don't need regex compilation.
    pub fn validate(&self) -> IngestResult<()> {
        let invalid = |reason: String| Err(IngestError::InvalidLayout { reason });

        if self.bank_name.trim().is_empty() {
            return invalid("bank_name is empty".to_string());
        }
        if self.header_label.trim().is_empty() {
            return invalid(format!("{}: header_label is empty", self.bank_name));
        }
        if !self.has_band(FieldKind::Date) {
            return invalid(format!("{}: no date band", self.bank_name));
        }
        if !(self.line_tolerance >= 0.0) {
            return invalid(format!("{}: negative line_tolerance", self.bank_name));
        }
        for band in &self.bands {
            if !(band.x_start < band.x_end) {
                return invalid(format!(
                    "{}: empty band {:?} [{}, {})",
                    self.bank_name, band.kind, band.x_start, band.x_end
                ));
            }
        }
        for pair in self.bands.windows(2) {
            if pair[1].x_start < pair[0].x_end {
                return invalid(format!(
                    "{}: bands {:?} and {:?} overlap",
                    self.bank_name, pair[0].kind, pair[1].kind
                ));
            }
        }
        Ok(())
    }

    /// True when `text` contains one of the layout's summary markers.
    pub fn is_summary_marker(&self, text: &str) -> bool {
        self.summary_markers.iter().any(|m| text.contains(m.as_str()))
    }
}

/// Layout regexes compiled once per parser.
#[derive(Debug, Clone)]
pub(crate) struct Patterns {
    date: Regex,
    time: Regex,
    date_format: String,
}

impl Patterns {
    pub(crate) fn compile(layout: &Layout) -> IngestResult<Self> {
        let anchored = |name: &str, pattern: &str| {
            Regex::new(&format!("^(?:{pattern})$")).map_err(|e| IngestError::InvalidLayout {
                reason: format!("{}: bad {name} pattern: {e}", layout.bank_name),
            })
        };

        Ok(Self {
            date: anchored("date", &layout.date_pattern)?,
            time: anchored("time", &layout.time_pattern)?,
            date_format: layout.date_format.clone(),
        })
    }

    /// Strict date: the whole token matches the pattern and is a real calendar date.
    pub(crate) fn parse_date(&self, s: &str) -> Option<NaiveDate> {
        let s = s.trim();
        if !self.date.is_match(s) {
            return None;
        }
        NaiveDate::parse_from_str(s, &self.date_format).ok()
    }

    pub(crate) fn parse_time(&self, s: &str) -> Option<NaiveTime> {
        let s = s.trim();
        if !self.time.is_match(s) {
            return None;
        }
        NaiveTime::parse_from_str(s, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
            .ok()
    }
}
