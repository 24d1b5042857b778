//! mutasi-ingest: layout-driven parsing of tokenized bank statements.
//!
//! Pipeline per document: group tokens into lines, find the table header,
//! map columns, segment rows into transactions, then read the header
//! metadata and trailer totals and reconcile.

pub mod columns;
pub mod error;
pub mod header;
pub mod layout;
pub mod layouts;
pub mod lines;
mod metadata;
pub mod parser;
pub mod registry;
pub mod segmenter;
mod summary;

pub use error::{IngestError, IngestResult};
pub use layout::{FieldBand, FieldKind, Layout, MetadataLabel};
pub use parser::StatementParser;
pub use registry::LayoutRegistry;
