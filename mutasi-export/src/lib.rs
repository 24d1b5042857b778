//! mutasi-export: writes parsed statements out as CSV.

pub mod csv_export;

pub use csv_export::{ExportError, TRANSACTION_COLUMNS, export_to_csv, write_metadata, write_transactions};
