//! CSV export of a parsed statement: one metadata file, one transaction file.
//!
//! Dates are ISO-8601. An unknown balance is an empty cell, never `0`.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveTime};
use mutasi_core::{ParseResult, StatementMetadata, Transaction};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

pub const TRANSACTION_COLUMNS: [&str; 7] = [
    "Transaction Date",
    "Transaction Time",
    "Description",
    "Teller/User ID",
    "Debit",
    "Credit",
    "Balance",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("creating {}: {source}", path.display())]
    Create { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Serialize)]
struct TransactionRow<'a> {
    date: NaiveDate,
    time: Option<NaiveTime>,
    description: &'a str,
    teller: Option<&'a str>,
    debit: &'a BigDecimal,
    credit: &'a BigDecimal,
    balance: Option<&'a BigDecimal>,
}

impl<'a> From<&'a Transaction> for TransactionRow<'a> {
    fn from(t: &'a Transaction) -> Self {
        Self {
            date: t.date,
            time: t.time,
            description: &t.description,
            teller: t.teller.as_deref(),
            debit: &t.debit,
            credit: &t.credit,
            balance: t.balance.as_ref(),
        }
    }
}

/// Header row plus one value row, in [`StatementMetadata::to_pairs`] order.
pub fn write_metadata<W: io::Write>(metadata: &StatementMetadata, writer: W) -> Result<(), ExportError> {
    let pairs = metadata.to_pairs();
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(pairs.iter().map(|(label, _)| *label))?;
    wtr.write_record(pairs.iter().map(|(_, value)| value.as_deref().unwrap_or("")))?;
    wtr.flush()?;
    Ok(())
}

/// Transaction table in document order. The header is written even when
/// there are no rows.
pub fn write_transactions<W: io::Write>(
    transactions: &[Transaction],
    writer: W,
) -> Result<(), ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(TRANSACTION_COLUMNS)?;
    for txn in transactions {
        wtr.serialize(TransactionRow::from(txn))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_to_csv(
    result: &ParseResult,
    metadata_path: impl AsRef<Path>,
    transactions_path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    let metadata_path = metadata_path.as_ref();
    let transactions_path = transactions_path.as_ref();

    write_metadata(&result.metadata, create(metadata_path)?)?;
    write_transactions(&result.transactions, create(transactions_path)?)?;

    debug!(
        metadata = %metadata_path.display(),
        transactions = %transactions_path.display(),
        rows = result.transactions.len(),
        "csv export written"
    );
    Ok(())
}

fn create(path: &Path) -> Result<File, ExportError> {
    File::create(path).map_err(|source| ExportError::Create {
        path: path.to_path_buf(),
        source,
    })
}
