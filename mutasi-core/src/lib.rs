//! mutasi-core: statement data model, amount parsing and reconciliation.

pub mod amount;
pub mod reconcile;
pub mod statement;
pub mod token;

pub use amount::NumberFormat;
pub use reconcile::{BalanceBreak, Check, CheckOutcome, Reconciler, ReconciliationReport};
pub use statement::{
    MetadataField, ParseResult, StatementMetadata, StatementSummary, Transaction, summary_keys,
};
pub use token::{BoundingBox, Document, Page, Token};
