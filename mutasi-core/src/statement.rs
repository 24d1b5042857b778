//! Statement data model: header metadata, ledger rows, declared totals.

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::reconcile::ReconciliationReport;

/// Keys of the declared totals printed in a statement trailer.
pub mod summary_keys {
    pub const OPENING_BALANCE: &str = "Opening Balance";
    pub const TOTAL_DEBIT: &str = "Total Debit";
    pub const TOTAL_CREDIT: &str = "Total Credit";
    pub const CLOSING_BALANCE: &str = "Closing Balance";
}

/// Header fields a layout knows how to find on the first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataField {
    StatementDate,
    /// Holds both ends of the period, e.g. `01/05/25 - 31/05/25`.
    TransactionPeriod,
    AccountNumber,
    ProductName,
    Currency,
    BusinessUnit,
    BusinessUnitAddress,
    RecipientName,
    RecipientAddress,
}

/// Parsed statement header. Every field is optional; a partially filled
/// header is a normal outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementMetadata {
    pub statement_date: Option<NaiveDate>,
    pub transaction_period_start: Option<NaiveDate>,
    pub transaction_period_end: Option<NaiveDate>,
    pub account_number: Option<String>,
    pub product_name: Option<String>,
    pub currency: Option<String>,
    pub business_unit: Option<String>,
    pub business_unit_address: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_address: Option<String>,
    pub bank_name: Option<String>,
}

impl StatementMetadata {
    /// Labelled rendition, in export column order.
    pub fn to_pairs(&self) -> Vec<(&'static str, Option<String>)> {
        let date = |d: &Option<NaiveDate>| d.map(|d| d.to_string());
        vec![
            ("Statement Date", date(&self.statement_date)),
            ("Transaction Period Start", date(&self.transaction_period_start)),
            ("Transaction Period End", date(&self.transaction_period_end)),
            ("Account Number", self.account_number.clone()),
            ("Product Name", self.product_name.clone()),
            ("Currency", self.currency.clone()),
            ("Business Unit", self.business_unit.clone()),
            ("Business Unit Address", self.business_unit_address.clone()),
            ("Recipient Name", self.recipient_name.clone()),
            ("Recipient Address", self.recipient_address.clone()),
            ("Bank Name", self.bank_name.clone()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One ledger row.
///
/// `debit` and `credit` are non-negative and at most one of them is nonzero.
/// `balance` is `None` when the statement did not print a usable running
/// balance; that is not the same as a zero balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub description: String,
    pub teller: Option<String>,
    pub debit: BigDecimal,
    pub credit: BigDecimal,
    pub balance: Option<BigDecimal>,
    /// Page the row starts on (zero-based).
    pub page: usize,
}

impl Transaction {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            time: None,
            description: String::new(),
            teller: None,
            debit: BigDecimal::from(0),
            credit: BigDecimal::from(0),
            balance: None,
            page: 0,
        }
    }

    /// Credit minus debit.
    pub fn net_amount(&self) -> BigDecimal {
        &self.credit - &self.debit
    }

    pub fn is_debit(&self) -> bool {
        self.debit > BigDecimal::from(0)
    }

    pub fn is_credit(&self) -> bool {
        self.credit > BigDecimal::from(0)
    }

    /// No debit, no credit and no nonzero balance: nothing monetary on the row.
    pub fn has_no_amounts(&self) -> bool {
        let zero = BigDecimal::from(0);
        self.debit == zero
            && self.credit == zero
            && self.balance.as_ref().is_none_or(|b| *b == zero)
    }
}

/// Totals declared in the statement trailer, keyed by [`summary_keys`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementSummary {
    pub totals: BTreeMap<String, BigDecimal>,
    /// Closing balance spelled out in words, when printed.
    pub balance_in_words: Option<String>,
}

impl StatementSummary {
    pub fn get(&self, key: &str) -> Option<&BigDecimal> {
        self.totals.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: BigDecimal) {
        self.totals.insert(key.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty() && self.balance_in_words.is_none()
    }
}

/// Everything recovered from one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    pub metadata: StatementMetadata,
    /// Document order; never re-sorted.
    pub transactions: Vec<Transaction>,
    pub summary: StatementSummary,
    pub reconciliation: ReconciliationReport,
}

impl ParseResult {
    pub fn total_debit(&self) -> BigDecimal {
        self.transactions.iter().map(|t| &t.debit).sum()
    }

    pub fn total_credit(&self) -> BigDecimal {
        self.transactions.iter().map(|t| &t.credit).sum()
    }

    /// Balance printed on the last row, if any.
    pub fn closing_balance(&self) -> Option<&BigDecimal> {
        self.transactions.last().and_then(|t| t.balance.as_ref())
    }
}
