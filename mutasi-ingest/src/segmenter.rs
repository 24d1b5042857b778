//! Transaction segmenter: turns table rows into ledger transactions.
//!
//! Rows arrive in document order, concatenated across pages, so a
//! transaction whose description wraps onto the next page is still one
//! transaction. States:
//!
//! - `AwaitingTransaction`: nothing buffered yet
//! - `InTransaction`: a transaction is buffered and may still grow
//! - `InSummary`: the trailer started; every further row is ignored
//!
//! Per row, first match wins:
//! 1. date cell holds a strict date -> flush the buffer, start a new transaction
//! 2. date cell holds only a time -> attach the time to the buffered
//!    transaction, or start a new one on the previous date when the buffer
//!    already has a time or the row prints amounts the buffer already holds
//! 3. line text holds a summary marker -> flush, enter `InSummary`
//! 4. anything else is a continuation of the buffered transaction
//!
//! A malformed date therefore lands in rule 4: its text is kept as
//! description instead of opening a transaction that may not exist.

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveTime};
use mutasi_core::Transaction;
use tracing::{debug, trace, warn};

use crate::columns::RawFields;
use crate::layout::{FieldKind, Layout, Patterns};

#[derive(Debug, Clone, PartialEq)]
enum State {
    AwaitingTransaction,
    InTransaction(Transaction),
    InSummary,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RowKind {
    Dated {
        date: NaiveDate,
        time: Option<NaiveTime>,
    },
    TimeOnly(NaiveTime),
    Summary,
    Continuation,
}

/// Output of a segmentation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segmentation {
    pub transactions: Vec<Transaction>,
    /// True when a summary marker ended the table.
    pub reached_summary: bool,
}

pub struct Segmenter<'a> {
    layout: &'a Layout,
    patterns: &'a Patterns,
    state: State,
    last_date: Option<NaiveDate>,
    transactions: Vec<Transaction>,
}

impl<'a> Segmenter<'a> {
    pub(crate) fn new(layout: &'a Layout, patterns: &'a Patterns) -> Self {
        Self {
            layout,
            patterns,
            state: State::AwaitingTransaction,
            last_date: None,
            transactions: Vec::new(),
        }
    }

    /// True once the trailer has been reached.
    pub fn is_done(&self) -> bool {
        self.state == State::InSummary
    }

    pub fn feed(&mut self, row: &RawFields) {
        if self.is_done() {
            return;
        }

        let kind = self.classify(row);
        trace!(page = row.page, y = row.y, ?kind, "segmenter row");

        match kind {
            RowKind::Dated { date, time } => {
                self.flush();
                self.last_date = Some(date);
                self.state = State::InTransaction(self.start(row, date, time));
            }
            RowKind::TimeOnly(time) => self.attach_time(row, time),
            RowKind::Summary => {
                self.flush();
                debug!(page = row.page, "summary marker reached, table ends");
                self.state = State::InSummary;
            }
            RowKind::Continuation => self.continue_with(row),
        }
    }

    pub fn finish(mut self) -> Segmentation {
        let reached_summary = self.is_done();
        if !reached_summary {
            self.flush();
        }
        Segmentation {
            transactions: self.transactions,
            reached_summary,
        }
    }

    fn classify(&self, row: &RawFields) -> RowKind {
        let date_cell = row.get(FieldKind::Date);
        let mut parts = date_cell.split_whitespace();
        let first = parts.next();
        let date = first.and_then(|s| self.patterns.parse_date(s));

        let time = if self.layout.has_band(FieldKind::Time) {
            row.get(FieldKind::Time)
                .split_whitespace()
                .next()
                .and_then(|s| self.patterns.parse_time(s))
        } else if date.is_some() {
            parts.next().and_then(|s| self.patterns.parse_time(s))
        } else {
            first.and_then(|s| self.patterns.parse_time(s))
        };

        if let Some(date) = date {
            return RowKind::Dated { date, time };
        }

        if let Some(time) = time {
            // With a dedicated time column the date cell must be empty;
            // without one the time sits where the date would be.
            if !self.layout.has_band(FieldKind::Time) || row.is_blank(FieldKind::Date) {
                return RowKind::TimeOnly(time);
            }
        }

        if self.layout.is_summary_marker(&row.text) {
            return RowKind::Summary;
        }

        RowKind::Continuation
    }

    fn start(&self, row: &RawFields, date: NaiveDate, time: Option<NaiveTime>) -> Transaction {
        let mut txn = Transaction::new(date);
        txn.time = time;
        txn.page = row.page;
        txn.description = normalize(row.get(FieldKind::Description));

        let teller = normalize(row.get(FieldKind::Teller));
        if !teller.is_empty() {
            txn.teller = Some(teller);
        }

        let amounts = Amounts::read(self.layout, row);
        txn.debit = amounts.debit.unwrap_or_else(zero);
        txn.credit = amounts.credit.unwrap_or_else(zero);
        txn.balance = amounts.balance;
        settle_sides(&mut txn);
        txn
    }

    fn attach_time(&mut self, row: &RawFields, time: NaiveTime) {
        let layout = self.layout;

        if let State::InTransaction(txn) = &mut self.state {
            if txn.time.is_none() && !Amounts::read(layout, row).collides_with(txn) {
                txn.time = Some(time);
                fold_continuation(layout, txn, row, &[FieldKind::Date, FieldKind::Time]);
                return;
            }
        }

        match self.last_date {
            Some(date) => {
                self.flush();
                self.state = State::InTransaction(self.start(row, date, Some(time)));
            }
            None => warn!(
                page = row.page,
                y = row.y,
                %time,
                "time-only row with no preceding date, skipped"
            ),
        }
    }

    fn continue_with(&mut self, row: &RawFields) {
        let layout = self.layout;
        match &mut self.state {
            State::InTransaction(txn) => fold_continuation(layout, txn, row, &[]),
            State::AwaitingTransaction => {
                trace!(page = row.page, text = %row.text, "row before first transaction, skipped")
            }
            State::InSummary => {}
        }
    }

    fn flush(&mut self) {
        if let State::InTransaction(txn) =
            std::mem::replace(&mut self.state, State::AwaitingTransaction)
        {
            if txn.has_no_amounts() {
                debug!(date = %txn.date, description = %txn.description, "dropping row without amounts");
            } else {
                self.transactions.push(txn);
            }
        }
    }
}

/// Amount cells of one row, parsed under the layout's number format.
struct Amounts {
    debit: Option<BigDecimal>,
    credit: Option<BigDecimal>,
    balance: Option<BigDecimal>,
}

impl Amounts {
    fn read(layout: &Layout, row: &RawFields) -> Self {
        let fmt = &layout.number_format;
        Self {
            debit: fmt.parse(row.get(FieldKind::Debit)).map(|d| d.abs()),
            credit: fmt.parse(row.get(FieldKind::Credit)).map(|d| d.abs()),
            balance: fmt.parse(row.get(FieldKind::Balance)),
        }
    }

    /// True when folding these amounts into `txn` would discard some of them.
    fn collides_with(&self, txn: &Transaction) -> bool {
        let has_side = self.debit.as_ref().is_some_and(|d| d != &zero())
            || self.credit.as_ref().is_some_and(|c| c != &zero());
        (has_side && (txn.is_debit() || txn.is_credit()))
            || (self.balance.is_some() && txn.balance.is_some())
    }
}

/// Append a continuation row's text; take its amounts only where the
/// buffered transaction has none.
fn fold_continuation(layout: &Layout, txn: &mut Transaction, row: &RawFields, skip: &[FieldKind]) {
    let fragment = layout
        .continuation_fields
        .iter()
        .filter(|kind| !skip.contains(*kind))
        .map(|kind| normalize(row.get(*kind)))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if !fragment.is_empty() {
        if !txn.description.is_empty() {
            txn.description.push_str(&layout.description_separator);
        }
        txn.description.push_str(&fragment);
    }

    let amounts = Amounts::read(layout, row);
    if !txn.is_debit() && !txn.is_credit() {
        if let Some(debit) = amounts.debit {
            txn.debit = debit;
        }
        if let Some(credit) = amounts.credit {
            txn.credit = credit;
        }
        settle_sides(txn);
    }
    if txn.balance.is_none() {
        txn.balance = amounts.balance;
    }
}

/// Keep at most one nonzero side by netting a row that prints both.
fn settle_sides(txn: &mut Transaction) {
    if !(txn.is_debit() && txn.is_credit()) {
        return;
    }
    warn!(
        date = %txn.date,
        debit = %txn.debit,
        credit = %txn.credit,
        "row carries both debit and credit, netting"
    );
    let net = txn.net_amount();
    if net > zero() {
        txn.credit = net;
        txn.debit = zero();
    } else {
        txn.debit = -net;
        txn.credit = zero();
    }
}

fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn zero() -> BigDecimal {
    BigDecimal::from(0)
}
