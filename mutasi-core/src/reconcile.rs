//! Reconciliation of a parsed ledger against the statement's declared totals.
//!
//! Purely observational: the transaction sequence is never modified, and a
//! mismatch is reported, not corrected.
//!
//! Checks:
//! - sum of debits vs `Total Debit`
//! - sum of credits vs `Total Credit`
//! - balance of the last row vs `Closing Balance`
//! - running-balance continuity row to row (seeded from `Opening Balance`)

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::statement::{StatementSummary, Transaction, summary_keys};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckOutcome {
    Match,
    /// `delta` is computed minus declared.
    Mismatch { delta: BigDecimal },
    /// The statement does not print this total.
    DeclaredAbsent,
    /// The ledger cannot produce this value (e.g. no row carries a balance).
    ComputedAbsent,
}

/// One aggregate compared against its declared counterpart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    pub key: String,
    pub computed: Option<BigDecimal>,
    pub declared: Option<BigDecimal>,
    pub outcome: CheckOutcome,
}

impl Check {
    fn evaluate(
        key: &str,
        computed: Option<BigDecimal>,
        declared: Option<BigDecimal>,
        tolerance: &BigDecimal,
    ) -> Self {
        let outcome = match (&computed, &declared) {
            (_, None) => CheckOutcome::DeclaredAbsent,
            (None, Some(_)) => CheckOutcome::ComputedAbsent,
            (Some(c), Some(d)) => {
                let delta = c - d;
                if delta.abs() <= *tolerance {
                    CheckOutcome::Match
                } else {
                    CheckOutcome::Mismatch { delta }
                }
            }
        };

        Self {
            key: key.to_string(),
            computed,
            declared,
            outcome,
        }
    }

    pub fn is_match(&self) -> bool {
        self.outcome == CheckOutcome::Match
    }

    /// Mismatch, or a declared value the ledger cannot reproduce.
    pub fn is_failure(&self) -> bool {
        matches!(
            self.outcome,
            CheckOutcome::Mismatch { .. } | CheckOutcome::ComputedAbsent
        )
    }
}

/// A row whose printed balance does not follow from the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceBreak {
    /// Index into the transaction sequence.
    pub index: usize,
    pub expected: BigDecimal,
    pub actual: BigDecimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub checks: Vec<Check>,
    pub balance_breaks: Vec<BalanceBreak>,
}

impl ReconciliationReport {
    pub fn check(&self, key: &str) -> Option<&Check> {
        self.checks.iter().find(|c| c.key == key)
    }

    /// No failed check and no balance break. Absent declared totals do not
    /// count against the ledger.
    pub fn is_reconciled(&self) -> bool {
        self.checks.iter().all(|c| !c.is_failure()) && self.balance_breaks.is_empty()
    }

    /// Every check matched (declared values all present) and balances are continuous.
    pub fn is_fully_verified(&self) -> bool {
        !self.checks.is_empty()
            && self.checks.iter().all(Check::is_match)
            && self.balance_breaks.is_empty()
    }

    pub fn failures(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|c| c.is_failure())
    }
}

/// Compares ledger aggregates with declared totals within a tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciler {
    tolerance: BigDecimal,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::exact()
    }
}

impl Reconciler {
    pub fn new(tolerance: BigDecimal) -> Self {
        Self {
            tolerance: tolerance.abs(),
        }
    }

    /// Zero tolerance.
    pub fn exact() -> Self {
        Self::new(BigDecimal::from(0))
    }

    pub fn reconcile(
        &self,
        transactions: &[Transaction],
        summary: &StatementSummary,
    ) -> ReconciliationReport {
        let total_debit: BigDecimal = transactions.iter().map(|t| &t.debit).sum();
        let total_credit: BigDecimal = transactions.iter().map(|t| &t.credit).sum();
        let closing = transactions.last().and_then(|t| t.balance.clone());

        let declared = |key: &str| summary.get(key).cloned();
        let checks = vec![
            Check::evaluate(
                summary_keys::TOTAL_DEBIT,
                Some(total_debit),
                declared(summary_keys::TOTAL_DEBIT),
                &self.tolerance,
            ),
            Check::evaluate(
                summary_keys::TOTAL_CREDIT,
                Some(total_credit),
                declared(summary_keys::TOTAL_CREDIT),
                &self.tolerance,
            ),
            Check::evaluate(
                summary_keys::CLOSING_BALANCE,
                closing,
                declared(summary_keys::CLOSING_BALANCE),
                &self.tolerance,
            ),
        ];

        let balance_breaks =
            self.balance_breaks(transactions, summary.get(summary_keys::OPENING_BALANCE));

        for check in checks.iter().filter(|c| c.is_failure()) {
            warn!(key = %check.key, outcome = ?check.outcome, "reconciliation check failed");
        }
        debug!(
            checks = checks.len(),
            breaks = balance_breaks.len(),
            "reconciled {} transactions",
            transactions.len()
        );

        ReconciliationReport {
            checks,
            balance_breaks,
        }
    }

    fn balance_breaks(
        &self,
        transactions: &[Transaction],
        opening: Option<&BigDecimal>,
    ) -> Vec<BalanceBreak> {
        let mut breaks = Vec::new();
        // Carries the last known (or derived) balance across rows without one.
        let mut previous: Option<BigDecimal> = opening.cloned();

        for (index, txn) in transactions.iter().enumerate() {
            let expected = previous
                .as_ref()
                .map(|p| p - &txn.debit + &txn.credit);

            previous = match (&txn.balance, expected) {
                (Some(actual), Some(expected)) => {
                    if (&expected - actual).abs() > self.tolerance {
                        warn!(index, %expected, %actual, "running balance break");
                        breaks.push(BalanceBreak {
                            index,
                            expected,
                            actual: actual.clone(),
                        });
                    }
                    Some(actual.clone())
                }
                (Some(actual), None) => Some(actual.clone()),
                (None, expected) => expected,
            };
        }

        breaks
    }
}
