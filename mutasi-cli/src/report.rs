//! Plain-text rendition of a parse result for the terminal.

use mutasi_core::{CheckOutcome, ParseResult};
use std::fmt::{self, Write};

pub fn render(result: &ParseResult) -> Result<String, fmt::Error> {
    let mut out = String::new();

    writeln!(out, "# Statement\n")?;
    for (label, value) in result.metadata.to_pairs() {
        if let Some(value) = value {
            writeln!(out, "{label:<26} {value}")?;
        }
    }

    writeln!(out, "\n# Transactions\n")?;
    writeln!(out, "{:<26} {}", "Count", result.transactions.len())?;
    writeln!(out, "{:<26} {}", "Total Debit", result.total_debit())?;
    writeln!(out, "{:<26} {}", "Total Credit", result.total_credit())?;
    if let Some(closing) = result.closing_balance() {
        writeln!(out, "{:<26} {}", "Last Balance", closing)?;
    }

    if !result.summary.is_empty() {
        writeln!(out, "\n# Summary\n")?;
        for (key, value) in &result.summary.totals {
            writeln!(out, "{key:<26} {value}")?;
        }
        if let Some(words) = &result.summary.balance_in_words {
            writeln!(out, "{:<26} {}", "Balance In Words", words)?;
        }
    }

    let report = &result.reconciliation;
    writeln!(out, "\n# Reconciliation\n")?;
    for check in &report.checks {
        let verdict = match &check.outcome {
            CheckOutcome::Match => "ok".to_string(),
            CheckOutcome::Mismatch { delta } => format!("MISMATCH (delta {delta})"),
            CheckOutcome::DeclaredAbsent => "not declared".to_string(),
            CheckOutcome::ComputedAbsent => "MISSING (no balance on ledger)".to_string(),
        };
        writeln!(out, "{:<26} {}", check.key, verdict)?;
    }
    for b in &report.balance_breaks {
        writeln!(
            out,
            "balance break at row {}: expected {}, printed {}",
            b.index + 1,
            b.expected,
            b.actual
        )?;
    }

    let verdict = if report.is_fully_verified() {
        "Reconciled."
    } else if report.is_reconciled() {
        "Reconciled (some totals not declared)."
    } else {
        "NOT reconciled."
    };
    writeln!(out, "\n{verdict}")?;

    Ok(out)
}
