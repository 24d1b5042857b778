//! Decimal amount parsing under a statement's number conventions.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Thousands/decimal separators used by a statement layout.
///
/// Indonesian retail statements (BRI) print `1,234,567.89`; other layouts print
/// `1.234.567,89`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFormat {
    pub thousands_separator: char,
    pub decimal_separator: char,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::new(',', '.')
    }
}

impl NumberFormat {
    pub const fn new(thousands_separator: char, decimal_separator: char) -> Self {
        Self {
            thousands_separator,
            decimal_separator,
        }
    }

    /// Parse a printed amount. Returns `None` for empty or malformed input.
    ///
    /// Accepts an optional leading sign. Anything other than digits and the two
    /// configured separators makes the value malformed.
    pub fn parse(&self, raw: &str) -> Option<BigDecimal> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }

        let (negative, digits) = match s.as_bytes()[0] {
            b'-' => (true, &s[1..]),
            b'+' => (false, &s[1..]),
            _ => (false, s),
        };

        let mut normalized = String::with_capacity(digits.len() + 1);
        if negative {
            normalized.push('-');
        }

        let mut seen_digit = false;
        let mut seen_decimal = false;
        for c in digits.chars() {
            if c.is_ascii_digit() {
                seen_digit = true;
                normalized.push(c);
            } else if c == self.decimal_separator {
                if seen_decimal {
                    return None;
                }
                seen_decimal = true;
                normalized.push('.');
            } else if c == self.thousands_separator && !seen_decimal {
                continue;
            } else {
                return None;
            }
        }

        if !seen_digit {
            return None;
        }

        BigDecimal::from_str(&normalized).ok()
    }
}
