//! Exact currency amounts.
//!
//! Statement amounts look like `$4.50` or `$1,234.5`: a dollar sign, digits in
//! comma-separated groups of three, and one or two fractional digits. They are
//! parsed straight into a `Decimal` so totals can be compared for equality.

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

/// Regex fragment matching a currency token, shared with the line classifier.
pub const AMOUNT_PATTERN: &str = r"\$\d{1,3}(?:,\d{3})*\.\d{1,2}";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("amount {0:?} is missing the leading '$'")]
    MissingSymbol(String),
    #[error("amount {0:?} has malformed digit grouping")]
    Grouping(String),
    #[error("amount {0:?} needs one or two fractional digits")]
    Fraction(String),
    #[error("amount {0:?} is out of range")]
    Range(String),
}

/// Parse a currency token into an exact amount.
pub fn parse_money(token: &str) -> Result<Decimal, MoneyError> {
    let token = token.trim();
    let body = token
        .strip_prefix('$')
        .ok_or_else(|| MoneyError::MissingSymbol(token.to_string()))?;

    let (whole, frac) = body
        .split_once('.')
        .ok_or_else(|| MoneyError::Fraction(token.to_string()))?;

    if frac.is_empty() || frac.len() > 2 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MoneyError::Fraction(token.to_string()));
    }

    let mut groups = whole.split(',');
    let lead = groups.next().unwrap_or_default();
    if lead.is_empty() || lead.len() > 3 || !lead.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MoneyError::Grouping(token.to_string()));
    }
    let mut digits = String::from(lead);
    for group in groups {
        if group.len() != 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MoneyError::Grouping(token.to_string()));
        }
        digits.push_str(group);
    }

    digits.push('.');
    digits.push_str(frac);
    Decimal::from_str(&digits).map_err(|_| MoneyError::Range(token.to_string()))
}

/// Render an amount the way statements print it, keeping its scale.
pub fn format_money(amount: Decimal) -> String {
    let plain = amount.abs().to_string();
    let (whole, frac) = match plain.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (plain.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    match frac {
        Some(f) => format!("{sign}${grouped}.{f}"),
        None => format!("{sign}${grouped}"),
    }
}
