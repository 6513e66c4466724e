use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account holder as named on a statement header: `JOHN DOE #1234`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Holder {
    pub name: String,
    /// Account number token, digits only.
    pub account: String,
}

impl Holder {
    pub fn new(name: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            account: account.into(),
        }
    }
}

/// One detail row of a transaction table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Short calendar date without a year, e.g. `Jan 5`.
    pub transaction_date: String,
    pub post_date: String,
    pub description: String,
    /// Always non-negative as parsed; serialized as an exact string.
    pub amount: Decimal,
}

impl Transaction {
    /// Resolve both dates against the statement year.
    ///
    /// A post date that falls before the transaction date is taken to be in
    /// the following year (a December purchase posted in January).
    pub fn resolve_dates(&self, statement_year: i32) -> Option<(NaiveDate, NaiveDate)> {
        let trans = parse_mmm_dd_with_year(&self.transaction_date, statement_year)?;
        let mut post = parse_mmm_dd_with_year(&self.post_date, statement_year)?;
        if post < trans {
            post = parse_mmm_dd_with_year(&self.post_date, statement_year + 1)?;
        }
        Some((trans, post))
    }
}

/// Parse `Jul 20` into a date in `year`.
pub fn parse_mmm_dd_with_year(s: &str, year: i32) -> Option<NaiveDate> {
    let parts: Vec<_> = s.split_whitespace().collect();
    if parts.len() != 2 {
        return None;
    }
    let day: u32 = parts[1].parse().ok()?;

    let month = match parts[0].to_ascii_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Accumulated transactions for one account holder.
///
/// The running total is kept in step with `transactions` on every push; it is
/// never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSection {
    #[serde(skip)]
    holder: String,
    account: String,
    transactions: Vec<Transaction>,
    transactions_count: usize,
    transactions_total_amount: Decimal,
    verified_amounts: bool,
}

impl AccountSection {
    pub fn new(holder: &Holder) -> Self {
        Self {
            holder: holder.name.clone(),
            account: holder.account.clone(),
            transactions: Vec::new(),
            transactions_count: 0,
            transactions_total_amount: Decimal::ZERO,
            verified_amounts: false,
        }
    }

    pub fn holder(&self) -> &str {
        &self.holder
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transactions_count(&self) -> usize {
        self.transactions_count
    }

    pub fn total(&self) -> Decimal {
        self.transactions_total_amount
    }

    pub fn is_verified(&self) -> bool {
        self.verified_amounts
    }

    /// Append a transaction. New activity invalidates any earlier
    /// reconciliation. Returns false, leaving the section untouched, when the
    /// running total would overflow.
    pub(crate) fn push(&mut self, txn: Transaction) -> bool {
        let Some(total) = self.transactions_total_amount.checked_add(txn.amount) else {
            return false;
        };
        self.transactions_total_amount = total;
        self.transactions_count += 1;
        self.transactions.push(txn);
        self.verified_amounts = false;
        true
    }

    pub(crate) fn set_verified(&mut self, verified: bool) {
        self.verified_amounts = verified;
    }
}
