//! Budget report: the parsed ledger for one card issuer plus a per-holder
//! expense breakdown.
//!
//! Serialized shape (top-level keys sorted):
//! ```text
//! {
//!   "budget": { "breakdown": { "<issuer>": { "<HOLDER>": { "expenses": "36.60", ... } } } },
//!   "<issuer>": { "<HOLDER>": { "account": "1234", "transactions": [...], ... } }
//! }
//! ```

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tally_ingest::{Discrepancy, Ledger, ParseOutcome};

use crate::category_rules::{categorize, ExpenseCategory};

/// Spending summary for one holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HolderBudget {
    pub expenses: Decimal,
    pub verified: bool,
    pub by_category: BTreeMap<ExpenseCategory, Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Budget {
    /// issuer -> holder -> summary
    pub breakdown: BTreeMap<String, BTreeMap<String, HolderBudget>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub discrepancies: Vec<Discrepancy>,
}

impl Budget {
    /// Expenses across every issuer and holder, or `None` if the sum does
    /// not fit in a `Decimal`.
    pub fn total_expenses(&self) -> Option<Decimal> {
        self.breakdown
            .values()
            .flat_map(|holders| holders.values())
            .try_fold(Decimal::ZERO, |acc, h| acc.checked_add(h.expenses))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementReport {
    pub issuer: String,
    pub ledger: Ledger,
    pub budget: Budget,
}

impl StatementReport {
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serialize statement report")
    }
}

impl Serialize for StatementReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        if self.issuer.as_str() < BUDGET_KEY {
            map.serialize_entry(&self.issuer, &self.ledger)?;
            map.serialize_entry(BUDGET_KEY, &self.budget)?;
        } else {
            map.serialize_entry(BUDGET_KEY, &self.budget)?;
            map.serialize_entry(&self.issuer, &self.ledger)?;
        }
        map.end()
    }
}

/// Top-level key the budget summary is written under.
const BUDGET_KEY: &str = "budget";

/// Build the report for one parsed statement.
///
/// The issuer becomes a top-level key next to `budget`, so it may not be
/// `budget` itself.
pub fn build_report(issuer: &str, outcome: &ParseOutcome) -> Result<StatementReport> {
    if issuer == BUDGET_KEY {
        bail!("issuer name {issuer:?} collides with the report's budget key");
    }

    let mut holders: BTreeMap<String, HolderBudget> = BTreeMap::new();
    for section in outcome.ledger.sections() {
        let mut by_category: BTreeMap<ExpenseCategory, Decimal> = BTreeMap::new();
        for txn in section.transactions() {
            let subtotal = by_category.entry(categorize(txn)).or_insert(Decimal::ZERO);
            *subtotal = subtotal.checked_add(txn.amount).with_context(|| {
                format!("{}: category subtotal overflows", section.holder())
            })?;
        }
        let summary = HolderBudget {
            expenses: section.total(),
            verified: section.is_verified(),
            by_category,
        };
        holders.insert(section.holder().to_string(), summary);
    }

    let mut breakdown = BTreeMap::new();
    breakdown.insert(issuer.to_string(), holders);

    Ok(StatementReport {
        issuer: issuer.to_string(),
        ledger: outcome.ledger.clone(),
        budget: Budget {
            breakdown,
            discrepancies: outcome.discrepancies.clone(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tally_ingest::{parse_statement, ParseOptions, Statement};

    fn outcome(total: &str) -> ParseOutcome {
        let text = format!(
            "JOHN DOE #1234: Transactions\n\
             Trans Date Post Date Description Amount\n\
             Jan 5 Jan 6 Coffee Shop $4.50\n\
             Jan 6 Jan 7 Grocery Store $32.10\n\
             Jan 8 Jan 9 Whole Foods Market $10.00\n\
             JOHN DOE #1234: Total Transactions {total}"
        );
        parse_statement(&Statement::from_pages([text]), ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_breakdown_per_holder() {
        let report = build_report("capital_one", &outcome("$46.60")).unwrap();
        let john = &report.budget.breakdown["capital_one"]["JOHN DOE"];
        assert_eq!(john.expenses, dec!(46.60));
        assert!(john.verified);
        assert_eq!(john.by_category[&ExpenseCategory::Groceries], dec!(42.10));
        assert_eq!(john.by_category[&ExpenseCategory::Miscellaneous], dec!(4.50));
        assert_eq!(report.budget.total_expenses(), Some(dec!(46.60)));
        assert!(report.budget.discrepancies.is_empty());
    }

    #[test]
    fn test_json_keys_sorted_and_exact() {
        let report = build_report("capital_one", &outcome("$46.60")).unwrap();
        let json = report.to_json_pretty().unwrap();

        let budget_at = json.find("\n  \"budget\"").unwrap();
        let issuer_at = json.find("\n  \"capital_one\"").unwrap();
        assert!(budget_at < issuer_at);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value["budget"]["breakdown"]["capital_one"]["JOHN DOE"]["expenses"],
            "46.60"
        );
        assert_eq!(value["capital_one"]["JOHN DOE"]["transactions_count"], 3);
        assert!(value["budget"].get("discrepancies").is_none());
    }

    #[test]
    fn test_issuer_sorting_before_budget() {
        let report = build_report("amex", &outcome("$46.60")).unwrap();
        let json = report.to_json_pretty().unwrap();
        assert!(json.find("\n  \"amex\"").unwrap() < json.find("\n  \"budget\"").unwrap());
    }

    #[test]
    fn test_discrepancies_are_carried() {
        let report = build_report("capital_one", &outcome("$50.00")).unwrap();
        assert!(!report.budget.breakdown["capital_one"]["JOHN DOE"].verified);
        assert_eq!(report.budget.discrepancies.len(), 1);
        assert_eq!(report.budget.discrepancies[0].expected, dec!(50.00));
    }

    #[test]
    fn test_budget_issuer_rejected() {
        let err = build_report("budget", &outcome("$46.60")).unwrap_err();
        assert!(err.to_string().contains("budget"));
    }

    #[test]
    fn test_total_expenses_overflow_is_none() {
        let huge = "$50,000,000,000,000,000,000,000,000,000.00";
        let text = format!(
            "JOHN DOE #1234: Transactions\n\
             Trans Date Post Date Description Amount\n\
             Jan 5 Jan 6 Wire Transfer {huge}\n\
             JANE DOE #5678: Transactions\n\
             Trans Date Post Date Description Amount\n\
             Jan 5 Jan 6 Wire Transfer {huge}"
        );
        let parsed =
            parse_statement(&Statement::from_pages([text]), ParseOptions::default()).unwrap();
        let report = build_report("capital_one", &parsed).unwrap();

        assert_eq!(report.budget.breakdown["capital_one"].len(), 2);
        assert_eq!(report.budget.total_expenses(), None);
    }
}
