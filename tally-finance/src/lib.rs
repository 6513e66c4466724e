//! tally-finance: expense categories and the budget report built from a parsed ledger

pub mod category_rules;
pub mod report;

pub use category_rules::{categorize, ExpenseCategory};
pub use report::{build_report, Budget, HolderBudget, StatementReport};
