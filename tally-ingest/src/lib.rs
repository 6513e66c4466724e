//! tally-ingest: statement text ingestion. Classifies extracted statement lines,
//! rebuilds per-holder transaction ledgers across page breaks, and reconciles
//! them against the totals the statement reports.

pub mod classify;
pub mod diagnostics;
pub mod error;
pub mod ledger;
pub mod money;
pub mod parser;
pub mod statement;
pub mod types;
pub mod verify;

pub use classify::{LineClassifier, LineKind};
pub use diagnostics::{Diagnostics, Event, Recorder, TracingDiagnostics};
pub use error::ParseError;
pub use ledger::Ledger;
pub use money::{format_money, parse_money, MoneyError};
pub use parser::{parse_statement, parse_statement_with, MismatchPolicy, ParseOptions, ParseOutcome, ParserState, StatementParser};
pub use statement::Statement;
pub use types::{AccountSection, Holder, Transaction};
pub use verify::{reconcile, Discrepancy, Verdict};
