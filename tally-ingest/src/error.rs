use thiserror::Error;

use crate::verify::Discrepancy;

/// Failures that abort a parse run.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A header or total line arrived while a continued table was still open.
    #[error("page {page}: {line:?} seen while the continued table for {pending} was still open")]
    ContinuationNotClosed {
        pending: String,
        line: String,
        page: usize,
    },

    #[error("page {page}: total line for {holder}, who has no transactions section")]
    UnknownHolder { holder: String, page: usize },

    #[error("reconciliation failed: {0}")]
    ReconciliationFailed(Discrepancy),

    #[error("no transactions were extracted from the statement")]
    NoData,

    #[error("invalid statement grammar: {0}")]
    Pattern(#[from] regex::Error),
}
