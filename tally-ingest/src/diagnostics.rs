//! Diagnostics sink handed to the statement parser.
//!
//! The parser never logs on its own; it reports what it saw to a
//! `Diagnostics` implementation. `TracingDiagnostics` forwards to `tracing`,
//! `Recorder` keeps the events for inspection.

use rust_decimal::Decimal;
use tracing::{debug, error, info, trace, warn};

use crate::types::{Holder, Transaction};
use crate::verify::Discrepancy;

pub trait Diagnostics {
    fn page_started(&mut self, _page: usize) {}

    /// A line that did not contribute to the ledger.
    fn line_discarded(&mut self, _page: usize, _line: &str) {}

    fn section_opened(&mut self, _holder: &Holder, _created: bool) {}

    fn transaction_recorded(&mut self, _holder: &str, _txn: &Transaction, _running_total: Decimal) {}

    fn section_verified(&mut self, _holder: &str, _total: Decimal) {}

    fn discrepancy(&mut self, _discrepancy: &Discrepancy) {}

    /// A header or total line named a different account number than the one
    /// the section was opened with.
    fn account_number_changed(&mut self, _holder: &str, _known: &str, _seen: &str) {}

    /// End of input reached without a total line for this holder.
    fn section_unclosed(&mut self, _holder: &str) {}
}

impl<D: Diagnostics + ?Sized> Diagnostics for &mut D {
    fn page_started(&mut self, page: usize) {
        (**self).page_started(page)
    }

    fn line_discarded(&mut self, page: usize, line: &str) {
        (**self).line_discarded(page, line)
    }

    fn section_opened(&mut self, holder: &Holder, created: bool) {
        (**self).section_opened(holder, created)
    }

    fn transaction_recorded(&mut self, holder: &str, txn: &Transaction, running_total: Decimal) {
        (**self).transaction_recorded(holder, txn, running_total)
    }

    fn section_verified(&mut self, holder: &str, total: Decimal) {
        (**self).section_verified(holder, total)
    }

    fn discrepancy(&mut self, discrepancy: &Discrepancy) {
        (**self).discrepancy(discrepancy)
    }

    fn account_number_changed(&mut self, holder: &str, known: &str, seen: &str) {
        (**self).account_number_changed(holder, known, seen)
    }

    fn section_unclosed(&mut self, holder: &str) {
        (**self).section_unclosed(holder)
    }
}

/// Default sink: structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn page_started(&mut self, page: usize) {
        info!(page, "processing page");
    }

    fn line_discarded(&mut self, page: usize, line: &str) {
        trace!(page, line, "discarding line");
    }

    fn section_opened(&mut self, holder: &Holder, created: bool) {
        info!(holder = %holder.name, account = %holder.account, created, "processing transactions");
    }

    fn transaction_recorded(&mut self, holder: &str, txn: &Transaction, running_total: Decimal) {
        debug!(
            holder,
            date = %txn.transaction_date,
            description = %txn.description,
            amount = %txn.amount,
            total = %running_total,
            "recorded transaction"
        );
    }

    fn section_verified(&mut self, holder: &str, total: Decimal) {
        info!(holder, total = %total, "final amount verified");
    }

    fn discrepancy(&mut self, discrepancy: &Discrepancy) {
        error!(
            holder = %discrepancy.holder,
            found = %discrepancy.actual,
            reported = %discrepancy.expected,
            "failed to verify transaction amounts against statement total"
        );
    }

    fn account_number_changed(&mut self, holder: &str, known: &str, seen: &str) {
        warn!(holder, known, seen, "account number differs from the section's");
    }

    fn section_unclosed(&mut self, holder: &str) {
        warn!(holder, "no total line found; amounts left unverified");
    }
}

/// One recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    PageStarted(usize),
    LineDiscarded { page: usize, line: String },
    SectionOpened { holder: String, created: bool },
    TransactionRecorded { holder: String, running_total: Decimal },
    SectionVerified { holder: String, total: Decimal },
    Discrepancy(Discrepancy),
    AccountNumberChanged { holder: String, known: String, seen: String },
    SectionUnclosed(String),
}

/// Collects every event in order.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    pub events: Vec<Event>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn discarded_lines(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|e| match e {
            Event::LineDiscarded { line, .. } => Some(line.as_str()),
            _ => None,
        })
    }
}

impl Diagnostics for Recorder {
    fn page_started(&mut self, page: usize) {
        self.events.push(Event::PageStarted(page));
    }

    fn line_discarded(&mut self, page: usize, line: &str) {
        self.events.push(Event::LineDiscarded {
            page,
            line: line.to_string(),
        });
    }

    fn section_opened(&mut self, holder: &Holder, created: bool) {
        self.events.push(Event::SectionOpened {
            holder: holder.name.clone(),
            created,
        });
    }

    fn transaction_recorded(&mut self, holder: &str, _txn: &Transaction, running_total: Decimal) {
        self.events.push(Event::TransactionRecorded {
            holder: holder.to_string(),
            running_total,
        });
    }

    fn section_verified(&mut self, holder: &str, total: Decimal) {
        self.events.push(Event::SectionVerified {
            holder: holder.to_string(),
            total,
        });
    }

    fn discrepancy(&mut self, discrepancy: &Discrepancy) {
        self.events.push(Event::Discrepancy(discrepancy.clone()));
    }

    fn account_number_changed(&mut self, holder: &str, known: &str, seen: &str) {
        self.events.push(Event::AccountNumberChanged {
            holder: holder.to_string(),
            known: known.to_string(),
            seen: seen.to_string(),
        });
    }

    fn section_unclosed(&mut self, holder: &str) {
        self.events.push(Event::SectionUnclosed(holder.to_string()));
    }
}
