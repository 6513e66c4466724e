//! Statement parser: a state machine over classified lines.
//!
//! Pages are fed in document order and the same state is carried from one
//! page to the next, so a table interrupted by a page break picks up where it
//! left off after a `Transactions (Continued)` marker.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::classify::{LineClassifier, LineKind};
use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::error::ParseError;
use crate::ledger::Ledger;
use crate::statement::Statement;
use crate::types::{AccountSection, Holder, Transaction};
use crate::verify::{reconcile, Discrepancy, Verdict};

/// What to do when a holder's transactions do not add up to the reported total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MismatchPolicy {
    /// Record a discrepancy, leave the section unverified and keep going.
    #[default]
    Report,
    /// Stop the parse with `ParseError::ReconciliationFailed`.
    Abort,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub mismatch_policy: MismatchPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// No current holder.
    Idle,
    /// Holder header seen, column header not yet.
    AwaitingTableHeader,
    InTable,
    /// Table continues after a page break; no column header is required.
    Continuation,
}

#[derive(Debug)]
struct ParseState {
    state: ParserState,
    current: Option<String>,
    page: usize,
}

impl ParseState {
    fn new() -> Self {
        Self {
            state: ParserState::Idle,
            current: None,
            page: 0,
        }
    }

    fn continuation_pending(&self) -> bool {
        self.state == ParserState::Continuation
    }
}

/// Result of a completed parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseOutcome {
    pub ledger: Ledger,
    pub discrepancies: Vec<Discrepancy>,
    /// Holders for which no total line was ever seen.
    pub unclosed: Vec<String>,
}

impl ParseOutcome {
    pub fn unverified(&self) -> impl Iterator<Item = &AccountSection> {
        self.ledger.sections().filter(|s| !s.is_verified())
    }

    pub fn all_verified(&self) -> bool {
        self.ledger.sections().all(AccountSection::is_verified)
    }
}

pub struct StatementParser<D = TracingDiagnostics> {
    classifier: LineClassifier,
    ledger: Ledger,
    state: ParseState,
    options: ParseOptions,
    discrepancies: Vec<Discrepancy>,
    closed: BTreeSet<String>,
    sink: D,
}

impl StatementParser<TracingDiagnostics> {
    pub fn new(options: ParseOptions) -> Result<Self, ParseError> {
        Self::with_diagnostics(options, TracingDiagnostics)
    }
}

impl<D: Diagnostics> StatementParser<D> {
    pub fn with_diagnostics(options: ParseOptions, sink: D) -> Result<Self, ParseError> {
        Ok(Self {
            classifier: LineClassifier::new()?,
            ledger: Ledger::new(),
            state: ParseState::new(),
            options,
            discrepancies: Vec::new(),
            closed: BTreeSet::new(),
            sink,
        })
    }

    pub fn state(&self) -> ParserState {
        self.state.state
    }

    pub fn current_holder(&self) -> Option<&str> {
        self.state.current.as_deref()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Feed the next page of text.
    pub fn feed_page(&mut self, text: &str) -> Result<(), ParseError> {
        self.state.page += 1;
        self.sink.page_started(self.state.page);
        for line in text.lines() {
            self.feed_line(line)?;
        }
        Ok(())
    }

    pub fn feed_line(&mut self, line: &str) -> Result<(), ParseError> {
        match self.classifier.classify(line) {
            LineKind::AccountTotal {
                holder,
                reported_total,
            } => self.on_account_total(holder, reported_total, line)?,
            LineKind::AccountHeader(holder) => self.on_account_header(holder, line)?,
            LineKind::ContinuationMarker { holder } => self.on_continuation(holder, line),
            LineKind::TableHeader => self.on_table_header(line),
            LineKind::TransactionDetail(txn) => self.on_detail(txn, line),
            LineKind::Unrecognized => self.sink.line_discarded(self.state.page, line),
        }
        Ok(())
    }

    /// End of input. Holders still open are reported, not treated as errors.
    pub fn finish(mut self) -> Result<ParseOutcome, ParseError> {
        if self.ledger.transaction_count() == 0 {
            return Err(ParseError::NoData);
        }

        let unclosed: Vec<String> = self
            .ledger
            .holders()
            .filter(|h| !self.closed.contains(*h))
            .map(str::to_string)
            .collect();
        for holder in &unclosed {
            self.sink.section_unclosed(holder);
        }

        Ok(ParseOutcome {
            ledger: self.ledger,
            discrepancies: self.discrepancies,
            unclosed,
        })
    }

    fn on_account_header(&mut self, holder: Holder, line: &str) -> Result<(), ParseError> {
        self.ensure_no_pending_continuation(line)?;
        self.open_section(&holder);
        self.state.current = Some(holder.name);
        self.state.state = ParserState::AwaitingTableHeader;
        Ok(())
    }

    fn on_continuation(&mut self, holder: Option<Holder>, line: &str) {
        if let Some(holder) = holder {
            self.open_section(&holder);
            self.state.current = Some(holder.name);
        }
        if self.state.current.is_none() {
            self.sink.line_discarded(self.state.page, line);
            return;
        }
        self.state.state = ParserState::Continuation;
    }

    fn on_table_header(&mut self, line: &str) {
        match self.state.state {
            ParserState::AwaitingTableHeader | ParserState::Continuation => {
                self.state.state = ParserState::InTable;
            }
            // Repeated column header inside a table.
            ParserState::InTable => {}
            ParserState::Idle => self.sink.line_discarded(self.state.page, line),
        }
    }

    fn on_detail(&mut self, txn: Transaction, line: &str) {
        let in_table = matches!(
            self.state.state,
            ParserState::InTable | ParserState::Continuation
        );
        let Some(holder) = self.state.current.as_deref().filter(|_| in_table) else {
            self.sink.line_discarded(self.state.page, line);
            return;
        };

        match self.ledger.record(holder, txn.clone()) {
            Some(section) => {
                self.sink.transaction_recorded(holder, &txn, section.total());
                // New activity after a total line reopens the section.
                self.closed.remove(holder);
                self.state.state = ParserState::InTable;
            }
            None => self.sink.line_discarded(self.state.page, line),
        }
    }

    fn on_account_total(
        &mut self,
        holder: Holder,
        reported: Decimal,
        line: &str,
    ) -> Result<(), ParseError> {
        self.ensure_no_pending_continuation(line)?;

        let Some(section) = self.ledger.get_mut(&holder.name) else {
            return Err(ParseError::UnknownHolder {
                holder: holder.name,
                page: self.state.page,
            });
        };
        if section.account() != holder.account {
            self.sink
                .account_number_changed(&holder.name, section.account(), &holder.account);
        }

        match reconcile(section, reported) {
            Verdict::Verified => self.sink.section_verified(&holder.name, reported),
            Verdict::Mismatch(discrepancy) => {
                self.sink.discrepancy(&discrepancy);
                self.discrepancies.push(discrepancy.clone());
                if self.options.mismatch_policy == MismatchPolicy::Abort {
                    return Err(ParseError::ReconciliationFailed(discrepancy));
                }
            }
        }

        self.closed.insert(holder.name);
        self.state.current = None;
        self.state.state = ParserState::Idle;
        Ok(())
    }

    fn open_section(&mut self, holder: &Holder) {
        let (section, created) = self.ledger.open(holder);
        if section.account() != holder.account {
            self.sink
                .account_number_changed(&holder.name, section.account(), &holder.account);
        }
        self.sink.section_opened(holder, created);
    }

    fn ensure_no_pending_continuation(&self, line: &str) -> Result<(), ParseError> {
        if !self.state.continuation_pending() {
            return Ok(());
        }
        Err(ParseError::ContinuationNotClosed {
            pending: self.state.current.clone().unwrap_or_default(),
            line: line.to_string(),
            page: self.state.page,
        })
    }
}

/// Parse every page of a statement with the default `tracing` diagnostics.
pub fn parse_statement(
    statement: &Statement,
    options: ParseOptions,
) -> Result<ParseOutcome, ParseError> {
    parse_statement_with(statement, options, TracingDiagnostics)
}

pub fn parse_statement_with<D: Diagnostics>(
    statement: &Statement,
    options: ParseOptions,
    sink: D,
) -> Result<ParseOutcome, ParseError> {
    let mut parser = StatementParser::with_diagnostics(options, sink)?;
    for page in statement.pages() {
        parser.feed_page(page)?;
    }
    parser.finish()
}
