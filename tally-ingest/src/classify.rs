//! Line classifier for Capital One style statement text.
//!
//! Expected text after PDF-to-text:
//!   JOHN DOE #1234: Transactions
//!   Trans Date Post Date Description Amount
//!   Jan 5 Jan 6 Coffee Shop $4.50
//!   JOHN DOE #1234: Transactions (Continued)
//!   JOHN DOE #1234: Total Transactions $36.60

use regex::{Captures, Regex};
use rust_decimal::Decimal;

use crate::money::{parse_money, AMOUNT_PATTERN};
use crate::types::{Holder, Transaction};

pub const TABLE_HEADER: &str = "Trans Date Post Date Description Amount";
pub const CONTINUED_MARKER: &str = "Transactions (Continued)";

/// What a single line of statement text is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    AccountTotal { holder: Holder, reported_total: Decimal },
    AccountHeader(Holder),
    /// The holder is present when the marker line names one.
    ContinuationMarker { holder: Option<Holder> },
    TableHeader,
    TransactionDetail(Transaction),
    Unrecognized,
}

/// Compiled statement grammar. Build once per parse and reuse for every line.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    total_re: Regex,
    header_re: Regex,
    continued_re: Regex,
    txn_re: Regex,
}

const HOLDER_PREFIX: &str = r"^(?P<name>[A-Z][A-Z ]*) #(?P<account>\d+):";

impl LineClassifier {
    pub fn new() -> Result<Self, regex::Error> {
        let total_re = Regex::new(&format!(
            r"{HOLDER_PREFIX} Total Transactions (?P<amount>{AMOUNT_PATTERN})\s*$"
        ))?;
        let header_re = Regex::new(&format!(r"{HOLDER_PREFIX} Transactions\s*$"))?;
        let continued_re = Regex::new(&format!(r"{HOLDER_PREFIX} Transactions \(Continued\)"))?;
        let txn_re = Regex::new(&format!(
            concat!(
                r"^\s*(?P<trans>[A-Za-z]{{3}} \d{{1,2}})\s+",
                r"(?P<post>[A-Za-z]{{3}} \d{{1,2}})\s+",
                r"(?P<desc>[\w\s*].*?[A-Za-z])\s+",
                r"(?P<amount>{})\s*$"
            ),
            AMOUNT_PATTERN
        ))?;

        Ok(Self {
            total_re,
            header_re,
            continued_re,
            txn_re,
        })
    }

    /// Classify one line. Patterns are tried most specific first.
    pub fn classify(&self, line: &str) -> LineKind {
        if let Some(caps) = self.total_re.captures(line) {
            return match parse_money(&caps["amount"]) {
                Ok(reported_total) => LineKind::AccountTotal {
                    holder: holder_from(&caps),
                    reported_total,
                },
                Err(_) => LineKind::Unrecognized,
            };
        }

        if let Some(caps) = self.header_re.captures(line) {
            return LineKind::AccountHeader(holder_from(&caps));
        }

        if line.contains(CONTINUED_MARKER) {
            let holder = self.continued_re.captures(line).map(|caps| holder_from(&caps));
            return LineKind::ContinuationMarker { holder };
        }

        if is_table_header(line) {
            return LineKind::TableHeader;
        }

        if let Some(caps) = self.txn_re.captures(line) {
            // Shape matched but the amount did not parse: the line contributes nothing.
            let Ok(amount) = parse_money(&caps["amount"]) else {
                return LineKind::Unrecognized;
            };
            return LineKind::TransactionDetail(Transaction {
                transaction_date: caps["trans"].to_string(),
                post_date: caps["post"].to_string(),
                description: caps["desc"].trim().to_string(),
                amount,
            });
        }

        LineKind::Unrecognized
    }
}

fn holder_from(caps: &Captures<'_>) -> Holder {
    Holder::new(caps["name"].trim(), &caps["account"])
}

/// Column header, compared with runs of whitespace collapsed so padded
/// column layouts still match.
fn is_table_header(line: &str) -> bool {
    let mut words = line.split_whitespace();
    TABLE_HEADER
        .split(' ')
        .all(|expected| words.next() == Some(expected))
        && words.next().is_none()
}
