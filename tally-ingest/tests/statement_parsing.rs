use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_ingest::{
    parse_statement, parse_statement_with, ParseError, ParseOptions, Recorder, Statement,
    StatementParser,
};

fn john_doe_lines(total: &str) -> Vec<String> {
    vec![
        "JOHN DOE #1234: Transactions".to_string(),
        "Trans Date Post Date Description Amount".to_string(),
        "Jan 5 Jan 6 Coffee Shop $4.50".to_string(),
        "Jan 6 Jan 7 Grocery Store $32.10".to_string(),
        format!("JOHN DOE #1234: Total Transactions {total}"),
    ]
}

fn one_page(lines: &[String]) -> Statement {
    Statement::from_pages([lines.join("\n")])
}

/// Two holders, the first one's table broken over a page.
fn two_page_statement() -> Statement {
    Statement::from_pages([
        "Capital One\nPage 1 of 2\n\
         JOHN DOE #1234: Transactions\n\
         Trans Date Post Date Description Amount\n\
         Jan 5 Jan 6 Coffee Shop $4.50\n\
         Jan 6 Jan 7 Grocery Store $32.10\n\
         Transactions (Continued)",
        "Page 2 of 2\n\
         Transactions (Continued)\n\
         Jan 9 Jan 10 Hardware Depot $1,204.99\n\
         JOHN DOE #1234: Total Transactions $1,241.59\n\
         JANE ROE #5678: Transactions\n\
         Trans Date Post Date Description Amount\n\
         Jan 12 Jan 13 Pharmacy $18.2\n\
         JANE ROE #5678: Total Transactions $18.20\n\
         Interest Charge on Purchases $0.00",
    ])
}

#[test]
fn test_john_doe_statement_verifies() {
    let outcome = parse_statement(&one_page(&john_doe_lines("$36.60")), ParseOptions::default())
        .expect("statement should parse");

    assert_eq!(outcome.ledger.len(), 1);
    let section = outcome.ledger.get("JOHN DOE").unwrap();
    assert_eq!(section.account(), "1234");
    assert_eq!(section.transactions_count(), 2);
    assert_eq!(section.total(), dec!(36.60));
    assert!(section.is_verified());
    assert!(outcome.discrepancies.is_empty());
    assert!(outcome.unclosed.is_empty());

    let first = &section.transactions()[0];
    assert_eq!(first.transaction_date, "Jan 5");
    assert_eq!(first.post_date, "Jan 6");
    assert_eq!(first.description, "Coffee Shop");
    assert_eq!(first.amount, dec!(4.50));
}

#[test]
fn test_mismatched_total_is_reported_not_fatal() {
    let outcome = parse_statement(&one_page(&john_doe_lines("$40.00")), ParseOptions::default())
        .expect("mismatch is not fatal by default");

    let section = outcome.ledger.get("JOHN DOE").unwrap();
    assert!(!section.is_verified());
    assert_eq!(outcome.discrepancies.len(), 1);
    let d = &outcome.discrepancies[0];
    assert_eq!(d.holder, "JOHN DOE");
    assert_eq!(d.expected, dec!(40.00));
    assert_eq!(d.actual, dec!(36.60));
    assert_eq!(outcome.unverified().count(), 1);
}

#[test]
fn test_continuation_carries_table_across_pages() {
    let outcome = parse_statement(&two_page_statement(), ParseOptions::default()).unwrap();

    let john = outcome.ledger.get("JOHN DOE").unwrap();
    assert_eq!(john.transactions_count(), 3);
    assert_eq!(john.transactions()[2].description, "Hardware Depot");
    assert_eq!(john.total(), dec!(1241.59));
    assert!(john.is_verified());

    let jane = outcome.ledger.get("JANE ROE").unwrap();
    assert_eq!(jane.transactions_count(), 1);
    assert!(jane.is_verified());
    assert!(outcome.all_verified());
}

#[test]
fn test_page_calls_match_concatenated_lines() {
    let statement = two_page_statement();
    let by_page = parse_statement(&statement, ParseOptions::default()).unwrap();

    let mut parser = StatementParser::new(ParseOptions::default()).unwrap();
    for line in statement.lines() {
        parser.feed_line(line).unwrap();
    }
    let by_line = parser.finish().unwrap();

    assert_eq!(by_page.ledger, by_line.ledger);
    assert_eq!(by_page.discrepancies, by_line.discrepancies);
}

#[test]
fn test_total_right_after_continuation_is_structural_violation() {
    let statement = Statement::from_pages([
        "JOHN DOE #1234: Transactions\n\
         Trans Date Post Date Description Amount\n\
         Jan 5 Jan 6 Coffee Shop $4.50\n\
         Transactions (Continued)",
        "JOHN DOE #1234: Total Transactions $4.50",
    ]);

    let err = parse_statement(&statement, ParseOptions::default()).unwrap_err();
    match err {
        ParseError::ContinuationNotClosed { pending, page, .. } => {
            assert_eq!(pending, "JOHN DOE");
            assert_eq!(page, 2);
        }
        other => panic!("expected a structural violation, got {other:?}"),
    }
}

#[test]
fn test_statement_without_sections_is_no_data() {
    let statement = Statement::from_pages(["Capital One\nAccount Summary\nPayments $100.00"]);
    assert!(matches!(
        parse_statement(&statement, ParseOptions::default()),
        Err(ParseError::NoData)
    ));
}

#[test]
fn test_parse_is_idempotent() {
    let statement = two_page_statement();
    let first = parse_statement(&statement, ParseOptions::default()).unwrap();
    let second = parse_statement(&statement, ParseOptions::default()).unwrap();

    let a = serde_json::to_string_pretty(&first.ledger).unwrap();
    let b = serde_json::to_string_pretty(&second.ledger).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_ledger_serializes_exact_amounts_as_strings() {
    let outcome =
        parse_statement(&one_page(&john_doe_lines("$36.60")), ParseOptions::default()).unwrap();
    let value = serde_json::to_value(&outcome.ledger).unwrap();

    let john = &value["JOHN DOE"];
    assert_eq!(john["account"], "1234");
    assert_eq!(john["transactions_count"], 2);
    assert_eq!(john["transactions_total_amount"], "36.60");
    assert_eq!(john["verified_amounts"], true);
    assert_eq!(john["transactions"][1]["amount"], "32.10");
    assert_eq!(john["transactions"][1]["description"], "Grocery Store");
    assert_eq!(john["transactions"][1]["transaction_date"], "Jan 6");
    assert_eq!(john["transactions"][1]["post_date"], "Jan 7");
}

#[test]
fn test_verified_sections_sum_to_their_totals() {
    let outcome = parse_statement(&two_page_statement(), ParseOptions::default()).unwrap();
    for section in outcome.ledger.sections().filter(|s| s.is_verified()) {
        let sum: Decimal = section.transactions().iter().map(|t| t.amount).sum();
        assert_eq!(sum, section.total());
        assert_eq!(section.transactions().len(), section.transactions_count());
    }
}

#[test]
fn test_noise_lines_are_reported_as_discarded() {
    let mut recorder = Recorder::new();
    parse_statement_with(&two_page_statement(), ParseOptions::default(), &mut recorder).unwrap();

    let discarded: Vec<_> = recorder.discarded_lines().collect();
    assert!(discarded.contains(&"Capital One"));
    assert!(discarded.contains(&"Page 2 of 2"));
    assert!(discarded.contains(&"Interest Charge on Purchases $0.00"));
}

#[test]
fn test_holder_reopened_later_keeps_accumulating() {
    let statement = Statement::from_pages([
        "JOHN DOE #1234: Transactions\n\
         Trans Date Post Date Description Amount\n\
         Jan 5 Jan 6 Coffee Shop $4.50",
        "JOHN DOE #1234: Transactions\n\
         Trans Date Post Date Description Amount\n\
         Jan 6 Jan 7 Grocery Store $32.10\n\
         JOHN DOE #1234: Total Transactions $36.60",
    ]);
    let outcome = parse_statement(&statement, ParseOptions::default()).unwrap();
    let john = outcome.ledger.get("JOHN DOE").unwrap();
    assert_eq!(john.transactions_count(), 2);
    assert!(john.is_verified());
}

#[test]
fn test_activity_after_total_reopens_section() {
    let statement = Statement::from_pages([
        "JOHN DOE #1234: Transactions\n\
         Trans Date Post Date Description Amount\n\
         Jan 5 Jan 6 Coffee Shop $4.50\n\
         JOHN DOE #1234: Total Transactions $4.50",
        "JOHN DOE #1234: Transactions\n\
         Trans Date Post Date Description Amount\n\
         Jan 6 Jan 7 Grocery Store $32.10",
    ]);
    let outcome = parse_statement(&statement, ParseOptions::default()).unwrap();

    let john = outcome.ledger.get("JOHN DOE").unwrap();
    assert_eq!(john.total(), dec!(36.60));
    assert!(!john.is_verified(), "verified against $4.50 but now totals {}", john.total());
    assert_eq!(outcome.unclosed, vec!["JOHN DOE".to_string()]);
    assert!(!outcome.all_verified());
}

#[test]
fn test_overflowing_amount_contributes_nothing() {
    const HUGE: &str = "Jan 5 Jan 6 Wire Transfer $50,000,000,000,000,000,000,000,000,000.00";
    let statement = Statement::from_pages([format!(
        "JOHN DOE #1234: Transactions\n\
         Trans Date Post Date Description Amount\n\
         {HUGE}\n\
         {HUGE}"
    )]);

    let mut recorder = Recorder::new();
    let outcome =
        parse_statement_with(&statement, ParseOptions::default(), &mut recorder).unwrap();

    let john = outcome.ledger.get("JOHN DOE").unwrap();
    assert_eq!(john.transactions_count(), 1);
    assert_eq!(john.transactions().len(), 1);
    assert_eq!(john.total(), john.transactions()[0].amount);
    assert!(recorder.discarded_lines().any(|l| l == HUGE));
}
