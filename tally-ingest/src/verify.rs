//! Reconciliation of accumulated totals against statement-reported totals.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::money::format_money;
use crate::types::AccountSection;

/// A holder whose parsed transactions do not add up to the reported total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discrepancy {
    pub holder: String,
    pub account: String,
    /// Total printed on the statement.
    pub expected: Decimal,
    /// Sum of the transactions we parsed.
    pub actual: Decimal,
}

impl Discrepancy {
    pub fn difference(&self) -> Decimal {
        self.expected - self.actual
    }
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} #{}: statement reports {} but parsed transactions total {}",
            self.holder,
            self.account,
            format_money(self.expected),
            format_money(self.actual)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Verified,
    Mismatch(Discrepancy),
}

/// Compare the section's running total with the reported one and set its
/// verified flag. Equality is exact: `36.6` and `36.60` match, `36.59` does not.
pub fn reconcile(section: &mut AccountSection, reported: Decimal) -> Verdict {
    if section.total() == reported {
        section.set_verified(true);
        return Verdict::Verified;
    }

    section.set_verified(false);
    Verdict::Mismatch(Discrepancy {
        holder: section.holder().to_string(),
        account: section.account().to_string(),
        expected: reported,
        actual: section.total(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Holder, Transaction};
    use rust_decimal_macros::dec;

    fn section_with(amounts: &[Decimal]) -> AccountSection {
        let mut section = AccountSection::new(&Holder::new("JOHN DOE", "1234"));
        for amount in amounts {
            section.push(Transaction {
                transaction_date: "Jan 5".to_string(),
                post_date: "Jan 6".to_string(),
                description: "Coffee Shop".to_string(),
                amount: *amount,
            });
        }
        section
    }

    #[test]
    fn test_exact_match_verifies() {
        let mut section = section_with(&[dec!(4.50), dec!(32.10)]);
        assert_eq!(reconcile(&mut section, dec!(36.60)), Verdict::Verified);
        assert!(section.is_verified());
    }

    #[test]
    fn test_scale_does_not_matter() {
        let mut section = section_with(&[dec!(4.5), dec!(32.1)]);
        assert_eq!(reconcile(&mut section, dec!(36.60)), Verdict::Verified);
    }

    #[test]
    fn test_mismatch_reports_both_totals() {
        let mut section = section_with(&[dec!(4.50), dec!(32.10)]);
        let Verdict::Mismatch(d) = reconcile(&mut section, dec!(40.00)) else {
            panic!("expected a mismatch");
        };
        assert!(!section.is_verified());
        assert_eq!(d.expected, dec!(40.00));
        assert_eq!(d.actual, dec!(36.60));
        assert_eq!(d.difference(), dec!(3.40));
        assert_eq!(
            d.to_string(),
            "JOHN DOE #1234: statement reports $40.00 but parsed transactions total $36.60"
        );
    }

    #[test]
    fn test_one_cent_off_is_a_mismatch() {
        let mut section = section_with(&[dec!(0.10), dec!(0.20)]);
        assert!(matches!(reconcile(&mut section, dec!(0.31)), Verdict::Mismatch(_)));
    }

    #[test]
    fn test_mismatch_clears_earlier_verification() {
        let mut section = section_with(&[dec!(1.00)]);
        reconcile(&mut section, dec!(1.00));
        assert!(section.is_verified());
        assert!(matches!(reconcile(&mut section, dec!(2.00)), Verdict::Mismatch(_)));
        assert!(!section.is_verified());
    }
}
