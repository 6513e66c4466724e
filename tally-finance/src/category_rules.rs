//! Deterministic expense categories from transaction descriptions.
//!
//! Keywords are matched as whole words on an upper-cased, punctuation-free
//! copy of the description, so `RENT` does not fire on `CURRENT`.

use serde::{Deserialize, Serialize};
use tally_ingest::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Rent,
    Utilities,
    Groceries,
    Transportation,
    Entertainment,
    Healthcare,
    Miscellaneous,
    Unknown,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Rent => "rent",
            ExpenseCategory::Utilities => "utilities",
            ExpenseCategory::Groceries => "groceries",
            ExpenseCategory::Transportation => "transportation",
            ExpenseCategory::Entertainment => "entertainment",
            ExpenseCategory::Healthcare => "healthcare",
            ExpenseCategory::Miscellaneous => "miscellaneous",
            ExpenseCategory::Unknown => "unknown",
        }
    }
}

/// Checked in order; the first category with a matching keyword wins.
const RULES: &[(ExpenseCategory, &[&str])] = &[
    (
        ExpenseCategory::Healthcare,
        &[
            "PHARMACY", "CVS", "WALGREENS", "CLINIC", "DENTAL", "DENTIST", "HOSPITAL",
            "MEDICAL", "DOCTOR", "OPTOMETRY", "URGENT CARE",
        ],
    ),
    (
        ExpenseCategory::Rent,
        &["RENT", "LEASE", "APARTMENT", "APARTMENTS", "LANDLORD", "PROPERTY MGMT"],
    ),
    (
        ExpenseCategory::Utilities,
        &[
            "ELECTRIC", "ENERGY", "WATER", "UTILITY", "UTILITIES", "COMCAST", "XFINITY",
            "SPECTRUM", "VERIZON", "AT T", "T MOBILE", "INTERNET",
        ],
    ),
    (
        ExpenseCategory::Groceries,
        &[
            "GROCERY", "GROCERIES", "H E B", "HEB", "KROGER", "SAFEWAY", "WHOLE FOODS",
            "TRADER JOE S", "ALDI", "COSTCO", "PUBLIX", "SUPERMARKET",
        ],
    ),
    (
        ExpenseCategory::Transportation,
        &[
            "SHELL", "EXXON", "EXXONMOBIL", "CHEVRON", "FUEL", "UBER", "LYFT", "PARKING",
            "TOLL", "TOLLWAY", "TRANSIT", "AIRLINES", "AIRLINE",
        ],
    ),
    (
        ExpenseCategory::Entertainment,
        &[
            "NETFLIX", "SPOTIFY", "HULU", "DISNEY", "CINEMA", "THEATER", "THEATRE", "STEAM",
            "XBOX", "PLAYSTATION", "TICKETMASTER",
        ],
    ),
    (
        ExpenseCategory::Miscellaneous,
        &[
            "PAYMENT", "FEE", "INTEREST", "AMAZON", "TARGET", "WALMART", "COFFEE", "CAFE",
            "RESTAURANT", "STORE", "SHOP",
        ],
    ),
];

/// Categorize a transaction by its description.
pub fn categorize(txn: &Transaction) -> ExpenseCategory {
    categorize_description(&txn.description)
}

pub fn categorize_description(description: &str) -> ExpenseCategory {
    let words = normalize(description);

    for (category, keywords) in RULES {
        if keywords
            .iter()
            .any(|kw| words.contains(&format!(" {} ", normalize(kw).trim())))
        {
            return *category;
        }
    }

    ExpenseCategory::Unknown
}

/// Upper-case, punctuation to spaces, single spaces, padded on both ends.
fn normalize(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_uppercase() } else { ' ' })
        .collect();
    let mut out = String::from(" ");
    for word in cleaned.split_whitespace() {
        out.push_str(word);
        out.push(' ');
    }
    out
}
