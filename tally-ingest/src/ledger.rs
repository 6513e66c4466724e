//! Ledger store: account sections keyed by holder name.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{AccountSection, Holder, Transaction};

/// All account sections seen in one parse run.
///
/// Keyed by holder name and kept sorted so serialized output is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Ledger {
    sections: BTreeMap<String, AccountSection>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the holder's section, creating it on first sighting.
    /// The flag is true when the section was created by this call.
    pub fn open(&mut self, holder: &Holder) -> (&mut AccountSection, bool) {
        let mut created = false;
        let section = self.sections.entry(holder.name.clone()).or_insert_with(|| {
            created = true;
            AccountSection::new(holder)
        });
        (section, created)
    }

    /// Append to an existing section. Returns `None` when nothing was
    /// recorded: the holder has no section, or its total would overflow.
    pub fn record(&mut self, holder: &str, txn: Transaction) -> Option<&AccountSection> {
        let section = self.sections.get_mut(holder)?;
        if !section.push(txn) {
            return None;
        }
        Some(section)
    }

    pub fn get(&self, holder: &str) -> Option<&AccountSection> {
        self.sections.get(holder)
    }

    pub(crate) fn get_mut(&mut self, holder: &str) -> Option<&mut AccountSection> {
        self.sections.get_mut(holder)
    }

    pub fn contains(&self, holder: &str) -> bool {
        self.sections.contains_key(holder)
    }

    pub fn sections(&self) -> impl Iterator<Item = &AccountSection> {
        self.sections.values()
    }

    pub fn holders(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Number of transactions across every section.
    pub fn transaction_count(&self) -> usize {
        self.sections.values().map(AccountSection::transactions_count).sum()
    }
}
