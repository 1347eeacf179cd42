//! Per-address transaction history and the merged wallet-wide view.

use crate::types::TxRecord;
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct TransactionHistoryIndex {
    by_address: IndexMap<String, Vec<TxRecord>>,
    merged: Vec<TxRecord>,
}

impl TransactionHistoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the history of `address` and rebuild the merged sequence.
    pub fn ingest(&mut self, address: &str, records: Vec<TxRecord>) {
        self.by_address.insert(address.to_string(), records);
        self.rebuild();
    }

    /// Ingest several addresses with a single rebuild.
    pub fn ingest_all<I>(&mut self, histories: I)
    where
        I: IntoIterator<Item = (String, Vec<TxRecord>)>,
    {
        for (address, records) in histories {
            self.by_address.insert(address, records);
        }
        self.rebuild();
    }

    fn rebuild(&mut self) {
        let mut unique: HashMap<&str, &TxRecord> = HashMap::new();
        for record in self.by_address.values().flatten() {
            unique
                .entry(record.transaction_id.as_str())
                .and_modify(|seen| {
                    if !seen.is_accepted() && record.is_accepted() {
                        *seen = record;
                    }
                })
                .or_insert(record);
        }
        let mut merged: Vec<TxRecord> = unique.into_values().cloned().collect();
        merged.sort_by(newest_first);
        self.merged = merged;
    }

    /// Every known transaction, newest first. Unaccepted ones lead.
    pub fn merged(&self) -> &[TxRecord] {
        &self.merged
    }

    pub fn for_address(&self, address: &str) -> &[TxRecord] {
        self.by_address
            .get(address)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Addresses with at least one transaction.
    pub fn active_addresses(&self) -> impl Iterator<Item = &str> {
        self.by_address
            .iter()
            .filter(|(_, records)| !records.is_empty())
            .map(|(address, _)| address.as_str())
    }

    pub fn clear(&mut self) {
        self.by_address.clear();
        self.merged.clear();
    }
}

fn newest_first(a: &TxRecord, b: &TxRecord) -> Ordering {
    match (a.accepting_blue_score, b.accepting_blue_score) {
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => y.cmp(&x),
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.transaction_id.cmp(&b.transaction_id))
}
