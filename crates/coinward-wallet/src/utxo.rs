//! Known unspent outputs and input selection.
//!
//! The set keeps every known output in insertion order, plus an ordered
//! subset of ids that are reserved by pending spends. Balances are always
//! recomputed from membership; nothing is cached.

use crate::error::WalletError;
use crate::types::{OutpointId, Utxo, UtxoEntry};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Outputs chosen to cover a target amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionResult {
    pub selected_ids: Vec<OutpointId>,
    pub selected: Vec<Utxo>,
    /// Sum of the selected values; always at least the target.
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoSet {
    known: IndexMap<OutpointId, Utxo>,
    in_use: IndexSet<OutpointId>,
}

impl UtxoSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert outputs owned by `owning_address`, skipping any already known.
    ///
    /// Returns the ids that were actually inserted.
    pub fn add(&mut self, entries: Vec<UtxoEntry>, owning_address: &str) -> Vec<OutpointId> {
        let mut inserted = Vec::new();
        for entry in entries {
            let id = entry.outpoint.id();
            if self.known.contains_key(&id) || self.in_use.contains(&id) {
                continue;
            }
            self.known
                .insert(id.clone(), Utxo::from_entry(entry, owning_address));
            inserted.push(id);
        }
        if !inserted.is_empty() {
            log::debug!(
                "added {} utxo(s) for {}, available balance {}",
                inserted.len(),
                owning_address,
                self.available_balance()
            );
        }
        inserted
    }

    /// Mark ids as in-use. Every id must be known; nothing changes otherwise.
    pub fn reserve(&mut self, ids: &[OutpointId]) -> Result<(), WalletError> {
        if let Some(missing) = ids.iter().find(|id| !self.known.contains_key(*id)) {
            return Err(WalletError::UnknownOutpoint(missing.to_string()));
        }
        self.in_use.extend(ids.iter().cloned());
        Ok(())
    }

    /// Clear the in-use mark on `ids`. Ids that are not reserved are ignored.
    pub fn release(&mut self, ids: &[OutpointId]) {
        for id in ids {
            self.in_use.shift_remove(id);
        }
    }

    /// Greedy selection over available outputs in insertion order.
    ///
    /// Stops as soon as the running sum reaches `target`. On failure the
    /// error reports the sum of everything scanned.
    pub fn select_inputs(&self, target: u64) -> Result<SelectionResult, WalletError> {
        let mut result = SelectionResult {
            selected_ids: Vec::new(),
            selected: Vec::new(),
            total: 0,
        };
        for (id, utxo) in self.available() {
            if result.total >= target {
                break;
            }
            result.total = result.total.saturating_add(utxo.value);
            result.selected_ids.push(id.clone());
            result.selected.push(utxo.clone());
        }
        if result.total < target {
            return Err(WalletError::InsufficientFunds {
                required: target,
                available: result.total,
            });
        }
        Ok(result)
    }

    fn available(&self) -> impl Iterator<Item = (&OutpointId, &Utxo)> {
        self.known
            .iter()
            .filter(move |(id, _)| !self.in_use.contains(*id))
    }

    /// Sum of known outputs that are not in use.
    pub fn available_balance(&self) -> u64 {
        self.available()
            .fold(0u64, |acc, (_, u)| acc.saturating_add(u.value))
    }

    /// Sum of every known output, reserved or not.
    pub fn total_balance(&self) -> u64 {
        self.known
            .values()
            .fold(0u64, |acc, u| acc.saturating_add(u.value))
    }

    pub fn get(&self, id: &OutpointId) -> Option<&Utxo> {
        self.known.get(id)
    }

    pub fn is_in_use(&self, id: &OutpointId) -> bool {
        self.in_use.contains(id)
    }

    pub fn in_use_ids(&self) -> impl Iterator<Item = &OutpointId> {
        self.in_use.iter()
    }

    /// Known outputs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Utxo> {
        self.known.values()
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    pub fn clear(&mut self) {
        self.known.clear();
        self.in_use.clear();
    }
}
