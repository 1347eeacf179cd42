//! Signed transactions awaiting confirmation.

use crate::error::WalletError;
use crate::types::OutpointId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A locally committed spend whose inputs stay reserved until it is
/// confirmed or abandoned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    pub id: String,
    #[serde(with = "hex_bytes")]
    pub raw_signed_bytes: Vec<u8>,
    pub reserved_outpoints: Vec<OutpointId>,
    /// Amount plus fee, in atomic units.
    pub total_debited: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingLedger {
    entries: IndexMap<String, PendingTransaction>,
}

impl PendingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: PendingTransaction) -> Result<(), WalletError> {
        if self.entries.contains_key(&entry.id) {
            return Err(WalletError::DuplicatePendingId(entry.id));
        }
        log::debug!(
            "pending {} debits {} across {} input(s)",
            entry.id,
            entry.total_debited,
            entry.reserved_outpoints.len()
        );
        self.entries.insert(entry.id.clone(), entry);
        Ok(())
    }

    /// Drop the entry and hand back the outpoints it was holding.
    pub fn remove(&mut self, id: &str) -> Result<Vec<OutpointId>, WalletError> {
        self.entries
            .shift_remove(id)
            .map(|entry| entry.reserved_outpoints)
            .ok_or_else(|| WalletError::UnknownPendingId(id.to_string()))
    }

    pub fn total_pending_amount(&self) -> u64 {
        self.entries
            .values()
            .fold(0u64, |acc, e| acc.saturating_add(e.total_debited))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&PendingTransaction> {
        self.entries.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingTransaction> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Outpoint;

    fn pending(id: &str, debited: u64) -> PendingTransaction {
        PendingTransaction {
            id: id.into(),
            raw_signed_bytes: vec![0xde, 0xad],
            reserved_outpoints: vec![Outpoint::new(format!("{}-in", id), 0).id()],
            total_debited: debited,
        }
    }

    #[test]
    fn test_empty_ledger() {
        let ledger = PendingLedger::new();
        assert_eq!(ledger.total_pending_amount(), 0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_record_and_total() {
        let mut ledger = PendingLedger::new();
        ledger.record(pending("a", 100)).unwrap();
        ledger.record(pending("b", 250)).unwrap();
        assert_eq!(ledger.total_pending_amount(), 350);
        assert_eq!(ledger.ids().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut ledger = PendingLedger::new();
        ledger.record(pending("a", 100)).unwrap();
        let err = ledger.record(pending("a", 999)).unwrap_err();
        assert!(matches!(err, WalletError::DuplicatePendingId(ref id) if id == "a"));
        assert_eq!(ledger.total_pending_amount(), 100);
    }

    #[test]
    fn test_remove_returns_outpoints() {
        let mut ledger = PendingLedger::new();
        ledger.record(pending("a", 100)).unwrap();
        let released = ledger.remove("a").unwrap();
        assert_eq!(released, vec![Outpoint::new("a-in", 0).id()]);
        assert!(!ledger.contains("a"));
        assert!(matches!(
            ledger.remove("a"),
            Err(WalletError::UnknownPendingId(_))
        ));
    }

    #[test]
    fn test_serializes_bytes_as_hex() {
        let mut ledger = PendingLedger::new();
        ledger.record(pending("a", 1)).unwrap();
        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(json["entries"]["a"]["raw_signed_bytes"], "dead");
        let back: PendingLedger = serde_json::from_value(json).unwrap();
        assert_eq!(back, ledger);
    }
}
