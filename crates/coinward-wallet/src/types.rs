//! Wallet data model: outpoints, UTXOs, and transaction records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// `(transaction id, output index)` identifying one output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Outpoint {
    pub transaction_id: String,
    pub index: u32,
}

impl Outpoint {
    pub fn new(transaction_id: impl Into<String>, index: u32) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            index,
        }
    }

    /// Canonical map key for this outpoint.
    pub fn id(&self) -> OutpointId {
        OutpointId(format!("{}:{}", self.transaction_id, self.index))
    }
}

/// Canonical string key of an [`Outpoint`]: `"<transaction id>:<index>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutpointId(String);

impl OutpointId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OutpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&Outpoint> for OutpointId {
    fn from(outpoint: &Outpoint) -> Self {
        outpoint.id()
    }
}

/// An output as reported by the indexer for one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoEntry {
    pub outpoint: Outpoint,
    /// Hex-encoded locking script.
    pub script_public_key: String,
    /// Value in atomic units.
    pub value: u64,
}

/// A known unspent output owned by one of the wallet's addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub outpoint: Outpoint,
    pub address: String,
    /// Hex-encoded locking script.
    pub script_public_key: String,
    /// Value in atomic units.
    pub value: u64,
}

impl Utxo {
    pub fn from_entry(entry: UtxoEntry, address: &str) -> Self {
        Self {
            outpoint: entry.outpoint,
            address: address.to_string(),
            script_public_key: entry.script_public_key,
            value: entry.value,
        }
    }

    pub fn id(&self) -> OutpointId {
        self.outpoint.id()
    }
}

/// A transaction touching one of the wallet's addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRecord {
    pub transaction_id: String,
    /// Hash of the block that accepted the transaction, if any yet.
    pub accepting_block_hash: Option<String>,
    /// Blue score of the accepting block; the global ordering key.
    pub accepting_blue_score: Option<u64>,
    /// Block time in milliseconds since the epoch.
    pub block_time: Option<u64>,
}

impl TxRecord {
    pub fn is_accepted(&self) -> bool {
        self.accepting_blue_score.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outpoint_id_format() {
        let op = Outpoint::new("tx1", 0);
        assert_eq!(op.id().as_str(), "tx1:0");
        assert_eq!(OutpointId::from(&Outpoint::new("ab", 12)).to_string(), "ab:12");
    }

    #[test]
    fn test_outpoint_id_serializes_as_string() {
        let id = Outpoint::new("tx2", 3).id();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"tx2:3\"");
    }
}
