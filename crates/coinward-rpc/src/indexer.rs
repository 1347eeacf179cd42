//! Indexer RPC client.
//!
//! Typed async methods for the address-indexing REST API: per-address
//! unspent outputs, per-address transaction history, and transaction
//! submission.

use crate::client::{RestClient, RpcConfig};
use crate::error::RpcError;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Response Types
// =============================================================================

/// Outpoint as reported by the indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutpointInfo {
    pub transaction_id: String,
    pub index: u32,
}

/// Locking script wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptPublicKeyInfo {
    #[serde(default)]
    pub version: u16,
    pub script_public_key: String,
}

/// UTXO entry payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtxoEntryInfo {
    /// Amount in atomic units. Indexers send this either as a JSON string or
    /// a number; both are accepted.
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub amount: u64,
    pub script_public_key: ScriptPublicKeyInfo,
    #[serde(default)]
    pub block_daa_score: Option<String>,
    #[serde(default)]
    pub is_coinbase: bool,
}

/// One element of `GET /addresses/{address}/utxos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressUtxo {
    #[serde(default)]
    pub address: Option<String>,
    pub outpoint: OutpointInfo,
    pub utxo_entry: UtxoEntryInfo,
}

/// One element of `GET /addresses/{address}/transactions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressTransaction {
    pub transaction_id: String,
    #[serde(default)]
    pub accepting_block_hash: Option<String>,
    #[serde(default)]
    pub accepting_blue_score: Option<u64>,
    #[serde(default)]
    pub block_time: Option<u64>,
    #[serde(default)]
    pub is_accepted: bool,
}

/// `POST /transactions` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResult {
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

fn u64_from_str_or_num<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

// =============================================================================
// Client
// =============================================================================

/// Indexer REST client.
pub struct IndexerRpc {
    client: RestClient,
}

impl IndexerRpc {
    /// Create an indexer client connected to the given URL.
    pub fn new(url: &str) -> Result<Self, RpcError> {
        Ok(Self {
            client: RestClient::new(url)?,
        })
    }

    /// Create with full configuration.
    pub fn with_config(config: RpcConfig) -> Result<Self, RpcError> {
        Ok(Self {
            client: RestClient::with_config(config)?,
        })
    }

    /// Get the underlying REST client for custom calls.
    pub fn client(&self) -> &RestClient {
        &self.client
    }

    /// Unspent outputs currently locked to `address`.
    pub async fn get_utxos(&self, address: &str) -> Result<Vec<AddressUtxo>, RpcError> {
        let val = self
            .client
            .get(&format!("/addresses/{}/utxos", address))
            .await?;
        Ok(serde_json::from_value(val)?)
    }

    /// Every transaction that touched `address`.
    pub async fn get_transactions(
        &self,
        address: &str,
    ) -> Result<Vec<AddressTransaction>, RpcError> {
        let val = self
            .client
            .get(&format!("/addresses/{}/transactions", address))
            .await?;
        Ok(serde_json::from_value(val)?)
    }

    /// Submit a signed transaction (hex-encoded). Returns the accepted id.
    pub async fn submit_transaction(&self, tx_hex: &str) -> Result<String, RpcError> {
        let val = self
            .client
            .post(
                "/transactions",
                &serde_json::json!({ "transaction": tx_hex }),
            )
            .await?;
        let result: SubmitResult = serde_json::from_value(val)?;
        if let Some(err) = result.error {
            return Err(RpcError::Rejected(err));
        }
        result
            .transaction_id
            .ok_or_else(|| RpcError::Other("submit response carried no transactionId".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexer_creation() {
        let rpc = IndexerRpc::new("http://localhost:18110").unwrap();
        assert_eq!(rpc.client().url(), "http://localhost:18110");
    }

    #[test]
    fn test_utxo_deserialize_string_amount() {
        let json = serde_json::json!([{
            "address": "cwtest:00",
            "outpoint": { "transactionId": "aa", "index": 1 },
            "utxoEntry": {
                "amount": "150000000",
                "scriptPublicKey": { "scriptPublicKey": "20ac" },
                "blockDaaScore": "1234",
                "isCoinbase": false
            }
        }]);
        let utxos: Vec<AddressUtxo> = serde_json::from_value(json).unwrap();
        assert_eq!(utxos.len(), 1);
        assert_eq!(utxos[0].outpoint.index, 1);
        assert_eq!(utxos[0].utxo_entry.amount, 150_000_000);
        assert_eq!(utxos[0].utxo_entry.script_public_key.version, 0);
    }

    #[test]
    fn test_utxo_deserialize_numeric_amount() {
        let json = serde_json::json!({
            "outpoint": { "transactionId": "bb", "index": 0 },
            "utxoEntry": {
                "amount": 42,
                "scriptPublicKey": { "version": 0, "scriptPublicKey": "20ac" }
            }
        });
        let utxo: AddressUtxo = serde_json::from_value(json).unwrap();
        assert_eq!(utxo.utxo_entry.amount, 42);
        assert!(utxo.address.is_none());
    }

    #[test]
    fn test_utxo_rejects_non_numeric_amount() {
        let json = serde_json::json!({
            "outpoint": { "transactionId": "bb", "index": 0 },
            "utxoEntry": {
                "amount": "1.5",
                "scriptPublicKey": { "scriptPublicKey": "20ac" }
            }
        });
        assert!(serde_json::from_value::<AddressUtxo>(json).is_err());
    }

    #[test]
    fn test_transaction_deserialize() {
        let json = serde_json::json!([
            { "transactionId": "t1", "acceptingBlockHash": "b1", "acceptingBlueScore": 99, "blockTime": 1700000000000u64, "isAccepted": true },
            { "transactionId": "t2" }
        ]);
        let txs: Vec<AddressTransaction> = serde_json::from_value(json).unwrap();
        assert_eq!(txs[0].accepting_blue_score, Some(99));
        assert!(txs[0].is_accepted);
        assert_eq!(txs[1].accepting_block_hash, None);
        assert!(!txs[1].is_accepted);
    }

    #[test]
    fn test_submit_result_deserialize() {
        let ok: SubmitResult =
            serde_json::from_value(serde_json::json!({ "transactionId": "cc" })).unwrap();
        assert_eq!(ok.transaction_id.as_deref(), Some("cc"));
        let err: SubmitResult =
            serde_json::from_value(serde_json::json!({ "error": "orphan" })).unwrap();
        assert_eq!(err.error.as_deref(), Some("orphan"));
    }
}
