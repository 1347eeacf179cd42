//! Indexer and broadcaster over the REST client.

use crate::backend::{Broadcaster, Indexer};
use crate::error::WalletError;
use crate::types::{Outpoint, TxRecord, UtxoEntry};
use async_trait::async_trait;
use coinward_rpc::{AddressTransaction, AddressUtxo, IndexerRpc, RpcError};

fn network_error(e: RpcError) -> WalletError {
    WalletError::Network(e.to_string())
}

impl From<AddressUtxo> for UtxoEntry {
    fn from(u: AddressUtxo) -> Self {
        UtxoEntry {
            outpoint: Outpoint::new(u.outpoint.transaction_id, u.outpoint.index),
            script_public_key: u.utxo_entry.script_public_key.script_public_key,
            value: u.utxo_entry.amount,
        }
    }
}

impl From<AddressTransaction> for TxRecord {
    fn from(t: AddressTransaction) -> Self {
        // some indexers report a score for transactions they later flag as not accepted
        let accepting_blue_score = if t.is_accepted || t.accepting_block_hash.is_some() {
            t.accepting_blue_score
        } else {
            None
        };
        TxRecord {
            transaction_id: t.transaction_id,
            accepting_block_hash: t.accepting_block_hash,
            accepting_blue_score,
            block_time: t.block_time,
        }
    }
}

#[async_trait]
impl Indexer for IndexerRpc {
    async fn fetch_utxos(&self, address: &str) -> Result<Vec<UtxoEntry>, WalletError> {
        let utxos = self.get_utxos(address).await.map_err(network_error)?;
        Ok(utxos.into_iter().map(UtxoEntry::from).collect())
    }

    async fn fetch_history(&self, address: &str) -> Result<Vec<TxRecord>, WalletError> {
        let txs = self.get_transactions(address).await.map_err(network_error)?;
        Ok(txs.into_iter().map(TxRecord::from).collect())
    }
}

#[async_trait]
impl Broadcaster for IndexerRpc {
    async fn submit(&self, signed_bytes: &[u8]) -> Result<String, WalletError> {
        self.submit_transaction(&hex::encode(signed_bytes))
            .await
            .map_err(network_error)
    }
}
