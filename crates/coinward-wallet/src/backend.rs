//! Network collaborators consumed by the wallet core.
//!
//! These are the only operations that suspend. Retry, timeout and
//! cancellation policy belong to the implementations, not to the core.

use crate::error::WalletError;
use crate::types::{TxRecord, UtxoEntry};
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::HashMap;

/// Per-address UTXO and history lookups.
#[async_trait]
pub trait Indexer: Send + Sync {
    /// Unspent outputs locked to `address`. Empty when there are none.
    async fn fetch_utxos(&self, address: &str) -> Result<Vec<UtxoEntry>, WalletError>;

    /// Every transaction that touched `address`.
    async fn fetch_history(&self, address: &str) -> Result<Vec<TxRecord>, WalletError>;
}

/// Transaction submission.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Submit signed transaction bytes; returns the id the network accepted.
    async fn submit(&self, signed_bytes: &[u8]) -> Result<String, WalletError>;
}

/// Fetch history for every address with at most `concurrency` requests in
/// flight. Results are keyed by address, so completion order is irrelevant.
pub(crate) async fn fetch_histories(
    indexer: &dyn Indexer,
    addresses: Vec<String>,
    concurrency: usize,
) -> Result<HashMap<String, Vec<TxRecord>>, WalletError> {
    stream::iter(addresses)
        .map(|address| async move {
            let history = indexer.fetch_history(&address).await?;
            Ok::<_, WalletError>((address, history))
        })
        .buffer_unordered(concurrency.max(1))
        .try_collect()
        .await
}

/// Fetch UTXOs for every address with at most `concurrency` requests in flight.
pub(crate) async fn fetch_utxos(
    indexer: &dyn Indexer,
    addresses: Vec<String>,
    concurrency: usize,
) -> Result<HashMap<String, Vec<UtxoEntry>>, WalletError> {
    stream::iter(addresses)
        .map(|address| async move {
            let utxos = indexer.fetch_utxos(&address).await?;
            Ok::<_, WalletError>((address, utxos))
        })
        .buffer_unordered(concurrency.max(1))
        .try_collect()
        .await
}
