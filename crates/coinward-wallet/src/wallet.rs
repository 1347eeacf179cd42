//! Main wallet facade.
//!
//! [`Wallet`] is the single owner of the address cursors, the UTXO set, the
//! pending ledger and the history index. Network work fans out through the
//! collaborators and is joined before any of that state is touched, so
//! callers only need to avoid running two mutating operations at once.

use crate::account::AddressManager;
use crate::backend::{fetch_utxos, Broadcaster, Indexer};
use crate::composer::{ComposedTransaction, TransactionComposer};
use crate::config::WalletConfig;
use crate::discovery::{DiscoveryEngine, DiscoveryOutcome};
use crate::error::WalletError;
use crate::history::TransactionHistoryIndex;
use crate::keys::{KeyDeriver, WalletKeys};
use crate::pending::PendingLedger;
use crate::signer::{SchnorrSigner, TransactionSigner};
use crate::types::{OutpointId, TxRecord, UtxoEntry};
use crate::utxo::UtxoSet;
use coinward_types::{ChainType, Network};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Summary of one discovery run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub receive_highest: Option<u32>,
    pub change_highest: Option<u32>,
    pub active_addresses: usize,
    pub new_utxos: usize,
}

#[derive(Serialize)]
struct StateSnapshot<'a> {
    utxos: &'a UtxoSet,
    pending: &'a PendingLedger,
}

pub struct Wallet {
    config: WalletConfig,
    addresses: AddressManager,
    utxos: UtxoSet,
    pending: PendingLedger,
    history: TransactionHistoryIndex,
    indexer: Arc<dyn Indexer>,
    broadcaster: Arc<dyn Broadcaster>,
    signer: Arc<dyn TransactionSigner>,
}

impl Wallet {
    pub fn new(
        config: WalletConfig,
        deriver: Arc<dyn KeyDeriver>,
        indexer: Arc<dyn Indexer>,
        broadcaster: Arc<dyn Broadcaster>,
        signer: Arc<dyn TransactionSigner>,
    ) -> Result<Self, WalletError> {
        config.validate()?;
        if deriver.network() != config.network {
            return Err(WalletError::Config(format!(
                "key deriver is for {}, config is for {}",
                deriver.network(),
                config.network
            )));
        }
        Ok(Self {
            config,
            addresses: AddressManager::new(deriver),
            utxos: UtxoSet::new(),
            pending: PendingLedger::new(),
            history: TransactionHistoryIndex::new(),
            indexer,
            broadcaster,
            signer,
        })
    }

    /// Seed-backed wallet with the default Schnorr signer.
    pub fn from_seed(
        seed: [u8; 32],
        config: WalletConfig,
        indexer: Arc<dyn Indexer>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Result<Self, WalletError> {
        let network = config.network;
        Self::new(
            config,
            Arc::new(WalletKeys::from_seed(seed, network)),
            indexer,
            broadcaster,
            Arc::new(SchnorrSigner::new(network)),
        )
    }

    /// Seed-backed wallet talking to an indexer over REST.
    #[cfg(feature = "transport")]
    pub fn connect(
        seed: [u8; 32],
        config: WalletConfig,
        rpc: coinward_rpc::RpcConfig,
    ) -> Result<Self, WalletError> {
        let client = Arc::new(
            coinward_rpc::IndexerRpc::with_config(rpc)
                .map_err(|e| WalletError::Network(e.to_string()))?,
        );
        Self::from_seed(seed, config, client.clone(), client)
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn network(&self) -> Network {
        self.config.network
    }

    // ── Addresses ───────────────────────────────────────────────────────────

    /// The receive address currently shown to payers.
    pub fn receive_address(&mut self) -> String {
        self.addresses.peek_address(ChainType::Receive).address
    }

    /// Retire the current receive address and return the next one.
    pub fn new_receive_address(&mut self) -> String {
        self.addresses.next_address(ChainType::Receive);
        self.receive_address()
    }

    pub fn cursor(&self, chain: ChainType) -> u32 {
        self.addresses.cursor(chain)
    }

    pub fn addresses(&self) -> &AddressManager {
        &self.addresses
    }

    // ── Sync ────────────────────────────────────────────────────────────────

    /// Gap-limit scan of both chains, then a UTXO refresh of every address
    /// that showed activity.
    ///
    /// Nothing is committed until every fetch has come back, so a failed
    /// lookup leaves cursors, history and UTXOs as they were.
    pub async fn discover(&mut self) -> Result<DiscoveryReport, WalletError> {
        let engine = DiscoveryEngine::new(
            self.indexer.as_ref(),
            self.config.gap_threshold,
            self.config.fetch_concurrency,
        );
        let outcome = engine.run(&mut self.addresses).await?;
        let active: Vec<String> = outcome.active_addresses().map(String::from).collect();
        let fetched = self.fetch_utxos_for(&active).await?;

        outcome.apply_cursors(&mut self.addresses);
        let active_addresses = active.len();
        let DiscoveryOutcome { receive, change } = outcome;
        let receive_highest = receive.highest_active;
        let change_highest = change.highest_active;
        self.history
            .ingest_all(receive.histories.into_iter().chain(change.histories));
        let new_utxos = self.apply_utxos(&active, fetched);

        let report = DiscoveryReport {
            receive_highest,
            change_highest,
            active_addresses,
            new_utxos,
        };
        log::info!(
            "discovery done: receive cursor {}, change cursor {}, {} active address(es), {} new utxo(s)",
            self.addresses.cursor(ChainType::Receive),
            self.addresses.cursor(ChainType::Change),
            report.active_addresses,
            report.new_utxos
        );
        Ok(report)
    }

    /// Refresh UTXOs for every address below either cursor.
    ///
    /// Only adds outputs. One the indexer stops reporting, for instance
    /// because it was spent from another device, stays in the set and keeps
    /// counting toward [`Wallet::balance`] until [`Wallet::clear`].
    pub async fn refresh_utxos(&mut self) -> Result<usize, WalletError> {
        let mut wanted = Vec::new();
        for chain in ChainType::ALL {
            let count = self.addresses.cursor(chain);
            wanted.extend(
                self.addresses
                    .derive_batch(count, chain, 0)
                    .into_iter()
                    .map(|d| d.address),
            );
        }
        let fetched = self.fetch_utxos_for(&wanted).await?;
        Ok(self.apply_utxos(&wanted, fetched))
    }

    async fn fetch_utxos_for(
        &self,
        addresses: &[String],
    ) -> Result<HashMap<String, Vec<UtxoEntry>>, WalletError> {
        fetch_utxos(
            self.indexer.as_ref(),
            addresses.to_vec(),
            self.config.fetch_concurrency,
        )
        .await
    }

    /// Add fetched entries in `addresses` order; returns how many were new.
    fn apply_utxos(
        &mut self,
        addresses: &[String],
        mut fetched: HashMap<String, Vec<UtxoEntry>>,
    ) -> usize {
        let mut inserted = 0;
        for address in addresses {
            if let Some(entries) = fetched.remove(address) {
                inserted += self.utxos.add(entries, address).len();
            }
        }
        inserted
    }

    // ── Balances ────────────────────────────────────────────────────────────

    /// Everything known minus what pending spends debit.
    pub fn balance(&self) -> u64 {
        self.utxos
            .total_balance()
            .saturating_sub(self.pending.total_pending_amount())
    }

    /// Spendable right now: known outputs not reserved by a pending spend.
    pub fn available_balance(&self) -> u64 {
        self.utxos.available_balance()
    }

    pub fn pending_amount(&self) -> u64 {
        self.pending.total_pending_amount()
    }

    pub fn utxos(&self) -> &UtxoSet {
        &self.utxos
    }

    pub fn pending(&self) -> &PendingLedger {
        &self.pending
    }

    // ── Spending ────────────────────────────────────────────────────────────

    pub fn compose(
        &mut self,
        destination: &str,
        amount: u64,
        fee: u64,
        change_override: Option<&str>,
    ) -> Result<ComposedTransaction, WalletError> {
        TransactionComposer::new(
            &mut self.addresses,
            &mut self.utxos,
            &mut self.pending,
            self.signer.as_ref(),
        )
        .compose(destination, amount, fee, change_override)
    }

    pub async fn send(
        &mut self,
        destination: &str,
        amount: u64,
        fee: u64,
    ) -> Result<String, WalletError> {
        TransactionComposer::new(
            &mut self.addresses,
            &mut self.utxos,
            &mut self.pending,
            self.signer.as_ref(),
        )
        .send(self.broadcaster.as_ref(), destination, amount, fee)
        .await
    }

    pub fn cancel_pending(&mut self, id: &str) -> Result<Vec<OutpointId>, WalletError> {
        TransactionComposer::new(
            &mut self.addresses,
            &mut self.utxos,
            &mut self.pending,
            self.signer.as_ref(),
        )
        .cancel_pending(id)
    }

    // ── History ─────────────────────────────────────────────────────────────

    /// Merged history of all addresses, newest first.
    pub fn history(&self) -> &[TxRecord] {
        self.history.merged()
    }

    pub fn history_for(&self, address: &str) -> &[TxRecord] {
        self.history.for_address(address)
    }

    // ── State ───────────────────────────────────────────────────────────────

    /// JSON image of the UTXO set and pending ledger.
    pub fn snapshot(&self) -> Result<String, WalletError> {
        Ok(serde_json::to_string(&StateSnapshot {
            utxos: &self.utxos,
            pending: &self.pending,
        })?)
    }

    /// Drop all state and reset cursors, e.g. before switching account.
    pub fn clear(&mut self) {
        self.utxos.clear();
        self.pending.clear();
        self.history.clear();
        self.addresses.clear();
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("config", &self.config)
            .field("addresses", &self.addresses)
            .field("utxos", &self.utxos.len())
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}
