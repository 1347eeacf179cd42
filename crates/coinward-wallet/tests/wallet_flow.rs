//! End-to-end wallet flows against in-memory collaborators.
//!
//! Run: cargo test -p coinward-wallet --test wallet_flow

use async_trait::async_trait;
use coinward_types::address::script_for_public_key;
use coinward_wallet::{
    Broadcaster, ChainType, Indexer, KeyDeriver, Network, Outpoint, TxRecord, UtxoEntry, Wallet,
    WalletConfig, WalletError, WalletKeys,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const SEED: [u8; 32] = [42u8; 32];

#[derive(Default)]
struct MockIndexer {
    histories: HashMap<String, Vec<TxRecord>>,
    utxos: HashMap<String, Vec<UtxoEntry>>,
    history_calls: AtomicUsize,
    /// Every `fetch_utxos` errors while set.
    fail_utxos: AtomicBool,
    /// History calls after this many succeed with an error.
    fail_history_after: Option<usize>,
}

impl MockIndexer {
    fn keys() -> WalletKeys {
        WalletKeys::from_seed(SEED, Network::Testnet)
    }

    /// Give the address at `(chain, index)` one confirmed transaction and,
    /// when `value > 0`, one unspent output of that value.
    fn fund(&mut self, chain: ChainType, index: u32, value: u64) {
        let key = Self::keys().derive(chain, index);
        let n = self.histories.len() as u64 + 1;
        let txid = format!("{:064x}", n + (chain.index() as u64) * 1000 + index as u64 * 10);
        self.histories.entry(key.address.clone()).or_default().push(TxRecord {
            transaction_id: txid.clone(),
            accepting_block_hash: Some(format!("block-{}", n)),
            accepting_blue_score: Some(100 + n),
            block_time: Some(1_700_000_000_000 + n),
        });
        if value > 0 {
            self.utxos.entry(key.address).or_default().push(UtxoEntry {
                outpoint: Outpoint::new(txid, 0),
                script_public_key: hex::encode(script_for_public_key(&key.public_key)),
                value,
            });
        }
    }
}

#[async_trait]
impl Indexer for MockIndexer {
    async fn fetch_utxos(&self, address: &str) -> Result<Vec<UtxoEntry>, WalletError> {
        if self.fail_utxos.load(Ordering::SeqCst) {
            return Err(WalletError::Network("utxo lookup timed out".into()));
        }
        Ok(self.utxos.get(address).cloned().unwrap_or_default())
    }

    async fn fetch_history(&self, address: &str) -> Result<Vec<TxRecord>, WalletError> {
        let call = self.history_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_history_after.is_some_and(|limit| call >= limit) {
            return Err(WalletError::Network("history lookup timed out".into()));
        }
        Ok(self.histories.get(address).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
struct RecordingBroadcaster {
    submitted: Mutex<Vec<Vec<u8>>>,
}

#[async_trait]
impl Broadcaster for RecordingBroadcaster {
    async fn submit(&self, signed_bytes: &[u8]) -> Result<String, WalletError> {
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(signed_bytes.to_vec());
        Ok(format!("accepted-{}", submitted.len()))
    }
}

struct FailingBroadcaster;

#[async_trait]
impl Broadcaster for FailingBroadcaster {
    async fn submit(&self, _signed_bytes: &[u8]) -> Result<String, WalletError> {
        Err(WalletError::Network("node down".into()))
    }
}

fn wallet(indexer: Arc<MockIndexer>, broadcaster: Arc<dyn Broadcaster>) -> Wallet {
    Wallet::from_seed(SEED, WalletConfig::new(Network::Testnet), indexer, broadcaster).unwrap()
}

fn destination() -> String {
    WalletKeys::from_seed([7u8; 32], Network::Testnet)
        .derive(ChainType::Receive, 0)
        .address
}

/// Wallet with 500 on receive/0 and 700 on receive/1, already discovered.
async fn funded(broadcaster: Arc<dyn Broadcaster>) -> Wallet {
    let mut indexer = MockIndexer::default();
    indexer.fund(ChainType::Receive, 0, 500);
    indexer.fund(ChainType::Receive, 1, 700);
    let mut w = wallet(Arc::new(indexer), broadcaster);
    w.discover().await.unwrap();
    w
}

#[tokio::test]
async fn discovery_finds_sparse_activity() {
    let mut indexer = MockIndexer::default();
    indexer.fund(ChainType::Receive, 0, 0);
    indexer.fund(ChainType::Receive, 2, 1_000);
    indexer.fund(ChainType::Receive, 5, 2_500);
    let indexer = Arc::new(indexer);
    let mut w = wallet(indexer.clone(), Arc::new(RecordingBroadcaster::default()));

    let report = w.discover().await.unwrap();
    assert_eq!(report.receive_highest, Some(5));
    assert_eq!(report.change_highest, None);
    assert_eq!(report.active_addresses, 3);
    assert_eq!(report.new_utxos, 2);
    assert_eq!(w.cursor(ChainType::Receive), 6);
    assert_eq!(w.cursor(ChainType::Change), 0);
    assert_eq!(w.balance(), 3_500);
    assert_eq!(w.available_balance(), 3_500);
    assert_eq!(w.history().len(), 3);
    // receive: [0, 20) then [20, 26); change: [0, 20)
    assert_eq!(indexer.history_calls.load(Ordering::SeqCst), 46);
}

#[tokio::test]
async fn discovery_on_unused_seed_leaves_cursors() {
    let mut w = wallet(
        Arc::new(MockIndexer::default()),
        Arc::new(RecordingBroadcaster::default()),
    );
    let report = w.discover().await.unwrap();
    assert_eq!(report.receive_highest, None);
    assert_eq!(report.change_highest, None);
    assert_eq!(w.cursor(ChainType::Receive), 0);
    assert_eq!(w.cursor(ChainType::Change), 0);
    assert_eq!(w.balance(), 0);
    assert!(w.history().is_empty());
}

#[tokio::test]
async fn discovery_covers_change_chain() {
    let mut indexer = MockIndexer::default();
    indexer.fund(ChainType::Change, 3, 900);
    let mut w = wallet(Arc::new(indexer), Arc::new(RecordingBroadcaster::default()));
    let report = w.discover().await.unwrap();
    assert_eq!(report.change_highest, Some(3));
    assert_eq!(w.cursor(ChainType::Change), 4);
    assert_eq!(w.available_balance(), 900);
}

#[tokio::test]
async fn rediscovery_adds_nothing_new() {
    let mut w = funded(Arc::new(RecordingBroadcaster::default())).await;
    let before = w.snapshot().unwrap();
    let report = w.discover().await.unwrap();
    assert_eq!(report.new_utxos, 0);
    assert_eq!(w.snapshot().unwrap(), before);
    assert_eq!(w.refresh_utxos().await.unwrap(), 0);
}

#[tokio::test]
async fn discovery_with_failed_utxo_fetch_mutates_nothing() {
    let mut indexer = MockIndexer::default();
    indexer.fund(ChainType::Receive, 5, 1_000);
    indexer.fail_utxos.store(true, Ordering::SeqCst);
    let indexer = Arc::new(indexer);
    let mut w = wallet(indexer.clone(), Arc::new(RecordingBroadcaster::default()));
    let before = w.snapshot().unwrap();
    let address = w.receive_address();

    let err = w.discover().await.unwrap_err();

    assert!(matches!(err, WalletError::Network(ref msg) if msg == "utxo lookup timed out"));
    assert_eq!(w.cursor(ChainType::Receive), 0);
    assert_eq!(w.cursor(ChainType::Change), 0);
    assert!(w.history().is_empty());
    assert_eq!(w.snapshot().unwrap(), before);
    assert_eq!(w.receive_address(), address);

    indexer.fail_utxos.store(false, Ordering::SeqCst);
    w.discover().await.unwrap();
    assert_eq!(w.cursor(ChainType::Receive), 6);
    assert_eq!(w.balance(), 1_000);
}

#[tokio::test]
async fn discovery_with_failed_history_fetch_mutates_nothing() {
    let mut indexer = MockIndexer::default();
    indexer.fund(ChainType::Receive, 0, 0);
    indexer.fund(ChainType::Receive, 2, 1_000);
    indexer.fund(ChainType::Receive, 5, 2_500);
    // first receive window succeeds, the follow-up window fails
    indexer.fail_history_after = Some(20);
    let mut w = wallet(Arc::new(indexer), Arc::new(RecordingBroadcaster::default()));
    let before = w.snapshot().unwrap();

    let err = w.discover().await.unwrap_err();

    assert!(matches!(err, WalletError::Network(ref msg) if msg == "history lookup timed out"));
    assert_eq!(w.cursor(ChainType::Receive), 0);
    assert_eq!(w.cursor(ChainType::Change), 0);
    assert!(w.history().is_empty());
    assert_eq!(w.balance(), 0);
    assert_eq!(w.snapshot().unwrap(), before);
}

#[tokio::test]
async fn failed_refresh_keeps_known_outputs() {
    let mut indexer = MockIndexer::default();
    indexer.fund(ChainType::Receive, 0, 500);
    let indexer = Arc::new(indexer);
    let mut w = wallet(indexer.clone(), Arc::new(RecordingBroadcaster::default()));
    w.discover().await.unwrap();
    let before = w.snapshot().unwrap();

    indexer.fail_utxos.store(true, Ordering::SeqCst);
    let err = w.refresh_utxos().await.unwrap_err();

    assert!(matches!(err, WalletError::Network(_)));
    assert_eq!(w.snapshot().unwrap(), before);
    assert_eq!(w.balance(), 500);
    assert_eq!(w.cursor(ChainType::Receive), 1);
}

#[tokio::test]
async fn send_reserves_inputs_and_debits_balance() {
    let broadcaster = Arc::new(RecordingBroadcaster::default());
    let mut w = funded(broadcaster.clone()).await;
    let receive_before = w.cursor(ChainType::Receive);

    let id = w.send(&destination(), 600, 10).await.unwrap();

    assert!(w.pending().contains(&id));
    assert_eq!(w.pending_amount(), 610);
    assert_eq!(w.balance(), 1_200 - 610);
    assert_eq!(w.available_balance(), 0);
    assert_eq!(broadcaster.submitted.lock().unwrap().len(), 1);
    assert_eq!(w.cursor(ChainType::Receive), receive_before + 1);
    assert_eq!(w.cursor(ChainType::Change), 1);
}

#[tokio::test]
async fn failed_broadcast_restores_state() {
    let mut w = funded(Arc::new(FailingBroadcaster)).await;
    let before = w.snapshot().unwrap();
    let balance = w.balance();

    let err = w.send(&destination(), 600, 10).await.unwrap_err();

    assert!(matches!(err, WalletError::Network(ref msg) if msg == "node down"));
    assert_eq!(w.snapshot().unwrap(), before);
    assert_eq!(w.balance(), balance);
    assert_eq!(w.available_balance(), 1_200);
    assert!(w.pending().is_empty());
}

#[tokio::test]
async fn cancel_pending_releases_inputs() {
    let mut w = funded(Arc::new(RecordingBroadcaster::default())).await;
    let before = w.snapshot().unwrap();

    let composed = w.compose(&destination(), 100, 1, None).unwrap();
    assert_eq!(w.available_balance(), 700);
    assert_eq!(w.pending_amount(), 101);

    let released = w.cancel_pending(&composed.id).unwrap();
    assert_eq!(released, composed.reserved_outpoints);
    assert_eq!(w.snapshot().unwrap(), before);
    assert!(matches!(
        w.cancel_pending(&composed.id),
        Err(WalletError::UnknownPendingId(_))
    ));
}

#[tokio::test]
async fn pending_inputs_are_not_spent_twice() {
    let mut w = funded(Arc::new(RecordingBroadcaster::default())).await;
    let first = w.compose(&destination(), 400, 0, None).unwrap();
    let second = w.compose(&destination(), 400, 0, None).unwrap();
    for id in &second.reserved_outpoints {
        assert!(!first.reserved_outpoints.contains(id));
    }
    assert!(matches!(
        w.compose(&destination(), 1, 0, None),
        Err(WalletError::InsufficientFunds { available: 0, .. })
    ));
}

#[tokio::test]
async fn insufficient_funds_mutates_nothing() {
    let mut w = funded(Arc::new(RecordingBroadcaster::default())).await;
    let before = w.snapshot().unwrap();
    let receive = w.cursor(ChainType::Receive);

    let err = w.send(&destination(), 5_000, 1).await.unwrap_err();

    assert!(matches!(
        err,
        WalletError::InsufficientFunds {
            required: 5_001,
            available: 1_200
        }
    ));
    assert_eq!(w.snapshot().unwrap(), before);
    assert_eq!(w.cursor(ChainType::Receive), receive);
}

#[tokio::test]
async fn unrepresentable_amount_is_rejected() {
    let mut w = funded(Arc::new(RecordingBroadcaster::default())).await;
    let before = w.snapshot().unwrap();
    assert!(matches!(
        w.compose(&destination(), u64::MAX, 1, None),
        Err(WalletError::AmountOverflow { .. })
    ));
    assert_eq!(w.snapshot().unwrap(), before);
}

#[tokio::test]
async fn receive_address_rotation() {
    let mut w = wallet(
        Arc::new(MockIndexer::default()),
        Arc::new(RecordingBroadcaster::default()),
    );
    let first = w.receive_address();
    assert_eq!(w.receive_address(), first);
    let second = w.new_receive_address();
    assert_ne!(first, second);
    assert_eq!(w.cursor(ChainType::Receive), 1);
}

#[test]
fn network_mismatch_is_rejected() {
    let matching = Wallet::from_seed(
        SEED,
        WalletConfig::new(Network::Mainnet),
        Arc::new(MockIndexer::default()),
        Arc::new(FailingBroadcaster),
    );
    assert!(matching.is_ok());

    let err = Wallet::new(
        WalletConfig::new(Network::Mainnet),
        Arc::new(MockIndexer::keys()),
        Arc::new(MockIndexer::default()),
        Arc::new(FailingBroadcaster),
        Arc::new(coinward_wallet::SchnorrSigner::new(Network::Mainnet)),
    )
    .unwrap_err();
    assert!(matches!(err, WalletError::Config(_)));
}

#[tokio::test]
async fn clear_resets_everything() {
    let mut w = funded(Arc::new(RecordingBroadcaster::default())).await;
    w.clear();
    assert_eq!(w.balance(), 0);
    assert!(w.history().is_empty());
    assert_eq!(w.cursor(ChainType::Receive), 0);
}
