//! Gap-limit address discovery.
//!
//! Each chain is scanned in windows. A window with activity schedules a
//! follow-up window sized so that exactly `threshold` addresses past the
//! last active one get checked; a window with no activity ends the scan.
//! The scan position is threaded through [`ScanState`] as a plain value and
//! stepped by [`ScanState::advance`], which does no I/O.

use crate::account::AddressManager;
use crate::backend::{fetch_histories, Indexer};
use crate::error::WalletError;
use crate::types::TxRecord;
use coinward_types::ChainType;

/// Position of an in-progress chain scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanState {
    pub offset: u32,
    pub batch_size: u32,
    pub highest_active: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStep {
    Continue(ScanState),
    Done { highest_active: Option<u32> },
}

impl ScanState {
    pub fn initial(threshold: u32) -> Self {
        Self {
            offset: 0,
            batch_size: threshold,
            highest_active: None,
        }
    }

    /// Fold in the outcome of the window `[offset, offset + batch_size)`.
    ///
    /// `max_active` is the largest window-relative index that had history,
    /// or `None` when the whole window was unused.
    pub fn advance(self, threshold: u32, max_active: Option<u32>) -> ScanStep {
        let Some(rel) = max_active else {
            debug_assert_eq!(
                self.highest_active.map_or(-1, i64::from),
                i64::from(self.offset) - i64::from(threshold - self.batch_size) - 1
            );
            return ScanStep::Done {
                highest_active: self.highest_active,
            };
        };
        debug_assert!(rel < self.batch_size);
        let highest = self.offset.saturating_add(rel);
        let next_offset = match self.offset.checked_add(self.batch_size) {
            Some(o) => o,
            None => {
                return ScanStep::Done {
                    highest_active: Some(highest),
                }
            }
        };
        // unused addresses already seen past `highest` count toward the gap
        let next_batch = 1 + rel + (threshold - self.batch_size);
        ScanStep::Continue(ScanState {
            offset: next_offset,
            batch_size: next_batch,
            highest_active: Some(highest),
        })
    }
}

/// Result of scanning one chain.
#[derive(Debug, Clone, Default)]
pub struct ChainScan {
    pub highest_active: Option<u32>,
    pub batches: u32,
    /// History of every address on this chain that had any.
    pub histories: Vec<(String, Vec<TxRecord>)>,
}

impl ChainScan {
    /// Cursor position implied by the scan.
    pub fn next_index(&self) -> u32 {
        self.highest_active.map_or(0, |i| i.saturating_add(1))
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiscoveryOutcome {
    pub receive: ChainScan,
    pub change: ChainScan,
}

impl DiscoveryOutcome {
    pub fn chain(&self, chain: ChainType) -> &ChainScan {
        match chain {
            ChainType::Receive => &self.receive,
            ChainType::Change => &self.change,
        }
    }

    /// Move each cursor past its chain's highest active index.
    pub fn apply_cursors(&self, addresses: &mut AddressManager) {
        for chain in ChainType::ALL {
            addresses.advance_cursor(chain, self.chain(chain).next_index());
        }
    }

    /// Every address on either chain that showed activity.
    pub fn active_addresses(&self) -> impl Iterator<Item = &str> {
        self.receive
            .histories
            .iter()
            .chain(&self.change.histories)
            .map(|(address, _)| address.as_str())
    }
}

pub struct DiscoveryEngine<'a> {
    indexer: &'a dyn Indexer,
    threshold: u32,
    concurrency: usize,
}

impl<'a> DiscoveryEngine<'a> {
    pub fn new(indexer: &'a dyn Indexer, threshold: u32, concurrency: usize) -> Self {
        Self {
            indexer,
            threshold: threshold.max(1),
            concurrency,
        }
    }

    /// Scan one chain to convergence. Cursors are not touched.
    pub async fn scan_chain(
        &self,
        addresses: &mut AddressManager,
        chain: ChainType,
    ) -> Result<ChainScan, WalletError> {
        let mut scan = ChainScan::default();
        let mut state = ScanState::initial(self.threshold);
        loop {
            let batch = addresses.derive_batch(state.batch_size, chain, state.offset);
            let wanted = batch.iter().map(|d| d.address.clone()).collect();
            let mut histories = fetch_histories(self.indexer, wanted, self.concurrency).await?;
            scan.batches += 1;

            let mut max_active = None;
            for (rel, descriptor) in batch.iter().enumerate() {
                let Some(records) = histories.remove(&descriptor.address) else {
                    continue;
                };
                if records.is_empty() {
                    continue;
                }
                max_active = Some(rel as u32);
                scan.histories.push((descriptor.address.clone(), records));
            }
            log::debug!(
                "{} window [{}, {}): last active {:?}",
                chain,
                state.offset,
                state.offset.saturating_add(state.batch_size),
                max_active.map(|r| state.offset + r)
            );

            match state.advance(self.threshold, max_active) {
                ScanStep::Continue(next) => state = next,
                ScanStep::Done { highest_active } => {
                    scan.highest_active = highest_active;
                    break;
                }
            }
        }
        log::info!(
            "{} chain: highest active index {:?} after {} window(s)",
            chain,
            scan.highest_active,
            scan.batches
        );
        Ok(scan)
    }

    /// Scan both chains. Cursors are left alone; the caller moves them with
    /// [`DiscoveryOutcome::apply_cursors`] once it has everything it needs.
    pub async fn run(&self, addresses: &mut AddressManager) -> Result<DiscoveryOutcome, WalletError> {
        let receive = self.scan_chain(addresses, ChainType::Receive).await?;
        let change = self.scan_chain(addresses, ChainType::Change).await?;
        Ok(DiscoveryOutcome { receive, change })
    }
}
