//! Wallet configuration.
//!
//! Everything the core needs from its environment is passed in through
//! [`WalletConfig`]; nothing is read from globals.

use crate::error::WalletError;
use coinward_types::constants::DEFAULT_GAP_THRESHOLD;
use coinward_types::Network;
use serde::{Deserialize, Serialize};

/// Upper bound on the gap threshold, to keep a single discovery batch sane.
pub const MAX_GAP_THRESHOLD: u32 = 1000;

/// Default number of concurrent indexer requests per batch.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Network the wallet derives addresses for.
    pub network: Network,
    /// Consecutive unused addresses that end discovery on a chain.
    pub gap_threshold: u32,
    /// Maximum in-flight indexer requests during a fan-out.
    pub fetch_concurrency: usize,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            network: Network::Mainnet,
            gap_threshold: DEFAULT_GAP_THRESHOLD,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }
}

impl WalletConfig {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            ..Default::default()
        }
    }

    pub fn with_gap_threshold(mut self, gap_threshold: u32) -> Self {
        self.gap_threshold = gap_threshold;
        self
    }

    pub fn with_fetch_concurrency(mut self, fetch_concurrency: usize) -> Self {
        self.fetch_concurrency = fetch_concurrency;
        self
    }

    pub fn validate(&self) -> Result<(), WalletError> {
        if self.gap_threshold == 0 || self.gap_threshold > MAX_GAP_THRESHOLD {
            return Err(WalletError::Config(format!(
                "gap_threshold must be in 1..={}, got {}",
                MAX_GAP_THRESHOLD, self.gap_threshold
            )));
        }
        if self.fetch_concurrency == 0 {
            return Err(WalletError::Config("fetch_concurrency must be at least 1".into()));
        }
        Ok(())
    }
}
