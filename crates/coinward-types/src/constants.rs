//! Network constants, unit definitions, and derivation chain identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Network Types
// =============================================================================

/// Network type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Devnet,
}

impl Network {
    /// Human-readable address prefix for this network.
    pub fn address_prefix(&self) -> &'static str {
        match self {
            Network::Mainnet => "cwmain",
            Network::Testnet => "cwtest",
            Network::Devnet => "cwdev",
        }
    }

    /// Reverse lookup from an address prefix.
    pub fn from_prefix(prefix: &str) -> Option<Network> {
        match prefix {
            "cwmain" => Some(Network::Mainnet),
            "cwtest" => Some(Network::Testnet),
            "cwdev" => Some(Network::Devnet),
            _ => None,
        }
    }

    /// Single byte mixed into key derivation so the same seed yields
    /// unrelated keys on different networks.
    pub fn derivation_tag(&self) -> u8 {
        match self {
            Network::Mainnet => 0,
            Network::Testnet => 1,
            Network::Devnet => 2,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
            Network::Devnet => write!(f, "devnet"),
        }
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            "devnet" | "dev" => Ok(Network::Devnet),
            _ => Err(format!("unknown network: {} (use mainnet, testnet, or devnet)", s)),
        }
    }
}

// =============================================================================
// Derivation Chains
// =============================================================================

/// Which derivation chain an address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainType {
    /// External chain: addresses handed out to payers.
    Receive,
    /// Internal chain: addresses that collect transaction change.
    Change,
}

impl ChainType {
    pub const ALL: [ChainType; 2] = [ChainType::Receive, ChainType::Change];

    /// Numeric chain index used in derivation.
    pub fn index(&self) -> u32 {
        match self {
            ChainType::Receive => 0,
            ChainType::Change => 1,
        }
    }
}

impl fmt::Display for ChainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainType::Receive => write!(f, "receive"),
            ChainType::Change => write!(f, "change"),
        }
    }
}

// =============================================================================
// Units
// =============================================================================

/// Number of decimal places in one coin.
pub const COIN_DECIMALS: u32 = 8;

/// Atomic units per whole coin.
pub const ATOMIC_UNITS_PER_COIN: u64 = 100_000_000;

/// Largest value the chain can carry in a single amount (atomic units).
pub const MAX_MONEY: u64 = 29_000_000_000 * ATOMIC_UNITS_PER_COIN;

/// Number of consecutive unused addresses that ends discovery on a chain.
pub const DEFAULT_GAP_THRESHOLD: u32 = 20;

/// Public key size in bytes.
pub const KEY_SIZE: usize = 32;

/// Address checksum size in bytes.
pub const CHECKSUM_SIZE: usize = 4;
