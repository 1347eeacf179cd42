//! Wallet key management.
//!
//! The seed is held only in memory for the lifetime of the wallet; export,
//! import and encryption of it are the caller's concern.

use crate::error::WalletError;
use coinward_crypto::SecretKey;
use coinward_types::{ChainType, Network};
use std::fmt;

/// One derived address with its key material.
#[derive(Debug, Clone)]
pub struct DerivedKey {
    pub address: String,
    pub public_key: [u8; 32],
    pub secret: SecretKey,
}

/// Deterministic `(chain, index) -> key` derivation.
///
/// Implementations must be pure: the same `(chain, index)` always yields
/// the same address and key.
pub trait KeyDeriver: Send + Sync {
    fn network(&self) -> Network;

    fn derive(&self, chain: ChainType, index: u32) -> DerivedKey;
}

/// Parse a 64-char hex seed. Surrounding whitespace is ignored.
pub fn parse_seed_hex(seed_hex: &str) -> Result<[u8; 32], WalletError> {
    let bytes =
        hex::decode(seed_hex.trim()).map_err(|e| WalletError::InvalidSeed(e.to_string()))?;
    bytes.try_into().map_err(|bytes: Vec<u8>| {
        WalletError::InvalidSeed(format!("expected 32 bytes, got {}", bytes.len()))
    })
}

/// Seed-backed key set.
pub struct WalletKeys {
    seed: [u8; 32],
    network: Network,
}

impl WalletKeys {
    /// Create from a 32-byte seed.
    pub fn from_seed(seed: [u8; 32], network: Network) -> Self {
        Self { seed, network }
    }

    /// Create from a 64-char hex seed.
    pub fn from_hex(seed_hex: &str, network: Network) -> Result<Self, WalletError> {
        Ok(Self::from_seed(parse_seed_hex(seed_hex)?, network))
    }

    /// Generate a random seed for a new wallet.
    pub fn random_seed() -> [u8; 32] {
        use rand::RngCore;
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);
        seed
    }
}

impl fmt::Debug for WalletKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletKeys")
            .field("network", &self.network)
            .finish_non_exhaustive()
    }
}

impl KeyDeriver for WalletKeys {
    fn network(&self) -> Network {
        self.network
    }

    fn derive(&self, chain: ChainType, index: u32) -> DerivedKey {
        let kp = coinward_crypto::derive_keypair(&self.seed, self.network, chain, index);
        DerivedKey {
            address: kp.address,
            public_key: kp.public,
            secret: kp.secret,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        let keys = WalletKeys::from_hex(&"07".repeat(32), Network::Testnet).unwrap();
        let direct = WalletKeys::from_seed([7u8; 32], Network::Testnet);
        assert_eq!(
            keys.derive(ChainType::Receive, 0).address,
            direct.derive(ChainType::Receive, 0).address
        );
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert!(matches!(
            WalletKeys::from_hex("zz", Network::Testnet),
            Err(WalletError::InvalidSeed(_))
        ));
        assert!(matches!(
            WalletKeys::from_hex("0102", Network::Testnet),
            Err(WalletError::InvalidSeed(_))
        ));
    }

    #[test]
    fn test_parse_seed_hex() {
        assert_eq!(parse_seed_hex(&"ab".repeat(32)).unwrap(), [0xab; 32]);
        assert_eq!(
            parse_seed_hex(&format!("{}\n", "01".repeat(32))).unwrap(),
            [1u8; 32]
        );
        assert!(matches!(
            parse_seed_hex(&"ab".repeat(33)),
            Err(WalletError::InvalidSeed(ref msg)) if msg == "expected 32 bytes, got 33"
        ));
    }

    #[test]
    fn test_random_seeds_differ() {
        assert_ne!(WalletKeys::random_seed(), WalletKeys::random_seed());
    }

    #[test]
    fn test_debug_hides_seed() {
        let keys = WalletKeys::from_seed([0xAB; 32], Network::Devnet);
        let shown = format!("{:?}", keys);
        assert!(!shown.contains("171"));
        assert!(shown.contains("Devnet"));
    }
}
