//! Deterministic hierarchical key derivation.
//!
//! Every `(network, chain, index)` triple maps to exactly one key pair:
//!
//! ```text
//! secret = wide_reduce(SHA-512("coinward/derive" || seed || net || chain_le || index_le))
//! public = secret * G
//! ```

use coinward_types::address::encode_address;
use coinward_types::{ChainType, Network};
use curve25519_dalek::constants::ED25519_BASEPOINT_TABLE;
use curve25519_dalek::scalar::Scalar;
use sha2::{Digest, Sha512};
use std::fmt;

const DERIVE_DOMAIN: &[u8] = b"coinward/derive";

/// A derived secret key. Debug output never shows the key material.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey([u8; 32]);

impl SecretKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(Scalar::from_bytes_mod_order(bytes).to_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub(crate) fn scalar(&self) -> Scalar {
        Scalar::from_bytes_mod_order(self.0)
    }

    /// Public key for this secret.
    pub fn public_key(&self) -> [u8; 32] {
        (ED25519_BASEPOINT_TABLE * &self.scalar()).compress().to_bytes()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// A derived key pair and its encoded address.
#[derive(Debug, Clone)]
pub struct KeyPair {
    pub secret: SecretKey,
    pub public: [u8; 32],
    pub address: String,
}

/// Derive the key pair at `(chain, index)` from a 32-byte seed.
pub fn derive_keypair(seed: &[u8; 32], network: Network, chain: ChainType, index: u32) -> KeyPair {
    let digest = Sha512::new()
        .chain_update(DERIVE_DOMAIN)
        .chain_update(seed)
        .chain_update([network.derivation_tag()])
        .chain_update(chain.index().to_le_bytes())
        .chain_update(index.to_le_bytes())
        .finalize();
    let mut wide = [0u8; 64];
    wide.copy_from_slice(&digest);

    let secret = SecretKey(Scalar::from_bytes_mod_order_wide(&wide).to_bytes());
    let public = secret.public_key();
    let address = encode_address(network, &public);
    KeyPair { secret, public, address }
}
