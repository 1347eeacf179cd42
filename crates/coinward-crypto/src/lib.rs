//! Crypto primitives for coinward.
//!
//! Deterministic key derivation per `(network, chain, index)`, Schnorr
//! signatures over Ed25519 points, and the transaction wire encoding those
//! signatures commit to.

pub mod keys;
pub mod schnorr;
pub mod tx_serialize;

pub use keys::{derive_keypair, KeyPair, SecretKey};
pub use tx_serialize::{sign_transaction, SignedTx, TxInput, TxOutput, UnsignedTx};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("transaction has no inputs")]
    NoInputs,

    #[error("signing key count mismatch: {inputs} inputs, {keys} keys")]
    KeyCountMismatch { inputs: usize, keys: usize },

    #[error("value overflow while summing transaction amounts")]
    ValueOverflow,

    #[error("outputs ({outputs}) exceed inputs ({inputs})")]
    OutputsExceedInputs { inputs: u64, outputs: u64 },

    #[error("invalid transaction id: {0}")]
    InvalidTxId(String),
}
