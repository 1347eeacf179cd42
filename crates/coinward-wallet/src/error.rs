//! Wallet error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("insufficient funds: need {required}, have {available}")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("amount {amount} plus fee {fee} is not representable as an on-chain value")]
    AmountOverflow { amount: u64, fee: u64 },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("address was never derived by this wallet: {0}")]
    UnknownAddress(String),

    #[error("outpoint is not in the UTXO set: {0}")]
    UnknownOutpoint(String),

    #[error("no pending transaction with id {0}")]
    UnknownPendingId(String),

    #[error("pending transaction {0} is already tracked")]
    DuplicatePendingId(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
