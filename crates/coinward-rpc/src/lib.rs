//! coinward RPC client library.
//!
//! Provides an async HTTP client for the address-indexing REST service the
//! wallet queries for unspent outputs and transaction history, and submits
//! signed transactions through.
//!
//! # Example
//!
//! ```ignore
//! use coinward_rpc::IndexerRpc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let indexer = IndexerRpc::new("http://localhost:18110").unwrap();
//!     let utxos = indexer.get_utxos("cwmain:...").await.unwrap();
//!     println!("{} unspent outputs", utxos.len());
//! }
//! ```

pub mod client;
pub mod error;
pub mod indexer;

pub use client::{RestClient, RpcConfig};
pub use error::RpcError;
pub use indexer::{AddressTransaction, AddressUtxo, IndexerRpc};

/// Default indexer ports.
pub mod ports {
    pub const INDEXER_MAINNET: u16 = 18110;
    pub const INDEXER_TESTNET: u16 = 18210;
    pub const INDEXER_DEVNET: u16 = 18610;
}
