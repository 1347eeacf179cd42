//! coinward wallet core.
//!
//! Tracks the outputs owned by a tree of derived receive/change addresses,
//! selects inputs for payments, reserves them while a spend is pending, and
//! finds used addresses with a gap-limit scan against an indexer.

pub mod error;
pub mod config;
pub mod types;
pub mod keys;
pub mod account;
pub mod utxo;
pub mod pending;
pub mod history;
pub mod backend;
pub mod discovery;
pub mod signer;
pub mod composer;
pub mod wallet;
#[cfg(feature = "transport")]
pub mod transport;

pub use error::WalletError;
pub use config::WalletConfig;
pub use types::{Outpoint, OutpointId, TxRecord, Utxo, UtxoEntry};
pub use keys::{parse_seed_hex, DerivedKey, KeyDeriver, WalletKeys};
pub use account::{AddressDescriptor, AddressManager};
pub use utxo::{SelectionResult, UtxoSet};
pub use pending::{PendingLedger, PendingTransaction};
pub use history::TransactionHistoryIndex;
pub use backend::{Broadcaster, Indexer};
pub use discovery::{ChainScan, DiscoveryEngine, DiscoveryOutcome, ScanState, ScanStep};
pub use signer::{PaymentOutput, SchnorrSigner, SignedTransaction, SigningInput, TransactionSigner};
pub use composer::{ComposedTransaction, TransactionComposer};
pub use wallet::{DiscoveryReport, Wallet};

pub use coinward_types::{ChainType, Network};
