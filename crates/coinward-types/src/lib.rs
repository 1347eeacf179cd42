//! Core types and constants for coinward.
//!
//! This crate provides the foundational types used across all coinward crates:
//! network configurations, derivation chain identifiers, exact amount
//! parsing, and address encoding/decoding.

pub mod address;
pub mod amount;
pub mod constants;

pub use address::{AddressError, ParsedAddress};
pub use amount::{format_amount, parse_amount, AmountError};
pub use constants::{ChainType, Network};
