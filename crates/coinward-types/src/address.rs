//! Address encoding, parsing, and validation.
//!
//! Format: `<network prefix>:<hex public key><hex checksum>`, where the
//! checksum is the first 4 bytes of Keccak-256 over `prefix || public key`.

use crate::constants::{Network, CHECKSUM_SIZE, KEY_SIZE};
use thiserror::Error;
use tiny_keccak::{Hasher, Keccak};

#[derive(Debug, Error)]
pub enum AddressError {
    #[error("address must be a non-empty string")]
    Empty,

    #[error("address is missing the network prefix separator")]
    MissingPrefix,

    #[error("unknown address prefix: {0}")]
    UnknownPrefix(String),

    #[error("invalid address length ({0})")]
    InvalidLength(usize),

    #[error("hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("address checksum mismatch")]
    BadChecksum,

    #[error("address belongs to {actual}, expected {expected}")]
    WrongNetwork { expected: Network, actual: Network },
}

/// Result of parsing an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress {
    pub network: Network,
    pub public_key: [u8; KEY_SIZE],
}

impl ParsedAddress {
    /// Re-encode this parsed address back to its string form.
    pub fn to_address_string(&self) -> String {
        encode_address(self.network, &self.public_key)
    }
}

fn checksum(prefix: &str, public_key: &[u8; KEY_SIZE]) -> [u8; CHECKSUM_SIZE] {
    let mut keccak = Keccak::v256();
    let mut output = [0u8; 32];
    keccak.update(prefix.as_bytes());
    keccak.update(public_key);
    keccak.finalize(&mut output);
    let mut out = [0u8; CHECKSUM_SIZE];
    out.copy_from_slice(&output[..CHECKSUM_SIZE]);
    out
}

/// Encode a public key as an address on `network`.
pub fn encode_address(network: Network, public_key: &[u8; KEY_SIZE]) -> String {
    let prefix = network.address_prefix();
    format!(
        "{}:{}{}",
        prefix,
        hex::encode(public_key),
        hex::encode(checksum(prefix, public_key))
    )
}

/// Parse and validate an address string.
pub fn parse_address(address: &str) -> Result<ParsedAddress, AddressError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(AddressError::Empty);
    }

    let (prefix, payload) = address.split_once(':').ok_or(AddressError::MissingPrefix)?;
    let network =
        Network::from_prefix(prefix).ok_or_else(|| AddressError::UnknownPrefix(prefix.to_string()))?;

    if payload.len() != (KEY_SIZE + CHECKSUM_SIZE) * 2 {
        return Err(AddressError::InvalidLength(payload.len()));
    }
    let data = hex::decode(payload)?;

    let mut public_key = [0u8; KEY_SIZE];
    public_key.copy_from_slice(&data[..KEY_SIZE]);
    if data[KEY_SIZE..] != checksum(prefix, &public_key) {
        return Err(AddressError::BadChecksum);
    }

    Ok(ParsedAddress { network, public_key })
}

/// Parse an address and require it to belong to `network`.
pub fn parse_address_for(address: &str, network: Network) -> Result<ParsedAddress, AddressError> {
    let parsed = parse_address(address)?;
    if parsed.network != network {
        return Err(AddressError::WrongNetwork {
            expected: network,
            actual: parsed.network,
        });
    }
    Ok(parsed)
}

/// Validate an address string.
pub fn is_valid_address(address: &str) -> bool {
    parse_address(address).is_ok()
}

/// Pay-to-pubkey locking script: `OP_DATA_32 <pubkey> OP_CHECKSIG`.
pub fn script_for_public_key(public_key: &[u8; KEY_SIZE]) -> Vec<u8> {
    let mut script = Vec::with_capacity(KEY_SIZE + 2);
    script.push(0x20);
    script.extend_from_slice(public_key);
    script.push(0xac);
    script
}

/// Locking script for an encoded address.
pub fn script_for_address(address: &str) -> Result<Vec<u8>, AddressError> {
    let parsed = parse_address(address)?;
    Ok(script_for_public_key(&parsed.public_key))
}
