//! Transaction serialization, hashing, and signing.
//!
//! Binary layout (all integers little-endian):
//!
//! ```text
//! version:u16
//! n_inputs:u32  { prev_txid:[32] prev_index:u32 value:u64 script_len:u32 script }*
//! n_outputs:u32 { value:u64 script_len:u32 script }*
//! ```
//!
//! The signed encoding appends one 64-byte signature per input, in input order.

use crate::keys::SecretKey;
use crate::schnorr::{self, SIGNATURE_SIZE};
use crate::CryptoError;

pub const TX_VERSION: u16 = 0;

const SIGHASH_KEY: &[u8] = b"TransactionSigningHash";
const TXID_KEY: &[u8] = b"TransactionID";

/// A spent outpoint together with the data committed to by signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxInput {
    pub previous_txid: [u8; 32],
    pub previous_index: u32,
    pub value: u64,
    pub script_public_key: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    pub value: u64,
    pub script_public_key: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTx {
    pub version: u16,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
}

/// Signed transaction bytes plus the transaction id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTx {
    pub id: [u8; 32],
    pub bytes: Vec<u8>,
}

impl SignedTx {
    pub fn id_hex(&self) -> String {
        hex::encode(self.id)
    }
}

fn write_script(out: &mut Vec<u8>, script: &[u8]) {
    out.extend_from_slice(&(script.len() as u32).to_le_bytes());
    out.extend_from_slice(script);
}

fn blake2b_256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let hash = blake2b_simd::Params::new().hash_length(32).key(key).hash(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(hash.as_bytes());
    out
}

impl UnsignedTx {
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> Self {
        Self {
            version: TX_VERSION,
            inputs,
            outputs,
        }
    }

    /// Unsigned binary encoding.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.version.to_le_bytes());

        out.extend_from_slice(&(self.inputs.len() as u32).to_le_bytes());
        for input in &self.inputs {
            out.extend_from_slice(&input.previous_txid);
            out.extend_from_slice(&input.previous_index.to_le_bytes());
            out.extend_from_slice(&input.value.to_le_bytes());
            write_script(&mut out, &input.script_public_key);
        }

        out.extend_from_slice(&(self.outputs.len() as u32).to_le_bytes());
        for output in &self.outputs {
            out.extend_from_slice(&output.value.to_le_bytes());
            write_script(&mut out, &output.script_public_key);
        }
        out
    }

    /// Message every input signature commits to.
    pub fn sighash(&self) -> [u8; 32] {
        blake2b_256(SIGHASH_KEY, &self.serialize())
    }

    /// Transaction id (independent of signatures).
    pub fn transaction_id(&self) -> [u8; 32] {
        blake2b_256(TXID_KEY, &self.serialize())
    }

    /// Sum of input values, `None` on overflow.
    pub fn input_total(&self) -> Option<u64> {
        self.inputs.iter().try_fold(0u64, |acc, i| acc.checked_add(i.value))
    }

    /// Sum of output values, `None` on overflow.
    pub fn output_total(&self) -> Option<u64> {
        self.outputs.iter().try_fold(0u64, |acc, o| acc.checked_add(o.value))
    }
}

/// Sign every input of `tx`; `secrets[i]` signs `tx.inputs[i]`.
pub fn sign_transaction(tx: &UnsignedTx, secrets: &[SecretKey]) -> Result<SignedTx, CryptoError> {
    if tx.inputs.is_empty() {
        return Err(CryptoError::NoInputs);
    }
    if secrets.len() != tx.inputs.len() {
        return Err(CryptoError::KeyCountMismatch {
            inputs: tx.inputs.len(),
            keys: secrets.len(),
        });
    }
    let inputs = tx.input_total().ok_or(CryptoError::ValueOverflow)?;
    let outputs = tx.output_total().ok_or(CryptoError::ValueOverflow)?;
    if outputs > inputs {
        return Err(CryptoError::OutputsExceedInputs { inputs, outputs });
    }

    let sighash = tx.sighash();
    let mut bytes = tx.serialize();
    bytes.reserve(secrets.len() * SIGNATURE_SIZE);
    for secret in secrets {
        bytes.extend_from_slice(&schnorr::sign(secret, &sighash));
    }

    let id = tx.transaction_id();
    log::trace!(
        "signed tx {} ({} inputs, {} outputs, {} bytes)",
        hex::encode(id),
        tx.inputs.len(),
        tx.outputs.len(),
        bytes.len()
    );
    Ok(SignedTx { id, bytes })
}

/// Parse a 64-char hex transaction id.
pub fn parse_txid(txid: &str) -> Result<[u8; 32], CryptoError> {
    let bytes = hex::decode(txid).map_err(|_| CryptoError::InvalidTxId(txid.to_string()))?;
    if bytes.len() != 32 {
        return Err(CryptoError::InvalidTxId(txid.to_string()));
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}
