//! Transaction building and signing.

use crate::error::WalletError;
use crate::types::Utxo;
use coinward_crypto::tx_serialize::parse_txid;
use coinward_crypto::{sign_transaction, SecretKey, TxInput, TxOutput, UnsignedTx};
use coinward_types::address::{parse_address_for, script_for_public_key};
use coinward_types::Network;

/// An input to spend and the key that unlocks it.
#[derive(Debug, Clone)]
pub struct SigningInput {
    pub utxo: Utxo,
    pub key: SecretKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOutput {
    pub address: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// Hex transaction id.
    pub id: String,
    pub bytes: Vec<u8>,
}

/// Builds and signs a transaction from resolved inputs and outputs.
///
/// Signing must be deterministic: the same inputs, outputs and keys always
/// produce the same bytes.
pub trait TransactionSigner: Send + Sync {
    fn sign(
        &self,
        inputs: &[SigningInput],
        outputs: &[PaymentOutput],
    ) -> Result<SignedTransaction, WalletError>;
}

/// Schnorr signer over the coinward wire format.
#[derive(Debug, Clone, Copy)]
pub struct SchnorrSigner {
    network: Network,
}

impl SchnorrSigner {
    pub fn new(network: Network) -> Self {
        Self { network }
    }
}

impl TransactionSigner for SchnorrSigner {
    fn sign(
        &self,
        inputs: &[SigningInput],
        outputs: &[PaymentOutput],
    ) -> Result<SignedTransaction, WalletError> {
        let mut tx_inputs = Vec::with_capacity(inputs.len());
        let mut keys = Vec::with_capacity(inputs.len());
        for input in inputs {
            let outpoint = &input.utxo.outpoint;
            let previous_txid = parse_txid(&outpoint.transaction_id)
                .map_err(|e| WalletError::Signing(e.to_string()))?;
            let script_public_key = hex::decode(&input.utxo.script_public_key)
                .map_err(|e| WalletError::Signing(format!("input {}: {}", outpoint.id(), e)))?;
            tx_inputs.push(TxInput {
                previous_txid,
                previous_index: outpoint.index,
                value: input.utxo.value,
                script_public_key,
            });
            keys.push(input.key.clone());
        }

        let mut tx_outputs = Vec::with_capacity(outputs.len());
        for output in outputs {
            let parsed = parse_address_for(&output.address, self.network)
                .map_err(|e| WalletError::InvalidAddress(format!("{}: {}", output.address, e)))?;
            tx_outputs.push(TxOutput {
                value: output.value,
                script_public_key: script_for_public_key(&parsed.public_key),
            });
        }

        let signed = sign_transaction(&UnsignedTx::new(tx_inputs, tx_outputs), &keys)
            .map_err(|e| WalletError::Signing(e.to_string()))?;
        Ok(SignedTransaction {
            id: signed.id_hex(),
            bytes: signed.bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{KeyDeriver, WalletKeys};
    use crate::types::Outpoint;
    use coinward_types::ChainType;

    fn input(keys: &WalletKeys, n: u32, value: u64) -> SigningInput {
        let d = keys.derive(ChainType::Receive, n);
        SigningInput {
            utxo: Utxo {
                outpoint: Outpoint::new(format!("{:064x}", n + 1), 0),
                address: d.address,
                script_public_key: hex::encode(script_for_public_key(&d.public_key)),
                value,
            },
            key: d.secret,
        }
    }

    #[test]
    fn test_sign_is_deterministic() {
        let keys = WalletKeys::from_seed([3u8; 32], Network::Testnet);
        let inputs = vec![input(&keys, 0, 500), input(&keys, 1, 700)];
        let outputs = vec![PaymentOutput {
            address: keys.derive(ChainType::Change, 0).address,
            value: 1100,
        }];
        let signer = SchnorrSigner::new(Network::Testnet);
        let a = signer.sign(&inputs, &outputs).unwrap();
        let b = signer.sign(&inputs, &outputs).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.id.len(), 64);
    }

    #[test]
    fn test_rejects_foreign_network_output() {
        let keys = WalletKeys::from_seed([3u8; 32], Network::Testnet);
        let mainnet = WalletKeys::from_seed([3u8; 32], Network::Mainnet);
        let outputs = vec![PaymentOutput {
            address: mainnet.derive(ChainType::Receive, 0).address,
            value: 1,
        }];
        let err = SchnorrSigner::new(Network::Testnet)
            .sign(&[input(&keys, 0, 10)], &outputs)
            .unwrap_err();
        assert!(matches!(err, WalletError::InvalidAddress(_)));
    }

    #[test]
    fn test_rejects_non_hex_txid() {
        let keys = WalletKeys::from_seed([3u8; 32], Network::Testnet);
        let mut bad = input(&keys, 0, 10);
        bad.utxo.outpoint = Outpoint::new("tx1", 0);
        let outputs = vec![PaymentOutput {
            address: keys.derive(ChainType::Receive, 1).address,
            value: 5,
        }];
        let err = SchnorrSigner::new(Network::Testnet)
            .sign(&[bad], &outputs)
            .unwrap_err();
        assert!(matches!(err, WalletError::Signing(_)));
    }
}
