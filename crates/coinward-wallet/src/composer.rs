//! Payment composition, broadcast and rollback.
//!
//! A payment attempt moves `Composing -> Signed -> Broadcast`, or on a
//! failed broadcast `Signed -> RolledBack`. Nothing in the wallet state
//! changes until signing has succeeded; after that the reservation, the
//! pending entry and the cursor moves are applied together.

use crate::account::AddressManager;
use crate::backend::Broadcaster;
use crate::error::WalletError;
use crate::pending::{PendingLedger, PendingTransaction};
use crate::signer::{PaymentOutput, SigningInput, TransactionSigner};
use crate::types::OutpointId;
use crate::utxo::UtxoSet;
use coinward_types::address::parse_address_for;
use coinward_types::constants::MAX_MONEY;
use coinward_types::ChainType;

/// A signed payment that is now reserved in the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedTransaction {
    pub id: String,
    pub signed_bytes: Vec<u8>,
    pub reserved_outpoints: Vec<OutpointId>,
    /// Amount plus fee.
    pub total_amount: u64,
    pub fee: u64,
    pub change: u64,
    /// `None` when the inputs matched the total exactly.
    pub change_address: Option<String>,
}

pub struct TransactionComposer<'a> {
    addresses: &'a mut AddressManager,
    utxos: &'a mut UtxoSet,
    pending: &'a mut PendingLedger,
    signer: &'a dyn TransactionSigner,
}

impl<'a> TransactionComposer<'a> {
    pub fn new(
        addresses: &'a mut AddressManager,
        utxos: &'a mut UtxoSet,
        pending: &'a mut PendingLedger,
        signer: &'a dyn TransactionSigner,
    ) -> Self {
        Self {
            addresses,
            utxos,
            pending,
            signer,
        }
    }

    fn check_address(&self, address: &str) -> Result<(), WalletError> {
        parse_address_for(address, self.addresses.network())
            .map(|_| ())
            .map_err(|e| WalletError::InvalidAddress(format!("{}: {}", address, e)))
    }

    /// Build, sign and reserve a payment of `amount` to `destination`.
    pub fn compose(
        &mut self,
        destination: &str,
        amount: u64,
        fee: u64,
        change_override: Option<&str>,
    ) -> Result<ComposedTransaction, WalletError> {
        if amount == 0 {
            return Err(WalletError::InvalidAmount("amount must be positive".into()));
        }
        let total = amount
            .checked_add(fee)
            .filter(|t| *t <= MAX_MONEY)
            .ok_or(WalletError::AmountOverflow { amount, fee })?;
        self.check_address(destination)?;
        if let Some(address) = change_override {
            self.check_address(address)?;
        }

        let selection = self.utxos.select_inputs(total)?;
        let mut inputs = Vec::with_capacity(selection.selected.len());
        for utxo in &selection.selected {
            let key = self.addresses.key_for(&utxo.address)?.clone();
            inputs.push(SigningInput {
                utxo: utxo.clone(),
                key,
            });
        }

        let change = selection.total - total;
        let mut outputs = vec![PaymentOutput {
            address: destination.to_string(),
            value: amount,
        }];
        let mut derived_change = None;
        let change_address = if change == 0 {
            None
        } else {
            let address = match change_override {
                Some(address) => address.to_string(),
                None => {
                    let descriptor = self.addresses.peek_address(ChainType::Change);
                    derived_change = Some(descriptor.index);
                    descriptor.address
                }
            };
            outputs.push(PaymentOutput {
                address: address.clone(),
                value: change,
            });
            Some(address)
        };

        let signed = self.signer.sign(&inputs, &outputs)?;
        if self.pending.contains(&signed.id) {
            return Err(WalletError::DuplicatePendingId(signed.id));
        }

        self.utxos.reserve(&selection.selected_ids)?;
        let entry = PendingTransaction {
            id: signed.id.clone(),
            raw_signed_bytes: signed.bytes.clone(),
            reserved_outpoints: selection.selected_ids.clone(),
            total_debited: total,
        };
        if let Err(e) = self.pending.record(entry) {
            self.utxos.release(&selection.selected_ids);
            return Err(e);
        }
        if let Some(index) = derived_change {
            self.addresses
                .advance_cursor(ChainType::Change, index.saturating_add(1));
        }
        self.addresses.next_address(ChainType::Receive);

        log::info!(
            "composed {}: {} + fee {} from {} input(s), change {}",
            signed.id,
            amount,
            fee,
            selection.selected_ids.len(),
            change
        );
        Ok(ComposedTransaction {
            id: signed.id,
            signed_bytes: signed.bytes,
            reserved_outpoints: selection.selected_ids,
            total_amount: total,
            fee,
            change,
            change_address,
        })
    }

    /// Compose and broadcast. A failed broadcast undoes the reservation and
    /// the pending entry before the broadcast error is returned.
    pub async fn send(
        &mut self,
        broadcaster: &dyn Broadcaster,
        destination: &str,
        amount: u64,
        fee: u64,
    ) -> Result<String, WalletError> {
        let composed = self.compose(destination, amount, fee, None)?;
        match broadcaster.submit(&composed.signed_bytes).await {
            Ok(accepted) => {
                if accepted != composed.id {
                    log::warn!(
                        "network accepted {} under id {}",
                        composed.id,
                        accepted
                    );
                }
                log::info!("broadcast {}", composed.id);
                Ok(composed.id)
            }
            Err(e) => {
                log::warn!("broadcast of {} failed: {}; rolling back", composed.id, e);
                if let Err(rollback) = self.cancel_pending(&composed.id) {
                    log::error!("rollback of {} failed: {}", composed.id, rollback);
                }
                Err(e)
            }
        }
    }

    /// Abandon a pending transaction and free its inputs.
    pub fn cancel_pending(&mut self, id: &str) -> Result<Vec<OutpointId>, WalletError> {
        let released = self.pending.remove(id)?;
        self.utxos.release(&released);
        log::warn!(
            "released {} input(s) of pending {}, available balance {}",
            released.len(),
            id,
            self.utxos.available_balance()
        );
        Ok(released)
    }
}
