//! Receive/change address management.
//!
//! Addresses are a pure function of `(chain, index)`. The manager caches
//! every descriptor it has derived so signing keys can be looked up by
//! address, and keeps one forward-only cursor per chain pointing at the
//! next index to hand out.

use crate::error::WalletError;
use crate::keys::KeyDeriver;
use coinward_crypto::SecretKey;
use coinward_types::{ChainType, Network};
use indexmap::IndexMap;
use std::sync::Arc;

/// A derived address and the key that spends from it.
#[derive(Debug, Clone)]
pub struct AddressDescriptor {
    pub address: String,
    pub index: u32,
    pub chain: ChainType,
    pub public_key: [u8; 32],
    pub private_key: SecretKey,
}

pub struct AddressManager {
    deriver: Arc<dyn KeyDeriver>,
    receive_cursor: u32,
    change_cursor: u32,
    derived: IndexMap<String, AddressDescriptor>,
}

impl AddressManager {
    pub fn new(deriver: Arc<dyn KeyDeriver>) -> Self {
        Self {
            deriver,
            receive_cursor: 0,
            change_cursor: 0,
            derived: IndexMap::new(),
        }
    }

    pub fn network(&self) -> Network {
        self.deriver.network()
    }

    fn derive_one(&mut self, chain: ChainType, index: u32) -> AddressDescriptor {
        let key = self.deriver.derive(chain, index);
        let descriptor = AddressDescriptor {
            address: key.address,
            index,
            chain,
            public_key: key.public_key,
            private_key: key.secret,
        };
        self.derived
            .entry(descriptor.address.clone())
            .or_insert_with(|| descriptor.clone());
        descriptor
    }

    /// Derive `count` addresses at `[start, start + count)` on `chain`.
    ///
    /// Cursors are left untouched. The range is clipped at `u32::MAX`.
    pub fn derive_batch(
        &mut self,
        count: u32,
        chain: ChainType,
        start: u32,
    ) -> Vec<AddressDescriptor> {
        let end = start.saturating_add(count);
        (start..end).map(|i| self.derive_one(chain, i)).collect()
    }

    /// The descriptor at the current cursor, without advancing it.
    pub fn peek_address(&mut self, chain: ChainType) -> AddressDescriptor {
        let index = self.cursor(chain);
        self.derive_one(chain, index)
    }

    /// The descriptor at the current cursor; the cursor then moves on by one.
    pub fn next_address(&mut self, chain: ChainType) -> AddressDescriptor {
        let descriptor = self.peek_address(chain);
        self.advance_cursor(chain, descriptor.index.saturating_add(1));
        descriptor
    }

    /// Move the cursor for `chain` to `max(current, to_index)`.
    pub fn advance_cursor(&mut self, chain: ChainType, to_index: u32) {
        let cursor = match chain {
            ChainType::Receive => &mut self.receive_cursor,
            ChainType::Change => &mut self.change_cursor,
        };
        if to_index > *cursor {
            log::debug!("{} cursor {} -> {}", chain, *cursor, to_index);
            *cursor = to_index;
        }
    }

    /// Next index to hand out on `chain`.
    pub fn cursor(&self, chain: ChainType) -> u32 {
        match chain {
            ChainType::Receive => self.receive_cursor,
            ChainType::Change => self.change_cursor,
        }
    }

    pub fn key_for(&self, address: &str) -> Result<&SecretKey, WalletError> {
        self.derived
            .get(address)
            .map(|d| &d.private_key)
            .ok_or_else(|| WalletError::UnknownAddress(address.to_string()))
    }

    pub fn descriptor(&self, address: &str) -> Option<&AddressDescriptor> {
        self.derived.get(address)
    }

    /// Every address derived so far, in derivation order.
    pub fn known_addresses(&self) -> impl Iterator<Item = &AddressDescriptor> {
        self.derived.values()
    }

    /// Forget cached descriptors and reset both cursors.
    pub fn clear(&mut self) {
        self.derived.clear();
        self.receive_cursor = 0;
        self.change_cursor = 0;
    }
}

impl std::fmt::Debug for AddressManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressManager")
            .field("network", &self.network())
            .field("receive_cursor", &self.receive_cursor)
            .field("change_cursor", &self.change_cursor)
            .field("derived", &self.derived.len())
            .finish()
    }
}
