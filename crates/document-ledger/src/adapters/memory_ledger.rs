//! # In-Memory Ledger
//!
//! Keyed state store implementing both state ports. Writes of one operation
//! are applied under a single lock, so readers never observe half of them.

use crate::domain::document::DocumentData;
use crate::domain::document_id::DocumentId;
use crate::domain::inventory::DocumentInventory;
use crate::domain::state::{document_data_key, documents_key, StateDelta, StateValue};
use crate::errors::LedgerError;
use crate::ports::{StateReader, StateWriter};
use parking_lot::RwLock;
use shared_types::{
    account_state_key, balance_state_key, AccountState, Address, BalanceState, CurrencyId, Hash,
};
use std::collections::HashMap;
use tracing::trace;

#[derive(Debug, Default)]
struct LedgerInner {
    values: HashMap<String, StateValue>,
    applied: Vec<Hash>,
}

/// In-memory ledger for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    inner: RwLock<LedgerInner>,
}

impl InMemoryLedger {
    /// Create a new empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, outside any operation.
    pub fn put(&self, key: impl Into<String>, value: StateValue) {
        self.inner.write().values.insert(key.into(), value);
    }

    /// Stores an account under its account-module key.
    pub fn put_account(&self, account: AccountState) {
        let key = account_state_key(&account.address);
        self.put(key, StateValue::Account(account));
    }

    /// Stores a balance under its currency-module key.
    pub fn put_balance(&self, balance: BalanceState) {
        let key = balance_state_key(&balance.holder, &balance.currency);
        self.put(key, StateValue::Balance(balance));
    }

    /// Balance of `holder` in `currency`.
    #[must_use]
    pub fn balance(&self, holder: &Address, currency: &CurrencyId) -> Option<BalanceState> {
        match self.value(&balance_state_key(holder, currency)) {
            Some(StateValue::Balance(balance)) => Some(balance),
            _ => None,
        }
    }

    /// Inventory held by `owner`.
    #[must_use]
    pub fn inventory(&self, owner: &Address) -> Option<DocumentInventory> {
        match self.value(&documents_key(owner)) {
            Some(StateValue::Inventory(inventory)) => Some(inventory),
            _ => None,
        }
    }

    /// Record stored for `id`.
    #[must_use]
    pub fn document(&self, id: &DocumentId) -> Option<DocumentData> {
        match self.value(&document_data_key(id)) {
            Some(StateValue::Document(data)) => Some(data),
            _ => None,
        }
    }

    /// Hashes of the operations applied so far, in order.
    #[must_use]
    pub fn applied_operations(&self) -> Vec<Hash> {
        self.inner.read().applied.clone()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().values.is_empty()
    }

    fn value(&self, key: &str) -> Option<StateValue> {
        self.inner.read().values.get(key).cloned()
    }
}

impl StateReader for InMemoryLedger {
    fn get(&self, key: &str) -> Result<Option<StateValue>, LedgerError> {
        Ok(self.value(key))
    }
}

impl StateWriter for InMemoryLedger {
    fn set(&self, op_hash: Hash, deltas: Vec<StateDelta>) -> Result<(), LedgerError> {
        let mut inner = self.inner.write();
        trace!(operation = %op_hash, deltas = deltas.len(), "applying state deltas");
        for delta in deltas {
            inner.values.insert(delta.key, delta.value);
        }
        inner.applied.push(op_hash);
        Ok(())
    }
}
