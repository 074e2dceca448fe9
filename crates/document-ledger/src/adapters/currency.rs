//! # Currency Policies
//!
//! In-memory fee policies and the registry that looks them up by currency.

use crate::ports::{CurrencyPolicies, FeeError, Feeer};
use parking_lot::RwLock;
use shared_types::{Address, Amount, CurrencyId};
use std::collections::HashMap;
use std::sync::Arc;

/// Charges no fee and has no receiver.
#[derive(Clone, Copy, Debug, Default)]
pub struct NilFeeer;

impl Feeer for NilFeeer {
    fn fee(&self, _base: Amount) -> Result<Amount, FeeError> {
        Ok(Amount::zero())
    }

    fn receiver(&self) -> Option<&Address> {
        None
    }
}

/// Charges a fixed amount per item, whatever the base amount.
#[derive(Clone, Debug)]
pub struct FixedFeeer {
    receiver: Address,
    amount: Amount,
}

impl FixedFeeer {
    #[must_use]
    pub fn new(receiver: Address, amount: Amount) -> Self {
        Self { receiver, amount }
    }

    #[must_use]
    pub fn amount(&self) -> Amount {
        self.amount
    }
}

impl Feeer for FixedFeeer {
    fn fee(&self, _base: Amount) -> Result<Amount, FeeError> {
        Ok(self.amount)
    }

    fn receiver(&self) -> Option<&Address> {
        Some(&self.receiver)
    }
}

/// Fee policies of the known currencies.
#[derive(Default)]
pub struct CurrencyRegistry {
    policies: RwLock<HashMap<CurrencyId, Arc<dyn Feeer>>>,
}

impl CurrencyRegistry {
    /// Create an empty registry; every currency is unknown.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces the policy of `currency`.
    pub fn register(&self, currency: CurrencyId, feeer: Arc<dyn Feeer>) {
        self.policies.write().insert(currency, feeer);
    }

    /// Builder-style registration.
    #[must_use]
    pub fn with_currency(self, currency: CurrencyId, feeer: Arc<dyn Feeer>) -> Self {
        self.register(currency, feeer);
        self
    }

    /// Number of known currencies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.read().is_empty()
    }
}

impl CurrencyPolicies for CurrencyRegistry {
    fn feeer(&self, currency: &CurrencyId) -> Option<Arc<dyn Feeer>> {
        self.policies.read().get(currency).cloned()
    }
}

impl std::fmt::Debug for CurrencyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let policies = self.policies.read();
        let mut currencies: Vec<&CurrencyId> = policies.keys().collect();
        currencies.sort();
        f.debug_struct("CurrencyRegistry")
            .field("currencies", &currencies)
            .finish()
    }
}
