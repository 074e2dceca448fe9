//! # Driven Ports (Outbound)
//!
//! What the engine needs from the outside:
//! - Keyed reads of ledger state
//! - Atomic writes of an operation's deltas
//! - Per-currency fee policies from the currency module

use crate::domain::state::{StateDelta, StateValue};
use crate::errors::LedgerError;
use shared_types::{Address, Amount, CurrencyId, Hash};
use std::sync::Arc;
use thiserror::Error;

// =============================================================================
// LEDGER STATE
// =============================================================================

/// Read access to ledger state.
pub trait StateReader: Send + Sync {
    /// Value stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<StateValue>, LedgerError>;

    /// True if a value is stored under `key`.
    fn exists(&self, key: &str) -> Result<bool, LedgerError> {
        Ok(self.get(key)?.is_some())
    }
}

/// Write access to ledger state.
pub trait StateWriter: Send + Sync {
    /// Applies all `deltas` of operation `op_hash` atomically.
    ///
    /// Either every delta becomes visible or none does.
    fn set(&self, op_hash: Hash, deltas: Vec<StateDelta>) -> Result<(), LedgerError>;
}

// =============================================================================
// CURRENCY POLICIES
// =============================================================================

/// Fee policy failure reported by a `Feeer`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct FeeError {
    pub reason: String,
}

impl FeeError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Fee policy of one currency.
pub trait Feeer: Send + Sync {
    /// Fee charged on an item whose base amount is `base`.
    fn fee(&self, base: Amount) -> Result<Amount, FeeError>;

    /// Account credited with collected fees, if any.
    fn receiver(&self) -> Option<&Address>;
}

/// Lookup of fee policies by currency.
pub trait CurrencyPolicies: Send + Sync {
    /// Policy of `currency`, or `None` if the currency is unknown.
    fn feeer(&self, currency: &CurrencyId) -> Option<Arc<dyn Feeer>>;
}
