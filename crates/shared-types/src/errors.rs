//! # Error Types
//!
//! Defines the errors raised while constructing ledger primitives.

use thiserror::Error;

/// Errors that can occur when parsing or validating a ledger primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// Address is empty, too short, too long or contains illegal characters.
    #[error("Invalid address: {0:?}")]
    InvalidAddress(String),

    /// Currency id does not match the currency id pattern.
    #[error("Invalid currency id: {0:?}")]
    InvalidCurrencyId(String),

    /// Public key is empty or contains illegal characters.
    #[error("Invalid public key: {0:?}")]
    InvalidPublicKey(String),

    /// Account keys are inconsistent with their threshold.
    #[error("Invalid account keys: {0}")]
    InvalidKeys(String),
}
