//! # Adapters Layer
//!
//! In-memory implementations of the outbound ports.
//!
//! - `InMemoryLedger` implements `StateReader` and `StateWriter`
//! - `CurrencyRegistry` implements `CurrencyPolicies`

pub mod currency;
pub mod memory_ledger;

pub use currency::*;
pub use memory_ledger::*;
