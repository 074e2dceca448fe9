//! # Ports Layer
//!
//! Interfaces the engine depends on. The ledger store and the currency
//! module sit behind these traits; `adapters` holds in-memory versions.
//!
//! - **Driven Ports (Outbound)**: `StateReader`, `StateWriter`,
//!   `CurrencyPolicies`, `Feeer`

pub mod outbound;

pub use outbound::*;
