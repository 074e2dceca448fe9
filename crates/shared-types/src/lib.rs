//! # Shared Types Crate
//!
//! This crate contains the ledger primitives that the document engine
//! consumes from the surrounding account and currency modules.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Addresses, currency ids, amounts and hashes
//!   are defined once and shared by every processor.
//! - **Validated Construction**: Every string-backed primitive is validated
//!   when it is built, so processors never see a malformed address.
//! - **Stable Key Layout**: Account and balance state keys are produced here,
//!   never formatted ad hoc by callers.

pub mod entities;
pub mod errors;
pub mod keys;

pub use entities::*;
pub use errors::*;
pub use keys::*;
