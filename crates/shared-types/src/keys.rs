//! # State Key Layout
//!
//! Keys owned by the account and currency modules. Keys are plain strings
//! discriminated by a suffix, so a prefix scan over one address groups all
//! of its state.

use crate::entities::{Address, CurrencyId};

/// Suffix of the account state key.
pub const ACCOUNT_STATE_SUFFIX: &str = ":account";

/// Suffix of the balance state key.
pub const BALANCE_STATE_SUFFIX: &str = ":balance";

/// Key of the account state for `address`.
#[must_use]
pub fn account_state_key(address: &Address) -> String {
    format!("{address}{ACCOUNT_STATE_SUFFIX}")
}

/// Key of the balance state of `holder` in `currency`.
#[must_use]
pub fn balance_state_key(holder: &Address, currency: &CurrencyId) -> String {
    format!("{holder}-{currency}{BALANCE_STATE_SUFFIX}")
}
