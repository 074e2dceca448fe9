//! # Ledger State Values
//!
//! The typed values stored in the ledger and the deltas processors emit.
//!
//! ## Key Layout
//!
//! | Key | Value |
//! |-----|-------|
//! | `<documentID>:documentdata` | `DocumentData` |
//! | `<owner>:documents` | `DocumentInventory` |
//! | `<address>:account` | `AccountState` (account module) |
//! | `<address>-<currency>:balance` | `BalanceState` (currency module) |

use super::document::{Document, DocumentData};
use super::document_id::DocumentId;
use super::inventory::DocumentInventory;
use crate::errors::LedgerError;
use serde::{Deserialize, Serialize};
use shared_types::{AccountState, Address, BalanceState};

/// Suffix of document record keys.
pub const DOCUMENT_DATA_SUFFIX: &str = ":documentdata";

/// Suffix of owner inventory keys.
pub const DOCUMENTS_SUFFIX: &str = ":documents";

/// Key of the record for `id`.
#[must_use]
pub fn document_data_key(id: &DocumentId) -> String {
    format!("{id}{DOCUMENT_DATA_SUFFIX}")
}

/// Key of the inventory held by `owner`.
#[must_use]
pub fn documents_key(owner: &Address) -> String {
    format!("{owner}{DOCUMENTS_SUFFIX}")
}

/// A value stored under a ledger key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateValue {
    Account(AccountState),
    Balance(BalanceState),
    Inventory(DocumentInventory),
    Document(DocumentData),
}

impl StateValue {
    /// Name of the variant, for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Account(_) => "account",
            Self::Balance(_) => "balance",
            Self::Inventory(_) => "document inventory",
            Self::Document(_) => "document data",
        }
    }

    pub fn into_account(self, key: &str) -> Result<AccountState, LedgerError> {
        match self {
            Self::Account(v) => Ok(v),
            _ => Err(unexpected(key, "account")),
        }
    }

    pub fn into_balance(self, key: &str) -> Result<BalanceState, LedgerError> {
        match self {
            Self::Balance(v) => Ok(v),
            _ => Err(unexpected(key, "balance")),
        }
    }

    pub fn into_inventory(self, key: &str) -> Result<DocumentInventory, LedgerError> {
        match self {
            Self::Inventory(v) => Ok(v),
            _ => Err(unexpected(key, "document inventory")),
        }
    }

    pub fn into_document(self, key: &str) -> Result<DocumentData, LedgerError> {
        match self {
            Self::Document(v) => Ok(v),
            _ => Err(unexpected(key, "document data")),
        }
    }
}

fn unexpected(key: &str, expected: &'static str) -> LedgerError {
    LedgerError::UnexpectedValue {
        key: key.to_string(),
        expected,
    }
}

/// One state write produced by a processor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDelta {
    pub key: String,
    pub value: StateValue,
}

impl StateDelta {
    #[must_use]
    pub fn new(key: String, value: StateValue) -> Self {
        Self { key, value }
    }

    /// Write of a document record under its own key.
    #[must_use]
    pub fn document(data: DocumentData) -> Self {
        Self::new(document_data_key(data.document_id()), StateValue::Document(data))
    }

    /// Write of an owner inventory.
    #[must_use]
    pub fn inventory(owner: &Address, inventory: DocumentInventory) -> Self {
        Self::new(documents_key(owner), StateValue::Inventory(inventory))
    }

    /// Write of a balance under the currency module's key.
    #[must_use]
    pub fn balance(balance: BalanceState) -> Self {
        Self::new(
            shared_types::balance_state_key(&balance.holder, &balance.currency),
            StateValue::Balance(balance),
        )
    }
}
