//! # Processors
//!
//! Two-phase executors for operations and their items.
//!
//! ```text
//! acquire ──> pre_process ──> process ──> close
//!              (reads only)    (one atomic write)  (recycle into pool)
//! ```
//!
//! `pre_process` of every documents operation runs, in order:
//! 1. structural validation of the operation
//! 2. sender account must exist
//! 3. sender inventory is loaded, or starts empty
//! 4. fee requirement is computed and the sender balances checked
//! 5. each item pre-processes, in item order
//! 6. signer weight must reach the sender account threshold
//!
//! `process` collects the item deltas, the inventory deltas and one debit
//! delta per fee currency, then hands them to a single `StateWriter::set`.

pub mod create;
pub mod fee;
pub mod pool;
pub mod sign;
pub mod transfer;
pub mod update;

pub use create::*;
pub use fee::*;
pub use pool::*;
pub use sign::*;
pub use transfer::*;
pub use update::*;

use crate::config::EngineConfig;
use crate::domain::document::DocumentData;
use crate::domain::document_id::DocumentId;
use crate::domain::inventory::DocumentInventory;
use crate::domain::operations::{Operation, OperationHint};
use crate::domain::state::{document_data_key, documents_key, StateDelta};
use crate::errors::{OperationError, PreconditionError};
use crate::fees::{calculate_item_fees, check_enough_balance, fee_deltas, FeeRequirements};
use crate::ports::{CurrencyPolicies, StateReader, StateWriter};
use shared_types::{account_state_key, AccountState, Address, BalanceState, CurrencyId, PublicKey};
use std::collections::BTreeMap;
use std::sync::Arc;

// =============================================================================
// PROCESSOR CONTRACTS
// =============================================================================

/// Executor of one operation.
pub trait OperationProcessor: Send {
    /// Operation type handled.
    fn hint(&self) -> OperationHint;

    /// Checks the operation against ledger state and stages its changes.
    fn pre_process(&mut self, reader: &dyn StateReader) -> Result<(), OperationError>;

    /// Writes the staged changes through one atomic `set`.
    fn process(
        &mut self,
        reader: &dyn StateReader,
        writer: &dyn StateWriter,
    ) -> Result<(), OperationError>;

    /// Returns this processor and its item processors to `pools`.
    fn close(self: Box<Self>, pools: &ProcessorPools);
}

/// Executor of one item of a documents operation.
pub trait ItemProcessor: Recycle + Send {
    /// Checks item preconditions and stages the record change.
    fn pre_process(&mut self, reader: &dyn StateReader) -> Result<(), OperationError>;

    /// Turns the staged change into state deltas.
    fn process(&mut self, reader: &dyn StateReader) -> Result<Vec<StateDelta>, OperationError>;
}

/// Builds the processor of one operation, drawing it from the pools.
pub type ProcessorConstructor =
    fn(&Operation, &ProcessorContext) -> Result<Box<dyn OperationProcessor>, OperationError>;

/// What a processor constructor needs besides the operation.
#[derive(Clone)]
pub struct ProcessorContext {
    pub pools: Arc<ProcessorPools>,
    pub policies: Option<Arc<dyn CurrencyPolicies>>,
    pub config: EngineConfig,
}

impl ProcessorContext {
    #[must_use]
    pub fn new(
        pools: Arc<ProcessorPools>,
        policies: Option<Arc<dyn CurrencyPolicies>>,
        config: EngineConfig,
    ) -> Self {
        Self {
            pools,
            policies,
            config,
        }
    }
}

// =============================================================================
// SENDER STATE
// =============================================================================

/// Sender account, inventory and fee balances staged by `pre_process`.
#[derive(Default)]
pub(crate) struct SenderState {
    account: Option<AccountState>,
    inventory: DocumentInventory,
    required: FeeRequirements,
    balances: BTreeMap<CurrencyId, BalanceState>,
}

impl SenderState {
    /// Loads the sender account and inventory, then checks fee balances.
    pub(crate) fn load<'a, I>(
        &mut self,
        reader: &dyn StateReader,
        sender: &Address,
        policies: Option<&dyn CurrencyPolicies>,
        currencies: I,
    ) -> Result<(), OperationError>
    where
        I: IntoIterator<Item = &'a CurrencyId>,
    {
        let account = load_account(reader, sender)?;
        let inventory = load_inventory(reader, sender)?.unwrap_or_default();
        let required = calculate_item_fees(policies, currencies)?;
        let balances = check_enough_balance(sender, &required, reader)?;

        self.account = Some(account);
        self.inventory = inventory;
        self.required = required;
        self.balances = balances;
        Ok(())
    }

    pub(crate) fn inventory(&self) -> &DocumentInventory {
        &self.inventory
    }

    /// Checks the signers reach the sender account threshold.
    pub(crate) fn check_signers(
        &self,
        sender: &Address,
        signers: &[PublicKey],
    ) -> Result<(), OperationError> {
        let Some(account) = &self.account else {
            return Err(PreconditionError::AccountNotFound(sender.clone()).into());
        };
        let weight = account.keys.signed_weight(signers);
        let threshold = account.keys.threshold();
        if weight < u64::from(threshold) {
            return Err(PreconditionError::NotEnoughSignWeight { weight, threshold }.into());
        }
        Ok(())
    }

    /// Debit deltas of the staged fee requirement.
    pub(crate) fn fee_deltas(&self, sender: &Address) -> Result<Vec<StateDelta>, OperationError> {
        Ok(fee_deltas(sender, &self.balances, &self.required)?)
    }

    pub(crate) fn clear(&mut self) {
        self.account = None;
        self.inventory = DocumentInventory::default();
        self.required.clear();
        self.balances.clear();
    }
}

// =============================================================================
// LEDGER READ HELPERS
// =============================================================================

/// Account state of `address`; fails if absent.
pub(crate) fn load_account(
    reader: &dyn StateReader,
    address: &Address,
) -> Result<AccountState, OperationError> {
    let key = account_state_key(address);
    match reader.get(&key)? {
        Some(value) => Ok(value.into_account(&key)?),
        None => Err(PreconditionError::AccountNotFound(address.clone()).into()),
    }
}

/// Fails on the first address without account state.
pub(crate) fn check_accounts_exist(
    reader: &dyn StateReader,
    addresses: &[Address],
) -> Result<(), OperationError> {
    for address in addresses {
        if !reader.exists(&account_state_key(address))? {
            return Err(PreconditionError::AccountNotFound(address.clone()).into());
        }
    }
    Ok(())
}

/// Inventory held by `owner`, if any.
pub(crate) fn load_inventory(
    reader: &dyn StateReader,
    owner: &Address,
) -> Result<Option<DocumentInventory>, OperationError> {
    let key = documents_key(owner);
    match reader.get(&key)? {
        Some(value) => Ok(Some(value.into_inventory(&key)?)),
        None => Ok(None),
    }
}

/// Record stored for `id`, if any.
pub(crate) fn load_document(
    reader: &dyn StateReader,
    id: &DocumentId,
) -> Result<Option<DocumentData>, OperationError> {
    let key = document_data_key(id);
    match reader.get(&key)? {
        Some(value) => Ok(Some(value.into_document(&key)?)),
        None => Ok(None),
    }
}

// =============================================================================
// TEST FIXTURES
// =============================================================================
