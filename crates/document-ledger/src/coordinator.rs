//! # Block Coordinator
//!
//! Routes the operations of one block to their processors and enforces the
//! block-wide rules.
//!
//! ## Per-Operation Lifecycle
//!
//! ```text
//! Unprocessed ──pre_process──> PreProcessed ──sender check──> Committed
//!      │                            │                             │
//!      └──────── failure ───────────┴────────── close ────────────┘
//! ```
//!
//! `close` runs on every path and returns the processor to its pool.
//!
//! ## Block Rules
//!
//! | Rule | Enforcement |
//! |------|-------------|
//! | One operation per sender | `BlockContext::register_sender` |
//! | Fees collected per currency | `FeeCollectingWriter` |
//! | Fees settled at close | `BlockCoordinator::close` |

use crate::config::EngineConfig;
use crate::domain::operations::{FeeOperation, Operation, OperationHint};
use crate::domain::state::{StateDelta, StateValue};
use crate::errors::{LedgerError, OperationError};
use crate::ports::{CurrencyPolicies, StateReader, StateWriter};
use crate::processor::{
    new_create_documents_processor, new_fee_processor, new_sign_documents_processor,
    new_transfer_documents_processor, new_update_documents_processor, ProcessorConstructor,
    ProcessorContext, ProcessorPools,
};
use parking_lot::Mutex;
use shared_types::{Address, Amount, CurrencyId, Hash};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

// =============================================================================
// PROCESSOR REGISTRY
// =============================================================================

/// Operation type to processor constructor.
#[derive(Clone, Default)]
pub struct ProcessorRegistry {
    constructors: HashMap<OperationHint, ProcessorConstructor>,
}

impl ProcessorRegistry {
    /// Registry with no processors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the document operations and the fee settlement.
    #[must_use]
    pub fn with_document_processors() -> Self {
        let mut registry = Self::new();
        registry
            .set_processor(OperationHint::CreateDocuments, new_create_documents_processor)
            .set_processor(OperationHint::SignDocuments, new_sign_documents_processor)
            .set_processor(OperationHint::UpdateDocuments, new_update_documents_processor)
            .set_processor(OperationHint::TransferDocuments, new_transfer_documents_processor)
            .set_processor(OperationHint::Fee, new_fee_processor);
        registry
    }

    /// Registers or replaces the constructor for `hint`.
    pub fn set_processor(
        &mut self,
        hint: OperationHint,
        constructor: ProcessorConstructor,
    ) -> &mut Self {
        self.constructors.insert(hint, constructor);
        self
    }

    /// Constructor registered for `hint`.
    #[must_use]
    pub fn processor(&self, hint: OperationHint) -> Option<ProcessorConstructor> {
        self.constructors.get(&hint).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

// =============================================================================
// BLOCK CONTEXT
// =============================================================================

#[derive(Debug, Default)]
struct BlockState {
    senders: HashSet<String>,
    fees: BTreeMap<CurrencyId, Amount>,
}

/// State shared by the operations of one block.
#[derive(Debug, Default)]
pub struct BlockContext {
    state: Mutex<BlockState>,
}

impl BlockContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the block for `sender`; fails if it already has an operation.
    pub fn register_sender(&self, sender: &Address) -> Result<(), OperationError> {
        let mut state = self.state.lock();
        if !state.senders.insert(sender.as_str().to_string()) {
            return Err(OperationError::DuplicateSender(sender.clone()));
        }
        Ok(())
    }

    /// True if `sender` already has an operation in this block.
    #[must_use]
    pub fn has_sender(&self, sender: &Address) -> bool {
        self.state.lock().senders.contains(sender.as_str())
    }

    /// Adds `amount` to the fee collected in `currency`.
    ///
    /// Fails with `LedgerError::FeeOverflow` and leaves the total unchanged
    /// if it would overflow.
    pub fn add_fee(&self, currency: &CurrencyId, amount: Amount) -> Result<(), LedgerError> {
        add_checked(&mut self.state.lock().fees, currency, amount)
    }

    /// Fees collected so far, in currency order.
    #[must_use]
    pub fn fees(&self) -> BTreeMap<CurrencyId, Amount> {
        self.state.lock().fees.clone()
    }

    /// Removes and returns the collected fees.
    pub fn take_fees(&self) -> BTreeMap<CurrencyId, Amount> {
        std::mem::take(&mut self.state.lock().fees)
    }
}

fn add_checked(
    fees: &mut BTreeMap<CurrencyId, Amount>,
    currency: &CurrencyId,
    amount: Amount,
) -> Result<(), LedgerError> {
    let total = fees.entry(currency.clone()).or_default();
    *total = total
        .checked_add(amount)
        .ok_or_else(|| LedgerError::FeeOverflow(currency.clone()))?;
    Ok(())
}

/// Writer that records the fees of balance deltas once they are applied.
///
/// The new block totals are computed before the write, so an overflowing
/// fee aborts the write instead of being dropped.
pub struct FeeCollectingWriter<'a> {
    inner: &'a dyn StateWriter,
    context: &'a BlockContext,
}

impl<'a> FeeCollectingWriter<'a> {
    #[must_use]
    pub fn new(inner: &'a dyn StateWriter, context: &'a BlockContext) -> Self {
        Self { inner, context }
    }
}

impl StateWriter for FeeCollectingWriter<'_> {
    fn set(&self, op_hash: Hash, deltas: Vec<StateDelta>) -> Result<(), LedgerError> {
        let mut state = self.context.state.lock();
        let mut totals = state.fees.clone();
        for delta in &deltas {
            if let StateValue::Balance(balance) = &delta.value {
                if !balance.fee.is_zero() {
                    add_checked(&mut totals, &balance.currency, balance.fee)?;
                }
            }
        }

        self.inner.set(op_hash, deltas)?;
        state.fees = totals;
        Ok(())
    }
}

// =============================================================================
// BLOCK COORDINATOR
// =============================================================================

/// Processes the operations of one block against a ledger.
pub struct BlockCoordinator<L> {
    height: u64,
    ledger: Arc<L>,
    registry: Arc<ProcessorRegistry>,
    context: BlockContext,
    processors: ProcessorContext,
    operations: Vec<Operation>,
    closed: bool,
}

impl<L: StateReader + StateWriter> BlockCoordinator<L> {
    /// Coordinator for block `height`.
    #[must_use]
    pub fn new(
        height: u64,
        ledger: Arc<L>,
        registry: Arc<ProcessorRegistry>,
        pools: Arc<ProcessorPools>,
        policies: Option<Arc<dyn CurrencyPolicies>>,
        config: EngineConfig,
    ) -> Self {
        Self {
            height,
            ledger,
            registry,
            context: BlockContext::new(),
            processors: ProcessorContext::new(pools, policies, config),
            operations: Vec::new(),
            closed: false,
        }
    }

    #[must_use]
    pub fn height(&self) -> u64 {
        self.height
    }

    /// Block-scoped shared state.
    #[must_use]
    pub fn context(&self) -> &BlockContext {
        &self.context
    }

    /// Operations committed so far, in order, including the fee settlement
    /// once the block is closed.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Processes one operation.
    ///
    /// A failure aborts only this operation; earlier operations of the
    /// block stay committed.
    #[instrument(
        skip(self, operation),
        fields(height = self.height, operation = %operation.hash(), hint = %operation.hint())
    )]
    pub fn process(&mut self, operation: Operation) -> Result<(), OperationError> {
        if self.closed {
            return Err(OperationError::BlockClosed(self.height));
        }
        if operation.hint() == OperationHint::Fee {
            return Err(OperationError::UnsupportedOperation(OperationHint::Fee));
        }

        match self.run(&operation) {
            Ok(()) => {
                debug!("operation committed");
                self.operations.push(operation);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "operation rejected");
                Err(err)
            }
        }
    }

    fn run(&self, operation: &Operation) -> Result<(), OperationError> {
        let constructor = self
            .registry
            .processor(operation.hint())
            .ok_or(OperationError::UnsupportedOperation(operation.hint()))?;
        let mut processor = constructor(operation, &self.processors)?;

        let reader: &dyn StateReader = self.ledger.as_ref();
        let writer = FeeCollectingWriter::new(self.ledger.as_ref(), &self.context);
        let result = processor.pre_process(reader).and_then(|()| {
            if let Some(sender) = operation.sender() {
                self.context.register_sender(sender)?;
            }
            processor.process(reader, &writer)
        });

        processor.close(&self.processors.pools);
        result
    }

    /// Finalizes the block, settling collected fees.
    ///
    /// If the settlement fails the block stays open with its fees intact, so
    /// `close` can be retried. Once it succeeds, calling it again is a no-op.
    #[instrument(skip(self), fields(height = self.height))]
    pub fn close(&mut self) -> Result<(), OperationError> {
        if self.closed {
            return Ok(());
        }

        let fees = self.context.fees();
        if fees.is_empty() {
            debug!("no fees collected");
            self.closed = true;
            return Ok(());
        }

        let operation = Operation::from(FeeOperation::new(self.height, fees.into_iter().collect()));
        if let Err(err) = self.run(&operation) {
            warn!(error = %err, "fee settlement failed");
            return Err(err);
        }
        self.context.take_fees();
        self.closed = true;
        info!(operation = %operation.hash(), "fee settlement recorded");
        self.operations.push(operation);
        Ok(())
    }
}
