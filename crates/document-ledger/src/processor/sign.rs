//! # Sign Documents
//!
//! Marks the sender as having signed file documents. The owner named by the
//! item must list the document under its full id in its inventory, the
//! record must be a file document and the sender must hold an unsigned slot
//! among its signers. Only the first unsigned slot of the sender is flipped.
//! Inventories are never written.

use super::{
    load_document, load_inventory, ItemProcessor, OperationProcessor, ProcessorContext,
    ProcessorPools, Recycle, SenderState,
};
use crate::config::EngineConfig;
use crate::domain::document::Document;
use crate::domain::file::FileDocument;
use crate::domain::operations::{
    FactItem, Operation, OperationHint, SignDocuments, SignDocumentsItem,
};
use crate::domain::state::StateDelta;
use crate::errors::{OperationError, PreconditionError};
use crate::ports::{CurrencyPolicies, StateReader, StateWriter};
use shared_types::Address;
use std::sync::Arc;
use tracing::{debug, info};

const HINT: OperationHint = OperationHint::SignDocuments;

// =============================================================================
// ITEM PROCESSOR
// =============================================================================

/// Processor of one `SignDocumentsItem`.
#[derive(Default)]
pub struct SignDocumentsItemProcessor {
    item: Option<SignDocumentsItem>,
    sender: Option<Address>,
    signed: Option<FileDocument>,
}

impl SignDocumentsItemProcessor {
    pub(crate) fn init(&mut self, item: SignDocumentsItem, sender: Address) {
        self.item = Some(item);
        self.sender = Some(sender);
    }
}

impl ItemProcessor for SignDocumentsItemProcessor {
    fn pre_process(&mut self, reader: &dyn StateReader) -> Result<(), OperationError> {
        let (Some(item), Some(sender)) = (&self.item, &self.sender) else {
            return Err(OperationError::NotInitialized(HINT));
        };

        let inventory = load_inventory(reader, &item.owner)?
            .ok_or_else(|| PreconditionError::InventoryNotFound(item.owner.clone()))?;
        if !inventory.holds(&item.id) {
            return Err(PreconditionError::DocumentNotInInventory {
                id: item.id.clone(),
                owner: item.owner.clone(),
            }
            .into());
        }

        let data = load_document(reader, &item.id)?
            .ok_or_else(|| PreconditionError::DocumentNotFound(item.id.clone()))?;
        let mut document = data
            .into_file()
            .map_err(|other| PreconditionError::NotFileDocument {
                id: item.id.clone(),
                kind: other.kind(),
            })?;

        if !document.sign(sender) {
            return Err(PreconditionError::SignerNotFound {
                sender: sender.clone(),
                id: item.id.clone(),
            }
            .into());
        }
        debug!(document = %item.id, signer = %sender, "staged document signature");
        self.signed = Some(document);
        Ok(())
    }

    fn process(&mut self, _reader: &dyn StateReader) -> Result<Vec<StateDelta>, OperationError> {
        let document = self
            .signed
            .clone()
            .ok_or(OperationError::NotInitialized(HINT))?;
        Ok(vec![StateDelta::document(document.into())])
    }
}

impl Recycle for SignDocumentsItemProcessor {
    fn recycle(&mut self) {
        self.item = None;
        self.sender = None;
        self.signed = None;
    }
}

// =============================================================================
// OPERATION PROCESSOR
// =============================================================================

/// Processor of a `SignDocuments` operation.
#[derive(Default)]
pub struct SignDocumentsProcessor {
    operation: Option<SignDocuments>,
    policies: Option<Arc<dyn CurrencyPolicies>>,
    config: EngineConfig,
    sender: SenderState,
    items: Vec<Box<SignDocumentsItemProcessor>>,
}

/// Builds a sign processor from the pools.
pub fn new_sign_documents_processor(
    operation: &Operation,
    context: &ProcessorContext,
) -> Result<Box<dyn OperationProcessor>, OperationError> {
    let Operation::SignDocuments(operation) = operation else {
        return Err(OperationError::UnsupportedOperation(operation.hint()));
    };

    let mut processor = context.pools.sign.acquire();
    let sender = operation.fact().sender();
    for item in operation.fact().items() {
        let mut item_processor = context.pools.sign_items.acquire();
        item_processor.init(item.clone(), sender.clone());
        processor.items.push(item_processor);
    }
    processor.operation = Some(operation.clone());
    processor.policies = context.policies.clone();
    processor.config = context.config.clone();
    Ok(processor)
}

impl OperationProcessor for SignDocumentsProcessor {
    fn hint(&self) -> OperationHint {
        HINT
    }

    fn pre_process(&mut self, reader: &dyn StateReader) -> Result<(), OperationError> {
        let operation = self
            .operation
            .as_ref()
            .ok_or(OperationError::NotInitialized(HINT))?;
        operation.is_valid(&self.config)?;

        let fact = operation.fact();
        self.sender.load(
            reader,
            fact.sender(),
            self.policies.as_deref(),
            fact.items().iter().map(FactItem::currency),
        )?;
        for item in &mut self.items {
            item.pre_process(reader)?;
        }
        self.sender.check_signers(fact.sender(), operation.signers())
    }

    fn process(
        &mut self,
        reader: &dyn StateReader,
        writer: &dyn StateWriter,
    ) -> Result<(), OperationError> {
        let operation = self
            .operation
            .as_ref()
            .ok_or(OperationError::NotInitialized(HINT))?;
        let sender = operation.fact().sender();

        let mut deltas = Vec::new();
        for item in &mut self.items {
            deltas.extend(item.process(reader)?);
        }
        deltas.extend(self.sender.fee_deltas(sender)?);

        writer.set(operation.hash(), deltas)?;
        info!(
            operation = %operation.hash(),
            sender = %sender,
            documents = self.items.len(),
            "documents signed"
        );
        Ok(())
    }

    fn close(mut self: Box<Self>, pools: &ProcessorPools) {
        for item in self.items.drain(..) {
            pools.sign_items.release(item);
        }
        pools.sign.release(self);
    }
}

impl Recycle for SignDocumentsProcessor {
    fn recycle(&mut self) {
        self.operation = None;
        self.policies = None;
        self.config = EngineConfig::default();
        self.sender.clear();
        self.items.clear();
    }
}
