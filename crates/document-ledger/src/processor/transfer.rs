//! # Transfer Documents
//!
//! Moves file documents from the sender to receivers. The sender must own
//! the record and list it under its full id. Each receiver account must exist
//! and must not already hold a document under the same bare id.
//! On commit the info leaves the sender inventory, joins the receiver
//! inventory, and the record is rewritten with the receiver as owner.

use super::{
    check_accounts_exist, load_document, load_inventory, ItemProcessor, OperationProcessor,
    ProcessorContext, ProcessorPools, Recycle, SenderState,
};
use crate::config::EngineConfig;
use crate::domain::document::Document;
use crate::domain::file::FileDocument;
use crate::domain::inventory::DocumentInventory;
use crate::domain::operations::{
    FactItem, Operation, OperationHint, TransferDocuments, TransferDocumentsItem,
};
use crate::domain::state::StateDelta;
use crate::errors::{OperationError, PreconditionError};
use crate::ports::{CurrencyPolicies, StateReader, StateWriter};
use shared_types::Address;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

const HINT: OperationHint = OperationHint::TransferDocuments;

// =============================================================================
// ITEM PROCESSOR
// =============================================================================

/// Processor of one `TransferDocumentsItem`.
#[derive(Default)]
pub struct TransferDocumentsItemProcessor {
    item: Option<TransferDocumentsItem>,
    sender: Option<Address>,
    staged: Option<FileDocument>,
}

impl TransferDocumentsItemProcessor {
    pub(crate) fn init(&mut self, item: TransferDocumentsItem, sender: Address) {
        self.item = Some(item);
        self.sender = Some(sender);
    }
}

impl ItemProcessor for TransferDocumentsItemProcessor {
    fn pre_process(&mut self, reader: &dyn StateReader) -> Result<(), OperationError> {
        let (Some(item), Some(sender)) = (&self.item, &self.sender) else {
            return Err(OperationError::NotInitialized(HINT));
        };

        check_accounts_exist(reader, std::slice::from_ref(&item.receiver))?;

        let data = load_document(reader, &item.id)?
            .ok_or_else(|| PreconditionError::DocumentNotFound(item.id.clone()))?;
        let document = data
            .into_file()
            .map_err(|other| PreconditionError::NotFileDocument {
                id: item.id.clone(),
                kind: other.kind(),
            })?;
        if document.owner() != sender {
            return Err(PreconditionError::NotDocumentOwner {
                id: item.id.clone(),
                sender: sender.clone(),
            }
            .into());
        }

        if let Some(inventory) = load_inventory(reader, &item.receiver)? {
            if inventory.exists(&item.id) {
                return Err(PreconditionError::ReceiverAlreadyOwns {
                    receiver: item.receiver.clone(),
                    id: item.id.clone(),
                }
                .into());
            }
        }

        debug!(document = %item.id, receiver = %item.receiver, "staged document transfer");
        self.staged = Some(document.with_owner(item.receiver.clone()));
        Ok(())
    }

    fn process(&mut self, _reader: &dyn StateReader) -> Result<Vec<StateDelta>, OperationError> {
        let document = self
            .staged
            .clone()
            .ok_or(OperationError::NotInitialized(HINT))?;
        Ok(vec![StateDelta::document(document.into())])
    }
}

impl Recycle for TransferDocumentsItemProcessor {
    fn recycle(&mut self) {
        self.item = None;
        self.sender = None;
        self.staged = None;
    }
}

// =============================================================================
// OPERATION PROCESSOR
// =============================================================================

/// Processor of a `TransferDocuments` operation.
#[derive(Default)]
pub struct TransferDocumentsProcessor {
    operation: Option<TransferDocuments>,
    policies: Option<Arc<dyn CurrencyPolicies>>,
    config: EngineConfig,
    sender: SenderState,
    items: Vec<Box<TransferDocumentsItemProcessor>>,
}

/// Builds a transfer processor from the pools.
pub fn new_transfer_documents_processor(
    operation: &Operation,
    context: &ProcessorContext,
) -> Result<Box<dyn OperationProcessor>, OperationError> {
    let Operation::TransferDocuments(operation) = operation else {
        return Err(OperationError::UnsupportedOperation(operation.hint()));
    };

    let mut processor = context.pools.transfer.acquire();
    let sender = operation.fact().sender();
    for item in operation.fact().items() {
        let mut item_processor = context.pools.transfer_items.acquire();
        item_processor.init(item.clone(), sender.clone());
        processor.items.push(item_processor);
    }
    processor.operation = Some(operation.clone());
    processor.policies = context.policies.clone();
    processor.config = context.config.clone();
    Ok(processor)
}

impl OperationProcessor for TransferDocumentsProcessor {
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
        for (item, processor) in fact.items().iter().zip(&mut self.items) {
            if !self.sender.inventory().holds(&item.id) {
                return Err(PreconditionError::DocumentNotInInventory {
                    id: item.id.clone(),
                    owner: fact.sender().clone(),
                }
                .into());
            }
            processor.pre_process(reader)?;
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
        let fact = operation.fact();
        let sender = fact.sender();

        let mut deltas = Vec::new();
        for item in &mut self.items {
            deltas.extend(item.process(reader)?);
        }

        let mut outgoing = self.sender.inventory().clone();
        let mut incoming: BTreeMap<Address, DocumentInventory> = BTreeMap::new();
        for item in fact.items() {
            let info = outgoing
                .remove(&item.id)
                .ok_or_else(|| PreconditionError::DocumentNotInInventory {
                    id: item.id.clone(),
                    owner: sender.clone(),
                })?;
            let inventory = match incoming.entry(item.receiver.clone()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    entry.insert(load_inventory(reader, &item.receiver)?.unwrap_or_default())
                }
            };
            inventory
                .append(info)
                .map_err(|_| PreconditionError::ReceiverAlreadyOwns {
                    receiver: item.receiver.clone(),
                    id: item.id.clone(),
                })?;
        }

        outgoing.sort(true);
        deltas.push(StateDelta::inventory(sender, outgoing));
        for (receiver, mut inventory) in incoming {
            inventory.sort(true);
            deltas.push(StateDelta::inventory(&receiver, inventory));
        }
        deltas.extend(self.sender.fee_deltas(sender)?);

        writer.set(operation.hash(), deltas)?;
        info!(
            operation = %operation.hash(),
            sender = %sender,
            documents = self.items.len(),
            "documents transferred"
        );
        Ok(())
    }

    fn close(mut self: Box<Self>, pools: &ProcessorPools) {
        for item in self.items.drain(..) {
            pools.transfer_items.release(item);
        }
        pools.transfer.release(self);
    }
}

impl Recycle for TransferDocumentsProcessor {
    fn recycle(&mut self) {
        self.operation = None;
        self.policies = None;
        self.config = EngineConfig::default();
        self.sender.clear();
        self.items.clear();
    }
}
