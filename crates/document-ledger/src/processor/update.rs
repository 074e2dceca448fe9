//! # Update Documents
//!
//! Replaces document records held by the sender. The record must exist, be
//! owned by the sender and be listed under its full id in the sender
//! inventory; the new content is validated the same way as on creation.
//! The inventory is re-emitted sorted but gains no entries.

use super::{
    check_accounts_exist, load_document, ItemProcessor, OperationProcessor, ProcessorContext,
    ProcessorPools, Recycle, SenderState,
};
use crate::config::EngineConfig;
use crate::domain::document::{Document, DocumentData};
use crate::domain::operations::{
    FactItem, Operation, OperationHint, UpdateDocuments, UpdateDocumentsItem,
};
use crate::domain::state::StateDelta;
use crate::errors::{OperationError, PreconditionError, ValidationError};
use crate::ports::{CurrencyPolicies, StateReader, StateWriter};
use shared_types::Address;
use std::sync::Arc;
use tracing::{debug, info};

const HINT: OperationHint = OperationHint::UpdateDocuments;

// =============================================================================
// ITEM PROCESSOR
// =============================================================================

/// Processor of one `UpdateDocumentsItem`.
#[derive(Default)]
pub struct UpdateDocumentsItemProcessor {
    item: Option<UpdateDocumentsItem>,
    sender: Option<Address>,
    staged: Option<DocumentData>,
}

impl UpdateDocumentsItemProcessor {
    pub(crate) fn init(&mut self, item: UpdateDocumentsItem, sender: Address) {
        self.item = Some(item);
        self.sender = Some(sender);
    }
}

impl ItemProcessor for UpdateDocumentsItemProcessor {
    fn pre_process(&mut self, reader: &dyn StateReader) -> Result<(), OperationError> {
        let (Some(item), Some(sender)) = (&self.item, &self.sender) else {
            return Err(OperationError::NotInitialized(HINT));
        };
        let id = item.document.document_id();

        let current = load_document(reader, id)?
            .ok_or_else(|| PreconditionError::DocumentNotFound(id.clone()))?;
        if current.owner() != sender {
            return Err(PreconditionError::NotDocumentOwner {
                id: id.clone(),
                sender: sender.clone(),
            }
            .into());
        }
        if current.kind() != item.document.kind() {
            return Err(ValidationError::KindMismatch {
                expected: current.kind(),
                actual: item.document.kind(),
            }
            .into());
        }
        check_accounts_exist(reader, &item.document.accounts())?;

        debug!(document = %id, "staged document update");
        self.staged = Some(item.document.clone());
        Ok(())
    }

    fn process(&mut self, _reader: &dyn StateReader) -> Result<Vec<StateDelta>, OperationError> {
        let document = self
            .staged
            .clone()
            .ok_or(OperationError::NotInitialized(HINT))?;
        Ok(vec![StateDelta::document(document)])
    }
}

impl Recycle for UpdateDocumentsItemProcessor {
    fn recycle(&mut self) {
        self.item = None;
        self.sender = None;
        self.staged = None;
    }
}

// =============================================================================
// OPERATION PROCESSOR
// =============================================================================

/// Processor of an `UpdateDocuments` operation.
#[derive(Default)]
pub struct UpdateDocumentsProcessor {
    operation: Option<UpdateDocuments>,
    policies: Option<Arc<dyn CurrencyPolicies>>,
    config: EngineConfig,
    sender: SenderState,
    items: Vec<Box<UpdateDocumentsItemProcessor>>,
}

/// Builds an update processor from the pools.
pub fn new_update_documents_processor(
    operation: &Operation,
    context: &ProcessorContext,
) -> Result<Box<dyn OperationProcessor>, OperationError> {
    let Operation::UpdateDocuments(operation) = operation else {
        return Err(OperationError::UnsupportedOperation(operation.hint()));
    };

    let mut processor = context.pools.update.acquire();
    let sender = operation.fact().sender();
    for item in operation.fact().items() {
        let mut item_processor = context.pools.update_items.acquire();
        item_processor.init(item.clone(), sender.clone());
        processor.items.push(item_processor);
    }
    processor.operation = Some(operation.clone());
    processor.policies = context.policies.clone();
    processor.config = context.config.clone();
    Ok(processor)
}

impl OperationProcessor for UpdateDocumentsProcessor {
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
            let id = item.document_id();
            if !self.sender.inventory().holds(id) {
                return Err(PreconditionError::DocumentNotInInventory {
                    id: id.clone(),
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
        let sender = operation.fact().sender();

        let mut deltas = Vec::new();
        for item in &mut self.items {
            deltas.extend(item.process(reader)?);
        }
        let mut inventory = self.sender.inventory().clone();
        inventory.sort(true);
        deltas.push(StateDelta::inventory(sender, inventory));
        deltas.extend(self.sender.fee_deltas(sender)?);

        writer.set(operation.hash(), deltas)?;
        info!(
            operation = %operation.hash(),
            sender = %sender,
            documents = self.items.len(),
            "documents updated"
        );
        Ok(())
    }

    fn close(mut self: Box<Self>, pools: &ProcessorPools) {
        for item in self.items.drain(..) {
            pools.update_items.release(item);
        }
        pools.update.release(self);
    }
}

impl Recycle for UpdateDocumentsProcessor {
    fn recycle(&mut self) {
        self.operation = None;
        self.policies = None;
        self.config = EngineConfig::default();
        self.sender.clear();
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document_id::{DocumentId, DocumentKind};
    use crate::processor::fixtures::*;
    use shared_types::Amount;

    #[test]
    fn test_update_replaces_record() {
        let ledger = ledger(&["alice0mca", "bob0mca"], 5);
        register(&ledger, file("c1", "alice0mca", &[]));
        let context = context();
        let updated = file("c1", "alice0mca", &[("bob0mca", false)]);
        let op = update_op("alice0mca", vec![updated.clone().into()]);

        execute(new_update_documents_processor, &op, &context, &ledger).unwrap();

        assert_eq!(ledger.document(&file_id("c1")), Some(updated.into()));
        assert_eq!(ledger.inventory(&addr("alice0mca")).unwrap().len(), 1);
        assert_eq!(
            ledger.balance(&addr("alice0mca"), &pen()).unwrap().amount,
            Amount::from(4)
        );
    }

    #[test]
    fn test_update_requires_existing_record() {
        let ledger = ledger(&["alice0mca"], 5);
        let context = context();
        let op = update_op("alice0mca", vec![file("c1", "alice0mca", &[]).into()]);

        let err = execute(new_update_documents_processor, &op, &context, &ledger).unwrap_err();
        assert!(matches!(
            err,
            OperationError::Precondition(PreconditionError::DocumentNotInInventory { .. })
        ));
    }

    #[test]
    fn test_update_of_foreign_document_is_rejected() {
        let ledger = ledger(&["alice0mca", "bob0mca"], 5);
        register(&ledger, file("c1", "bob0mca", &[]));
        let context = context();
        let op = update_op("alice0mca", vec![file("c1", "alice0mca", &[]).into()]);

        let err = execute(new_update_documents_processor, &op, &context, &ledger).unwrap_err();
        assert!(err.to_string().contains("document not registered"));
        assert_eq!(
            ledger.document(&file_id("c1")).unwrap().owner(),
            &addr("bob0mca")
        );
    }

    #[test]
    fn test_update_requires_referenced_accounts() {
        let ledger = ledger(&["alice0mca"], 5);
        register(&ledger, file("c1", "alice0mca", &[]));
        let context = context();
        let op = update_op(
            "alice0mca",
            vec![file("c1", "alice0mca", &[("ghost0mca", false)]).into()],
        );

        let err = execute(new_update_documents_processor, &op, &context, &ledger).unwrap_err();
        assert_eq!(
            err,
            OperationError::from(PreconditionError::AccountNotFound(addr("ghost0mca")))
        );
    }

    #[test]
    fn test_update_across_kinds_is_rejected() {
        let ledger = ledger(&["alice0mca", "bob0mca"], 5);
        register(&ledger, file("c1", "bob0mca", &[]));
        list(&ledger, "alice0mca", DocumentId::new("c1", DocumentKind::Land).unwrap());
        let context = context();
        let op = update_op("alice0mca", vec![file("c1", "alice0mca", &[]).into()]);

        let err = execute(new_update_documents_processor, &op, &context, &ledger).unwrap_err();
        assert!(matches!(
            err,
            OperationError::Precondition(PreconditionError::DocumentNotInInventory { .. })
        ));
        assert_eq!(
            ledger.document(&file_id("c1")).unwrap().owner(),
            &addr("bob0mca")
        );
        assert_eq!(
            ledger.balance(&addr("alice0mca"), &pen()).unwrap().amount,
            Amount::from(5)
        );
    }

    #[test]
    fn test_update_requires_record_owner() {
        let ledger = ledger(&["alice0mca", "bob0mca"], 5);
        register(&ledger, file("c1", "bob0mca", &[]));
        list(&ledger, "alice0mca", file_id("c1"));
        let context = context();
        let op = update_op("alice0mca", vec![file("c1", "alice0mca", &[]).into()]);

        let err = execute(new_update_documents_processor, &op, &context, &ledger).unwrap_err();
        assert_eq!(
            err,
            OperationError::from(PreconditionError::NotDocumentOwner {
                id: file_id("c1"),
                sender: addr("alice0mca"),
            })
        );
        assert_eq!(
            ledger.document(&file_id("c1")).unwrap().owner(),
            &addr("bob0mca")
        );
    }
}
