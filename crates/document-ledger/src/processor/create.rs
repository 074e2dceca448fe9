//! # Create Documents
//!
//! Registers new documents under the sender. Each target record must be
//! absent, the sender inventory must not hold its bare id under any kind and
//! every account the record references must exist. The new
//! infos are appended to the sender inventory, which is re-sorted ascending.

use super::{
    check_accounts_exist, ItemProcessor, OperationProcessor, ProcessorContext, ProcessorPools,
    Recycle, SenderState,
};
use crate::config::EngineConfig;
use crate::domain::document::Document;
use crate::domain::info::DocumentInfo;
use crate::domain::operations::{
    CreateDocuments, CreateDocumentsItem, FactItem, Operation, OperationHint,
};
use crate::domain::state::{document_data_key, StateDelta};
use crate::errors::{OperationError, PreconditionError};
use crate::ports::{CurrencyPolicies, StateReader, StateWriter};
use std::sync::Arc;
use tracing::{debug, info};

const HINT: OperationHint = OperationHint::CreateDocuments;

// =============================================================================
// ITEM PROCESSOR
// =============================================================================

/// Processor of one `CreateDocumentsItem`.
#[derive(Default)]
pub struct CreateDocumentsItemProcessor {
    item: Option<CreateDocumentsItem>,
    info: Option<DocumentInfo>,
}

impl CreateDocumentsItemProcessor {
    pub(crate) fn init(&mut self, item: CreateDocumentsItem) {
        self.item = Some(item);
    }

    /// Info staged for the sender inventory.
    pub(crate) fn info(&self) -> Option<&DocumentInfo> {
        self.info.as_ref()
    }
}

impl ItemProcessor for CreateDocumentsItemProcessor {
    fn pre_process(&mut self, reader: &dyn StateReader) -> Result<(), OperationError> {
        let item = self.item.as_ref().ok_or(OperationError::NotInitialized(HINT))?;
        let id = item.document.document_id();

        if reader.exists(&document_data_key(id))? {
            return Err(PreconditionError::AlreadyRegistered(id.clone()).into());
        }
        check_accounts_exist(reader, &item.document.accounts())?;

        let info = DocumentInfo::with_kind(id.clone(), item.document.kind())?;
        debug!(document = %id, "staged document creation");
        self.info = Some(info);
        Ok(())
    }

    fn process(&mut self, _reader: &dyn StateReader) -> Result<Vec<StateDelta>, OperationError> {
        let item = self.item.as_ref().ok_or(OperationError::NotInitialized(HINT))?;
        if self.info.is_none() {
            return Err(OperationError::NotInitialized(HINT));
        }
        Ok(vec![StateDelta::document(item.document.clone())])
    }
}

impl Recycle for CreateDocumentsItemProcessor {
    fn recycle(&mut self) {
        self.item = None;
        self.info = None;
    }
}

// =============================================================================
// OPERATION PROCESSOR
// =============================================================================

/// Processor of a `CreateDocuments` operation.
#[derive(Default)]
pub struct CreateDocumentsProcessor {
    operation: Option<CreateDocuments>,
    policies: Option<Arc<dyn CurrencyPolicies>>,
    config: EngineConfig,
    sender: SenderState,
    items: Vec<Box<CreateDocumentsItemProcessor>>,
}

/// Builds a create processor from the pools.
pub fn new_create_documents_processor(
    operation: &Operation,
    context: &ProcessorContext,
) -> Result<Box<dyn OperationProcessor>, OperationError> {
    let Operation::CreateDocuments(operation) = operation else {
        return Err(OperationError::UnsupportedOperation(operation.hint()));
    };

    let mut processor = context.pools.create.acquire();
    for item in operation.fact().items() {
        let mut item_processor = context.pools.create_items.acquire();
        item_processor.init(item.clone());
        processor.items.push(item_processor);
    }
    processor.operation = Some(operation.clone());
    processor.policies = context.policies.clone();
    processor.config = context.config.clone();
    Ok(processor)
}

impl OperationProcessor for CreateDocumentsProcessor {
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
            if self.sender.inventory().exists(id) {
                return Err(PreconditionError::AlreadyRegistered(id.clone()).into());
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
        let mut inventory = self.sender.inventory().clone();
        for item in &mut self.items {
            deltas.extend(item.process(reader)?);
            let info = item.info().ok_or(OperationError::NotInitialized(HINT))?;
            inventory.append(info.clone())?;
        }
        inventory.sort(true);
        deltas.push(StateDelta::inventory(sender, inventory));
        deltas.extend(self.sender.fee_deltas(sender)?);

        writer.set(operation.hash(), deltas)?;
        info!(
            operation = %operation.hash(),
            sender = %sender,
            documents = self.items.len(),
            "documents created"
        );
        Ok(())
    }

    fn close(mut self: Box<Self>, pools: &ProcessorPools) {
        for item in self.items.drain(..) {
            pools.create_items.release(item);
        }
        pools.create.release(self);
    }
}

impl Recycle for CreateDocumentsProcessor {
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
    fn test_create_debits_fee_and_registers_document() {
        let ledger = ledger(&["alice0mca", "bob0mca"], 33);
        let context = context();
        let doc = file("c1", "alice0mca", &[("bob0mca", false)]);
        let op = create_op("alice0mca", vec![doc.clone().into()]);

        execute(new_create_documents_processor, &op, &context, &ledger).unwrap();

        let balance = ledger.balance(&addr("alice0mca"), &pen()).unwrap();
        assert_eq!(balance.amount, Amount::from(32));
        assert_eq!(balance.fee, Amount::from(FEE));

        let inventory = ledger.inventory(&addr("alice0mca")).unwrap();
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory.documents()[0].id(), &file_id("c1"));
        assert_eq!(ledger.document(&file_id("c1")), Some(doc.into()));
        assert_eq!(ledger.applied_operations(), vec![op.hash()]);
    }

    #[test]
    fn test_create_sorts_inventory() {
        let ledger = ledger(&["alice0mca"], 33);
        let context = context();
        let op = create_op(
            "alice0mca",
            vec![file("zz", "alice0mca", &[]).into(), file("aa", "alice0mca", &[]).into()],
        );

        execute(new_create_documents_processor, &op, &context, &ledger).unwrap();

        let inventory = ledger.inventory(&addr("alice0mca")).unwrap();
        let ids: Vec<&str> = inventory.documents().iter().map(|d| d.id().as_str()).collect();
        assert_eq!(ids, vec!["aafdi", "zzfdi"]);
        let balance = ledger.balance(&addr("alice0mca"), &pen()).unwrap();
        assert_eq!(balance.amount, Amount::from(31));
        assert_eq!(balance.fee, Amount::from(2));
    }

    #[test]
    fn test_create_rejects_registered_document() {
        let ledger = ledger(&["alice0mca"], 33);
        register(&ledger, file("c1", "alice0mca", &[]));
        let context = context();
        let op = create_op("alice0mca", vec![file("c1", "alice0mca", &[]).into()]);

        let err = execute(new_create_documents_processor, &op, &context, &ledger).unwrap_err();
        assert!(err.to_string().contains("already registered"));
    }

    #[test]
    fn test_create_rejects_bare_id_held_under_other_kind() {
        let ledger = ledger(&["alice0mca"], 33);
        list(&ledger, "alice0mca", DocumentId::new("c1", DocumentKind::Land).unwrap());
        let context = context();
        let op = create_op("alice0mca", vec![file("c1", "alice0mca", &[]).into()]);

        let mut processor = new_create_documents_processor(&op, &context).unwrap();
        let err = processor.pre_process(&ledger).unwrap_err();
        processor.close(&context.pools);

        assert_eq!(
            err,
            OperationError::from(PreconditionError::AlreadyRegistered(file_id("c1")))
        );
        assert!(ledger.document(&file_id("c1")).is_none());
        assert_eq!(ledger.inventory(&addr("alice0mca")).unwrap().len(), 1);
    }

    #[test]
    fn test_create_requires_referenced_accounts() {
        let ledger = ledger(&["alice0mca"], 33);
        let context = context();
        let doc = file("c1", "alice0mca", &[("ghost0mca", false)]);
        let op = create_op("alice0mca", vec![doc.into()]);

        let err = execute(new_create_documents_processor, &op, &context, &ledger).unwrap_err();
        assert_eq!(
            err,
            OperationError::from(PreconditionError::AccountNotFound(addr("ghost0mca")))
        );
        assert!(ledger.applied_operations().is_empty());
    }

    #[test]
    fn test_create_insufficient_balance_leaves_state() {
        let ledger = ledger(&["alice0mca"], 0);
        let context = context();
        let op = create_op("alice0mca", vec![file("c1", "alice0mca", &[]).into()]);

        let err = execute(new_create_documents_processor, &op, &context, &ledger).unwrap_err();
        assert!(err.to_string().contains("insufficient balance"));
        assert!(ledger.document(&file_id("c1")).is_none());
        assert!(ledger.inventory(&addr("alice0mca")).is_none());
        assert_eq!(ledger.balance(&addr("alice0mca"), &pen()).unwrap().amount, Amount::zero());
    }

    #[test]
    fn test_create_requires_sender_account() {
        let ledger = ledger(&[], 0);
        let context = context();
        let op = create_op("alice0mca", vec![file("c1", "alice0mca", &[]).into()]);

        let err = execute(new_create_documents_processor, &op, &context, &ledger).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_create_rejects_foreign_signer_keys() {
        let ledger = ledger(&["alice0mca", "bob0mca"], 33);
        let context = context();
        let doc = file("c1", "alice0mca", &[]);
        let fact = crate::domain::operations::DocumentsFact::new(
            b"token".to_vec(),
            addr("alice0mca"),
            vec![CreateDocumentsItem::new(doc.into(), pen())],
        );
        let op: Operation = CreateDocuments::new(fact, vec![key_of("bob0mca")]).into();

        let err = execute(new_create_documents_processor, &op, &context, &ledger).unwrap_err();
        assert!(matches!(
            err,
            OperationError::Precondition(PreconditionError::NotEnoughSignWeight { .. })
        ));
    }

    #[test]
    fn test_close_returns_zeroed_processors() {
        let ledger = ledger(&["alice0mca"], 33);
        let context = context();
        let op = create_op("alice0mca", vec![file("c1", "alice0mca", &[]).into()]);
        execute(new_create_documents_processor, &op, &context, &ledger).unwrap();

        assert_eq!(context.pools.create.idle(), 1);
        assert_eq!(context.pools.create_items.idle(), 1);

        let processor = context.pools.create.acquire();
        assert!(processor.operation.is_none());
        assert!(processor.policies.is_none());
        assert!(processor.items.is_empty());
        assert!(processor.sender.inventory().is_empty());

        let item = context.pools.create_items.acquire();
        assert!(item.item.is_none());
        assert!(item.info().is_none());
    }

    #[test]
    fn test_constructor_rejects_other_operations() {
        let context = context();
        let op = sign_op("alice0mca", "alice0mca", &["c1"]);
        let err = new_create_documents_processor(&op, &context).err().unwrap();
        assert_eq!(
            err,
            OperationError::UnsupportedOperation(OperationHint::SignDocuments)
        );
    }
}
