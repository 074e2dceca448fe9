//! # Ownership Moves
//!
//! Transfers across blocks: the record, both inventories and the right to
//! update follow the document to its new owner.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use document_ledger::prelude::*;
    use shared_types::Amount;

    fn created(engine: &DocumentEngine, accounts: &[&str]) -> std::sync::Arc<InMemoryLedger> {
        let ledger = funded_ledger(accounts, 10);
        let mut block = engine.new_block(1, ledger.clone());
        block
            .process(create(
                "alice0mca",
                vec![
                    file("c1", "alice0mca", &["carol0mca"]).into(),
                    file("c2", "alice0mca", &[]).into(),
                ],
            ))
            .unwrap();
        block.close().unwrap();
        ledger
    }

    #[test]
    fn test_transfer_moves_ownership() {
        let engine = engine(1);
        let ledger = created(&engine, &["alice0mca", "bob0mca", "carol0mca"]);

        let mut block = engine.new_block(2, ledger.clone());
        block.process(transfer("alice0mca", "c1", "bob0mca")).unwrap();
        block.close().unwrap();

        let alice = ledger.inventory(&addr("alice0mca")).unwrap();
        assert!(!alice.exists(&file_id("c1")));
        assert!(alice.exists(&file_id("c2")));
        assert!(ledger
            .inventory(&addr("bob0mca"))
            .unwrap()
            .exists(&file_id("c1")));
        assert_eq!(
            ledger.document(&file_id("c1")).unwrap().owner(),
            &addr("bob0mca")
        );
        assert_eq!(balance_of(&ledger, "alice0mca").amount, Amount::from(7));
        assert_eq!(balance_of(&ledger, FEE_RECEIVER).amount, Amount::from(3));
    }

    #[test]
    fn test_new_owner_controls_document() {
        let engine = engine(1);
        let ledger = created(&engine, &["alice0mca", "bob0mca", "carol0mca"]);

        let mut moved = engine.new_block(2, ledger.clone());
        moved.process(transfer("alice0mca", "c1", "bob0mca")).unwrap();
        moved.close().unwrap();

        let mut block = engine.new_block(3, ledger.clone());
        let err = block
            .process(update("alice0mca", file("c1", "alice0mca", &[]).into()))
            .unwrap_err();
        assert!(err.to_string().contains("document not registered"));

        block
            .process(update("bob0mca", file("c1", "bob0mca", &[]).into()))
            .unwrap();
        assert!(ledger
            .document(&file_id("c1"))
            .unwrap()
            .as_file()
            .unwrap()
            .signers()
            .is_empty());
    }

    #[test]
    fn test_signer_signs_under_new_owner() {
        let engine = engine(1);
        let ledger = created(&engine, &["alice0mca", "bob0mca", "carol0mca"]);

        let mut moved = engine.new_block(2, ledger.clone());
        moved.process(transfer("alice0mca", "c1", "bob0mca")).unwrap();
        moved.close().unwrap();

        let mut block = engine.new_block(3, ledger.clone());
        let err = block
            .process(sign("carol0mca", "alice0mca", "c1"))
            .unwrap_err();
        assert!(err.to_string().contains("document not registered"));

        let mut next = engine.new_block(4, ledger.clone());
        next.process(sign("carol0mca", "bob0mca", "c1")).unwrap();
        let data = ledger.document(&file_id("c1")).unwrap();
        assert!(data.as_file().unwrap().signers()[0].signed);
    }

    #[test]
    fn test_transfer_onto_existing_id_is_denied() {
        let engine = engine(1);
        let ledger = created(&engine, &["alice0mca", "bob0mca", "carol0mca"]);

        let mut block = engine.new_block(2, ledger.clone());
        block
            .process(transfer("alice0mca", "c1", "alice0mca"))
            .unwrap_err();
        block.close().unwrap();

        assert_eq!(ledger.inventory(&addr("alice0mca")).unwrap().len(), 2);
        assert_eq!(balance_of(&ledger, "alice0mca").amount, Amount::from(8));
        assert_eq!(block.operations().len(), 0);
    }

    #[test]
    fn test_same_bare_id_of_other_kind_grants_nothing() {
        let engine = engine(1);
        let ledger = funded_ledger(&["alice0mca", "bob0mca", "carol0mca"], 10);

        let mut first = engine.new_block(1, ledger.clone());
        first
            .process(create("bob0mca", vec![file("c1", "bob0mca", &["carol0mca"]).into()]))
            .unwrap();
        first
            .process(create("alice0mca", vec![land("c1", "alice0mca", "carol0mca").into()]))
            .unwrap();
        first.close().unwrap();

        let mut block = engine.new_block(2, ledger.clone());
        let err = block
            .process(update("alice0mca", file("c1", "alice0mca", &[]).into()))
            .unwrap_err();
        assert!(err.to_string().contains("document not registered"));

        let mut next = engine.new_block(3, ledger.clone());
        let err = next
            .process(transfer("alice0mca", "c1", "carol0mca"))
            .unwrap_err();
        assert!(err.to_string().contains("document not registered"));

        let record = ledger.document(&file_id("c1")).unwrap();
        assert_eq!(record.owner(), &addr("bob0mca"));
        assert_eq!(record.as_file().unwrap().signers().len(), 1);
        assert!(ledger
            .inventory(&addr("bob0mca"))
            .unwrap()
            .holds(&file_id("c1")));
        assert!(ledger.inventory(&addr("carol0mca")).is_none());
        assert_eq!(balance_of(&ledger, "alice0mca").amount, Amount::from(9));
    }
}
