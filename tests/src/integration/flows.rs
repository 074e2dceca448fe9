//! # Block Flows
//!
//! Create, sign, update and fee settlement driven through `DocumentEngine`
//! blocks, checking the ledger state each block leaves behind.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use document_ledger::prelude::*;
    use shared_types::Amount;

    // =============================================================================
    // CREATE
    // =============================================================================

    #[test]
    fn test_create_debits_fee_and_lists_document() {
        let engine = engine(1);
        let ledger = funded_ledger(&["alice0mca"], 33);
        let mut block = engine.new_block(1, ledger.clone());

        block
            .process(create("alice0mca", vec![file("c1", "alice0mca", &[]).into()]))
            .unwrap();

        let balance = balance_of(&ledger, "alice0mca");
        assert_eq!(balance.amount, Amount::from(32));
        assert_eq!(balance.fee, Amount::from(1));

        let inventory = ledger.inventory(&addr("alice0mca")).unwrap();
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory.documents()[0].id(), &file_id("c1"));
        assert!(ledger.document(&file_id("c1")).is_some());
    }

    #[test]
    fn test_create_every_document_kind() {
        let engine = engine(1);
        let ledger = funded_ledger(&["mayor0mca", "bob0mca", "carol0mca"], 10);
        let owner = addr("mayor0mca");
        let info = |bare: &str, kind| DocumentInfo::new(DocumentId::new(bare, kind).unwrap());

        let stats = UserStatisticsDocument::new(
            info("citizen", DocumentKind::UserStatistics),
            owner.clone(),
            120,
            30,
            UserStatistics::default(),
        )
        .unwrap();
        let land = LandDocument::new(
            info("plot7", DocumentKind::Land),
            owner.clone(),
            "north gate 7",
            "40x20",
            "bob",
            addr("bob0mca"),
            "2026-01-01",
            90,
        )
        .unwrap();
        let vote = VoteDocument::new(
            info("round3", DocumentKind::Vote),
            owner.clone(),
            3,
            "2026-03-01",
            vec![
                VotingCandidate::new(addr("bob0mca"), "bob", "lower taxes", 0).unwrap(),
                VotingCandidate::new(addr("carol0mca"), "carol", "more parks", 0).unwrap(),
            ],
            "mayor",
            addr("mayor0mca"),
            "2026",
        )
        .unwrap();
        let history = HistoryDocument::new(
            info("founding", DocumentKind::History),
            owner.clone(),
            "founding day",
            addr("carol0mca"),
            "2026-01-01",
            "archive",
            "city",
        )
        .unwrap();

        let mut block = engine.new_block(1, ledger.clone());
        block
            .process(create(
                "mayor0mca",
                vec![
                    file("deed", "mayor0mca", &["bob0mca"]).into(),
                    stats.into(),
                    land.into(),
                    vote.into(),
                    history.into(),
                ],
            ))
            .unwrap();

        let inventory = ledger.inventory(&owner).unwrap();
        assert_eq!(inventory.len(), 5);
        let kinds: Vec<DocumentKind> = inventory
            .documents()
            .iter()
            .map(DocumentInfo::kind)
            .collect();
        for kind in DocumentKind::ALL {
            assert!(kinds.contains(&kind), "missing {kind}");
        }
        assert_eq!(balance_of(&ledger, "mayor0mca").amount, Amount::from(5));
    }

    #[test]
    fn test_insufficient_balance_mutates_nothing() {
        let engine = engine(10);
        let ledger = funded_ledger(&["alice0mca"], 9);
        let mut block = engine.new_block(1, ledger.clone());

        let err = block
            .process(create("alice0mca", vec![file("c1", "alice0mca", &[]).into()]))
            .unwrap_err();

        assert!(err.to_string().contains("insufficient balance"));
        assert!(!err.is_fatal());
        assert_eq!(balance_of(&ledger, "alice0mca").amount, Amount::from(9));
        assert!(ledger.document(&file_id("c1")).is_none());
        assert!(ledger.inventory(&addr("alice0mca")).is_none());
        assert!(ledger.applied_operations().is_empty());
    }

    #[test]
    fn test_create_over_held_bare_id_leaves_sender_free() {
        let engine = engine(1);
        let ledger = funded_ledger(&["alice0mca", "bob0mca"], 10);

        let mut first = engine.new_block(1, ledger.clone());
        first
            .process(create("alice0mca", vec![land("c1", "alice0mca", "bob0mca").into()]))
            .unwrap();
        first.close().unwrap();

        let mut block = engine.new_block(2, ledger.clone());
        let err = block
            .process(create("alice0mca", vec![file("c1", "alice0mca", &[]).into()]))
            .unwrap_err();
        assert!(err.to_string().contains("already registered"));
        assert!(!block.context().has_sender(&addr("alice0mca")));

        block
            .process(create("alice0mca", vec![file("c2", "alice0mca", &[]).into()]))
            .unwrap();
        block.close().unwrap();

        assert!(ledger.document(&file_id("c1")).is_none());
        let inventory = ledger.inventory(&addr("alice0mca")).unwrap();
        assert_eq!(inventory.len(), 2);
        assert!(inventory.holds(&file_id("c2")));
        assert_eq!(balance_of(&ledger, "alice0mca").amount, Amount::from(8));
        assert_eq!(balance_of(&ledger, FEE_RECEIVER).amount, Amount::from(2));
    }

    // =============================================================================
    // BLOCK RULES
    // =============================================================================

    #[test]
    fn test_second_operation_of_sender_is_rejected() {
        let engine = engine(1);
        let ledger = funded_ledger(&["alice0mca"], 33);
        let mut block = engine.new_block(1, ledger.clone());

        block
            .process(create("alice0mca", vec![file("c1", "alice0mca", &[]).into()]))
            .unwrap();
        let err = block
            .process(create("alice0mca", vec![file("c2", "alice0mca", &[]).into()]))
            .unwrap_err();

        assert!(err.to_string().contains("violates only one sender"));
        assert!(ledger.document(&file_id("c1")).is_some());
        assert!(ledger.document(&file_id("c2")).is_none());
        assert_eq!(ledger.inventory(&addr("alice0mca")).unwrap().len(), 1);
        assert_eq!(balance_of(&ledger, "alice0mca").amount, Amount::from(32));
    }

    #[test]
    fn test_sender_may_act_again_in_next_block() {
        let engine = engine(1);
        let ledger = funded_ledger(&["alice0mca"], 33);

        let mut first = engine.new_block(1, ledger.clone());
        first
            .process(create("alice0mca", vec![file("c1", "alice0mca", &[]).into()]))
            .unwrap();
        first.close().unwrap();

        let mut second = engine.new_block(2, ledger.clone());
        second
            .process(create("alice0mca", vec![file("c2", "alice0mca", &[]).into()]))
            .unwrap();

        let inventory = ledger.inventory(&addr("alice0mca")).unwrap();
        let ids: Vec<&DocumentId> = inventory.documents().iter().map(DocumentInfo::id).collect();
        assert_eq!(ids, vec![&file_id("c1"), &file_id("c2")]);
    }

    #[test]
    fn test_close_credits_collected_fees() {
        let engine = engine(2);
        let ledger = funded_ledger(&["alice0mca", "bob0mca"], 20);
        let mut block = engine.new_block(4, ledger.clone());

        block
            .process(create(
                "alice0mca",
                vec![
                    file("c1", "alice0mca", &[]).into(),
                    file("c2", "alice0mca", &[]).into(),
                ],
            ))
            .unwrap();
        block
            .process(create("bob0mca", vec![file("c3", "bob0mca", &[]).into()]))
            .unwrap();
        assert_eq!(block.context().fees().get(&pen()), Some(&Amount::from(6)));

        block.close().unwrap();

        assert_eq!(balance_of(&ledger, FEE_RECEIVER).amount, Amount::from(6));
        let settlement = block.operations().last().unwrap();
        assert_eq!(settlement.hint(), OperationHint::Fee);
        assert_eq!(ledger.applied_operations().last(), Some(&settlement.hash()));
    }

    // =============================================================================
    // SIGN AND UPDATE
    // =============================================================================

    #[test]
    fn test_only_listed_signer_can_sign() {
        let engine = engine(1);
        let ledger = funded_ledger(&["alice0mca", "bob0mca", "carol0mca", "dave0mca"], 10);

        let mut first = engine.new_block(1, ledger.clone());
        first
            .process(create(
                "alice0mca",
                vec![file("c1", "alice0mca", &["bob0mca", "carol0mca"]).into()],
            ))
            .unwrap();
        first.close().unwrap();

        let mut second = engine.new_block(2, ledger.clone());
        let err = second
            .process(sign("dave0mca", "alice0mca", "c1"))
            .unwrap_err();
        assert!(err.to_string().contains("sender not found in document signers"));

        second.process(sign("bob0mca", "alice0mca", "c1")).unwrap();

        let data = ledger.document(&file_id("c1")).unwrap();
        let signers = data.as_file().unwrap().signers();
        assert!(signers[0].signed);
        assert!(!signers[1].signed);
        assert_eq!(balance_of(&ledger, "dave0mca").amount, Amount::from(10));
        assert_eq!(balance_of(&ledger, "bob0mca").amount, Amount::from(9));
    }

    #[test]
    fn test_update_replaces_content_in_later_block() {
        let engine = engine(1);
        let ledger = funded_ledger(&["alice0mca", "bob0mca"], 10);

        let mut first = engine.new_block(1, ledger.clone());
        first
            .process(create("alice0mca", vec![file("c1", "alice0mca", &[]).into()]))
            .unwrap();
        first.close().unwrap();

        let revised = file("c1", "alice0mca", &["bob0mca"]);
        let mut second = engine.new_block(2, ledger.clone());
        second
            .process(update("alice0mca", revised.clone().into()))
            .unwrap();

        assert_eq!(ledger.document(&file_id("c1")), Some(revised.into()));
        assert_eq!(ledger.inventory(&addr("alice0mca")).unwrap().len(), 1);
    }

    #[test]
    fn test_unsigned_operation_is_rejected() {
        let engine = engine(1);
        let ledger = funded_ledger(&["alice0mca", "bob0mca"], 10);
        let fact = DocumentsFact::new(
            b"block-flow".to_vec(),
            addr("alice0mca"),
            vec![CreateDocumentsItem::new(file("c1", "alice0mca", &[]).into(), pen())],
        );
        let op: Operation = CreateDocuments::new(fact, vec![key_of("bob0mca")]).into();

        let mut block = engine.new_block(1, ledger.clone());
        let err = block.process(op).unwrap_err();

        assert!(err.to_string().contains("not enough signing weight"));
        assert!(ledger.document(&file_id("c1")).is_none());
    }
}
