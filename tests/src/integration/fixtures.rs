//! Shared builders for the block flows.
//!
//! Every account `name` gets the single key `"{name}key"` with weight 1 and a
//! `PEN` balance. The `PEN` policy charges a fixed fee to `feebox0mca`.

use document_ledger::domain::FactItem;
use document_ledger::prelude::*;
use shared_types::{
    AccountKeys, AccountState, Address, Amount, BalanceState, CurrencyId, PublicKey,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Fee receiver of the `PEN` currency.
pub const FEE_RECEIVER: &str = "feebox0mca";

/// Installs a test subscriber honoring `RUST_LOG`; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn addr(s: &str) -> Address {
    Address::new(s).unwrap()
}

pub fn pen() -> CurrencyId {
    CurrencyId::new("PEN").unwrap()
}

pub fn key_of(name: &str) -> PublicKey {
    PublicKey::new(format!("{name}key")).unwrap()
}

pub fn file_id(bare: &str) -> DocumentId {
    DocumentId::new(bare, DocumentKind::File).unwrap()
}

/// File document owned by `owner` with the given signer slots.
pub fn file(bare: &str, owner: &str, signers: &[&str]) -> FileDocument {
    FileDocument::new(
        DocumentInfo::new(file_id(bare)),
        addr(owner),
        "b3f1c0ffee",
        DocumentSigner::new(addr(owner), "creator", true),
        "lease agreement",
        2048,
        signers
            .iter()
            .map(|a| DocumentSigner::new(addr(a), "signcode", false))
            .collect(),
    )
    .unwrap()
}

/// Land record `<bare>cli` owned by `owner`, leased to `lessee`.
pub fn land(bare: &str, owner: &str, lessee: &str) -> LandDocument {
    LandDocument::new(
        DocumentInfo::new(DocumentId::new(bare, DocumentKind::Land).unwrap()),
        addr(owner),
        "north gate 7",
        "40x20",
        "lessee",
        addr(lessee),
        "2026-01-01",
        90,
    )
    .unwrap()
}

/// Ledger with a funded account for every name.
pub fn funded_ledger(accounts: &[&str], balance: u64) -> Arc<InMemoryLedger> {
    let ledger = InMemoryLedger::new();
    for name in accounts {
        ledger.put_account(AccountState::new(addr(name), AccountKeys::single(key_of(name))));
        ledger.put_balance(BalanceState::new(addr(name), pen(), Amount::from(balance)));
    }
    Arc::new(ledger)
}

/// Engine charging `fee` per item in `PEN`.
pub fn engine(fee: u64) -> DocumentEngine {
    init_tracing();
    let policies: Arc<dyn CurrencyPolicies> = Arc::new(CurrencyRegistry::new().with_currency(
        pen(),
        Arc::new(FixedFeeer::new(addr(FEE_RECEIVER), Amount::from(fee))),
    ));
    DocumentEngine::new(EngineConfig::default(), Some(policies)).unwrap()
}

fn fact<I: FactItem>(sender: &str, items: Vec<I>) -> DocumentsFact<I> {
    DocumentsFact::new(b"block-flow".to_vec(), addr(sender), items)
}

pub fn create(sender: &str, docs: Vec<DocumentData>) -> Operation {
    let items = docs
        .into_iter()
        .map(|doc| CreateDocumentsItem::new(doc, pen()))
        .collect();
    CreateDocuments::new(fact(sender, items), vec![key_of(sender)]).into()
}

pub fn sign(sender: &str, owner: &str, bare: &str) -> Operation {
    let item = SignDocumentsItem::new(file_id(bare), addr(owner), pen());
    SignDocuments::new(fact(sender, vec![item]), vec![key_of(sender)]).into()
}

pub fn update(sender: &str, doc: DocumentData) -> Operation {
    let item = UpdateDocumentsItem::new(doc, pen());
    UpdateDocuments::new(fact(sender, vec![item]), vec![key_of(sender)]).into()
}

pub fn transfer(sender: &str, bare: &str, receiver: &str) -> Operation {
    let item = TransferDocumentsItem::new(file_id(bare), addr(receiver), pen());
    TransferDocuments::new(fact(sender, vec![item]), vec![key_of(sender)]).into()
}

/// `PEN` balance of `name`, zero when absent.
pub fn balance_of(ledger: &InMemoryLedger, name: &str) -> BalanceState {
    ledger
        .balance(&addr(name), &pen())
        .unwrap_or_else(|| BalanceState::new(addr(name), pen(), Amount::zero()))
}
