//! # Operations
//!
//! Ledger operations over documents. An operation wraps a fact (token,
//! sender, items) together with the public keys that signed it; signature
//! checks themselves happen before the engine sees the operation.
//!
//! ```text
//! SignedOperation<I>
//!   ├── fact: DocumentsFact<I>   hash = keccak(hint, token, sender, items)
//!   ├── signers: [PublicKey]
//!   └── hash = keccak(fact.hash, signers)
//! ```

use super::document::{Document, DocumentData};
use super::document_id::DocumentId;
use crate::config::EngineConfig;
use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use shared_types::{concat_bytes, keccak256, Address, Amount, CurrencyId, Hash, PublicKey};
use std::fmt;

/// Runtime type tag of an operation, used to pick its processor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OperationHint {
    CreateDocuments,
    SignDocuments,
    UpdateDocuments,
    TransferDocuments,
    Fee,
}

impl OperationHint {
    /// Stable string form, also mixed into fact hashes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateDocuments => "create-documents",
            Self::SignDocuments => "sign-documents",
            Self::UpdateDocuments => "update-documents",
            Self::TransferDocuments => "transfer-documents",
            Self::Fee => "fee",
        }
    }
}

impl fmt::Display for OperationHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn amount_bytes(amount: &Amount) -> [u8; 32] {
    let mut buf = [0u8; 32];
    amount.to_big_endian(&mut buf);
    buf
}

// =============================================================================
// ITEMS
// =============================================================================

/// One line item of a documents fact.
pub trait FactItem: Clone {
    /// Operation the item belongs to.
    const HINT: OperationHint;

    /// Currency the item fee is paid in.
    fn currency(&self) -> &CurrencyId;

    /// Document the item targets.
    fn document_id(&self) -> &DocumentId;

    /// Canonical bytes.
    fn bytes(&self) -> Vec<u8>;

    /// Structural checks; `sender` is the fact sender.
    fn is_valid(&self, sender: &Address) -> Result<(), ValidationError>;
}

/// Registers a new document owned by the sender.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDocumentsItem {
    pub document: DocumentData,
    pub currency: CurrencyId,
}

impl CreateDocumentsItem {
    #[must_use]
    pub fn new(document: DocumentData, currency: CurrencyId) -> Self {
        Self { document, currency }
    }
}

impl FactItem for CreateDocumentsItem {
    const HINT: OperationHint = OperationHint::CreateDocuments;

    fn currency(&self) -> &CurrencyId {
        &self.currency
    }

    fn document_id(&self) -> &DocumentId {
        self.document.document_id()
    }

    fn bytes(&self) -> Vec<u8> {
        let document = self.document.bytes();
        concat_bytes([document.as_slice(), self.currency.as_str().as_bytes()])
    }

    fn is_valid(&self, sender: &Address) -> Result<(), ValidationError> {
        self.document.is_valid()?;
        check_owner(&self.document, sender)
    }
}

/// Replaces an existing document record held by the sender.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDocumentsItem {
    pub document: DocumentData,
    pub currency: CurrencyId,
}

impl UpdateDocumentsItem {
    #[must_use]
    pub fn new(document: DocumentData, currency: CurrencyId) -> Self {
        Self { document, currency }
    }
}

impl FactItem for UpdateDocumentsItem {
    const HINT: OperationHint = OperationHint::UpdateDocuments;

    fn currency(&self) -> &CurrencyId {
        &self.currency
    }

    fn document_id(&self) -> &DocumentId {
        self.document.document_id()
    }

    fn bytes(&self) -> Vec<u8> {
        let document = self.document.bytes();
        concat_bytes([document.as_slice(), self.currency.as_str().as_bytes()])
    }

    fn is_valid(&self, sender: &Address) -> Result<(), ValidationError> {
        self.document.is_valid()?;
        check_owner(&self.document, sender)
    }
}

fn check_owner(document: &DocumentData, sender: &Address) -> Result<(), ValidationError> {
    if document.owner() != sender {
        return Err(ValidationError::OwnerMismatch {
            owner: document.owner().clone(),
            sender: sender.clone(),
        });
    }
    Ok(())
}

/// Signs a file document held by `owner`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignDocumentsItem {
    pub id: DocumentId,
    pub owner: Address,
    pub currency: CurrencyId,
}

impl SignDocumentsItem {
    #[must_use]
    pub fn new(id: DocumentId, owner: Address, currency: CurrencyId) -> Self {
        Self {
            id,
            owner,
            currency,
        }
    }
}

impl FactItem for SignDocumentsItem {
    const HINT: OperationHint = OperationHint::SignDocuments;

    fn currency(&self) -> &CurrencyId {
        &self.currency
    }

    fn document_id(&self) -> &DocumentId {
        &self.id
    }

    fn bytes(&self) -> Vec<u8> {
        concat_bytes([
            self.id.bytes(),
            self.owner.bytes(),
            self.currency.as_str().as_bytes(),
        ])
    }

    fn is_valid(&self, _sender: &Address) -> Result<(), ValidationError> {
        self.id.is_valid()
    }
}

/// Hands a file document held by the sender to `receiver`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferDocumentsItem {
    pub id: DocumentId,
    pub receiver: Address,
    pub currency: CurrencyId,
}

impl TransferDocumentsItem {
    #[must_use]
    pub fn new(id: DocumentId, receiver: Address, currency: CurrencyId) -> Self {
        Self {
            id,
            receiver,
            currency,
        }
    }
}

impl FactItem for TransferDocumentsItem {
    const HINT: OperationHint = OperationHint::TransferDocuments;

    fn currency(&self) -> &CurrencyId {
        &self.currency
    }

    fn document_id(&self) -> &DocumentId {
        &self.id
    }

    fn bytes(&self) -> Vec<u8> {
        concat_bytes([
            self.id.bytes(),
            self.receiver.bytes(),
            self.currency.as_str().as_bytes(),
        ])
    }

    fn is_valid(&self, _sender: &Address) -> Result<(), ValidationError> {
        self.id.is_valid()
    }
}

// =============================================================================
// FACTS
// =============================================================================

/// Token, sender and items of a documents operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentsFact<I> {
    hash: Hash,
    token: Vec<u8>,
    sender: Address,
    items: Vec<I>,
}

impl<I: FactItem> DocumentsFact<I> {
    /// Creates a fact and computes its hash.
    pub fn new(token: impl Into<Vec<u8>>, sender: Address, items: Vec<I>) -> Self {
        let mut fact = Self {
            hash: Hash::ZERO,
            token: token.into(),
            sender,
            items,
        };
        fact.hash = fact.generate_hash();
        fact
    }

    #[must_use]
    pub fn hash(&self) -> Hash {
        self.hash
    }

    #[must_use]
    pub fn token(&self) -> &[u8] {
        &self.token
    }

    #[must_use]
    pub fn sender(&self) -> &Address {
        &self.sender
    }

    #[must_use]
    pub fn items(&self) -> &[I] {
        &self.items
    }

    /// Canonical bytes.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        let items: Vec<Vec<u8>> = self.items.iter().map(FactItem::bytes).collect();
        let mut parts: Vec<&[u8]> = vec![
            I::HINT.as_str().as_bytes(),
            self.token.as_slice(),
            self.sender.bytes(),
        ];
        parts.extend(items.iter().map(Vec::as_slice));
        concat_bytes(parts)
    }

    fn generate_hash(&self) -> Hash {
        keccak256(&self.bytes())
    }

    /// Structural validation; touches no ledger state.
    pub fn is_valid(&self, config: &EngineConfig) -> Result<(), ValidationError> {
        if self.token.is_empty() {
            return Err(ValidationError::EmptyToken);
        }
        if self.items.is_empty() {
            return Err(ValidationError::EmptyItems);
        }
        if self.items.len() > config.max_items_per_operation {
            return Err(ValidationError::TooManyItems {
                count: self.items.len(),
                max: config.max_items_per_operation,
            });
        }
        for (i, item) in self.items.iter().enumerate() {
            item.is_valid(&self.sender)?;
            let id = item.document_id();
            if self.items[..i]
                .iter()
                .any(|other| other.document_id().bare() == id.bare())
            {
                return Err(ValidationError::DuplicateDocument(id.clone()));
            }
        }
        if self.hash != self.generate_hash() {
            return Err(ValidationError::HashMismatch);
        }
        Ok(())
    }
}

/// A documents fact with its signers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedOperation<I> {
    fact: DocumentsFact<I>,
    signers: Vec<PublicKey>,
    hash: Hash,
}

impl<I: FactItem> SignedOperation<I> {
    /// Wraps a fact signed by `signers`.
    pub fn new(fact: DocumentsFact<I>, signers: Vec<PublicKey>) -> Self {
        let hash = operation_hash(fact.hash(), &signers);
        Self {
            fact,
            signers,
            hash,
        }
    }

    #[must_use]
    pub fn fact(&self) -> &DocumentsFact<I> {
        &self.fact
    }

    #[must_use]
    pub fn signers(&self) -> &[PublicKey] {
        &self.signers
    }

    #[must_use]
    pub fn hash(&self) -> Hash {
        self.hash
    }

    /// Structural validation of the fact and the operation hash.
    pub fn is_valid(&self, config: &EngineConfig) -> Result<(), ValidationError> {
        if self.signers.is_empty() {
            return Err(ValidationError::EmptySigners);
        }
        self.fact.is_valid(config)?;
        if self.hash != operation_hash(self.fact.hash(), &self.signers) {
            return Err(ValidationError::HashMismatch);
        }
        Ok(())
    }
}

fn operation_hash(fact_hash: Hash, signers: &[PublicKey]) -> Hash {
    let mut parts: Vec<&[u8]> = vec![fact_hash.as_bytes().as_slice()];
    parts.extend(signers.iter().map(|k| k.as_str().as_bytes()));
    keccak256(&concat_bytes(parts))
}

pub type CreateDocuments = SignedOperation<CreateDocumentsItem>;
pub type SignDocuments = SignedOperation<SignDocumentsItem>;
pub type UpdateDocuments = SignedOperation<UpdateDocumentsItem>;
pub type TransferDocuments = SignedOperation<TransferDocumentsItem>;

// =============================================================================
// FEE OPERATION
// =============================================================================

/// Fee settlement synthesized by the block coordinator.
///
/// Carries the per-currency fee totals of one block; it has no sender and
/// no signers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeOperation {
    height: u64,
    amounts: Vec<(CurrencyId, Amount)>,
    hash: Hash,
}

impl FeeOperation {
    /// Creates the settlement for block `height`.
    #[must_use]
    pub fn new(height: u64, amounts: Vec<(CurrencyId, Amount)>) -> Self {
        let height_bytes = height.to_be_bytes();
        let amount_parts: Vec<Vec<u8>> = amounts
            .iter()
            .map(|(cid, amount)| {
                let amount = amount_bytes(amount);
                concat_bytes([cid.as_str().as_bytes(), amount.as_slice()])
            })
            .collect();
        let mut parts: Vec<&[u8]> = vec![
            OperationHint::Fee.as_str().as_bytes(),
            height_bytes.as_slice(),
        ];
        parts.extend(amount_parts.iter().map(Vec::as_slice));
        let hash = keccak256(&concat_bytes(parts));
        Self {
            height,
            amounts,
            hash,
        }
    }

    #[must_use]
    pub fn height(&self) -> u64 {
        self.height
    }

    #[must_use]
    pub fn amounts(&self) -> &[(CurrencyId, Amount)] {
        &self.amounts
    }

    #[must_use]
    pub fn hash(&self) -> Hash {
        self.hash
    }
}

// =============================================================================
// OPERATION
// =============================================================================

/// Any operation the engine processes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    CreateDocuments(CreateDocuments),
    SignDocuments(SignDocuments),
    UpdateDocuments(UpdateDocuments),
    TransferDocuments(TransferDocuments),
    Fee(FeeOperation),
}

impl Operation {
    /// Registry tag of this operation.
    #[must_use]
    pub fn hint(&self) -> OperationHint {
        match self {
            Self::CreateDocuments(_) => OperationHint::CreateDocuments,
            Self::SignDocuments(_) => OperationHint::SignDocuments,
            Self::UpdateDocuments(_) => OperationHint::UpdateDocuments,
            Self::TransferDocuments(_) => OperationHint::TransferDocuments,
            Self::Fee(_) => OperationHint::Fee,
        }
    }

    /// Operation hash; the ledger write of this operation is keyed by it.
    #[must_use]
    pub fn hash(&self) -> Hash {
        match self {
            Self::CreateDocuments(op) => op.hash(),
            Self::SignDocuments(op) => op.hash(),
            Self::UpdateDocuments(op) => op.hash(),
            Self::TransferDocuments(op) => op.hash(),
            Self::Fee(op) => op.hash(),
        }
    }

    /// Sender, for operations that have one.
    #[must_use]
    pub fn sender(&self) -> Option<&Address> {
        match self {
            Self::CreateDocuments(op) => Some(op.fact().sender()),
            Self::SignDocuments(op) => Some(op.fact().sender()),
            Self::UpdateDocuments(op) => Some(op.fact().sender()),
            Self::TransferDocuments(op) => Some(op.fact().sender()),
            Self::Fee(_) => None,
        }
    }

    /// Structural validation.
    pub fn is_valid(&self, config: &EngineConfig) -> Result<(), ValidationError> {
        match self {
            Self::CreateDocuments(op) => op.is_valid(config),
            Self::SignDocuments(op) => op.is_valid(config),
            Self::UpdateDocuments(op) => op.is_valid(config),
            Self::TransferDocuments(op) => op.is_valid(config),
            Self::Fee(_) => Ok(()),
        }
    }
}

impl From<CreateDocuments> for Operation {
    fn from(op: CreateDocuments) -> Self {
        Self::CreateDocuments(op)
    }
}

impl From<SignDocuments> for Operation {
    fn from(op: SignDocuments) -> Self {
        Self::SignDocuments(op)
    }
}

impl From<UpdateDocuments> for Operation {
    fn from(op: UpdateDocuments) -> Self {
        Self::UpdateDocuments(op)
    }
}

impl From<TransferDocuments> for Operation {
    fn from(op: TransferDocuments) -> Self {
        Self::TransferDocuments(op)
    }
}

impl From<FeeOperation> for Operation {
    fn from(op: FeeOperation) -> Self {
        Self::Fee(op)
    }
}
