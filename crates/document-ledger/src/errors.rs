//! # Error Types
//!
//! All error types for document operations.
//!
//! | Layer | Type | Effect |
//! |-------|------|--------|
//! | Structure | `ValidationError` | operation rejected before any ledger access |
//! | Ledger state | `PreconditionError` | current operation aborted, no writes |
//! | Block | `OperationError::DuplicateSender` | offending operation aborted |
//! | Storage | `LedgerError` | fatal, propagated unchanged |

use crate::domain::document_id::{DocumentId, DocumentKind};
use crate::domain::operations::OperationHint;
use shared_types::{Address, Amount, CurrencyId, TypeError};
use thiserror::Error;

// =============================================================================
// VALIDATION ERRORS
// =============================================================================

/// Structural errors detected without reading the ledger.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Fact token is empty.
    #[error("empty token")]
    EmptyToken,

    /// Fact carries no items.
    #[error("empty items")]
    EmptyItems,

    /// Fact carries more items than allowed.
    #[error("items over allowed: {count} > {max}")]
    TooManyItems { count: usize, max: usize },

    /// Operation carries no signers.
    #[error("empty signers")]
    EmptySigners,

    /// Document id string is malformed.
    #[error("malformed document id: {0:?}")]
    MalformedDocumentId(String),

    /// Document id suffix is not a known variant tag.
    #[error("unknown document type suffix: {0:?}")]
    UnknownDocumentKind(String),

    /// Record or info carries a different variant tag than expected.
    #[error("document type mismatch: expected {expected}, got {actual}")]
    KindMismatch {
        expected: DocumentKind,
        actual: DocumentKind,
    },

    /// Two signer records of one document share an address.
    #[error("duplicate signer found: {0}")]
    DuplicateSigner(Address),

    /// Two candidate records of one vote share an address.
    #[error("duplicate candidate found: {0}")]
    DuplicateCandidate(Address),

    /// Two items of one fact address the same document.
    #[error("duplicate document id found in items: {0}")]
    DuplicateDocument(DocumentId),

    /// Candidate manifest is over the allowed length.
    #[error("manifest too long: {length} > {max}")]
    ManifestTooLong { length: usize, max: usize },

    /// Document owner is not the operation sender.
    #[error("document owner {owner} is not the sender {sender}")]
    OwnerMismatch { owner: Address, sender: Address },

    /// A required field is empty.
    #[error("empty {0}")]
    EmptyField(&'static str),

    /// Operation hash does not match its content.
    #[error("hash does not match content")]
    HashMismatch,

    /// Primitive failed to parse.
    #[error(transparent)]
    Type(#[from] TypeError),
}

// =============================================================================
// PRECONDITION ERRORS
// =============================================================================

/// Ledger-state preconditions checked during pre-processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    /// Account has no state.
    #[error("account {0} does not exist")]
    AccountNotFound(Address),

    /// Holder has no balance state for a currency.
    #[error("balance of {holder} in {currency} does not exist")]
    BalanceNotFound {
        holder: Address,
        currency: CurrencyId,
    },

    /// Holder balance is below the required debit.
    #[error("insufficient balance of {holder} in {currency}: required {required}, available {available}")]
    InsufficientBalance {
        holder: Address,
        currency: CurrencyId,
        required: Amount,
        available: Amount,
    },

    /// No fee policy registered for a currency.
    #[error("unknown currency id found: {0}")]
    UnknownCurrency(CurrencyId),

    /// Fee policy failed to compute a fee.
    #[error("fee policy of {currency} failed: {reason}")]
    FeePolicy { currency: CurrencyId, reason: String },

    /// Document record already exists.
    #[error("document {0} already registered")]
    AlreadyRegistered(DocumentId),

    /// Document record does not exist.
    #[error("document {0} does not exist")]
    DocumentNotFound(DocumentId),

    /// Owner has no inventory state.
    #[error("owner has no document inventory: {0}")]
    InventoryNotFound(Address),

    /// Inventory does not list the document.
    #[error("document not registered in inventory of {owner}: {id}")]
    DocumentNotInInventory { id: DocumentId, owner: Address },

    /// Record is owned by another account than the sender.
    #[error("document {id} is not owned by {sender}")]
    NotDocumentOwner { id: DocumentId, sender: Address },

    /// Record is not a signable file document.
    #[error("document {id} is not a file document: {kind}")]
    NotFileDocument { id: DocumentId, kind: DocumentKind },

    /// Sender is not an unsigned signer of the document.
    #[error("sender not found in document signers: sender {sender}, document {id}")]
    SignerNotFound { sender: Address, id: DocumentId },

    /// Receiver already holds a document with the same id.
    #[error("receiver already owns document: receiver {receiver}, document {id}")]
    ReceiverAlreadyOwns { receiver: Address, id: DocumentId },

    /// Signers do not reach the sender account threshold.
    #[error("not enough signing weight: {weight} < threshold {threshold}")]
    NotEnoughSignWeight { weight: u64, threshold: u32 },

    /// Balance would overflow when credited.
    #[error("balance overflow of {holder} in {currency}")]
    BalanceOverflow {
        holder: Address,
        currency: CurrencyId,
    },
}

// =============================================================================
// LEDGER ERRORS
// =============================================================================

/// Failures surfaced by the ledger read/write capabilities.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Value stored under a key has an unexpected type.
    #[error("unexpected state value under key {key}: expected {expected}")]
    UnexpectedValue { key: String, expected: &'static str },

    /// Block fee total for a currency would overflow.
    #[error("block fee total overflows in {0}")]
    FeeOverflow(CurrencyId),

    /// Storage backend failure.
    #[error("ledger backend error: {0}")]
    Backend(String),
}

// =============================================================================
// OPERATION ERRORS
// =============================================================================

/// Error returned by operation processors and the block coordinator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OperationError {
    /// Operation is structurally invalid.
    #[error("invalid operation: {0}")]
    Validation(#[from] ValidationError),

    /// Ledger state does not allow the operation.
    #[error("failed to process operation: {0}")]
    Precondition(#[from] PreconditionError),

    /// Sender already has an operation in this block.
    #[error("violates only one sender in one block: {0}")]
    DuplicateSender(Address),

    /// No processor registered for the operation type.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(OperationHint),

    /// Block was already closed.
    #[error("block {0} is closed")]
    BlockClosed(u64),

    /// Processor was driven out of lifecycle order.
    #[error("{0} processor used before it was initialized")]
    NotInitialized(OperationHint),

    /// Ledger capability failed.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl OperationError {
    /// Returns true if the error came from the ledger itself.
    ///
    /// Fatal errors are propagated to the runtime; every other error only
    /// aborts the current operation.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Ledger(_))
    }
}

// =============================================================================
// TESTS
// =============================================================================
