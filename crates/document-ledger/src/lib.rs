//! # Document Ledger - Document Operation Engine
//!
//! Registers, signs, updates and transfers typed documents on a key-value
//! ledger, charging a per-item fee in the currency each item names.
//!
//! ## Purpose
//!
//! Every document lives under a typed id (`<bare id><3-letter suffix>`) and
//! is listed in the inventory of its owner. Operations are validated,
//! checked against ledger state, then committed as one atomic write set.
//!
//! ## Ledger Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | One operation per sender per block | `coordinator.rs` - `BlockContext::register_sender()` |
//! | A document id is registered once | `processor/create.rs` - item pre-processing |
//! | An inventory holds unique bare ids | `domain/inventory.rs` - `DocumentInventory::append()` |
//! | A failed operation writes nothing | `processor/*` - single `StateWriter::set()` in `process` |
//! | Balances never go negative | `fees.rs` - `check_enough_balance()` |
//!
//! ## State Layout
//!
//! | Key | Value |
//! |-----|-------|
//! | `<address>:account` | `AccountState` |
//! | `<address>-<currency>:balance` | `BalanceState` |
//! | `<address>:documents` | `DocumentInventory` |
//! | `<document id>:documentdata` | `DocumentData` |
//!
//! ## Operations
//!
//! | Operation | Processor | Effect |
//! |-----------|-----------|--------|
//! | `CreateDocuments` | `processor/create.rs` | new records, inventory grows |
//! | `SignDocuments` | `processor/sign.rs` | sender signer flag set |
//! | `UpdateDocuments` | `processor/update.rs` | records replaced |
//! | `TransferDocuments` | `processor/transfer.rs` | records move to receivers |
//! | `FeeOperation` | `processor/fee.rs` | block fees credited to receivers |
//!
//! ## Usage Example
//!
//! ```ignore
//! use document_ledger::prelude::*;
//!
//! let engine = DocumentEngine::new(EngineConfig::default(), Some(policies))?;
//! let mut block = engine.new_block(height, ledger);
//! block.process(operation)?;
//! block.close()?;
//! ```

// Crate-level lints
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod errors;
pub mod fees;
pub mod ports;
pub mod processor;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Documents
    pub use crate::domain::{
        Document, DocumentData, DocumentId, DocumentInfo, DocumentInventory, DocumentKind,
        DocumentSigner, FileDocument, HistoryDocument, LandDocument, UserStatistics,
        UserStatisticsDocument, VoteDocument, VotingCandidate,
    };

    // Operations
    pub use crate::domain::{
        CreateDocuments, CreateDocumentsItem, DocumentsFact, FeeOperation, Operation,
        OperationHint, SignDocuments, SignDocumentsItem, SignedOperation, TransferDocuments,
        TransferDocumentsItem, UpdateDocuments, UpdateDocumentsItem,
    };

    // State
    pub use crate::domain::{document_data_key, documents_key, StateDelta, StateValue};

    // Ports
    pub use crate::ports::{CurrencyPolicies, FeeError, Feeer, StateReader, StateWriter};

    // Adapters
    pub use crate::adapters::{CurrencyRegistry, FixedFeeer, InMemoryLedger, NilFeeer};

    // Errors
    pub use crate::errors::{LedgerError, OperationError, PreconditionError, ValidationError};

    // Engine
    pub use crate::config::{ConfigError, EngineConfig};
    pub use crate::coordinator::{BlockContext, BlockCoordinator, ProcessorRegistry};
    pub use crate::service::DocumentEngine;
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
