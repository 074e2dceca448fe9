//! # Document-Ledger Test Suite
//!
//! Unified test crate for flows that span a whole block.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # End-to-end block flows
//!     ├── fixtures.rs   # Funded ledgers, documents, operations
//!     ├── flows.rs      # Create, sign, fee and duplicate-sender flows
//!     └── transfer.rs   # Ownership moves across blocks
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p document-ledger-tests
//!
//! # With engine logs
//! RUST_LOG=document_ledger=debug cargo test -p document-ledger-tests
//! ```

pub mod integration;
