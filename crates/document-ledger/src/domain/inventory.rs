//! # Document Inventory
//!
//! The ordered list of documents an owner holds, stored under
//! `<owner>:documents`.
//!
//! ## Invariants
//!
//! - No two entries share a bare id, whatever their variant.
//! - `append` fails when the bare id is already present.
//! - Equality ignores insertion order.

use super::document_id::DocumentId;
use super::info::DocumentInfo;
use crate::errors::{PreconditionError, ValidationError};
use serde::{Deserialize, Serialize};
use shared_types::{concat_bytes, keccak256, Hash};

/// Documents held by one owner.
#[derive(Clone, Debug, Default, Eq, Serialize, Deserialize)]
pub struct DocumentInventory {
    documents: Vec<DocumentInfo>,
}

impl DocumentInventory {
    /// Creates an empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an inventory, rejecting duplicate bare ids.
    pub fn from_documents(documents: Vec<DocumentInfo>) -> Result<Self, ValidationError> {
        let inventory = Self { documents };
        inventory.is_valid()?;
        Ok(inventory)
    }

    /// Entries in their current order.
    #[must_use]
    pub fn documents(&self) -> &[DocumentInfo] {
        &self.documents
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// True if an entry shares the bare id of `id`.
    #[must_use]
    pub fn exists(&self, id: &DocumentId) -> bool {
        self.position(id).is_some()
    }

    /// True if the entry for the bare id of `id` carries exactly `id`.
    #[must_use]
    pub fn holds(&self, id: &DocumentId) -> bool {
        self.get(id).is_some_and(|info| info.id() == id)
    }

    /// The entry sharing the bare id of `id`.
    #[must_use]
    pub fn get(&self, id: &DocumentId) -> Option<&DocumentInfo> {
        self.position(id).map(|i| &self.documents[i])
    }

    /// Appends `info`; fails if its id is already held.
    pub fn append(&mut self, info: DocumentInfo) -> Result<(), PreconditionError> {
        if self.exists(info.id()) {
            return Err(PreconditionError::AlreadyRegistered(info.id().clone()));
        }
        self.documents.push(info);
        Ok(())
    }

    /// Removes the entry for `id` and returns it.
    pub fn remove(&mut self, id: &DocumentId) -> Option<DocumentInfo> {
        self.position(id).map(|i| self.documents.remove(i))
    }

    /// Orders entries by raw id bytes.
    pub fn sort(&mut self, ascending: bool) {
        if ascending {
            self.documents
                .sort_by(|a, b| a.id().as_str().as_bytes().cmp(b.id().as_str().as_bytes()));
        } else {
            self.documents
                .sort_by(|a, b| b.id().as_str().as_bytes().cmp(a.id().as_str().as_bytes()));
        }
    }

    /// Checks every entry and the bare-id uniqueness invariant.
    pub fn is_valid(&self) -> Result<(), ValidationError> {
        for (i, info) in self.documents.iter().enumerate() {
            info.is_valid()?;
            if self.documents[..i]
                .iter()
                .any(|d| d.id().bare() == info.id().bare())
            {
                return Err(ValidationError::DuplicateDocument(info.id().clone()));
            }
        }
        Ok(())
    }

    /// Canonical bytes, over the entries in their current order.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        let entries: Vec<Vec<u8>> = self.documents.iter().map(DocumentInfo::bytes).collect();
        concat_bytes(entries.iter().map(Vec::as_slice))
    }

    /// Content hash.
    #[must_use]
    pub fn hash(&self) -> Hash {
        keccak256(&self.bytes())
    }

    fn position(&self, id: &DocumentId) -> Option<usize> {
        self.documents.iter().position(|d| d.id().bare() == id.bare())
    }

    fn sorted(&self) -> Vec<&DocumentInfo> {
        let mut entries: Vec<&DocumentInfo> = self.documents.iter().collect();
        entries.sort_by(|a, b| a.id().as_str().as_bytes().cmp(b.id().as_str().as_bytes()));
        entries
    }
}

impl PartialEq for DocumentInventory {
    fn eq(&self, other: &Self) -> bool {
        self.documents.len() == other.documents.len() && self.sorted() == other.sorted()
    }
}
