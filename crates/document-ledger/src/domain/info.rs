//! Document info: the inventory entry naming one document and its variant.

use super::document_id::{DocumentId, DocumentKind};
use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use shared_types::{concat_bytes, keccak256, Hash};

/// A document id paired with its variant tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentInfo {
    id: DocumentId,
    kind: DocumentKind,
}

impl DocumentInfo {
    /// Creates an info whose tag is taken from the id.
    #[must_use]
    pub fn new(id: DocumentId) -> Self {
        let kind = id.kind();
        Self { id, kind }
    }

    /// Creates an info with an explicit tag; it must match the id suffix.
    pub fn with_kind(id: DocumentId, kind: DocumentKind) -> Result<Self, ValidationError> {
        let info = Self { id, kind };
        info.is_valid()?;
        Ok(info)
    }

    /// Document id.
    #[must_use]
    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    /// Variant tag.
    #[must_use]
    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Checks that the id is well formed and carries the same tag.
    pub fn is_valid(&self) -> Result<(), ValidationError> {
        self.id.is_valid()?;
        if self.id.kind() != self.kind {
            return Err(ValidationError::KindMismatch {
                expected: self.kind,
                actual: self.id.kind(),
            });
        }
        Ok(())
    }

    /// Canonical bytes.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        concat_bytes([self.id.bytes(), self.kind.suffix().as_bytes()])
    }

    /// Content hash.
    #[must_use]
    pub fn hash(&self) -> Hash {
        keccak256(&self.bytes())
    }
}
