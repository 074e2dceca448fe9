//! # Document Identifiers
//!
//! A document id is a bare identifier followed by a three-character suffix
//! naming the document variant, e.g. `contract7fdi` is the file document
//! `contract7`.
//!
//! Suffixes are resolved through an explicit `DocumentKindRegistry` rather
//! than global state, so a runtime can see exactly which variants it accepts.

use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Length of the variant suffix.
pub const DOCUMENT_KIND_SUFFIX_LENGTH: usize = 3;

/// Maximum length of a bare document id.
pub const MAX_DOCUMENT_ID_LENGTH: usize = 64;

/// Document variant tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocumentKind {
    /// Signable file record.
    File,
    /// City user statistics record.
    UserStatistics,
    /// City land record.
    Land,
    /// City voting record.
    Vote,
    /// City history record.
    History,
}

impl DocumentKind {
    /// Every variant, in registration order.
    pub const ALL: [DocumentKind; 5] = [
        Self::File,
        Self::UserStatistics,
        Self::Land,
        Self::Vote,
        Self::History,
    ];

    /// The id suffix encoding this variant.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::File => "fdi",
            Self::UserStatistics => "cui",
            Self::Land => "cli",
            Self::Vote => "cvi",
            Self::History => "chi",
        }
    }

    /// Human readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::UserStatistics => "user-statistics",
            Self::Land => "land",
            Self::Vote => "vote",
            Self::History => "history",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Maps id suffixes to document variants.
#[derive(Clone, Debug)]
pub struct DocumentKindRegistry {
    by_suffix: HashMap<&'static str, DocumentKind>,
}

impl DocumentKindRegistry {
    /// Creates a registry with no variants.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            by_suffix: HashMap::new(),
        }
    }

    /// Registers a variant under its suffix.
    pub fn register(&mut self, kind: DocumentKind) -> &mut Self {
        self.by_suffix.insert(kind.suffix(), kind);
        self
    }

    /// Resolves a suffix.
    #[must_use]
    pub fn kind_of(&self, suffix: &str) -> Option<DocumentKind> {
        self.by_suffix.get(suffix).copied()
    }

    /// Parses a tagged document id.
    ///
    /// Rejects strings too short to hold a suffix, unknown suffixes and bare
    /// ids outside the allowed pattern.
    pub fn parse(&self, s: &str) -> Result<DocumentId, ValidationError> {
        if s.len() <= DOCUMENT_KIND_SUFFIX_LENGTH || !s.is_ascii() {
            return Err(ValidationError::MalformedDocumentId(s.to_string()));
        }
        let (bare, suffix) = s.split_at(s.len() - DOCUMENT_KIND_SUFFIX_LENGTH);
        let kind = self
            .kind_of(suffix)
            .ok_or_else(|| ValidationError::UnknownDocumentKind(suffix.to_string()))?;
        DocumentId::new(bare, kind)
    }
}

impl Default for DocumentKindRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for kind in DocumentKind::ALL {
            registry.register(kind);
        }
        registry
    }
}

/// Tagged document identifier.
///
/// Equality, ordering and hashing follow the full tagged string.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId {
    raw: String,
    kind: DocumentKind,
}

impl DocumentId {
    /// Builds an id from a bare identifier and a variant.
    pub fn new(bare: &str, kind: DocumentKind) -> Result<Self, ValidationError> {
        validate_bare_id(bare)?;
        Ok(Self {
            raw: format!("{bare}{}", kind.suffix()),
            kind,
        })
    }

    /// The full tagged string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The identifier without its suffix.
    #[must_use]
    pub fn bare(&self) -> &str {
        &self.raw[..self.raw.len() - DOCUMENT_KIND_SUFFIX_LENGTH]
    }

    /// The variant encoded in the suffix.
    #[must_use]
    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Bytes used for hashing.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        self.raw.as_bytes()
    }

    /// Re-checks the invariants of a deserialized id.
    pub fn is_valid(&self) -> Result<(), ValidationError> {
        if self.raw.len() <= DOCUMENT_KIND_SUFFIX_LENGTH || !self.raw.is_ascii() {
            return Err(ValidationError::MalformedDocumentId(self.raw.clone()));
        }
        let suffix = &self.raw[self.raw.len() - DOCUMENT_KIND_SUFFIX_LENGTH..];
        if suffix != self.kind.suffix() {
            return Err(ValidationError::MalformedDocumentId(self.raw.clone()));
        }
        validate_bare_id(self.bare())
    }
}

impl TryFrom<String> for DocumentId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DocumentKindRegistry::default().parse(&value)
    }
}

impl From<DocumentId> for String {
    fn from(value: DocumentId) -> Self {
        value.raw
    }
}

fn validate_bare_id(bare: &str) -> Result<(), ValidationError> {
    if bare.is_empty()
        || bare.len() > MAX_DOCUMENT_ID_LENGTH
        || !bare.bytes().all(|b| b.is_ascii_alphanumeric())
    {
        return Err(ValidationError::MalformedDocumentId(bare.to_string()));
    }
    Ok(())
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.raw)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_splits_suffix() {
        let registry = DocumentKindRegistry::default();
        let id = registry.parse("contract7fdi").unwrap();
        assert_eq!(id.bare(), "contract7");
        assert_eq!(id.kind(), DocumentKind::File);
        assert_eq!(id.as_str(), "contract7fdi");
    }

    #[test]
    fn test_parse_rejects_short_and_unknown() {
        let registry = DocumentKindRegistry::default();
        assert!(matches!(
            registry.parse("fdi"),
            Err(ValidationError::MalformedDocumentId(_))
        ));
        assert!(matches!(
            registry.parse("abcxyz"),
            Err(ValidationError::UnknownDocumentKind(s)) if s == "xyz"
        ));
        assert!(matches!(
            registry.parse("bad-idfdi"),
            Err(ValidationError::MalformedDocumentId(_))
        ));
    }

    #[test]
    fn test_bare_id_length_limit() {
        let long = "a".repeat(MAX_DOCUMENT_ID_LENGTH + 1);
        assert!(DocumentId::new(&long, DocumentKind::Land).is_err());
        let max = "a".repeat(MAX_DOCUMENT_ID_LENGTH);
        assert!(DocumentId::new(&max, DocumentKind::Land).is_ok());
    }

    #[test]
    fn test_registry_only_knows_registered_kinds() {
        let mut registry = DocumentKindRegistry::empty();
        registry.register(DocumentKind::Vote);
        assert!(registry.parse("round1cvi").is_ok());
        assert!(registry.parse("round1chi").is_err());
    }

    #[test]
    fn test_identity_follows_full_string() {
        let a = DocumentId::new("abc", DocumentKind::File).unwrap();
        let b = DocumentId::new("abc", DocumentKind::Land).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.bare(), b.bare());
    }

    #[test]
    fn test_deserialize_validates_id() {
        let id: DocumentId = serde_json::from_str("\"deed9cli\"").unwrap();
        assert_eq!(id, DocumentId::new("deed9", DocumentKind::Land).unwrap());
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"deed9cli\"");

        for raw in ["\"ab\"", "\"fdi\"", "\"\u{00e9}\u{00e9}fdi\"", "\"abcxyz\""] {
            assert!(serde_json::from_str::<DocumentId>(raw).is_err(), "{raw}");
        }
    }

    proptest! {
        #[test]
        fn prop_parse_roundtrips_kind(bare in "[a-zA-Z0-9]{1,64}", idx in 0usize..5) {
            let registry = DocumentKindRegistry::default();
            let kind = DocumentKind::ALL[idx];
            let id = DocumentId::new(&bare, kind).unwrap();
            let parsed = registry.parse(id.as_str()).unwrap();
            prop_assert_eq!(parsed.kind(), kind);
            prop_assert_eq!(parsed.bare(), bare.as_str());
            prop_assert_eq!(parsed, id);
        }
    }
}
