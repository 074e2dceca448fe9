//! # Document Capability Contract
//!
//! Every record type implements `Document`. Processors work on
//! `DocumentData` through that contract and never branch on the variant,
//! except where an operation is defined for one variant only (signing and
//! transferring file documents).

use super::city::{HistoryDocument, LandDocument, UserStatisticsDocument, VoteDocument};
use super::document_id::{DocumentId, DocumentKind};
use super::file::FileDocument;
use super::info::DocumentInfo;
use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use shared_types::{keccak256, Address, Hash};

/// Capability contract shared by all document records.
pub trait Document {
    /// Info naming this record.
    fn info(&self) -> &DocumentInfo;

    /// Variant tag of the concrete record type.
    fn kind(&self) -> DocumentKind;

    /// Owner account.
    fn owner(&self) -> &Address;

    /// Other ledger accounts the record references; each must exist.
    fn accounts(&self) -> Vec<Address>;

    /// Canonical bytes.
    fn bytes(&self) -> Vec<u8>;

    /// Validates the record, including the info/variant cross-check.
    fn is_valid(&self) -> Result<(), ValidationError>;

    /// Document id.
    fn document_id(&self) -> &DocumentId {
        self.info().id()
    }

    /// Content hash.
    fn hash(&self) -> Hash {
        keccak256(&self.bytes())
    }
}

/// Checks that `info` is well formed and tagged as `kind`.
pub(crate) fn check_info(info: &DocumentInfo, kind: DocumentKind) -> Result<(), ValidationError> {
    info.is_valid()?;
    if info.kind() != kind {
        return Err(ValidationError::KindMismatch {
            expected: kind,
            actual: info.kind(),
        });
    }
    Ok(())
}

/// Any document record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentData {
    File(FileDocument),
    UserStatistics(UserStatisticsDocument),
    Land(LandDocument),
    Vote(VoteDocument),
    History(HistoryDocument),
}

impl DocumentData {
    fn inner(&self) -> &dyn Document {
        match self {
            Self::File(d) => d,
            Self::UserStatistics(d) => d,
            Self::Land(d) => d,
            Self::Vote(d) => d,
            Self::History(d) => d,
        }
    }

    /// The file record, if this is one.
    #[must_use]
    pub fn as_file(&self) -> Option<&FileDocument> {
        match self {
            Self::File(d) => Some(d),
            _ => None,
        }
    }

    /// Consumes into the file record, if this is one.
    pub fn into_file(self) -> Result<FileDocument, Self> {
        match self {
            Self::File(d) => Ok(d),
            other => Err(other),
        }
    }
}

impl Document for DocumentData {
    fn info(&self) -> &DocumentInfo {
        self.inner().info()
    }

    fn kind(&self) -> DocumentKind {
        self.inner().kind()
    }

    fn owner(&self) -> &Address {
        self.inner().owner()
    }

    fn accounts(&self) -> Vec<Address> {
        self.inner().accounts()
    }

    fn bytes(&self) -> Vec<u8> {
        self.inner().bytes()
    }

    fn is_valid(&self) -> Result<(), ValidationError> {
        self.inner().is_valid()
    }
}

impl From<FileDocument> for DocumentData {
    fn from(doc: FileDocument) -> Self {
        Self::File(doc)
    }
}

impl From<UserStatisticsDocument> for DocumentData {
    fn from(doc: UserStatisticsDocument) -> Self {
        Self::UserStatistics(doc)
    }
}

impl From<LandDocument> for DocumentData {
    fn from(doc: LandDocument) -> Self {
        Self::Land(doc)
    }
}

impl From<VoteDocument> for DocumentData {
    fn from(doc: VoteDocument) -> Self {
        Self::Vote(doc)
    }
}

impl From<HistoryDocument> for DocumentData {
    fn from(doc: HistoryDocument) -> Self {
        Self::History(doc)
    }
}
