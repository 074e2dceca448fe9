//! # Signable File Document
//!
//! A file record whose listed signers each flip their own `signed` flag
//! with a sign operation. The record itself only stores the content hash;
//! the file lives outside the ledger.

use super::document::{check_info, Document};
use super::document_id::DocumentKind;
use super::info::DocumentInfo;
use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use shared_types::{concat_bytes, Address};

/// One signature slot of a file document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSigner {
    /// Signer account.
    pub address: Address,
    /// Code the signer presents off-ledger.
    pub signcode: String,
    /// Whether this slot has been signed.
    pub signed: bool,
}

impl DocumentSigner {
    /// Creates a slot.
    pub fn new(address: Address, signcode: impl Into<String>, signed: bool) -> Self {
        Self {
            address,
            signcode: signcode.into(),
            signed,
        }
    }

    /// Canonical bytes.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        let signed = [u8::from(self.signed)];
        concat_bytes([
            self.address.bytes(),
            self.signcode.as_bytes(),
            signed.as_slice(),
        ])
    }
}

/// Signable file record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDocument {
    info: DocumentInfo,
    owner: Address,
    file_hash: String,
    creator: DocumentSigner,
    title: String,
    size: u64,
    signers: Vec<DocumentSigner>,
}

impl FileDocument {
    /// Variant tag of this record type.
    pub const KIND: DocumentKind = DocumentKind::File;

    /// Creates a file document and validates it.
    pub fn new(
        info: DocumentInfo,
        owner: Address,
        file_hash: impl Into<String>,
        creator: DocumentSigner,
        title: impl Into<String>,
        size: u64,
        signers: Vec<DocumentSigner>,
    ) -> Result<Self, ValidationError> {
        let doc = Self {
            info,
            owner,
            file_hash: file_hash.into(),
            creator,
            title: title.into(),
            size,
            signers,
        };
        doc.is_valid()?;
        Ok(doc)
    }

    /// Content hash of the file.
    #[must_use]
    pub fn file_hash(&self) -> &str {
        &self.file_hash
    }

    /// Creator slot.
    #[must_use]
    pub fn creator(&self) -> &DocumentSigner {
        &self.creator
    }

    /// Title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// File size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Signer slots in order.
    #[must_use]
    pub fn signers(&self) -> &[DocumentSigner] {
        &self.signers
    }

    /// Marks the first unsigned slot of `sender` as signed.
    ///
    /// Returns false when `sender` has no unsigned slot, which covers both
    /// "not a signer" and "already signed".
    pub fn sign(&mut self, sender: &Address) -> bool {
        match self
            .signers
            .iter_mut()
            .find(|s| !s.signed && &s.address == sender)
        {
            Some(slot) => {
                slot.signed = true;
                true
            }
            None => false,
        }
    }

    /// Copy of this record owned by `owner`.
    #[must_use]
    pub fn with_owner(&self, owner: Address) -> Self {
        Self {
            owner,
            ..self.clone()
        }
    }
}

impl Document for FileDocument {
    fn info(&self) -> &DocumentInfo {
        &self.info
    }

    fn kind(&self) -> DocumentKind {
        Self::KIND
    }

    fn owner(&self) -> &Address {
        &self.owner
    }

    fn accounts(&self) -> Vec<Address> {
        self.signers.iter().map(|s| s.address.clone()).collect()
    }

    fn bytes(&self) -> Vec<u8> {
        let signers: Vec<Vec<u8>> = self.signers.iter().map(DocumentSigner::bytes).collect();
        let size = self.size.to_be_bytes();
        let info = self.info.bytes();
        let creator = self.creator.bytes();
        let mut parts: Vec<&[u8]> = vec![
            info.as_slice(),
            self.owner.bytes(),
            self.file_hash.as_bytes(),
            creator.as_slice(),
            self.title.as_bytes(),
            size.as_slice(),
        ];
        parts.extend(signers.iter().map(Vec::as_slice));
        concat_bytes(parts)
    }

    fn is_valid(&self) -> Result<(), ValidationError> {
        check_info(&self.info, Self::KIND)?;
        if self.file_hash.is_empty() {
            return Err(ValidationError::EmptyField("file hash"));
        }
        for (i, signer) in self.signers.iter().enumerate() {
            if self.signers[..i].iter().any(|s| s.address == signer.address) {
                return Err(ValidationError::DuplicateSigner(signer.address.clone()));
            }
        }
        Ok(())
    }
}
