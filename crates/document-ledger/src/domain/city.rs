//! # City Documents
//!
//! Mutable records kept by the city application: user statistics, land
//! leases, voting rounds and usage history. None of them carries signers;
//! they change only by wholesale update.

use super::document::{check_info, Document};
use super::document_id::DocumentKind;
use super::info::DocumentInfo;
use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use shared_types::{concat_bytes, Address};

/// Maximum length of a candidate manifest.
pub const MAX_MANIFEST_LENGTH: usize = 100;

// =============================================================================
// USER STATISTICS
// =============================================================================

/// Attribute counters of a city user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatistics {
    pub hp: u64,
    pub strength: u64,
    pub agility: u64,
    pub dexterity: u64,
    pub charisma: u64,
    pub intelligence: u64,
    pub vital: u64,
}

impl UserStatistics {
    /// Canonical bytes: the seven counters, big-endian.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        [
            self.hp,
            self.strength,
            self.agility,
            self.dexterity,
            self.charisma,
            self.intelligence,
            self.vital,
        ]
        .iter()
        .flat_map(|v| v.to_be_bytes())
        .collect()
    }
}

/// City user record with its balances and statistics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatisticsDocument {
    info: DocumentInfo,
    owner: Address,
    gold: u64,
    bank_gold: u64,
    statistics: UserStatistics,
}

impl UserStatisticsDocument {
    /// Variant tag of this record type.
    pub const KIND: DocumentKind = DocumentKind::UserStatistics;

    /// Creates a user record and validates it.
    pub fn new(
        info: DocumentInfo,
        owner: Address,
        gold: u64,
        bank_gold: u64,
        statistics: UserStatistics,
    ) -> Result<Self, ValidationError> {
        let doc = Self {
            info,
            owner,
            gold,
            bank_gold,
            statistics,
        };
        doc.is_valid()?;
        Ok(doc)
    }

    #[must_use]
    pub fn gold(&self) -> u64 {
        self.gold
    }

    #[must_use]
    pub fn bank_gold(&self) -> u64 {
        self.bank_gold
    }

    #[must_use]
    pub fn statistics(&self) -> &UserStatistics {
        &self.statistics
    }
}

impl Document for UserStatisticsDocument {
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
        Vec::new()
    }

    fn bytes(&self) -> Vec<u8> {
        let info = self.info.bytes();
        let gold = self.gold.to_be_bytes();
        let bank_gold = self.bank_gold.to_be_bytes();
        let statistics = self.statistics.bytes();
        concat_bytes([
            info.as_slice(),
            self.owner.bytes(),
            gold.as_slice(),
            bank_gold.as_slice(),
            statistics.as_slice(),
        ])
    }

    fn is_valid(&self) -> Result<(), ValidationError> {
        check_info(&self.info, Self::KIND)
    }
}

// =============================================================================
// LAND
// =============================================================================

/// Land lease record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandDocument {
    info: DocumentInfo,
    owner: Address,
    address: String,
    area: String,
    renter: String,
    account: Address,
    rent_date: String,
    period_days: u64,
}

impl LandDocument {
    /// Variant tag of this record type.
    pub const KIND: DocumentKind = DocumentKind::Land;

    /// Creates a land record and validates it.
    ///
    /// `account` is the counterparty of the lease (lender or renter).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        info: DocumentInfo,
        owner: Address,
        address: impl Into<String>,
        area: impl Into<String>,
        renter: impl Into<String>,
        account: Address,
        rent_date: impl Into<String>,
        period_days: u64,
    ) -> Result<Self, ValidationError> {
        let doc = Self {
            info,
            owner,
            address: address.into(),
            area: area.into(),
            renter: renter.into(),
            account,
            rent_date: rent_date.into(),
            period_days,
        };
        doc.is_valid()?;
        Ok(doc)
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[must_use]
    pub fn area(&self) -> &str {
        &self.area
    }

    #[must_use]
    pub fn renter(&self) -> &str {
        &self.renter
    }

    #[must_use]
    pub fn account(&self) -> &Address {
        &self.account
    }

    #[must_use]
    pub fn rent_date(&self) -> &str {
        &self.rent_date
    }

    #[must_use]
    pub fn period_days(&self) -> u64 {
        self.period_days
    }
}

impl Document for LandDocument {
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
        vec![self.account.clone()]
    }

    fn bytes(&self) -> Vec<u8> {
        let info = self.info.bytes();
        let period = self.period_days.to_be_bytes();
        concat_bytes([
            info.as_slice(),
            self.owner.bytes(),
            self.address.as_bytes(),
            self.area.as_bytes(),
            self.renter.as_bytes(),
            self.account.bytes(),
            self.rent_date.as_bytes(),
            period.as_slice(),
        ])
    }

    fn is_valid(&self) -> Result<(), ValidationError> {
        check_info(&self.info, Self::KIND)?;
        if self.address.is_empty() {
            return Err(ValidationError::EmptyField("land address"));
        }
        Ok(())
    }
}

// =============================================================================
// VOTE
// =============================================================================

/// A candidate in a voting round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingCandidate {
    pub address: Address,
    pub nickname: String,
    pub manifest: String,
    pub count: u64,
}

impl VotingCandidate {
    /// Creates a candidate; the manifest is bounded.
    pub fn new(
        address: Address,
        nickname: impl Into<String>,
        manifest: impl Into<String>,
        count: u64,
    ) -> Result<Self, ValidationError> {
        let candidate = Self {
            address,
            nickname: nickname.into(),
            manifest: manifest.into(),
            count,
        };
        candidate.is_valid()?;
        Ok(candidate)
    }

    fn is_valid(&self) -> Result<(), ValidationError> {
        let length = self.manifest.chars().count();
        if length > MAX_MANIFEST_LENGTH {
            return Err(ValidationError::ManifestTooLong {
                length,
                max: MAX_MANIFEST_LENGTH,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        let count = self.count.to_be_bytes();
        concat_bytes([
            self.address.bytes(),
            self.nickname.as_bytes(),
            self.manifest.as_bytes(),
            count.as_slice(),
        ])
    }
}

/// Voting round record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteDocument {
    info: DocumentInfo,
    owner: Address,
    round: u64,
    end_time: String,
    candidates: Vec<VotingCandidate>,
    boss_name: String,
    account: Address,
    term: String,
}

impl VoteDocument {
    /// Variant tag of this record type.
    pub const KIND: DocumentKind = DocumentKind::Vote;

    /// Creates a voting record and validates it.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        info: DocumentInfo,
        owner: Address,
        round: u64,
        end_time: impl Into<String>,
        candidates: Vec<VotingCandidate>,
        boss_name: impl Into<String>,
        account: Address,
        term: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let doc = Self {
            info,
            owner,
            round,
            end_time: end_time.into(),
            candidates,
            boss_name: boss_name.into(),
            account,
            term: term.into(),
        };
        doc.is_valid()?;
        Ok(doc)
    }

    #[must_use]
    pub fn round(&self) -> u64 {
        self.round
    }

    #[must_use]
    pub fn end_time(&self) -> &str {
        &self.end_time
    }

    #[must_use]
    pub fn candidates(&self) -> &[VotingCandidate] {
        &self.candidates
    }

    #[must_use]
    pub fn boss_name(&self) -> &str {
        &self.boss_name
    }

    #[must_use]
    pub fn account(&self) -> &Address {
        &self.account
    }

    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }
}

impl Document for VoteDocument {
    fn info(&self) -> &DocumentInfo {
        &self.info
    }

    fn kind(&self) -> DocumentKind {
        Self::KIND
    }

    fn owner(&self) -> &Address {
        &self.owner
    }

    /// The boss account followed by every candidate.
    fn accounts(&self) -> Vec<Address> {
        std::iter::once(self.account.clone())
            .chain(self.candidates.iter().map(|c| c.address.clone()))
            .collect()
    }

    fn bytes(&self) -> Vec<u8> {
        let info = self.info.bytes();
        let round = self.round.to_be_bytes();
        let candidates: Vec<Vec<u8>> = self.candidates.iter().map(VotingCandidate::bytes).collect();
        let mut parts: Vec<&[u8]> = vec![
            info.as_slice(),
            self.owner.bytes(),
            round.as_slice(),
            self.end_time.as_bytes(),
        ];
        parts.extend(candidates.iter().map(Vec::as_slice));
        parts.extend([
            self.boss_name.as_bytes(),
            self.account.bytes(),
            self.term.as_bytes(),
        ]);
        concat_bytes(parts)
    }

    fn is_valid(&self) -> Result<(), ValidationError> {
        check_info(&self.info, Self::KIND)?;
        for (i, candidate) in self.candidates.iter().enumerate() {
            candidate.is_valid()?;
            if self.candidates[..i]
                .iter()
                .any(|c| c.address == candidate.address)
            {
                return Err(ValidationError::DuplicateCandidate(candidate.address.clone()));
            }
        }
        Ok(())
    }
}

// =============================================================================
// HISTORY
// =============================================================================

/// Usage history record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryDocument {
    info: DocumentInfo,
    owner: Address,
    name: String,
    account: Address,
    date: String,
    usage: String,
    application: String,
}

impl HistoryDocument {
    /// Variant tag of this record type.
    pub const KIND: DocumentKind = DocumentKind::History;

    /// Creates a history record and validates it.
    pub fn new(
        info: DocumentInfo,
        owner: Address,
        name: impl Into<String>,
        account: Address,
        date: impl Into<String>,
        usage: impl Into<String>,
        application: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let doc = Self {
            info,
            owner,
            name: name.into(),
            account,
            date: date.into(),
            usage: usage.into(),
            application: application.into(),
        };
        doc.is_valid()?;
        Ok(doc)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn account(&self) -> &Address {
        &self.account
    }

    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }

    #[must_use]
    pub fn usage(&self) -> &str {
        &self.usage
    }

    #[must_use]
    pub fn application(&self) -> &str {
        &self.application
    }
}

impl Document for HistoryDocument {
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
        vec![self.account.clone()]
    }

    fn bytes(&self) -> Vec<u8> {
        let info = self.info.bytes();
        concat_bytes([
            info.as_slice(),
            self.owner.bytes(),
            self.name.as_bytes(),
            self.account.bytes(),
            self.date.as_bytes(),
            self.usage.as_bytes(),
            self.application.as_bytes(),
        ])
    }

    fn is_valid(&self) -> Result<(), ValidationError> {
        check_info(&self.info, Self::KIND)?;
        if self.name.is_empty() {
            return Err(ValidationError::EmptyField("history name"));
        }
        Ok(())
    }
}
