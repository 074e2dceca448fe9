//! # Core Ledger Entities
//!
//! Defines the primitives shared between the document engine and the
//! account/currency modules it depends on.
//!
//! ## Clusters
//!
//! - **Identity**: `Address`, `PublicKey`, `AccountKeys`, `AccountState`
//! - **Value**: `CurrencyId`, `Amount`, `BalanceState`
//! - **Integrity**: `Hash`, `keccak256`

use crate::errors::TypeError;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

// Re-export U256 from primitive-types for use across the workspace
pub use primitive_types::U256;

/// Balance and fee amounts are unsigned 256-bit integers.
pub type Amount = U256;

// =============================================================================
// CLUSTER A: INTEGRITY
// =============================================================================

/// A 32-byte Keccak-256 hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// The zero hash.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns true if this is the zero hash.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{}...{}",
            hex::encode(&self.0[..4]),
            hex::encode(&self.0[28..])
        )
    }
}

impl From<[u8; 32]> for Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Keccak-256 over `data`.
#[must_use]
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    Hash(hasher.finalize().into())
}

/// Concatenates byte slices, prefixing each with its big-endian length.
///
/// The length prefix keeps `["ab", "c"]` and `["a", "bc"]` distinct, which
/// plain concatenation would not.
#[must_use]
pub fn concat_bytes<'a, I>(parts: I) -> Vec<u8>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut out = Vec::new();
    for part in parts {
        out.extend_from_slice(&(part.len() as u64).to_be_bytes());
        out.extend_from_slice(part);
    }
    out
}

// =============================================================================
// CLUSTER B: IDENTITY
// =============================================================================

/// Minimum address length, in characters.
pub const MIN_ADDRESS_LENGTH: usize = 3;

/// Maximum address length, in characters.
pub const MAX_ADDRESS_LENGTH: usize = 100;

/// An account address.
///
/// Addresses are opaque ASCII alphanumeric strings; the engine only compares
/// and hashes them.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Creates an address, validating its length and alphabet.
    pub fn new(value: impl Into<String>) -> Result<Self, TypeError> {
        let value = value.into();
        let valid_len = (MIN_ADDRESS_LENGTH..=MAX_ADDRESS_LENGTH).contains(&value.len());
        if !valid_len || !value.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(TypeError::InvalidAddress(value));
        }
        Ok(Self(value))
    }

    /// Returns the address string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the address bytes used for hashing.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Address {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

impl FromStr for Address {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// A public key in its string form.
///
/// Signature verification happens outside the engine; the key is only used
/// to match operation signers against account keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PublicKey(String);

impl PublicKey {
    /// Creates a public key; it must be non-empty ASCII alphanumeric.
    pub fn new(value: impl Into<String>) -> Result<Self, TypeError> {
        let value = value.into();
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(TypeError::InvalidPublicKey(value));
        }
        Ok(Self(value))
    }

    /// Returns the key string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A weighted account key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountKey {
    /// Public key.
    pub key: PublicKey,
    /// Signing weight contributed when this key signs.
    pub weight: u32,
}

/// The keys controlling an account and the weight required to act for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountKeys {
    keys: Vec<AccountKey>,
    threshold: u32,
}

impl AccountKeys {
    /// Creates a key set.
    ///
    /// Keys must be unique, weights positive, and the summed weight must be
    /// able to reach a positive threshold.
    pub fn new(keys: Vec<AccountKey>, threshold: u32) -> Result<Self, TypeError> {
        if keys.is_empty() {
            return Err(TypeError::InvalidKeys("empty keys".to_string()));
        }
        if threshold == 0 {
            return Err(TypeError::InvalidKeys("zero threshold".to_string()));
        }
        let mut total: u64 = 0;
        for (i, key) in keys.iter().enumerate() {
            if key.weight == 0 {
                return Err(TypeError::InvalidKeys(format!("zero weight for {}", key.key)));
            }
            if keys[..i].iter().any(|k| k.key == key.key) {
                return Err(TypeError::InvalidKeys(format!("duplicated key {}", key.key)));
            }
            total += u64::from(key.weight);
        }
        if total < u64::from(threshold) {
            return Err(TypeError::InvalidKeys(format!(
                "sum of weights {total} under threshold {threshold}"
            )));
        }
        Ok(Self { keys, threshold })
    }

    /// Single key with full weight; the common case.
    pub fn single(key: PublicKey) -> Self {
        Self {
            keys: vec![AccountKey { key, weight: 100 }],
            threshold: 100,
        }
    }

    /// Returns the keys.
    #[must_use]
    pub fn keys(&self) -> &[AccountKey] {
        &self.keys
    }

    /// Returns the threshold.
    #[must_use]
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Sums the weights of the keys present in `signers`.
    ///
    /// Each account key counts at most once, however many times it signs.
    #[must_use]
    pub fn signed_weight(&self, signers: &[PublicKey]) -> u64 {
        self.keys
            .iter()
            .filter(|k| signers.contains(&k.key))
            .map(|k| u64::from(k.weight))
            .sum()
    }
}

/// Account state as published by the account module.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    /// Account address.
    pub address: Address,
    /// Keys controlling the account.
    pub keys: AccountKeys,
}

impl AccountState {
    /// Creates an account state.
    pub fn new(address: Address, keys: AccountKeys) -> Self {
        Self { address, keys }
    }
}

// =============================================================================
// CLUSTER C: VALUE
// =============================================================================

/// Minimum currency id length.
pub const MIN_CURRENCY_ID_LENGTH: usize = 3;

/// Maximum currency id length.
pub const MAX_CURRENCY_ID_LENGTH: usize = 10;

/// A currency identifier such as `PEN`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyId(String);

impl CurrencyId {
    /// Creates a currency id: 3 to 10 uppercase ASCII letters or digits.
    pub fn new(value: impl Into<String>) -> Result<Self, TypeError> {
        let value = value.into();
        let valid_len = (MIN_CURRENCY_ID_LENGTH..=MAX_CURRENCY_ID_LENGTH).contains(&value.len());
        let valid_chars = value
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
        if !valid_len || !valid_chars {
            return Err(TypeError::InvalidCurrencyId(value));
        }
        Ok(Self(value))
    }

    /// Returns the currency id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CurrencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CurrencyId({})", self.0)
    }
}

impl fmt::Display for CurrencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CurrencyId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CurrencyId> for String {
    fn from(value: CurrencyId) -> Self {
        value.0
    }
}

impl FromStr for CurrencyId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Balance of one holder in one currency.
///
/// `fee` is the part of the most recent debit that was charged as a fee; the
/// block coordinator sums it into the block fee pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceState {
    /// Holder address.
    pub holder: Address,
    /// Currency of this balance.
    pub currency: CurrencyId,
    /// Current amount.
    pub amount: Amount,
    /// Fee charged by the update that produced this state.
    pub fee: Amount,
}

impl BalanceState {
    /// Creates a balance with no pending fee.
    pub fn new(holder: Address, currency: CurrencyId, amount: Amount) -> Self {
        Self {
            holder,
            currency,
            amount,
            fee: Amount::zero(),
        }
    }

    /// Copy of this balance prepared for a new update: the fee is cleared.
    #[must_use]
    pub fn for_update(&self) -> Self {
        Self {
            fee: Amount::zero(),
            ..self.clone()
        }
    }

    /// Subtracts `amount`, or `None` if the balance would go negative.
    #[must_use]
    pub fn checked_sub(&self, amount: Amount) -> Option<Self> {
        let remaining = self.amount.checked_sub(amount)?;
        Some(Self {
            amount: remaining,
            ..self.clone()
        })
    }

    /// Adds `amount`, or `None` on overflow.
    #[must_use]
    pub fn checked_add(&self, amount: Amount) -> Option<Self> {
        let total = self.amount.checked_add(amount)?;
        Some(Self {
            amount: total,
            ..self.clone()
        })
    }

    /// Records `fee` as charged by this update.
    #[must_use]
    pub fn add_fee(self, fee: Amount) -> Self {
        Self {
            fee: self.fee.saturating_add(fee),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> PublicKey {
        PublicKey::new(s).unwrap()
    }

    #[test]
    fn test_address_validation() {
        assert!(Address::new("alice0mca").is_ok());
        assert!(Address::new("ab").is_err());
        assert!(Address::new("has space").is_err());
        assert!(Address::new("x".repeat(MAX_ADDRESS_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_currency_id_validation() {
        assert!(CurrencyId::new("PEN").is_ok());
        assert!(CurrencyId::new("pen").is_err());
        assert!(CurrencyId::new("PE").is_err());
        assert!(CurrencyId::new("ABCDEFGHIJK").is_err());
    }

    #[test]
    fn test_keccak_known_vector() {
        // keccak256("") = c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470
        let hash = keccak256(b"");
        assert_eq!(
            hex::encode(hash.0),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_concat_bytes_is_unambiguous() {
        let a = concat_bytes([b"ab".as_slice(), b"c".as_slice()]);
        let b = concat_bytes([b"a".as_slice(), b"bc".as_slice()]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_account_keys_validation() {
        let ok = AccountKeys::new(
            vec![
                AccountKey { key: key("k1"), weight: 50 },
                AccountKey { key: key("k2"), weight: 50 },
            ],
            100,
        );
        assert!(ok.is_ok());

        let under = AccountKeys::new(vec![AccountKey { key: key("k1"), weight: 50 }], 100);
        assert!(under.is_err());

        let dup = AccountKeys::new(
            vec![
                AccountKey { key: key("k1"), weight: 50 },
                AccountKey { key: key("k1"), weight: 50 },
            ],
            100,
        );
        assert!(dup.is_err());
    }

    #[test]
    fn test_signed_weight_counts_each_key_once() {
        let keys = AccountKeys::new(
            vec![
                AccountKey { key: key("k1"), weight: 30 },
                AccountKey { key: key("k2"), weight: 70 },
            ],
            100,
        )
        .unwrap();

        assert_eq!(keys.signed_weight(&[key("k1")]), 30);
        assert_eq!(keys.signed_weight(&[key("k1"), key("k1")]), 30);
        assert_eq!(keys.signed_weight(&[key("k1"), key("k2")]), 100);
        assert_eq!(keys.signed_weight(&[key("k3")]), 0);
    }

    #[test]
    fn test_balance_sub_and_fee() {
        let holder = Address::new("alice0mca").unwrap();
        let pen = CurrencyId::new("PEN").unwrap();
        let balance = BalanceState::new(holder, pen, Amount::from(33));

        let debited = balance.checked_sub(Amount::from(1)).unwrap().add_fee(Amount::from(1));
        assert_eq!(debited.amount, Amount::from(32));
        assert_eq!(debited.fee, Amount::from(1));

        assert!(balance.checked_sub(Amount::from(34)).is_none());
        assert_eq!(debited.for_update().fee, Amount::zero());
    }

    #[test]
    fn test_balance_serde_roundtrip() {
        let holder = Address::new("alice0mca").unwrap();
        let pen = CurrencyId::new("PEN").unwrap();
        let balance = BalanceState::new(holder, pen, Amount::from(7));
        let json = serde_json::to_string(&balance).unwrap();
        let back: BalanceState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, balance);
    }
}
