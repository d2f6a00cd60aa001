//! Entry: a single deposit or withdrawal, linked to its predecessor by key.
//!
//! An entry never references its predecessor directly. It only ever sees the
//! predecessor's key, passed in as a [`SeedKey`] by whoever owns the order
//! (see [`Chain`](crate::chain::Chain)).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::encode::{encode, encode_amount, SeedKey};
use crate::error::{CoreError, Result};

/// Length of every kind tag (`DE`, `WH`).
pub const KIND_TAG_LEN: usize = 2;

/// Length of every valid timestamp (`YYYY-MM-DD HH:MM:SS`).
pub const TIMESTAMP_LEN: usize = 19;

/// Neutral values the field probe holds fixed while it tests one real field.
pub const PROBE_KIND: &str = "TYPE";
pub const PROBE_TIMESTAMP: &str = "2020-01-01 00:00:00";
pub const PROBE_AMOUNT: f64 = 0.0;

static TIMESTAMP_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u)^\d{4}-\d{2}-\d{2}\s\d{2}:\d{2}:\d{2}$")
        .expect("timestamp pattern compiles")
});

/// The kind of transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    /// Adds its amount to the balance.
    #[serde(rename = "DE")]
    Deposit,
    /// Subtracts its amount from the balance.
    #[serde(rename = "WH")]
    Withdrawal,
}

impl EntryKind {
    /// The two-letter tag fed to the transform.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Deposit => "DE",
            Self::Withdrawal => "WH",
        }
    }

    /// +1.0 for deposits, -1.0 for withdrawals.
    pub fn sign(self) -> f64 {
        match self {
            Self::Deposit => 1.0,
            Self::Withdrawal => -1.0,
        }
    }
}

impl FromStr for EntryKind {
    type Err = CoreError;

    fn from_str(tag: &str) -> Result<Self> {
        match tag {
            "DE" => Ok(Self::Deposit),
            "WH" => Ok(Self::Withdrawal),
            other => Err(CoreError::InvalidKind(other.to_string())),
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A date-time string matching `YYYY-MM-DD HH:MM:SS`.
///
/// Only the shape is checked, not the calendar.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(String);

impl Timestamp {
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if TIMESTAMP_PATTERN.is_match(&text) {
            Ok(Self(text))
        } else {
            Err(CoreError::InvalidTimestamp(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Timestamp {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Timestamp {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

/// One of the three fields that feed an entry's key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryField {
    #[serde(rename = "TYPE")]
    Kind,
    #[serde(rename = "DATE")]
    Timestamp,
    Amount,
}

impl EntryField {
    /// Fields in key order, which is also the order the probe reports them.
    pub const ALL: [EntryField; 3] = [Self::Kind, Self::Timestamp, Self::Amount];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kind => "TYPE",
            Self::Timestamp => "DATE",
            Self::Amount => "AMOUNT",
        }
    }
}

impl fmt::Display for EntryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three encoded fields that make up a key, before concatenation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySegments {
    pub kind: String,
    pub timestamp: String,
    pub amount: String,
}

impl KeySegments {
    pub fn get(&self, field: EntryField) -> &str {
        match field {
            EntryField::Kind => &self.kind,
            EntryField::Timestamp => &self.timestamp,
            EntryField::Amount => &self.amount,
        }
    }

    /// Concatenate into the final key.
    pub fn into_key(self) -> EntryKey {
        let mut key = self.kind;
        key.push_str(&self.timestamp);
        key.push_str(&self.amount);
        EntryKey(SeedKey::from_encoded(key))
    }
}

/// Encode each field independently under `seed`.
///
/// Takes the kind as a raw tag so the probe can substitute [`PROBE_KIND`].
pub fn derive_segments(kind: &str, timestamp: &str, amount: f64, seed: &SeedKey) -> KeySegments {
    KeySegments {
        kind: encode(kind, seed),
        timestamp: encode(timestamp, seed),
        amount: encode_amount(amount, seed),
    }
}

/// Derive the key for (kind, timestamp, amount) under `seed`.
pub fn derive_key(kind: EntryKind, timestamp: &Timestamp, amount: f64, seed: &SeedKey) -> EntryKey {
    derive_segments(kind.tag(), timestamp.as_str(), amount, seed).into_key()
}

/// The key derived for an entry. It is also the seed for the next entry.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntryKey(SeedKey);

impl EntryKey {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// View this key as the seed for the following entry.
    pub fn as_seed(&self) -> &SeedKey {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_str())
    }

    /// Split the stored key into its kind, timestamp and amount segments.
    ///
    /// Returns `None` if the key is too short to hold the fixed-width
    /// kind and timestamp segments.
    pub fn segments(&self) -> Option<(&str, &str, &str)> {
        let key = self.as_str();
        let kind_end = char_offset(key, KIND_TAG_LEN)?;
        let (kind, rest) = key.split_at(kind_end);
        let ts_end = char_offset(rest, TIMESTAMP_LEN)?;
        let (timestamp, amount) = rest.split_at(ts_end);
        Some((kind, timestamp, amount))
    }

    fn segment(&self, field: EntryField) -> Option<&str> {
        let (kind, timestamp, amount) = self.segments()?;
        Some(match field {
            EntryField::Kind => kind,
            EntryField::Timestamp => timestamp,
            EntryField::Amount => amount,
        })
    }
}

/// Byte offset of the `n`th character, or the end if the string has exactly
/// `n` characters.
fn char_offset(s: &str, n: usize) -> Option<usize> {
    s.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(s.len()))
        .nth(n)
}

impl fmt::Debug for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryKey({})", self)
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.to_hex();
        write!(f, "{}", &hex[..hex.len().min(16)])
    }
}

impl AsRef<SeedKey> for EntryKey {
    fn as_ref(&self) -> &SeedKey {
        &self.0
    }
}

impl TryFrom<String> for EntryKey {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        SeedKey::new(value).map(Self)
    }
}

impl From<EntryKey> for String {
    fn from(key: EntryKey) -> Self {
        key.0.into()
    }
}

/// A single transaction and the key it was linked with.
///
/// Fields can be changed after linking through the setters; doing so does not
/// re-derive the key, which is exactly what makes the change detectable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    kind: EntryKind,
    timestamp: Timestamp,
    amount: f64,
    key: EntryKey,
}

impl Entry {
    /// Create and link an entry from validated fields.
    pub fn new(kind: EntryKind, timestamp: Timestamp, amount: f64, seed: &SeedKey) -> Self {
        let key = derive_key(kind, &timestamp, amount, seed);
        Self {
            kind,
            timestamp,
            amount,
            key,
        }
    }

    /// Validate raw inputs, then create and link the entry.
    pub fn parse(kind: &str, timestamp: &str, amount: f64, seed: &SeedKey) -> Result<Self> {
        let kind = kind.parse()?;
        let timestamp = Timestamp::new(timestamp)?;
        Ok(Self::new(kind, timestamp, amount, seed))
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn key(&self) -> &EntryKey {
        &self.key
    }

    /// The amount with the sign of its kind applied.
    pub fn signed_amount(&self) -> f64 {
        self.kind.sign() * self.amount
    }

    /// Replace the amount. The key is left as it was.
    pub fn set_amount(&mut self, amount: f64) {
        self.amount = amount;
    }

    /// Replace the kind from a raw tag. The key is left as it was.
    pub fn set_kind(&mut self, tag: &str) -> Result<()> {
        self.kind = tag.parse()?;
        Ok(())
    }

    /// Replace the timestamp. The key is left as it was.
    pub fn set_timestamp(&mut self, timestamp: &str) -> Result<()> {
        self.timestamp = Timestamp::new(timestamp)?;
        Ok(())
    }

    /// Re-derive and store the key from the current fields.
    pub fn link(&mut self, seed: &SeedKey) {
        self.key = derive_key(self.kind, &self.timestamp, self.amount, seed);
        tracing::debug!(key = %self.key, "re-linked entry");
    }

    /// Whether re-deriving from `seed` reproduces the stored key.
    pub fn is_valid(&self, seed: &SeedKey) -> bool {
        derive_key(self.kind, &self.timestamp, self.amount, seed) == self.key
    }

    /// Find which field no longer matches the stored key under `seed`.
    ///
    /// Each field is probed with a key derived from that field's real value
    /// and the neutral [`PROBE_KIND`], [`PROBE_TIMESTAMP`], [`PROBE_AMOUNT`]
    /// for the other two. The probed segment is compared against the same
    /// segment of the stored key.
    ///
    /// This assumes a single field changed. When several did, the first in
    /// the order kind, timestamp, amount is reported and the others are not.
    /// A wrong `seed` makes every segment mismatch, so it reports the kind.
    pub fn locate_inconsistency(&self, seed: &SeedKey) -> Option<EntryField> {
        if self.is_valid(seed) {
            return None;
        }

        EntryField::ALL.into_iter().find(|&field| {
            let probe = self.probe(field, seed);
            self.key.segment(field) != Some(probe.get(field))
        })
    }

    fn probe(&self, field: EntryField, seed: &SeedKey) -> KeySegments {
        let kind = match field {
            EntryField::Kind => self.kind.tag(),
            _ => PROBE_KIND,
        };
        let timestamp = match field {
            EntryField::Timestamp => self.timestamp.as_str(),
            _ => PROBE_TIMESTAMP,
        };
        let amount = match field {
            EntryField::Amount => self.amount,
            _ => PROBE_AMOUNT,
        };
        derive_segments(kind, timestamp, amount, seed)
    }
}
