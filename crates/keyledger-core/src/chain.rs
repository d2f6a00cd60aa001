//! Chain: an ordered, append-only sequence of linked entries.
//!
//! The chain is the only holder of the seed key, so it is the only thing that
//! can attest to an entry's validity. Every check walks forward from that seed;
//! no entry is ever asked to vouch for its own predecessor.

use serde::{Deserialize, Serialize};
use std::ops::Index;

use crate::encode::SeedKey;
use crate::entry::{Entry, EntryField, EntryKey, EntryKind, Timestamp};
use crate::error::{CoreError, Result};

/// The first broken entry in a chain and the field that broke it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inconsistency {
    /// Position of the entry in the chain.
    pub index: usize,
    /// Field reported by [`Entry::locate_inconsistency`].
    pub field: Option<EntryField>,
}

/// An ordered sequence of entries anchored by a seed key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    seed_key: SeedKey,
    entries: Vec<Entry>,
}

impl Chain {
    /// Create an empty chain, validating the seed key.
    pub fn new(seed_key: impl Into<String>) -> Result<Self> {
        Ok(Self::with_seed(SeedKey::new(seed_key)?))
    }

    /// Create an empty chain from an already validated seed key.
    pub fn with_seed(seed_key: SeedKey) -> Self {
        Self {
            seed_key,
            entries: Vec::new(),
        }
    }

    pub fn seed_key(&self) -> &SeedKey {
        &self.seed_key
    }

    /// The key the next appended entry will be linked with.
    pub fn head_key(&self) -> &SeedKey {
        self.entries
            .last()
            .map(|e| e.key().as_seed())
            .unwrap_or(&self.seed_key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Append
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate raw inputs and append a new entry.
    ///
    /// Nothing is appended if the kind or timestamp is rejected.
    pub fn append(&mut self, kind: &str, timestamp: &str, amount: f64) -> Result<&Entry> {
        let kind: EntryKind = kind.parse()?;
        let timestamp = Timestamp::new(timestamp)?;
        Ok(self.push(kind, timestamp, amount))
    }

    /// Append an entry from validated fields.
    pub fn push(&mut self, kind: EntryKind, timestamp: Timestamp, amount: f64) -> &Entry {
        let entry = Entry::new(kind, timestamp, amount, self.head_key());
        tracing::debug!(
            index = self.entries.len(),
            kind = %entry.kind(),
            key = %entry.key(),
            "appended entry"
        );
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether every entry re-derives from the seed key forward.
    pub fn is_valid(&self) -> bool {
        self.first_inconsistency_index().is_none()
    }

    /// The first entry that does not re-derive from the key held at its
    /// position.
    pub fn first_inconsistency(&self) -> Option<&Entry> {
        self.first_inconsistency_index().map(|i| &self.entries[i])
    }

    /// Position of the first entry that fails the walk.
    pub fn first_inconsistency_index(&self) -> Option<usize> {
        let broken = first_broken(&self.seed_key, &self.entries);
        if let Some(index) = broken {
            tracing::debug!(index, len = self.entries.len(), "chain walk found broken entry");
        }
        broken
    }

    /// Locate the changed field of the entry at `index`.
    ///
    /// Uses the key the walk holds at that position: the seed key for the
    /// first entry, otherwise the stored key of the entry before it. Returns
    /// `None` if the entry is consistent or `index` is out of range.
    pub fn find_inconsistent_field(&self, index: usize) -> Option<EntryField> {
        let entry = self.entries.get(index)?;
        entry.locate_inconsistency(self.seed_at(index))
    }

    /// The first broken entry together with its changed field.
    pub fn diagnose(&self) -> Option<Inconsistency> {
        let index = self.first_inconsistency_index()?;
        let field = self.find_inconsistent_field(index);
        tracing::warn!(index, field = ?field, "chain inconsistency located");
        Some(Inconsistency { index, field })
    }

    fn seed_at(&self, index: usize) -> &SeedKey {
        match index.checked_sub(1).and_then(|prev| self.entries.get(prev)) {
            Some(prev) => prev.key().as_seed(),
            None => &self.seed_key,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Balance
    // ─────────────────────────────────────────────────────────────────────────

    /// Sum of deposits minus withdrawals, or 0.0 if the chain is not valid.
    pub fn balance(&self) -> f64 {
        if !self.is_valid() {
            return 0.0;
        }
        self.entries.iter().map(Entry::signed_amount).sum()
    }

    /// Balance of the entries up to and including `index`.
    ///
    /// Only that prefix has to be valid; it reports 0.0 otherwise. Returns
    /// `None` if `index` is out of range.
    pub fn running_balance(&self, index: usize) -> Option<f64> {
        let prefix = self.entries.get(..=index)?;
        if first_broken(&self.seed_key, prefix).is_some() {
            return Some(0.0);
        }
        Some(prefix.iter().map(Entry::signed_amount).sum())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lookup
    // ─────────────────────────────────────────────────────────────────────────

    /// Entry at `index`, or `None` if out of range.
    pub fn find_by_index(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// First entry whose stored key equals `key`.
    pub fn find_by_key(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.key().as_str() == key)
    }

    /// Position of the entry whose stored key equals `key`.
    pub fn position_of(&self, key: &EntryKey) -> Option<usize> {
        self.entries.iter().position(|e| e.key() == key)
    }

    /// Entry at `index`; out of range is an error.
    pub fn transaction_at(&self, index: usize) -> Result<&Entry> {
        self.entries.get(index).ok_or(CoreError::IndexOutOfRange {
            index,
            len: self.entries.len(),
        })
    }

    /// Mutable access to a stored entry.
    ///
    /// Changing a field through this does not re-link anything, so the chain
    /// will report the entry as inconsistent.
    pub fn entry_mut(&mut self, index: usize) -> Option<&mut Entry> {
        self.entries.get_mut(index)
    }
}

/// Walk `entries` forward from `seed` and return the first index that fails.
fn first_broken(seed: &SeedKey, entries: &[Entry]) -> Option<usize> {
    let mut running = seed;
    for (index, entry) in entries.iter().enumerate() {
        if !entry.is_valid(running) {
            return Some(index);
        }
        running = entry.key().as_seed();
    }
    None
}

impl Index<usize> for Chain {
    type Output = Entry;

    /// Panics if `index` is out of range. Use [`Chain::find_by_index`] or
    /// [`Chain::transaction_at`] for checked access.
    fn index(&self, index: usize) -> &Entry {
        &self.entries[index]
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
