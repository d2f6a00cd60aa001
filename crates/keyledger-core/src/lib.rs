//! # Keyledger Core
//!
//! Pure primitives for keyledger: the keyed transform, linked entries, and
//! the chain that validates them.
//!
//! This crate contains no I/O and no synchronization. It is pure computation
//! over an append-only sequence.
//!
//! ## Key Types
//!
//! - [`SeedKey`] - A validated key for the transform (non-empty, no NUL)
//! - [`Entry`] - A deposit or withdrawal plus its derived [`EntryKey`]
//! - [`Chain`] - The ordered entries and the seed key that anchors them
//! - [`EntryField`] - Which field the diagnostic probe found altered
//!
//! ## Linking
//!
//! Entry `i` is linked with the key of entry `i - 1`, or with the chain's
//! seed key for the first entry. Changing any stored field afterwards, or
//! reordering or removing entries, breaks the walk at that entry.
//!
//! ```rust
//! use keyledger_core::{Chain, EntryField};
//!
//! let mut chain = Chain::new("ABCDEFGH").unwrap();
//! chain.append("DE", "2024-01-01 00:00:00", 100.0).unwrap();
//! chain.append("WH", "2024-01-02 00:00:00", 40.0).unwrap();
//! assert_eq!(chain.balance(), 60.0);
//!
//! chain.entry_mut(1).unwrap().set_amount(999.0);
//! assert!(!chain.is_valid());
//! assert_eq!(chain.find_inconsistent_field(1), Some(EntryField::Amount));
//! ```

pub mod chain;
pub mod encode;
pub mod entry;
pub mod error;

pub use chain::{Chain, Inconsistency};
pub use encode::{
    encode, encode_amount, pad_amount, render_amount, try_encode, SeedKey, AMOUNT_WIDTH,
};
pub use entry::{
    derive_key, derive_segments, Entry, EntryField, EntryKey, EntryKind, KeySegments, Timestamp,
};
pub use error::CoreError;
