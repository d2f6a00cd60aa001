//! # Keyledger
//!
//! The unified API for keyledger: an append-only sequence of deposits and
//! withdrawals where every entry's key is derived from the key before it.
//!
//! ## Overview
//!
//! - **Entry**: a transaction plus the key it was linked with
//! - **Chain**: the ordered entries and the seed key that anchors them
//! - **Ledger**: a chain behind one lock, configured from [`LedgerConfig`]
//!
//! Altering any field of any entry, or reordering or removing entries, makes
//! the validity walk stop at that entry. [`Ledger::audit`] reports where and
//! which field.
//!
//! ## Usage
//!
//! ```rust
//! use keyledger::{Ledger, LedgerConfig};
//!
//! let ledger = Ledger::open(LedgerConfig::with_seed("ABCDEFGH")).unwrap();
//! ledger.append("DE", "2024-01-01 00:00:00", 100.0).unwrap();
//! ledger.append("WH", "2024-01-02 00:00:00", 40.0).unwrap();
//!
//! assert!(ledger.is_valid().unwrap());
//! assert_eq!(ledger.balance().unwrap(), 60.0);
//! ```
//!
//! ## Re-exports
//!
//! - `keyledger::core` - Core primitives (Chain, Entry, SeedKey, etc.)

pub mod config;
pub mod error;
pub mod ledger;

pub use keyledger_core as core;

pub use config::LedgerConfig;
pub use error::{LedgerError, Result};
pub use ledger::{AuditReport, Ledger};

pub use keyledger_core::{
    Chain, CoreError, Entry, EntryField, EntryKey, EntryKind, Inconsistency, SeedKey, Timestamp,
};
