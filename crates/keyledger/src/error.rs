//! Error types for the Ledger.

use keyledger_core::CoreError;
use thiserror::Error;

/// Errors that can occur during Ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Entry, seed key, or index rejected by the core.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Configuration could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Append refused because the chain already fails validation.
    #[error("chain is corrupted at entry {index}")]
    ChainCorrupted { index: usize },

    /// A previous holder of the chain lock panicked.
    #[error("chain lock poisoned")]
    LockPoisoned,
}

/// Result type for Ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
