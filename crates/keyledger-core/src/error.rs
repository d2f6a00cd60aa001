//! Error types for keyledger core.

use thiserror::Error;

/// Errors raised while building, updating, or indexing entries.
///
/// Every variant is local to the call that produced it: a rejected entry is
/// never appended and a rejected update leaves the entry untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid transaction type: {0:?}")]
    InvalidKind(String),

    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    #[error("seed key must not be empty")]
    EmptySeedKey,

    #[error("seed key must not contain NUL characters")]
    SeedKeyContainsNul,

    #[error("index {index} out of range for chain of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
