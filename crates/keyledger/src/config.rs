//! Ledger configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Configuration for a [`Ledger`](crate::Ledger).
///
/// ```toml
/// seed_key = "ABCDEFGH"
/// verify_before_append = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Trust anchor for the first entry. Must be non-empty.
    pub seed_key: String,
    /// Refuse to append onto a chain that fails the validity walk.
    pub verify_before_append: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            seed_key: String::new(),
            verify_before_append: true,
        }
    }
}

impl LedgerConfig {
    /// Config with the given seed key and default options.
    pub fn with_seed(seed_key: impl Into<String>) -> Self {
        Self {
            seed_key: seed_key.into(),
            ..Self::default()
        }
    }

    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}
