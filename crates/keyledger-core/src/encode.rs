//! The character-wise keyed transform.
//!
//! Every output character is computed from one input character and two
//! adjacent key characters:
//!
//! ```text
//! raw = (c mod k[cursor]) + k[cursor + 1]     (cursor wraps around the key)
//! raw = raw mod 126   if raw > 126
//! raw = raw + 35      if raw < 35
//! ```
//!
//! The output has the same number of characters as the input and every
//! character lies in the printable range `[35, 126]`. This is a scramble, not
//! a hash: it makes no cryptographic claims.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Width the rendered amount is left-padded to before encoding.
pub const AMOUNT_WIDTH: usize = 20;

/// Values above this are reduced modulo this value.
pub const CHAR_UPPER_LIMIT: u32 = 126;

/// Values below this are shifted up by this value.
pub const CHAR_LOWER_LIMIT: u32 = 35;

/// Amounts with a magnitude in `[PLAIN_MIN, PLAIN_MAX)` render without an
/// exponent.
const PLAIN_MIN: f64 = 1e-3;
const PLAIN_MAX: f64 = 1e7;

/// A key accepted by the transform: non-empty and free of NUL characters.
///
/// Validation happens once, here, so [`encode`] itself cannot fail.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeedKey(String);

impl SeedKey {
    /// Validate a key string.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(CoreError::EmptySeedKey);
        }
        if key.contains('\0') {
            return Err(CoreError::SeedKeyContainsNul);
        }
        Ok(Self(key))
    }

    /// Wrap a key produced by the transform itself.
    ///
    /// Transform output is never empty for non-empty input and never contains
    /// characters below 35, so it is always a valid key.
    pub(crate) fn from_encoded(key: String) -> Self {
        debug_assert!(!key.is_empty());
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of characters in the key.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Debug for SeedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SeedKey({} chars)", self.char_len())
    }
}

impl fmt::Display for SeedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SeedKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for SeedKey {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SeedKey> for String {
    fn from(key: SeedKey) -> Self {
        key.0
    }
}

impl AsRef<str> for SeedKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Run the keyed transform over `text`.
///
/// The key cursor starts at 0 for every call and advances (wrapping) once per
/// input character.
pub fn encode(text: &str, key: &SeedKey) -> String {
    let key: Vec<u32> = key.0.chars().map(u32::from).collect();
    let last = key.len() - 1;
    let mut cursor = 0usize;

    text.chars()
        .map(|c| {
            let next = if cursor == last { 0 } else { cursor + 1 };
            // Key characters are never NUL, so the divisor is non-zero.
            let mut raw = u32::from(c) % key[cursor] + key[next];
            if raw > CHAR_UPPER_LIMIT {
                raw %= CHAR_UPPER_LIMIT;
            }
            if raw < CHAR_LOWER_LIMIT {
                raw += CHAR_LOWER_LIMIT;
            }
            cursor = next;
            // raw is in [35, 126].
            char::from(raw as u8)
        })
        .collect()
}

/// Validate `key` and run the transform.
pub fn try_encode(text: &str, key: &str) -> Result<String> {
    let key = SeedKey::new(key)?;
    Ok(encode(text, &key))
}

/// Render an amount as text.
///
/// Magnitudes in `[1e-3, 1e7)` are written as plain decimals with at least
/// one fractional digit (`100.0`, `0.001`). Everything else uses the shortest
/// round-trip digits as `d.ddd` followed by `E` and the exponent (`1.0E7`,
/// `1.0E-4`, `1.23456789E8`). Zero keeps its sign; non-finite amounts render
/// as `NaN`, `Infinity` and `-Infinity`.
pub fn render_amount(amount: f64) -> String {
    if amount.is_nan() {
        return "NaN".to_string();
    }
    if amount.is_infinite() {
        let sign = if amount.is_sign_negative() { "-" } else { "" };
        return format!("{sign}Infinity");
    }

    let magnitude = amount.abs();
    if amount == 0.0 || (PLAIN_MIN..PLAIN_MAX).contains(&magnitude) {
        return format!("{:?}", amount);
    }

    let sign = if amount.is_sign_negative() { "-" } else { "" };
    let scientific = format!("{magnitude:e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let fraction = if mantissa.contains('.') { "" } else { ".0" };
    format!("{sign}{mantissa}{fraction}E{exponent}")
}

/// Render an amount the way it is fed to the transform.
///
/// [`render_amount`], right-aligned to [`AMOUNT_WIDTH`]. Longer renderings
/// are kept whole.
pub fn pad_amount(amount: f64) -> String {
    format!("{:>width$}", render_amount(amount), width = AMOUNT_WIDTH)
}

/// Encode an amount: [`pad_amount`] followed by [`encode`].
pub fn encode_amount(amount: f64, key: &SeedKey) -> String {
    encode(&pad_amount(amount), key)
}
