//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the exact key the transform derives for known inputs, so
//! any change to the transform, the amount rendering, or the field order shows
//! up as a mismatch.

use serde::Serialize;

use keyledger_core::{Entry, SeedKey};

/// A golden test vector.
#[derive(Debug, Clone, Serialize)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Seed key the entry is linked with.
    pub seed: &'static str,
    /// Kind tag.
    pub kind: &'static str,
    /// Timestamp text.
    pub timestamp: &'static str,
    /// Amount.
    pub amount: f64,
    /// Expected derived key.
    pub expected_key: &'static str,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "scenario_deposit",
            seed: "ABCDEFGH",
            kind: "DE",
            timestamp: "2024-01-01 00:00:00",
            amount: 100.0,
            expected_key: "EFtsvyswynrtduv&xq|stbcdefghabcdefghrrsru",
        },
        GoldenVector {
            name: "single_char_seed",
            seed: "k",
            kind: "DE",
            timestamp: "2020-01-01 00:00:00",
            amount: 0.0,
            expected_key: "12B@B@=@A=@A0@@'@@'@@00000000000000000@>@",
        },
        GoldenVector {
            name: "negative_withdrawal",
            seed: "seed",
            kind: "WH",
            timestamp: "1999-12-31 23:59:59",
            amount: -12.5,
            expected_key: ">/;CB.7;;E=;)'=D>.D?B**)8**)8**)8**)E;<7*",
        },
        GoldenVector {
            // Renders to exactly 20 characters, so no padding is added.
            name: "unpadded_amount",
            seed: "ABCDEFGH",
            kind: "DE",
            timestamp: "2024-02-29 12:30:45",
            amount: -0.30000000000000004,
            expected_key: "EFtsvyswznt|dvx&{q|wyosrxvwxqrstuvwxqrsty",
        },
        GoldenVector {
            name: "non_ascii_seed",
            seed: "clé-à-€",
            kind: "WH",
            timestamp: "2024-03-01 08:00:00",
            amount: 2500.75,
            expected_key: "E5C@_iZ3;>@^'];BA@ge]10M'MP(10M'MP:#@]cd8",
        },
        GoldenVector {
            // Renders as `1.0E7`.
            name: "large_amount_exponent",
            seed: "ABCDEFGH",
            kind: "DE",
            timestamp: "2024-05-01 09:15:00",
            amount: 1.0e7,
            expected_key: "EFtsvysw}nrtdu$&yv|stbcdefghabcdefghrpsF|",
        },
        GoldenVector {
            // Renders as `1.0E-4`.
            name: "small_amount_exponent",
            seed: "ABCDEFGH",
            kind: "WH",
            timestamp: "2024-05-02 17:45:30",
            amount: 1.0e-4,
            expected_key: "XItsvysw}nrudv}&|v|vtbcdefghabcdefgyorFqy",
        },
    ]
}

/// Key of `("WH", "2024-01-02 00:00:00", 40.0)` linked after `scenario_deposit`.
pub const SCENARIO_SECOND_KEY: &str = "Xvx&',(%*(C&99'2V'-.%f98;>8<>379):;F='.#&";

/// Build the entry a vector describes.
pub fn entry_from_vector(vector: &GoldenVector) -> Entry {
    let seed = SeedKey::new(vector.seed).expect("golden seed is valid");
    Entry::parse(vector.kind, vector.timestamp, vector.amount, &seed)
        .expect("golden fields are valid")
}

/// Check every vector against the implementation.
///
/// Returns `(name, matches, actual_key)` for each vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let entry = entry_from_vector(v);
            let actual = entry.key().as_str().to_string();
            (v.name.to_string(), actual == v.expected_key, actual)
        })
        .collect()
}
