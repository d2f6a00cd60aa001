//! Proptest generators for property-based testing.

use proptest::prelude::*;

use keyledger_core::{Chain, EntryField, EntryKind, SeedKey, Timestamp};

/// Generate a seed key of printable ASCII.
pub fn seed_key() -> impl Strategy<Value = SeedKey> {
    "[!-~]{1,32}".prop_map(|s| SeedKey::new(s).expect("generated seed is non-empty"))
}

/// Generate a seed key from any non-NUL characters.
pub fn unicode_seed_key() -> impl Strategy<Value = SeedKey> {
    r"[^\x00]{1,16}".prop_map(|s| SeedKey::new(s).expect("generated seed has no NUL"))
}

/// Generate an EntryKind.
pub fn entry_kind() -> impl Strategy<Value = EntryKind> {
    prop_oneof![Just(EntryKind::Deposit), Just(EntryKind::Withdrawal)]
}

/// Generate a well-formed timestamp.
pub fn timestamp() -> impl Strategy<Value = Timestamp> {
    (1970u32..=2099, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60, 0u32..60).prop_map(
        |(y, mo, d, h, mi, s)| {
            Timestamp::new(format!("{y:04}-{mo:02}-{d:02} {h:02}:{mi:02}:{s:02}"))
                .expect("generated timestamp matches pattern")
        },
    )
}

/// Generate a reasonable amount.
pub fn amount() -> impl Strategy<Value = f64> {
    prop_oneof![
        (-1_000_000i64..=1_000_000).prop_map(|cents| cents as f64 / 100.0),
        -1.0e12f64..1.0e12,
    ]
}

/// Generate a field to tamper with.
pub fn entry_field() -> impl Strategy<Value = EntryField> {
    prop_oneof![
        Just(EntryField::Kind),
        Just(EntryField::Timestamp),
        Just(EntryField::Amount),
    ]
}

/// Parameters for one appended entry.
#[derive(Debug, Clone)]
pub struct EntryParams {
    pub kind: EntryKind,
    pub timestamp: Timestamp,
    pub amount: f64,
}

impl Arbitrary for EntryParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (entry_kind(), timestamp(), amount())
            .prop_map(|(kind, timestamp, amount)| EntryParams {
                kind,
                timestamp,
                amount,
            })
            .boxed()
    }
}

/// Parameters for a whole chain.
#[derive(Debug, Clone)]
pub struct ChainParams {
    pub seed: SeedKey,
    pub entries: Vec<EntryParams>,
}

impl Arbitrary for ChainParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (seed_key(), prop::collection::vec(any::<EntryParams>(), 0..16))
            .prop_map(|(seed, entries)| ChainParams { seed, entries })
            .boxed()
    }
}

/// Build a chain from parameters.
pub fn chain_from_params(params: &ChainParams) -> Chain {
    let mut chain = Chain::with_seed(params.seed.clone());
    for e in &params.entries {
        chain.push(e.kind, e.timestamp.clone(), e.amount);
    }
    chain
}

/// Change one field of the entry at `index` to a different valid value.
///
/// The key is left untouched. Returns `false` if `index` is out of range.
pub fn tamper(chain: &mut Chain, index: usize, field: EntryField) -> bool {
    let Some(entry) = chain.entry_mut(index) else {
        return false;
    };
    match field {
        EntryField::Kind => {
            let flipped = match entry.kind() {
                EntryKind::Deposit => "WH",
                EntryKind::Withdrawal => "DE",
            };
            entry.set_kind(flipped).is_ok()
        }
        EntryField::Timestamp => {
            // Flip the final seconds digit; the result still matches the pattern.
            let mut ts = entry.timestamp().as_str().to_string();
            let last = if ts.ends_with('0') { '1' } else { '0' };
            ts.pop();
            ts.push(last);
            entry.set_timestamp(&ts).is_ok()
        }
        EntryField::Amount => {
            let amount = entry.amount();
            entry.set_amount(if amount == 1.0 { 2.0 } else { 1.0 });
            true
        }
    }
}
