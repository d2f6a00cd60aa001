//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use rand::distributions::Alphanumeric;
use rand::Rng;

use keyledger::{Ledger, LedgerConfig};
use keyledger_core::{Chain, Entry, SeedKey};

/// Length of randomly generated seed keys.
pub const RANDOM_SEED_LEN: usize = 16;

/// A test fixture with a seed key and a chain anchored at it.
pub struct TestFixture {
    pub seed: SeedKey,
    pub chain: Chain,
}

impl TestFixture {
    /// Create a new test fixture with a random seed key.
    pub fn new() -> Self {
        Self::with_seed(&random_seed())
    }

    /// Create with a fixed seed key.
    pub fn with_seed(seed: &str) -> Self {
        let seed = SeedKey::new(seed).expect("fixture seed is valid");
        Self {
            chain: Chain::with_seed(seed.clone()),
            seed,
        }
    }

    /// Append a deposit.
    pub fn deposit(&mut self, timestamp: &str, amount: f64) -> &Entry {
        self.chain
            .append("DE", timestamp, amount)
            .expect("fixture deposit is valid")
    }

    /// Append a withdrawal.
    pub fn withdraw(&mut self, timestamp: &str, amount: f64) -> &Entry {
        self.chain
            .append("WH", timestamp, amount)
            .expect("fixture withdrawal is valid")
    }

    /// Append `count` deposits of 1.0 on consecutive seconds.
    pub fn fill(&mut self, count: usize) -> &mut Self {
        for i in 0..count {
            let ts = format!(
                "2024-01-01 {:02}:{:02}:{:02}",
                (i / 3600) % 24,
                (i / 60) % 60,
                i % 60
            );
            self.deposit(&ts, 1.0);
        }
        self
    }

    /// A ledger holding a copy of this fixture's chain.
    pub fn ledger(&self) -> Ledger {
        Ledger::from_chain(
            self.chain.clone(),
            LedgerConfig::with_seed(self.seed.as_str()),
        )
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create fixtures with distinct seed keys.
pub fn multi_seed_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| TestFixture::with_seed(&format!("fixture-seed-{i}")))
        .collect()
}

/// A random alphanumeric seed key.
pub fn random_seed() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_SEED_LEN)
        .map(char::from)
        .collect()
}
