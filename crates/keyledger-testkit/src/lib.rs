//! # Keyledger Testkit
//!
//! Testing utilities for keyledger.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known inputs with the exact key they must derive
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Helper structs for setting up test chains
//!
//! ## Golden Vectors
//!
//! ```rust
//! use keyledger_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, key) in verify_all_vectors() {
//!     assert!(matches, "{name}: {key}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use keyledger_testkit::generators::{chain_from_params, ChainParams};
//!
//! proptest! {
//!     #[test]
//!     fn built_chains_are_valid(params: ChainParams) {
//!         prop_assert!(chain_from_params(&params).is_valid());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use keyledger_testkit::fixtures::TestFixture;
//!
//! let mut fixture = TestFixture::new();
//! fixture.deposit("2024-01-01 00:00:00", 100.0);
//! assert!(fixture.chain.is_valid());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_seed_fixtures, TestFixture};
pub use generators::{chain_from_params, tamper, ChainParams, EntryParams};
pub use vectors::{all_vectors, entry_from_vector, verify_all_vectors, GoldenVector};
