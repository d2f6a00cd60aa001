//! The Ledger: a chain behind one lock.
//!
//! The core [`Chain`] has no internal synchronization. The Ledger holds it in
//! an `RwLock` so an append and a full validity walk never interleave: appends
//! take the write lock for their whole duration, walks take the read lock.

use serde::{Deserialize, Serialize};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use keyledger_core::{Chain, Entry, EntryField, EntryKey, Inconsistency};

use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};

/// Summary of a full validity walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Number of entries walked.
    pub entries: usize,
    /// Whether the walk reached the end.
    pub valid: bool,
    /// Balance as reported by the chain (0.0 when invalid).
    pub balance: f64,
    /// Short hex form of the last entry's key (first 16 hex characters);
    /// `None` for an empty ledger.
    pub head: Option<String>,
    /// First broken entry, if any.
    pub first_broken: Option<Inconsistency>,
}

/// A lock-guarded, tamper-evident transaction chain.
pub struct Ledger {
    chain: RwLock<Chain>,
    config: LedgerConfig,
}

impl Ledger {
    /// Create an empty ledger anchored at `config.seed_key`.
    pub fn open(config: LedgerConfig) -> Result<Self> {
        let chain = Chain::new(config.seed_key.clone())?;
        tracing::info!(
            verify_before_append = config.verify_before_append,
            "opened ledger"
        );
        Ok(Self::from_chain(chain, config))
    }

    /// Wrap an existing chain.
    ///
    /// The chain's own seed key is kept and replaces `config.seed_key`, so
    /// [`Ledger::config`] always reports the seed the walk starts from.
    pub fn from_chain(chain: Chain, mut config: LedgerConfig) -> Self {
        config.seed_key = chain.seed_key().as_str().to_string();
        Self {
            chain: RwLock::new(chain),
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Chain>> {
        self.chain.read().map_err(|_| LedgerError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Chain>> {
        self.chain.write().map_err(|_| LedgerError::LockPoisoned)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Append
    // ─────────────────────────────────────────────────────────────────────────

    /// Append a transaction and return its key.
    ///
    /// With `verify_before_append`, the chain is walked first under the same
    /// write lock and the append is refused if any entry is broken.
    pub fn append(&self, kind: &str, timestamp: &str, amount: f64) -> Result<EntryKey> {
        let mut chain = self.write()?;

        if self.config.verify_before_append {
            if let Some(index) = chain.first_inconsistency_index() {
                tracing::warn!(index, "refusing append onto corrupted chain");
                return Err(LedgerError::ChainCorrupted { index });
            }
        }

        let entry = chain.append(kind, timestamp, amount)?;
        Ok(entry.key().clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation
    // ─────────────────────────────────────────────────────────────────────────

    pub fn is_valid(&self) -> Result<bool> {
        Ok(self.read()?.is_valid())
    }

    pub fn first_inconsistency(&self) -> Result<Option<Entry>> {
        Ok(self.read()?.first_inconsistency().cloned())
    }

    pub fn find_inconsistent_field(&self, index: usize) -> Result<Option<EntryField>> {
        Ok(self.read()?.find_inconsistent_field(index))
    }

    pub fn diagnose(&self) -> Result<Option<Inconsistency>> {
        Ok(self.read()?.diagnose())
    }

    /// Walk the chain once and summarize it.
    pub fn audit(&self) -> Result<AuditReport> {
        let chain = self.read()?;
        let first_broken = chain.diagnose();
        let valid = first_broken.is_none();
        let balance = if valid {
            chain.iter().map(Entry::signed_amount).sum()
        } else {
            0.0
        };

        let report = AuditReport {
            entries: chain.len(),
            valid,
            balance,
            head: chain.iter().next_back().map(|e| e.key().to_string()),
            first_broken,
        };
        tracing::debug!(entries = report.entries, valid, "audited ledger");
        Ok(report)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query
    // ─────────────────────────────────────────────────────────────────────────

    pub fn balance(&self) -> Result<f64> {
        Ok(self.read()?.balance())
    }

    pub fn running_balance(&self, index: usize) -> Result<Option<f64>> {
        Ok(self.read()?.running_balance(index))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    pub fn find_by_index(&self, index: usize) -> Result<Option<Entry>> {
        Ok(self.read()?.find_by_index(index).cloned())
    }

    pub fn find_by_key(&self, key: &str) -> Result<Option<Entry>> {
        Ok(self.read()?.find_by_key(key).cloned())
    }

    /// Entry at `index`; out of range is an error.
    pub fn transaction_at(&self, index: usize) -> Result<Entry> {
        Ok(self.read()?.transaction_at(index)?.clone())
    }

    /// A copy of the current chain.
    pub fn snapshot(&self) -> Result<Chain> {
        Ok(self.read()?.clone())
    }

    /// Run `f` with exclusive access to the chain.
    pub fn modify<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Chain) -> R,
    {
        let mut chain = self.write()?;
        Ok(f(&mut chain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyledger_core::CoreError;
    use std::sync::Arc;
    use std::thread;

    fn ledger() -> Ledger {
        Ledger::open(LedgerConfig::with_seed("ABCDEFGH")).unwrap()
    }

    #[test]
    fn test_open_rejects_empty_seed() {
        let result = Ledger::open(LedgerConfig::default());
        assert!(matches!(
            result,
            Err(LedgerError::Core(CoreError::EmptySeedKey))
        ));
    }

    #[test]
    fn test_append_returns_key() {
        let ledger = ledger();
        let key = ledger.append("DE", "2024-01-01 00:00:00", 100.0).unwrap();
        assert_eq!(key.as_str(), "EFtsvyswynrtduv&xq|stbcdefghabcdefghrrsru");
        assert_eq!(ledger.find_by_key(key.as_str()).unwrap().unwrap().amount(), 100.0);
    }

    #[test]
    fn test_invalid_input_is_rejected() {
        let ledger = ledger();
        let result = ledger.append("XX", "2024-01-01 00:00:00", 1.0);
        assert!(matches!(
            result,
            Err(LedgerError::Core(CoreError::InvalidKind(_)))
        ));
        assert!(ledger.is_empty().unwrap());
    }

    #[test]
    fn test_verify_before_append_refuses_corrupted_chain() {
        let ledger = ledger();
        ledger.append("DE", "2024-01-01 00:00:00", 100.0).unwrap();
        ledger
            .modify(|chain| chain.entry_mut(0).unwrap().set_amount(1.0))
            .unwrap();

        let result = ledger.append("DE", "2024-01-02 00:00:00", 1.0);
        assert!(matches!(result, Err(LedgerError::ChainCorrupted { index: 0 })));
        assert_eq!(ledger.len().unwrap(), 1);
    }

    #[test]
    fn test_append_without_verification() {
        let config = LedgerConfig {
            seed_key: "ABCDEFGH".into(),
            verify_before_append: false,
        };
        let ledger = Ledger::open(config).unwrap();
        ledger.append("DE", "2024-01-01 00:00:00", 100.0).unwrap();
        ledger
            .modify(|chain| chain.entry_mut(0).unwrap().set_amount(1.0))
            .unwrap();

        ledger.append("DE", "2024-01-02 00:00:00", 1.0).unwrap();
        assert_eq!(ledger.len().unwrap(), 2);
        assert!(!ledger.is_valid().unwrap());
    }

    #[test]
    fn test_from_chain_reports_chain_seed() {
        let mut chain = Chain::new("chain-seed").unwrap();
        chain.append("DE", "2024-01-01 00:00:00", 5.0).unwrap();

        let ledger = Ledger::from_chain(chain, LedgerConfig::with_seed("other-seed"));
        assert_eq!(ledger.config().seed_key, "chain-seed");
        assert!(ledger.is_valid().unwrap());

        let reopened = Ledger::open(ledger.config().clone()).unwrap();
        reopened.append("DE", "2024-01-01 00:00:00", 5.0).unwrap();
        assert_eq!(reopened.snapshot().unwrap(), ledger.snapshot().unwrap());
    }

    #[test]
    fn test_transaction_at_out_of_range() {
        let ledger = ledger();
        let result = ledger.transaction_at(0);
        assert!(matches!(
            result,
            Err(LedgerError::Core(CoreError::IndexOutOfRange { index: 0, len: 0 }))
        ));
        assert!(ledger.find_by_index(0).unwrap().is_none());
    }

    #[test]
    fn test_audit_report() {
        let ledger = ledger();
        ledger.append("DE", "2024-01-01 00:00:00", 100.0).unwrap();
        ledger.append("WH", "2024-01-02 00:00:00", 40.0).unwrap();

        let report = ledger.audit().unwrap();
        assert!(report.valid);
        assert_eq!(report.entries, 2);
        assert_eq!(report.balance, 60.0);
        assert_eq!(report.head.as_deref().map(str::len), Some(16));
        assert_eq!(
            report.head,
            Some(ledger.transaction_at(1).unwrap().key().to_string())
        );
        assert!(report.first_broken.is_none());

        ledger
            .modify(|chain| chain.entry_mut(1).unwrap().set_amount(999.0))
            .unwrap();

        let report = ledger.audit().unwrap();
        assert!(!report.valid);
        assert_eq!(report.balance, 0.0);
        assert_eq!(
            report.first_broken,
            Some(Inconsistency {
                index: 1,
                field: Some(EntryField::Amount)
            })
        );
    }

    #[test]
    fn test_audit_report_serializes() {
        let ledger = ledger();
        ledger.append("DE", "2024-01-01 00:00:00", 1.0).unwrap();
        ledger
            .modify(|chain| chain.entry_mut(0).unwrap().set_kind("WH"))
            .unwrap()
            .unwrap();

        let json = serde_json::to_value(ledger.audit().unwrap()).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["first_broken"]["index"], 0);
        assert_eq!(json["first_broken"]["field"], "TYPE");
    }

    #[test]
    fn test_concurrent_appends_stay_linked() {
        let ledger = Arc::new(ledger());

        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || {
                    for i in 0..25 {
                        let ts = format!("2024-01-{:02} 00:00:{:02}", worker + 1, i);
                        ledger.append("DE", &ts, 1.0).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(ledger.len().unwrap(), 100);
        assert!(ledger.is_valid().unwrap());
        assert_eq!(ledger.balance().unwrap(), 100.0);
    }

    #[test]
    fn test_poisoned_lock_is_reported() {
        let ledger = Arc::new(ledger());
        let poisoner = Arc::clone(&ledger);

        let _ = thread::spawn(move || {
            poisoner
                .modify::<_, ()>(|_| panic!("panic while holding the chain"))
                .ok();
        })
        .join();

        assert!(matches!(ledger.len(), Err(LedgerError::LockPoisoned)));
    }
}
