//! End-to-end tamper detection through the Ledger API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use proptest::prelude::*;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

use keyledger::{CoreError, EntryField, EntryKind, Inconsistency, Ledger, LedgerConfig, LedgerError};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn two_entry_ledger() -> Ledger {
    init_tracing();
    let config = LedgerConfig {
        seed_key: "ABCDEFGH".into(),
        verify_before_append: true,
    };
    let ledger = Ledger::open(config).unwrap();
    ledger.append("DE", "2024-01-01 00:00:00", 100.0).unwrap();
    ledger.append("WH", "2024-01-02 00:00:00", 40.0).unwrap();
    ledger
}

#[test]
fn deposit_then_withdrawal_balances() {
    let ledger = two_entry_ledger();

    assert!(ledger.is_valid().unwrap());
    assert_eq!(ledger.balance().unwrap(), 60.0);
    assert_eq!(ledger.running_balance(0).unwrap(), Some(100.0));
    assert!(ledger.first_inconsistency().unwrap().is_none());
}

#[test]
fn altered_amount_is_located() {
    let ledger = two_entry_ledger();
    ledger
        .modify(|chain| chain.entry_mut(1).unwrap().set_amount(999.0))
        .unwrap();

    assert!(!ledger.is_valid().unwrap());
    assert_eq!(ledger.balance().unwrap(), 0.0);

    let broken = ledger.first_inconsistency().unwrap().unwrap();
    assert_eq!(broken.kind(), EntryKind::Withdrawal);
    assert_eq!(broken.amount(), 999.0);
    assert_eq!(ledger.find_inconsistent_field(1).unwrap(), Some(EntryField::Amount));
}

#[test]
fn altered_kind_and_date_are_located() {
    let ledger = two_entry_ledger();
    ledger
        .modify(|chain| chain.entry_mut(0).unwrap().set_kind("WH"))
        .unwrap()
        .unwrap();
    assert_eq!(
        ledger.diagnose().unwrap(),
        Some(Inconsistency {
            index: 0,
            field: Some(EntryField::Kind)
        })
    );

    let ledger = two_entry_ledger();
    ledger
        .modify(|chain| chain.entry_mut(1).unwrap().set_timestamp("2024-01-02 00:00:01"))
        .unwrap()
        .unwrap();
    assert_eq!(
        ledger.diagnose().unwrap(),
        Some(Inconsistency {
            index: 1,
            field: Some(EntryField::Timestamp)
        })
    );
}

#[test]
fn relinking_forward_repairs_chain() {
    let ledger = two_entry_ledger();
    ledger
        .modify(|chain| {
            chain.entry_mut(0).unwrap().set_amount(50.0);
            let seed = chain.seed_key().clone();
            chain.entry_mut(0).unwrap().link(&seed);
            // Entry 1 was linked with the old key of entry 0.
            assert_eq!(chain.first_inconsistency_index(), Some(1));

            let seed = chain[0].key().as_seed().clone();
            chain.entry_mut(1).unwrap().link(&seed);
        })
        .unwrap();

    assert!(ledger.is_valid().unwrap());
    assert_eq!(ledger.balance().unwrap(), 10.0);
}

#[test]
fn rejected_inputs_never_enter_the_chain() {
    let ledger = two_entry_ledger();

    let err = ledger.append("XX", "2024-01-03 00:00:00", 1.0).unwrap_err();
    assert!(matches!(err, LedgerError::Core(CoreError::InvalidKind(ref k)) if k == "XX"));

    let err = ledger.append("DE", "2024/01/01 00:00:00", 1.0).unwrap_err();
    assert!(matches!(err, LedgerError::Core(CoreError::InvalidTimestamp(_))));

    assert_eq!(ledger.len().unwrap(), 2);
    assert!(ledger.is_valid().unwrap());
}

#[test]
fn lookups_return_absence_not_errors() {
    let ledger = two_entry_ledger();
    let head = ledger.transaction_at(1).unwrap();

    assert_eq!(ledger.find_by_key(head.key().as_str()).unwrap(), Some(head));
    assert!(ledger.find_by_key("no such key").unwrap().is_none());
    assert!(ledger.find_by_index(2).unwrap().is_none());
    assert!(matches!(
        ledger.transaction_at(2),
        Err(LedgerError::Core(CoreError::IndexOutOfRange { index: 2, len: 2 }))
    ));
}

#[test]
fn snapshot_is_independent() {
    let ledger = two_entry_ledger();
    let mut snapshot = ledger.snapshot().unwrap();
    snapshot.entry_mut(0).unwrap().set_amount(0.5);

    assert!(!snapshot.is_valid());
    assert!(ledger.is_valid().unwrap());
}

#[test]
fn config_file_drives_ledger() {
    let config = LedgerConfig::from_toml_str(
        r#"
        seed_key = "ABCDEFGH"
        verify_before_append = false
        "#,
    )
    .unwrap();
    let ledger = Ledger::open(config).unwrap();
    let key = ledger.append("DE", "2024-01-01 00:00:00", 100.0).unwrap();

    assert_eq!(key.as_str(), "EFtsvyswynrtduv&xq|stbcdefghabcdefghrrsru");
    assert!(!ledger.config().verify_before_append);
}

/// Counts `WARN` events.
struct WarnCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[test]
fn audit_of_tampered_chain_warns_once() {
    let ledger = two_entry_ledger();
    ledger
        .modify(|chain| chain.entry_mut(1).unwrap().set_amount(999.0))
        .unwrap();

    let warnings = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(WarnCounter(Arc::clone(&warnings)));
    tracing::subscriber::with_default(subscriber, || {
        assert!(!ledger.is_valid().unwrap());
        assert_eq!(ledger.balance().unwrap(), 0.0);
        assert_eq!(warnings.load(Ordering::SeqCst), 0);

        assert!(!ledger.audit().unwrap().valid);
    });
    assert_eq!(warnings.load(Ordering::SeqCst), 1);
}

fn amount() -> impl Strategy<Value = f64> {
    (1i64..=1_000_000).prop_map(|cents| cents as f64 / 100.0)
}

proptest! {
    #[test]
    fn tampered_ledger_balances_to_zero(
        amounts in prop::collection::vec(amount(), 1..8),
        pick in any::<prop::sample::Index>(),
        forged in amount(),
    ) {
        let ledger = Ledger::open(LedgerConfig::with_seed("ABCDEFGH")).unwrap();
        for (i, amount) in amounts.iter().enumerate() {
            let ts = format!("2024-01-01 00:00:{:02}", i);
            ledger.append("DE", &ts, *amount).unwrap();
        }
        let index = pick.index(amounts.len());
        prop_assume!(forged != amounts[index]);

        ledger
            .modify(|chain| chain.entry_mut(index).unwrap().set_amount(forged))
            .unwrap();
        let report = ledger.audit().unwrap();

        // A forged amount can reproduce the stored segment; only a failed
        // walk is required to zero the balance.
        if !report.valid {
            prop_assert_eq!(report.balance, 0.0);
            prop_assert_eq!(ledger.balance().unwrap(), 0.0);
            prop_assert_eq!(
                report.first_broken,
                Some(Inconsistency { index, field: Some(EntryField::Amount) })
            );
        } else {
            prop_assert_eq!(ledger.balance().unwrap(), report.balance);
        }
    }
}
