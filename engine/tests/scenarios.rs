//! Integration tests for the vault rule set.
//!
//! The first half walks through concrete rider stories against the public
//! reducer API. The second half sweeps a grid of balances and amounts to
//! check the properties every transaction must keep: funds are conserved,
//! badges and points never shrink, and a rejected transaction changes
//! nothing at all.

use chrono::{TimeZone, Utc};

use arc_vault::vault::{
    apply_transaction, apply_transaction_at, units, Direction, LockPeriod, TierId,
    TransactionIntent, VaultAccount, VaultError, VaultSnapshot, WalletAccount,
};
use arc_vault::{SessionError, VaultSession};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn start(liquid: u64) -> VaultSnapshot {
    VaultSnapshot::new(
        WalletAccount::connected("0x71C7656EC7ab88b098defB751B7401B5f6d89A23", units(liquid)),
        VaultAccount::new(),
    )
}

fn apply(state: &VaultSnapshot, intent: TransactionIntent) -> Result<VaultSnapshot, VaultError> {
    apply_transaction(&state.wallet, &state.vault, &intent).map(|o| o.snapshot)
}

// ---------------------------------------------------------------------------
// Rider stories
// ---------------------------------------------------------------------------

#[test]
fn first_deposit_unlocks_bronze() {
    let s1 = apply(&start(100), TransactionIntent::deposit(units(50))).unwrap();

    assert_eq!(s1.vault.vault_balance, units(50));
    assert_eq!(s1.wallet.liquid_balance, units(50));
    assert_eq!(s1.vault.points, units(50));
    assert_eq!(s1.vault.tier_ids(), vec![TierId::Bronze]);
}

#[test]
fn overdraft_deposit_is_rejected_without_mutation() {
    let s1 = apply(&start(100), TransactionIntent::deposit(units(50))).unwrap();

    let err = apply(
        &s1,
        TransactionIntent::deposit_with_lock(units(150), LockPeriod::NinetyDays),
    )
    .unwrap_err();

    assert_eq!(
        err,
        VaultError::InsufficientLiquidFunds {
            available: units(50),
            requested: units(150),
        }
    );
    // s1 was borrowed, never moved; it is still the current state.
    assert_eq!(s1.vault.lock_period, LockPeriod::None);
    assert_eq!(s1.vault.vault_balance, units(50));
}

#[test]
fn large_deposit_unlocks_every_tier_at_once() {
    let s3 = apply(&start(1_000), TransactionIntent::deposit(units(600))).unwrap();

    assert_eq!(s3.vault.vault_balance, units(600));
    assert_eq!(s3.vault.points, units(600));
    assert_eq!(
        s3.vault.tier_ids(),
        vec![TierId::Bronze, TierId::Silver, TierId::Gold]
    );
    assert_eq!(s3.vault.apy_bps, 450);
}

#[test]
fn over_withdrawal_is_rejected() {
    let s3 = apply(&start(1_000), TransactionIntent::deposit(units(600))).unwrap();
    let err = apply(&s3, TransactionIntent::withdraw(units(700))).unwrap_err();

    assert_eq!(
        err,
        VaultError::InsufficientVaultFunds {
            available: units(600),
            requested: units(700),
        }
    );
    assert_eq!(err.user_message(), "Insufficient Vault Funds");
}

#[test]
fn withdrawal_keeps_badges_and_points() {
    let s3 = apply(&start(1_000), TransactionIntent::deposit(units(600))).unwrap();
    let s5 = apply(&s3, TransactionIntent::withdraw(units(100))).unwrap();

    assert_eq!(s5.vault.vault_balance, units(500));
    assert_eq!(s5.wallet.liquid_balance, units(500));
    assert_eq!(s5.vault.points, units(600));
    assert_eq!(s5.vault.unlocked_tiers, s3.vault.unlocked_tiers);

    // Falling below every threshold still revokes nothing.
    let s6 = apply(&s5, TransactionIntent::withdraw(units(500))).unwrap();
    assert_eq!(s6.vault.vault_balance, 0);
    assert_eq!(s6.vault.tier_ids().len(), 3);
}

#[test]
fn one_year_lock_triples_points_and_sets_apy() {
    let s1 = apply(&start(100), TransactionIntent::deposit(units(50))).unwrap();
    let s = apply(
        &s1,
        TransactionIntent::deposit_with_lock(units(10), LockPeriod::OneYear),
    )
    .unwrap();

    assert_eq!(s.vault.points, units(50) + units(30));
    assert_eq!(s.vault.apy_bps, 1_200);
    assert_eq!(s.vault.lock_period, LockPeriod::OneYear);
}

#[test]
fn none_selection_keeps_existing_lock() {
    let locked = apply(
        &start(100),
        TransactionIntent::deposit_with_lock(units(10), LockPeriod::ThirtyDays),
    )
    .unwrap();
    let s = apply(
        &locked,
        TransactionIntent::deposit_with_lock(units(10), LockPeriod::None),
    )
    .unwrap();

    assert_eq!(s.vault.lock_period, LockPeriod::ThirtyDays);
    assert_eq!(s.vault.apy_bps, 620);
    // 15 from the locked deposit, 10 at 1x for the second.
    assert_eq!(s.vault.points, units(25));
}

#[test]
fn parsed_input_flows_through_reducer() {
    let intent = TransactionIntent::from_input(Direction::Deposit, "50.25", None).unwrap();
    let s = apply(&start(100), intent).unwrap();
    assert_eq!(s.vault.vault_balance, 50_250_000);
    assert_eq!(s.vault.points, 50_250_000);

    let err = TransactionIntent::from_input(Direction::Deposit, "-5", None).unwrap_err();
    assert!(matches!(err, VaultError::InvalidAmount(_)));
}

#[test]
fn replay_with_fixed_clock_is_deterministic() {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
    let s = start(1_000);
    let intent = TransactionIntent::deposit_with_lock(units(250), LockPeriod::NinetyDays);

    let a = apply_transaction_at(&s.wallet, &s.vault, &intent, now).unwrap();
    let b = apply_transaction_at(&s.wallet, &s.vault, &intent, now).unwrap();
    assert_eq!(a, b);
    assert!(a
        .snapshot
        .vault
        .unlocked_tiers
        .iter()
        .all(|badge| badge.date_earned == now));
}

#[test]
fn session_replays_the_stories() {
    let mut session = VaultSession::default();
    session.connect("0xrider", units(1_000)).unwrap();

    session.execute(TransactionIntent::deposit(units(600))).unwrap();
    let err = session
        .execute(TransactionIntent::withdraw(units(700)))
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Vault(VaultError::InsufficientVaultFunds { .. })
    ));
    session.execute(TransactionIntent::withdraw(units(100))).unwrap();

    assert_eq!(session.vault().vault_balance, units(500));
    assert_eq!(session.receipts().len(), 2);
    assert_eq!(
        session.receipts()[0].tiers_unlocked,
        vec![TierId::Bronze, TierId::Silver, TierId::Gold]
    );
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

const BALANCES: [u64; 7] = [0, 1, 49_999_999, 50_000_000, 199_000_000, 500_000_000, 2_000_000_000];
const AMOUNTS: [u64; 7] = [0, 1, 10_000_000, 50_000_000, 150_000_000, 600_000_000, 3_000_000_000];

fn all_intents(amount: u64) -> Vec<TransactionIntent> {
    let mut intents = vec![TransactionIntent::withdraw(amount), TransactionIntent::deposit(amount)];
    for lock in LockPeriod::ALL {
        intents.push(TransactionIntent::deposit_with_lock(amount, lock));
    }
    intents
}

/// A vault that has already seen some activity, so the grid also covers
/// states with badges and points.
fn seasoned(liquid: u64, vaulted: u64) -> VaultSnapshot {
    let s = VaultSnapshot::new(
        WalletAccount::connected("0xgrid", liquid.saturating_add(vaulted)),
        VaultAccount::new(),
    );
    if vaulted == 0 {
        return s;
    }
    apply(&s, TransactionIntent::deposit(vaulted)).unwrap()
}

#[test]
fn every_transaction_keeps_the_invariants() {
    for &liquid in &BALANCES {
        for &vaulted in &BALANCES {
            let before = seasoned(liquid, vaulted);
            for &amount in &AMOUNTS {
                for intent in all_intents(amount) {
                    match apply(&before, intent.clone()) {
                        Ok(after) => {
                            assert_eq!(after.total_funds(), before.total_funds(), "{intent:?}");
                            assert!(after.vault.points >= before.vault.points);
                            for badge in &before.vault.unlocked_tiers {
                                assert!(after.vault.unlocked_tiers.contains(badge));
                            }
                        }
                        Err(err) => {
                            let expected = if amount == 0 {
                                matches!(err, VaultError::InvalidAmount(_))
                            } else if intent.direction == Direction::Deposit {
                                amount > before.wallet.liquid_balance
                                    && matches!(err, VaultError::InsufficientLiquidFunds { .. })
                            } else {
                                amount > before.vault.vault_balance
                                    && matches!(err, VaultError::InsufficientVaultFunds { .. })
                            };
                            assert!(expected, "unexpected {err:?} for {intent:?}");
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn zero_amount_never_mutates() {
    let before = seasoned(units(300), units(250));
    for intent in all_intents(0) {
        let err = apply(&before, intent).unwrap_err();
        assert!(matches!(err, VaultError::InvalidAmount(_)));
    }
    // `before` was only ever borrowed.
    assert_eq!(before.vault.vault_balance, units(250));
}

#[test]
fn badges_and_points_only_grow_over_a_sequence() {
    let mut state = start(5_000);
    let steps = [
        TransactionIntent::deposit(units(40)),
        TransactionIntent::deposit_with_lock(units(20), LockPeriod::ThirtyDays),
        TransactionIntent::withdraw(units(55)),
        TransactionIntent::deposit_with_lock(units(300), LockPeriod::OneYear),
        TransactionIntent::withdraw(units(305)),
        TransactionIntent::deposit(units(600)),
        TransactionIntent::withdraw(units(600)),
    ];

    let mut last_points = 0;
    let mut last_tiers = 0;
    for step in steps {
        state = apply(&state, step).unwrap();
        assert!(state.vault.points >= last_points);
        assert!(state.vault.unlocked_tiers.len() >= last_tiers);
        last_points = state.vault.points;
        last_tiers = state.vault.unlocked_tiers.len();
    }
    assert_eq!(state.vault.vault_balance, 0);
    assert_eq!(last_tiers, 3);
}
