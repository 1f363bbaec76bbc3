//! # Vault State Reducer
//!
//! One pure function decides what a deposit or withdrawal does to the
//! wallet/vault pair. It borrows the current snapshot, validates the intent,
//! and either returns a brand-new snapshot or a [`VaultError`]. The inputs
//! are never mutated, so a failed transaction leaves the caller's state
//! exactly as it was.
//!
//! ## Rules
//!
//! - Amount must be non-zero (negative input never gets this far, see
//!   [`super::amount::parse_amount`]).
//! - Deposit: wallet → vault, points += amount × multiplier, new tiers
//!   minted, lock/APY switched if a non-`NONE` lock was selected.
//! - Withdraw: vault → wallet. Points, tiers, lock and APY untouched.
//!
//! Any processing delay is the caller's business. The reducer answers
//! immediately.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::BPS_DENOMINATOR;

use super::account::{VaultAccount, WalletAccount};
use super::amount::parse_amount;
use super::error::VaultError;
use super::lock::LockPeriod;
use super::tier::{newly_crossed, TierId};

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

/// Which way the money moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Wallet → vault.
    Deposit,
    /// Vault → wallet.
    Withdraw,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Deposit => "DEPOSIT",
            Direction::Withdraw => "WITHDRAW",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to move money. Ephemeral: built by the caller, consumed by
/// [`apply_transaction`], never stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionIntent {
    pub direction: Direction,
    /// Amount in micro-USDC.
    pub amount: u64,
    /// Only consulted for deposits.
    #[serde(default)]
    pub lock_selection: Option<LockPeriod>,
}

impl TransactionIntent {
    /// A deposit that keeps whatever lock the vault already has.
    pub fn deposit(amount: u64) -> Self {
        Self {
            direction: Direction::Deposit,
            amount,
            lock_selection: None,
        }
    }

    /// A deposit with an explicit lock selection.
    pub fn deposit_with_lock(amount: u64, lock: LockPeriod) -> Self {
        Self {
            direction: Direction::Deposit,
            amount,
            lock_selection: Some(lock),
        }
    }

    pub fn withdraw(amount: u64) -> Self {
        Self {
            direction: Direction::Withdraw,
            amount,
            lock_selection: None,
        }
    }

    /// Builds an intent from user-entered text.
    ///
    /// # Errors
    ///
    /// Whatever [`parse_amount`] rejects.
    pub fn from_input(
        direction: Direction,
        amount: &str,
        lock_selection: Option<LockPeriod>,
    ) -> Result<Self, VaultError> {
        Ok(Self {
            direction,
            amount: parse_amount(amount)?,
            lock_selection,
        })
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A wallet/vault pair at one point in time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultSnapshot {
    pub wallet: WalletAccount,
    pub vault: VaultAccount,
}

impl VaultSnapshot {
    pub fn new(wallet: WalletAccount, vault: VaultAccount) -> Self {
        Self { wallet, vault }
    }

    /// Liquid plus vaulted funds. Conserved by every transaction.
    pub fn total_funds(&self) -> u128 {
        u128::from(self.wallet.liquid_balance) + u128::from(self.vault.vault_balance)
    }
}

/// The next snapshot plus what changed, for receipts and logs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionOutcome {
    pub snapshot: VaultSnapshot,
    /// Micro-points added by this transaction (always 0 for withdrawals).
    pub points_awarded: u64,
    /// Tiers minted by this transaction, in threshold order.
    pub tiers_unlocked: Vec<TierId>,
}

// ---------------------------------------------------------------------------
// Reducer
// ---------------------------------------------------------------------------

/// Applies `intent` to the snapshot, stamping new badges with the current
/// time.
///
/// # Errors
///
/// - [`VaultError::InvalidAmount`] if `intent.amount` is zero.
/// - [`VaultError::InsufficientLiquidFunds`] if a deposit exceeds the wallet.
/// - [`VaultError::InsufficientVaultFunds`] if a withdrawal exceeds the vault.
/// - [`VaultError::Overflow`] if a balance or point total would overflow.
pub fn apply_transaction(
    wallet: &WalletAccount,
    vault: &VaultAccount,
    intent: &TransactionIntent,
) -> Result<TransactionOutcome, VaultError> {
    apply_transaction_at(wallet, vault, intent, Utc::now())
}

/// Same as [`apply_transaction`] with an explicit clock, so that replaying
/// the same inputs yields identical output.
pub fn apply_transaction_at(
    wallet: &WalletAccount,
    vault: &VaultAccount,
    intent: &TransactionIntent,
    now: DateTime<Utc>,
) -> Result<TransactionOutcome, VaultError> {
    if intent.amount == 0 {
        return Err(VaultError::InvalidAmount(
            "amount must be greater than zero".into(),
        ));
    }

    match intent.direction {
        Direction::Deposit => deposit(wallet, vault, intent, now),
        Direction::Withdraw => withdraw(wallet, vault, intent.amount),
    }
}

fn deposit(
    wallet: &WalletAccount,
    vault: &VaultAccount,
    intent: &TransactionIntent,
    now: DateTime<Utc>,
) -> Result<TransactionOutcome, VaultError> {
    let amount = intent.amount;
    if amount > wallet.liquid_balance {
        return Err(VaultError::InsufficientLiquidFunds {
            available: wallet.liquid_balance,
            requested: amount,
        });
    }

    let vault_balance = vault
        .vault_balance
        .checked_add(amount)
        .ok_or(VaultError::Overflow("vault balance"))?;

    let effective_lock = intent.lock_selection.unwrap_or(vault.lock_period);
    let points_awarded = award_points(amount, effective_lock)?;
    let points = vault
        .points
        .checked_add(points_awarded)
        .ok_or(VaultError::Overflow("points"))?;

    let crossed = newly_crossed(vault_balance, &vault.unlocked_tiers);
    let tiers_unlocked: Vec<TierId> = crossed.iter().map(|spec| spec.tier).collect();

    let mut next_vault = vault.clone();
    next_vault.vault_balance = vault_balance;
    next_vault.points = points;
    next_vault
        .unlocked_tiers
        .extend(crossed.iter().map(|spec| spec.badge(now)));

    if let Some(lock) = intent.lock_selection.filter(|l| *l != LockPeriod::None) {
        next_vault.lock_period = lock;
        next_vault.apy_bps = lock.apy_bps();
    }

    let mut next_wallet = wallet.clone();
    next_wallet.liquid_balance = wallet.liquid_balance - amount;

    Ok(TransactionOutcome {
        snapshot: VaultSnapshot::new(next_wallet, next_vault),
        points_awarded,
        tiers_unlocked,
    })
}

fn withdraw(
    wallet: &WalletAccount,
    vault: &VaultAccount,
    amount: u64,
) -> Result<TransactionOutcome, VaultError> {
    if amount > vault.vault_balance {
        return Err(VaultError::InsufficientVaultFunds {
            available: vault.vault_balance,
            requested: amount,
        });
    }

    let liquid_balance = wallet
        .liquid_balance
        .checked_add(amount)
        .ok_or(VaultError::Overflow("liquid balance"))?;

    let mut next_vault = vault.clone();
    next_vault.vault_balance = vault.vault_balance - amount;

    let mut next_wallet = wallet.clone();
    next_wallet.liquid_balance = liquid_balance;

    Ok(TransactionOutcome {
        snapshot: VaultSnapshot::new(next_wallet, next_vault),
        points_awarded: 0,
        tiers_unlocked: Vec::new(),
    })
}

/// `amount × multiplier`, in micro-points. Rounds down.
fn award_points(amount: u64, lock: LockPeriod) -> Result<u64, VaultError> {
    let scaled = u128::from(amount) * u128::from(lock.multiplier_bps()) / u128::from(BPS_DENOMINATOR);
    u64::try_from(scaled).map_err(|_| VaultError::Overflow("points"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::amount::units;

    fn funded(liquid: u64) -> (WalletAccount, VaultAccount) {
        (
            WalletAccount::connected("0xtest", units(liquid)),
            VaultAccount::new(),
        )
    }

    #[test]
    fn deposit_moves_funds_into_vault() {
        let (w, v) = funded(100);
        let out = apply_transaction(&w, &v, &TransactionIntent::deposit(units(30))).unwrap();
        assert_eq!(out.snapshot.wallet.liquid_balance, units(70));
        assert_eq!(out.snapshot.vault.vault_balance, units(30));
        assert_eq!(out.points_awarded, units(30));
    }

    #[test]
    fn deposit_without_selection_uses_current_lock_multiplier() {
        let (w, mut v) = funded(100);
        v.lock_period = LockPeriod::NinetyDays;
        v.apy_bps = LockPeriod::NinetyDays.apy_bps();
        let out = apply_transaction(&w, &v, &TransactionIntent::deposit(units(10))).unwrap();
        assert_eq!(out.points_awarded, units(20));
        assert_eq!(out.snapshot.vault.lock_period, LockPeriod::NinetyDays);
    }

    #[test]
    fn explicit_none_selection_keeps_lock_but_earns_base_rate() {
        let (w, mut v) = funded(100);
        v.lock_period = LockPeriod::OneYear;
        v.apy_bps = LockPeriod::OneYear.apy_bps();
        let intent = TransactionIntent::deposit_with_lock(units(10), LockPeriod::None);
        let out = apply_transaction(&w, &v, &intent).unwrap();
        assert_eq!(out.points_awarded, units(10));
        assert_eq!(out.snapshot.vault.lock_period, LockPeriod::OneYear);
        assert_eq!(out.snapshot.vault.apy_bps, 1_200);
    }

    #[test]
    fn thirty_day_lock_awards_one_and_a_half_points() {
        let (w, v) = funded(100);
        let intent = TransactionIntent::deposit_with_lock(units(1), LockPeriod::ThirtyDays);
        let out = apply_transaction(&w, &v, &intent).unwrap();
        assert_eq!(out.points_awarded, 1_500_000);
        assert_eq!(out.snapshot.vault.apy_bps, 620);
    }

    #[test]
    fn zero_amount_rejected() {
        let (w, v) = funded(100);
        for intent in [TransactionIntent::deposit(0), TransactionIntent::withdraw(0)] {
            assert!(matches!(
                apply_transaction(&w, &v, &intent),
                Err(VaultError::InvalidAmount(_))
            ));
        }
    }

    #[test]
    fn deposit_exactly_liquid_balance_allowed() {
        let (w, v) = funded(100);
        let out = apply_transaction(&w, &v, &TransactionIntent::deposit(units(100))).unwrap();
        assert_eq!(out.snapshot.wallet.liquid_balance, 0);
    }

    #[test]
    fn withdraw_carries_rewards_unchanged() {
        let (w, v) = funded(300);
        let after_deposit = apply_transaction(
            &w,
            &v,
            &TransactionIntent::deposit_with_lock(units(250), LockPeriod::ThirtyDays),
        )
        .unwrap()
        .snapshot;

        let out = apply_transaction(
            &after_deposit.wallet,
            &after_deposit.vault,
            &TransactionIntent::withdraw(units(250)),
        )
        .unwrap();

        let vault = &out.snapshot.vault;
        assert_eq!(vault.vault_balance, 0);
        assert_eq!(vault.points, after_deposit.vault.points);
        assert_eq!(vault.unlocked_tiers, after_deposit.vault.unlocked_tiers);
        assert_eq!(vault.lock_period, LockPeriod::ThirtyDays);
        assert_eq!(out.points_awarded, 0);
        assert!(out.tiers_unlocked.is_empty());
    }

    #[test]
    fn badges_are_stamped_with_supplied_clock() {
        let (w, v) = funded(100);
        let now = DateTime::parse_from_rfc3339("2026-01-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let out =
            apply_transaction_at(&w, &v, &TransactionIntent::deposit(units(60)), now).unwrap();
        assert_eq!(out.snapshot.vault.unlocked_tiers[0].date_earned, now);
    }

    #[test]
    fn earlier_badge_dates_survive_later_deposits() {
        let (w, v) = funded(1_000);
        let first = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let later = DateTime::parse_from_rfc3339("2026-02-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let s1 = apply_transaction_at(&w, &v, &TransactionIntent::deposit(units(60)), first)
            .unwrap()
            .snapshot;
        let s2 = apply_transaction_at(
            &s1.wallet,
            &s1.vault,
            &TransactionIntent::deposit(units(200)),
            later,
        )
        .unwrap()
        .snapshot;

        assert_eq!(s2.vault.tier_ids(), vec![TierId::Bronze, TierId::Silver]);
        assert_eq!(s2.vault.unlocked_tiers[0].date_earned, first);
        assert_eq!(s2.vault.unlocked_tiers[1].date_earned, later);
    }

    #[test]
    fn vault_overflow_reported() {
        let w = WalletAccount::connected("0xtest", u64::MAX);
        let mut v = VaultAccount::new();
        v.vault_balance = u64::MAX;
        assert!(matches!(
            apply_transaction(&w, &v, &TransactionIntent::deposit(1)),
            Err(VaultError::Overflow(_))
        ));
    }

    #[test]
    fn intent_from_input_parses_amount() {
        let intent = TransactionIntent::from_input(Direction::Deposit, "12.5", None).unwrap();
        assert_eq!(intent.amount, 12_500_000);
        assert!(TransactionIntent::from_input(Direction::Withdraw, "-1", None).is_err());
    }

    #[test]
    fn intent_deserializes_without_lock() {
        let intent: TransactionIntent =
            serde_json::from_str(r#"{"direction":"WITHDRAW","amount":5}"#).unwrap();
        assert_eq!(intent, TransactionIntent::withdraw(5));
    }
}
