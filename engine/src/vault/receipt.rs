//! # Transaction Receipts
//!
//! Every committed transaction leaves a [`TransactionReceipt`] in the
//! session history. The receipt's [`digest`](TransactionReceipt::digest) is
//! the simulated transaction hash shown next to the confirmation: a BLAKE3
//! hash over the receipt's canonical fields, so two receipts only share a
//! digest if they describe the same movement at the same instant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::lock::LockPeriod;
use super::reducer::{Direction, TransactionIntent, TransactionOutcome};
use super::tier::TierId;

/// Record of one committed deposit or withdrawal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub id: Uuid,
    pub direction: Direction,
    /// Micro-USDC moved.
    pub amount: u64,
    /// Micro-points credited (0 for withdrawals).
    pub points_awarded: u64,
    pub tiers_unlocked: Vec<TierId>,
    /// Lock period in effect after the transaction.
    pub lock_period: LockPeriod,
    pub liquid_balance_after: u64,
    pub vault_balance_after: u64,
    pub committed_at: DateTime<Utc>,
}

impl TransactionReceipt {
    /// Builds the receipt for an applied intent.
    pub fn new(
        intent: &TransactionIntent,
        outcome: &TransactionOutcome,
        committed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            direction: intent.direction,
            amount: intent.amount,
            points_awarded: outcome.points_awarded,
            tiers_unlocked: outcome.tiers_unlocked.clone(),
            lock_period: outcome.snapshot.vault.lock_period,
            liquid_balance_after: outcome.snapshot.wallet.liquid_balance,
            vault_balance_after: outcome.snapshot.vault.vault_balance,
            committed_at,
        }
    }

    /// Hex-encoded BLAKE3 digest of the canonical receipt fields.
    ///
    /// Field order: id, direction, amount, points, lock, liquid after,
    /// vault after, commit time (unix millis). Integers are little-endian.
    /// Unlocked tiers are implied by the balances and left out.
    pub fn digest(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.id.as_bytes());
        hasher.update(self.direction.as_str().as_bytes());
        hasher.update(&self.amount.to_le_bytes());
        hasher.update(&self.points_awarded.to_le_bytes());
        hasher.update(self.lock_period.key().as_bytes());
        hasher.update(&self.liquid_balance_after.to_le_bytes());
        hasher.update(&self.vault_balance_after.to_le_bytes());
        hasher.update(&self.committed_at.timestamp_millis().to_le_bytes());
        format!("0x{}", hex::encode(hasher.finalize().as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::account::{VaultAccount, WalletAccount};
    use crate::vault::amount::units;
    use crate::vault::reducer::apply_transaction;

    fn sample() -> TransactionReceipt {
        let wallet = WalletAccount::connected("0xtest", units(100));
        let vault = VaultAccount::new();
        let intent = TransactionIntent::deposit_with_lock(units(60), LockPeriod::NinetyDays);
        let outcome = apply_transaction(&wallet, &vault, &intent).unwrap();
        TransactionReceipt::new(&intent, &outcome, Utc::now())
    }

    #[test]
    fn receipt_reflects_outcome() {
        let r = sample();
        assert_eq!(r.direction, Direction::Deposit);
        assert_eq!(r.amount, units(60));
        assert_eq!(r.points_awarded, units(120));
        assert_eq!(r.tiers_unlocked, vec![TierId::Bronze]);
        assert_eq!(r.lock_period, LockPeriod::NinetyDays);
        assert_eq!(r.liquid_balance_after, units(40));
        assert_eq!(r.vault_balance_after, units(60));
    }

    #[test]
    fn digest_is_stable_and_hex() {
        let r = sample();
        let d = r.digest();
        assert_eq!(d, r.digest());
        assert!(d.starts_with("0x"));
        assert_eq!(d.len(), 2 + 64);
    }

    #[test]
    fn distinct_receipts_have_distinct_digests() {
        assert_ne!(sample().digest(), sample().digest());
    }

    #[test]
    fn receipt_serialization_roundtrip() {
        let r = sample();
        let json = serde_json::to_string(&r).expect("serialize");
        let back: TransactionReceipt = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, r);
        assert_eq!(back.digest(), r.digest());
    }
}
