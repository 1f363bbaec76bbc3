//! # Yield Projection & Tier Progress
//!
//! Read-only views derived from a [`VaultAccount`]: the month-by-month
//! simple-interest projection drawn on the dashboard chart, and how far the
//! vault is from its next badge. Nothing here feeds back into state.

use serde::{Deserialize, Serialize};

use crate::config::{BPS_DENOMINATOR, PROJECTION_MONTHS};

use super::account::VaultAccount;
use super::tier::{next_locked_tier, TierId};

/// Projected vault value `month_offset` months from now.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    pub month_offset: u32,
    /// Micro-USDC.
    pub value: u64,
}

/// `balance × (1 + apy/12 × i)` for `i` in `0..months`. Simple interest, no
/// compounding, matching what the dashboard has always shown.
pub fn project(balance: u64, apy_bps: u32, months: usize) -> Vec<ProjectionPoint> {
    let monthly_denominator = u128::from(BPS_DENOMINATOR) * 12;
    (0..months as u32)
        .map(|i| {
            let interest =
                u128::from(balance) * u128::from(apy_bps) * u128::from(i) / monthly_denominator;
            let value = u128::from(balance) + interest;
            ProjectionPoint {
                month_offset: i,
                value: u64::try_from(value).unwrap_or(u64::MAX),
            }
        })
        .collect()
}

/// The default six-month projection for a vault at its current APY.
pub fn project_vault(vault: &VaultAccount) -> Vec<ProjectionPoint> {
    project(vault.vault_balance, vault.apy_bps, PROJECTION_MONTHS)
}

/// Yield one full year at `apy_bps` would add to `balance`, in micro-USDC.
pub fn annual_yield(balance: u64, apy_bps: u32) -> u64 {
    let y = u128::from(balance) * u128::from(apy_bps) / u128::from(BPS_DENOMINATOR);
    u64::try_from(y).unwrap_or(u64::MAX)
}

/// Distance to the next locked badge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierProgress {
    pub next_tier: TierId,
    pub threshold: u64,
    /// How much more vault balance is needed. Zero means the balance
    /// already qualifies and the next deposit mints it, which only happens
    /// for vaults restored from a snapshot.
    pub remaining: u64,
}

/// `None` once every catalog tier is unlocked.
pub fn tier_progress(vault: &VaultAccount) -> Option<TierProgress> {
    next_locked_tier(&vault.unlocked_tiers).map(|spec| TierProgress {
        next_tier: spec.tier,
        threshold: spec.threshold,
        remaining: spec.threshold.saturating_sub(vault.vault_balance),
    })
}
