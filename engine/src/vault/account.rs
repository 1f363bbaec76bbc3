//! # Wallet & Vault Accounts
//!
//! Two records make up a user's money in Transit Arc: the liquid
//! [`WalletAccount`] supplied by the external wallet provider, and the
//! yield-bearing [`VaultAccount`] the engine manages. Both are plain values;
//! the reducer takes snapshots of them and hands back new ones.

use serde::{Deserialize, Serialize};

use crate::config::{DEMO_VAULT_POINTS, DEMO_VAULT_YIELD};

use super::lock::LockPeriod;
use super::tier::{TierBadge, TierId};

// ---------------------------------------------------------------------------
// WalletAccount
// ---------------------------------------------------------------------------

/// Funds outside the vault, as reported by the wallet provider.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletAccount {
    pub connected: bool,
    pub address: Option<String>,
    /// Liquid balance in micro-USDC.
    pub liquid_balance: u64,
}

impl WalletAccount {
    /// A disconnected wallet with nothing in it.
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// A connected wallet. The provider supplies both values.
    pub fn connected(address: impl Into<String>, liquid_balance: u64) -> Self {
        Self {
            connected: true,
            address: Some(address.into()),
            liquid_balance,
        }
    }

    /// `0x71C...9A23` style abbreviation for display. Short addresses are
    /// returned as-is.
    pub fn short_address(&self) -> Option<String> {
        let address = self.address.as_deref()?;
        let chars: Vec<char> = address.chars().collect();
        if chars.len() <= 10 {
            return Some(address.to_string());
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        Some(format!("{head}...{tail}"))
    }
}

// ---------------------------------------------------------------------------
// VaultAccount
// ---------------------------------------------------------------------------

/// Funds inside the vault plus everything earned by keeping them there.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultAccount {
    /// Deposited balance in micro-USDC.
    pub vault_balance: u64,
    /// Display-only yield figure. Reported from outside; the reducer
    /// carries it through untouched.
    pub yield_earned: u64,
    /// Loyalty points in micro-points. Never decreases.
    pub points: u64,
    /// Current APY in basis points, set by the active lock period.
    pub apy_bps: u32,
    pub lock_period: LockPeriod,
    /// Earned badges. Only ever grows, one entry per tier.
    pub unlocked_tiers: Vec<TierBadge>,
}

impl VaultAccount {
    /// An empty vault at the no-lock rate.
    pub fn new() -> Self {
        Self {
            vault_balance: 0,
            yield_earned: 0,
            points: 0,
            apy_bps: LockPeriod::None.apy_bps(),
            lock_period: LockPeriod::None,
            unlocked_tiers: Vec::new(),
        }
    }

    /// The vault a fresh demo session starts with: 12.45 USDC of reported
    /// yield and 120 points, nothing deposited.
    pub fn demo() -> Self {
        Self {
            yield_earned: DEMO_VAULT_YIELD,
            points: DEMO_VAULT_POINTS,
            ..Self::new()
        }
    }

    /// Tier ids currently unlocked, in the order they were earned.
    pub fn tier_ids(&self) -> Vec<TierId> {
        self.unlocked_tiers.iter().map(|badge| badge.tier).collect()
    }
}

impl Default for VaultAccount {
    fn default() -> Self {
        Self::new()
    }
}
