//! # Tier Catalog
//!
//! Reward tiers are achievements: the first time the vault balance reaches a
//! threshold, the matching badge is minted into the vault and stays there
//! forever. Dropping back below the threshold later revokes nothing.
//!
//! The catalog is static and ordered by threshold. Evaluation is a set of
//! independent `threshold <= balance` checks, so a single large deposit can
//! unlock every tier at once.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{BRONZE_THRESHOLD, GOLD_THRESHOLD, SILVER_THRESHOLD};

// ---------------------------------------------------------------------------
// TierId
// ---------------------------------------------------------------------------

/// Identifier for a reward tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TierId {
    Bronze,
    Silver,
    Gold,
    /// Reserved for a future threshold. Never unlocked by the active catalog.
    Platinum,
}

impl TierId {
    /// Wire/display key, e.g. `"GOLD"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            TierId::Bronze => "BRONZE",
            TierId::Silver => "SILVER",
            TierId::Gold => "GOLD",
            TierId::Platinum => "PLATINUM",
        }
    }
}

impl fmt::Display for TierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TierSpec
// ---------------------------------------------------------------------------

/// Static catalog entry: threshold plus the display metadata copied onto
/// every badge minted from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TierSpec {
    pub tier: TierId,
    /// Minimum vault balance (micro-USDC) that unlocks this tier.
    pub threshold: u64,
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub image_ref: &'static str,
}

impl TierSpec {
    /// Mints a badge for this tier, stamped with `earned_at`.
    pub fn badge(&self, earned_at: DateTime<Utc>) -> TierBadge {
        TierBadge {
            tier: self.tier,
            threshold: self.threshold,
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            image_ref: self.image_ref.to_string(),
            date_earned: earned_at,
        }
    }
}

/// Active tiers, ordered by threshold.
pub const TIER_CATALOG: [TierSpec; 3] = [
    TierSpec {
        tier: TierId::Bronze,
        threshold: BRONZE_THRESHOLD,
        id: "nft-bronze",
        name: "Bronze Pass",
        description: "Entry level transit access",
        image_ref: "https://images.unsplash.com/photo-1610375461246-83c485099f10?w=400&q=80",
    },
    TierSpec {
        tier: TierId::Silver,
        threshold: SILVER_THRESHOLD,
        id: "nft-silver",
        name: "Silver Commuter",
        description: "Pro traveler status",
        image_ref: "https://images.unsplash.com/photo-1610375461369-d612b120f6ca?w=400&q=80",
    },
    TierSpec {
        tier: TierId::Gold,
        threshold: GOLD_THRESHOLD,
        id: "nft-gold",
        name: "Gold Class",
        description: "Elite transit privileges",
        image_ref: "https://images.unsplash.com/photo-1610375461257-d72dd254859a?w=400&q=80",
    },
];

/// Looks up the active catalog entry for a tier.
#[cfg(test)]
pub(crate) fn spec_for(tier: TierId) -> Option<&'static TierSpec> {
    TIER_CATALOG.iter().find(|spec| spec.tier == tier)
}

// ---------------------------------------------------------------------------
// TierBadge
// ---------------------------------------------------------------------------

/// A tier that has been unlocked in a specific vault.
///
/// `date_earned` is set when the badge is minted and never touched again.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierBadge {
    pub tier: TierId,
    pub threshold: u64,
    pub id: String,
    pub name: String,
    pub description: String,
    pub image_ref: String,
    pub date_earned: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Returns the catalog tiers that `balance` qualifies for but that are not
/// yet in `unlocked`, in threshold order.
pub fn newly_crossed(balance: u64, unlocked: &[TierBadge]) -> Vec<&'static TierSpec> {
    TIER_CATALOG
        .iter()
        .filter(|spec| spec.threshold <= balance)
        .filter(|spec| !unlocked.iter().any(|badge| badge.tier == spec.tier))
        .collect()
}

/// The lowest catalog tier not yet unlocked, or `None` once all are earned.
pub fn next_locked_tier(unlocked: &[TierBadge]) -> Option<&'static TierSpec> {
    TIER_CATALOG
        .iter()
        .find(|spec| !unlocked.iter().any(|badge| badge.tier == spec.tier))
}
