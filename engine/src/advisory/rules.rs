//! Local, deterministic advisor. Useful offline and as the node's default.

use async_trait::async_trait;

use crate::vault::amount::{format_amount, format_points};
use crate::vault::tier::TIER_CATALOG;

use super::{AdvisoryError, InsightAdvisor};

/// Picks a tip from the vault balance and point total.
///
/// Tier hints are derived from the balance alone (the advisor never sees
/// the badge list), so a rider who withdrew below a threshold is nudged
/// toward a badge they may already hold. Good enough for a tip line.
#[derive(Clone, Debug, Default)]
pub struct RuleBasedAdvisor;

impl RuleBasedAdvisor {
    pub fn new() -> Self {
        Self
    }

    /// The synchronous core, exposed for tests and the CLI.
    pub fn tip(&self, vault_balance: u64, points: u64) -> String {
        if vault_balance == 0 {
            let first = &TIER_CATALOG[0];
            return format!(
                "Deposit ${} to unlock your first NFT, the {}!",
                format_amount(first.threshold),
                first.name
            );
        }

        match TIER_CATALOG
            .iter()
            .find(|spec| spec.threshold > vault_balance)
        {
            Some(next) => format!(
                "You're {} USDC away from {}. A 1 year lock triples the points on your next deposit.",
                format_amount(next.threshold - vault_balance),
                next.name
            ),
            None => format!(
                "Gold Class holders ride 10% cheaper. Your {} points keep growing with every locked deposit.",
                format_points(points)
            ),
        }
    }
}

#[async_trait]
impl InsightAdvisor for RuleBasedAdvisor {
    async fn fetch_advisory(&self, vault_balance: u64, points: u64) -> Result<String, AdvisoryError> {
        Ok(self.tip(vault_balance, points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::amount::units;

    #[test]
    fn empty_vault_points_at_bronze() {
        let tip = RuleBasedAdvisor::new().tip(0, 0);
        assert!(tip.contains("50.00"));
        assert!(tip.contains("Bronze Pass"));
    }

    #[test]
    fn mid_vault_counts_down_to_next_tier() {
        let tip = RuleBasedAdvisor::new().tip(units(120), 0);
        assert!(tip.contains("80.00 USDC away from Silver Commuter"));
    }

    #[test]
    fn full_vault_mentions_points() {
        let tip = RuleBasedAdvisor::new().tip(units(600), units(750));
        assert!(tip.contains("750 points"));
    }

    #[tokio::test]
    async fn trait_delegates_to_tip() {
        let advisor = RuleBasedAdvisor::new();
        let text = advisor.fetch_advisory(units(10), 0).await.unwrap();
        assert_eq!(text, advisor.tip(units(10), 0));
    }
}
