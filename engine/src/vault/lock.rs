//! # Lock Policy
//!
//! Maps a lock-period selection to the APY shown on the vault and the point
//! multiplier applied to deposits. Pure lookup, no clocks: the lock is a
//! label. Funds are never actually held for the period and there is no
//! early-withdrawal penalty.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{
    APY_1_YEAR_BPS, APY_30_DAYS_BPS, APY_90_DAYS_BPS, APY_NONE_BPS, MULTIPLIER_1_YEAR_BPS,
    MULTIPLIER_30_DAYS_BPS, MULTIPLIER_90_DAYS_BPS, MULTIPLIER_NONE_BPS,
};

/// The user's chosen commitment period.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockPeriod {
    #[default]
    #[serde(rename = "NONE")]
    None,
    #[serde(rename = "30_DAYS")]
    ThirtyDays,
    #[serde(rename = "90_DAYS")]
    NinetyDays,
    #[serde(rename = "1_YEAR")]
    OneYear,
}

/// One row of the lock policy table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LockTerms {
    pub period: LockPeriod,
    /// Annual yield in basis points.
    pub apy_bps: u32,
    /// Point multiplier in basis points (10_000 = 1.0x).
    pub multiplier_bps: u32,
}

/// Error from [`LockPeriod::parse_strict`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown lock period {0:?} (expected NONE, 30_DAYS, 90_DAYS or 1_YEAR)")]
pub struct UnknownLockPeriod(pub String);

impl LockPeriod {
    /// Every selectable period, in the order the dashboard shows them.
    pub const ALL: [LockPeriod; 4] = [
        LockPeriod::None,
        LockPeriod::ThirtyDays,
        LockPeriod::NinetyDays,
        LockPeriod::OneYear,
    ];

    /// Wire key, e.g. `"90_DAYS"`.
    pub fn key(&self) -> &'static str {
        match self {
            LockPeriod::None => "NONE",
            LockPeriod::ThirtyDays => "30_DAYS",
            LockPeriod::NinetyDays => "90_DAYS",
            LockPeriod::OneYear => "1_YEAR",
        }
    }

    /// Parses a wire key, falling back to [`LockPeriod::None`] for anything
    /// unrecognized.
    pub fn from_key(key: &str) -> Self {
        match Self::parse_strict(key) {
            Ok(period) => period,
            Err(err) => {
                tracing::debug!(%err, "falling back to no lock");
                LockPeriod::None
            }
        }
    }

    /// Parses a wire key and rejects unknown values. Case-insensitive, and
    /// tolerant of a space instead of the underscore (`"30 days"`).
    pub fn parse_strict(key: &str) -> Result<Self, UnknownLockPeriod> {
        let normalized = key.trim().to_ascii_uppercase().replace(' ', "_");
        match normalized.as_str() {
            "NONE" => Ok(LockPeriod::None),
            "30_DAYS" => Ok(LockPeriod::ThirtyDays),
            "90_DAYS" => Ok(LockPeriod::NinetyDays),
            "1_YEAR" => Ok(LockPeriod::OneYear),
            _ => Err(UnknownLockPeriod(key.to_string())),
        }
    }

    /// The policy row for this period.
    pub fn terms(&self) -> LockTerms {
        let (apy_bps, multiplier_bps) = match self {
            LockPeriod::None => (APY_NONE_BPS, MULTIPLIER_NONE_BPS),
            LockPeriod::ThirtyDays => (APY_30_DAYS_BPS, MULTIPLIER_30_DAYS_BPS),
            LockPeriod::NinetyDays => (APY_90_DAYS_BPS, MULTIPLIER_90_DAYS_BPS),
            LockPeriod::OneYear => (APY_1_YEAR_BPS, MULTIPLIER_1_YEAR_BPS),
        };
        LockTerms {
            period: *self,
            apy_bps,
            multiplier_bps,
        }
    }

    pub fn apy_bps(&self) -> u32 {
        self.terms().apy_bps
    }

    pub fn multiplier_bps(&self) -> u32 {
        self.terms().multiplier_bps
    }

    /// Button label: `"No Lock"`, `"30 DAYS"`, ...
    pub fn label(&self) -> &'static str {
        match self {
            LockPeriod::None => "No Lock",
            LockPeriod::ThirtyDays => "30 DAYS",
            LockPeriod::NinetyDays => "90 DAYS",
            LockPeriod::OneYear => "1 YEAR",
        }
    }

    /// Multiplier badge: `"1x"`, `"1.5x"`, `"2x"`, `"3x"`.
    pub fn multiplier_label(&self) -> String {
        let bps = self.multiplier_bps();
        let whole = bps / 10_000;
        let tenths = (bps % 10_000) / 1_000;
        if tenths == 0 {
            format!("{whole}x")
        } else {
            format!("{whole}.{tenths}x")
        }
    }
}

impl fmt::Display for LockPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for LockPeriod {
    type Err = UnknownLockPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_strict(s)
    }
}

/// The full policy table, in display order.
pub fn lock_policy() -> Vec<LockTerms> {
    LockPeriod::ALL.iter().map(LockPeriod::terms).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_table_matches_dashboard() {
        let table = lock_policy();
        let rows: Vec<_> = table
            .iter()
            .map(|t| (t.period.key(), t.apy_bps, t.multiplier_bps))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("NONE", 450, 10_000),
                ("30_DAYS", 620, 15_000),
                ("90_DAYS", 850, 20_000),
                ("1_YEAR", 1_200, 30_000),
            ]
        );
    }

    #[test]
    fn unknown_key_falls_back_to_none() {
        assert_eq!(LockPeriod::from_key("2_YEARS"), LockPeriod::None);
        assert_eq!(LockPeriod::from_key(""), LockPeriod::None);
        assert_eq!(LockPeriod::from_key("1_YEAR"), LockPeriod::OneYear);
    }

    #[test]
    fn strict_parse_rejects_unknown() {
        assert!(LockPeriod::parse_strict("forever").is_err());
        assert_eq!(
            "30 days".parse::<LockPeriod>().unwrap(),
            LockPeriod::ThirtyDays
        );
    }

    #[test]
    fn multiplier_labels() {
        let labels: Vec<_> = LockPeriod::ALL
            .iter()
            .map(LockPeriod::multiplier_label)
            .collect();
        assert_eq!(labels, vec!["1x", "1.5x", "2x", "3x"]);
    }

    #[test]
    fn serde_uses_wire_keys() {
        let json = serde_json::to_string(&LockPeriod::NinetyDays).unwrap();
        assert_eq!(json, "\"90_DAYS\"");
        let back: LockPeriod = serde_json::from_str("\"1_YEAR\"").unwrap();
        assert_eq!(back, LockPeriod::OneYear);
    }

    #[test]
    fn default_is_no_lock() {
        assert_eq!(LockPeriod::default(), LockPeriod::None);
    }
}
