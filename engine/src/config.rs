//! # Engine Configuration & Constants
//!
//! Every magic number in the vault engine lives here: tier thresholds, lock
//! rates, the presentation delay, and the fallback copy shown when the
//! advisor is down. If you're hardcoding one of these somewhere else, move
//! it here.
//!
//! Money is fixed-point. One USDC is [`MICROS_PER_UNIT`] micro-units, and
//! loyalty points use the same scale so that a 1.5x multiplier on 1 USDC is
//! exactly 1.5 points with no rounding.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

/// Number of decimal places carried by every amount (USDC uses 6).
pub const AMOUNT_DECIMALS: u32 = 6;

/// Micro-units in one whole USDC (or one whole loyalty point).
pub const MICROS_PER_UNIT: u64 = 1_000_000;

/// Basis points in 100%. Rates and multipliers are both expressed in bps.
pub const BPS_DENOMINATOR: u64 = 10_000;

// ---------------------------------------------------------------------------
// Tier Thresholds (whole USDC of vault balance)
// ---------------------------------------------------------------------------

/// Vault balance that unlocks the Bronze Pass.
pub const BRONZE_THRESHOLD: u64 = 50 * MICROS_PER_UNIT;

/// Vault balance that unlocks the Silver Commuter badge.
pub const SILVER_THRESHOLD: u64 = 200 * MICROS_PER_UNIT;

/// Vault balance that unlocks Gold Class.
pub const GOLD_THRESHOLD: u64 = 500 * MICROS_PER_UNIT;

/// Reserved. Platinum is not part of the active catalog.
pub const PLATINUM_THRESHOLD: u64 = 1_000 * MICROS_PER_UNIT;

// ---------------------------------------------------------------------------
// Lock Policy
// ---------------------------------------------------------------------------

/// APY for flexible (unlocked) deposits: 4.5%.
pub const APY_NONE_BPS: u32 = 450;

/// APY for a 30-day lock: 6.2%.
pub const APY_30_DAYS_BPS: u32 = 620;

/// APY for a 90-day lock: 8.5%.
pub const APY_90_DAYS_BPS: u32 = 850;

/// APY for a one-year lock: 12.0%.
pub const APY_1_YEAR_BPS: u32 = 1_200;

/// Point multipliers in bps (10_000 = 1.0x).
pub const MULTIPLIER_NONE_BPS: u32 = 10_000;
pub const MULTIPLIER_30_DAYS_BPS: u32 = 15_000;
pub const MULTIPLIER_90_DAYS_BPS: u32 = 20_000;
pub const MULTIPLIER_1_YEAR_BPS: u32 = 30_000;

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

/// Milliseconds a submitted transaction sits in `Pending` before the node
/// commits it. Purely cosmetic; the reducer never waits.
pub const PROCESSING_DELAY_MS: u64 = 2_000;

/// Number of months shown on the yield projection chart.
pub const PROJECTION_MONTHS: usize = 6;

// ---------------------------------------------------------------------------
// Advisory
// ---------------------------------------------------------------------------

/// Shown when the advisor fails or times out.
pub const ADVISORY_FALLBACK: &str =
    "Lock your USDC for rewards and early access to route upgrades!";

/// Shown when the advisor answers with nothing.
pub const ADVISORY_EMPTY_FALLBACK: &str = "Deposit more to earn higher yield!";

/// Upper bound on how long we wait for an advisory before falling back.
pub const ADVISORY_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Demo Session Seeds
// ---------------------------------------------------------------------------

/// Address handed out by the simulated wallet provider on connect.
pub const DEMO_WALLET_ADDRESS: &str = "0x71C...9A23";

/// Liquid balance of the simulated wallet on connect: 145.50 USDC.
pub const DEMO_WALLET_BALANCE: u64 = 145_500_000;

/// Yield shown on a fresh demo vault: 12.45 USDC.
pub const DEMO_VAULT_YIELD: u64 = 12_450_000;

/// Loyalty points on a fresh demo vault: 120.
pub const DEMO_VAULT_POINTS: u64 = 120 * MICROS_PER_UNIT;

/// Crate version, surfaced by the node's status endpoint.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
