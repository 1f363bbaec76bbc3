//! # Vault Module: Deposits, Rewards & Lock Policy
//!
//! The vault is where a rider parks transit funds to earn yield and loyalty
//! points. This module holds the whole rule set: what a deposit or a
//! withdrawal does to the wallet/vault pair, which badges a balance unlocks,
//! and what each lock period pays.
//!
//! ## Architecture
//!
//! ```text
//! amount.rs      fixed-point parsing and formatting (micro-USDC)
//! tier.rs        tier catalog and badge minting
//! lock.rs        lock period → APY and point multiplier
//! account.rs     WalletAccount and VaultAccount records
//! reducer.rs     the pure transaction reducer
//! projection.rs  APY projection and next-tier progress
//! receipt.rs     committed transaction receipts
//! error.rs       VaultError
//! ```
//!
//! ## Design Principles
//!
//! 1. **All amounts are `u64` micro-units.** No floating point anywhere in
//!    the arithmetic. Decimals only exist at the parse/format boundary.
//!
//! 2. **The reducer is pure.** It borrows a snapshot and returns a new one.
//!    Failure means the caller's state is exactly what it was.
//!
//! 3. **Achievements are permanent.** Badges and points only ever grow;
//!    withdrawals move money and nothing else.
//!
//! 4. **Serializable state.** Every record derives `Serialize` and
//!    `Deserialize` so a session can be snapshotted to disk or sent over
//!    the API as-is.

pub mod account;
pub mod amount;
pub mod error;
pub mod lock;
pub mod projection;
pub mod receipt;
pub mod reducer;
pub mod tier;

pub use account::{VaultAccount, WalletAccount};
pub use amount::{format_amount, format_bps_percent, format_points, parse_amount, units};
pub use error::VaultError;
pub use lock::{lock_policy, LockPeriod, LockTerms};
pub use projection::{annual_yield, project_vault, tier_progress, ProjectionPoint, TierProgress};
pub use receipt::TransactionReceipt;
pub use reducer::{
    apply_transaction, apply_transaction_at, Direction, TransactionIntent, TransactionOutcome,
    VaultSnapshot,
};
pub use tier::{TierBadge, TierId, TierSpec, TIER_CATALOG};
