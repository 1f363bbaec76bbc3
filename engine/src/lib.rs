// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Arc Vault Core Library
//!
//! The rules behind the Transit Arc vault: riders move USDC from a liquid
//! wallet into a vault, earn points scaled by how long they lock, and collect
//! tier badges (Bronze Pass, Silver Commuter, Gold Class) as the vault grows.
//!
//! Nothing here talks to a chain. Wallet balances come from whoever connects
//! the wallet; the engine only keeps the ledger honest.
//!
//! ## Architecture
//!
//! - **vault**: Amounts, tiers, lock policy and the pure transaction reducer.
//! - **session**: Owns one user's state and sequences pending transactions.
//! - **advisory**: Pluggable tip text with guaranteed fallbacks.
//! - **config**: Units, thresholds, rates and demo seeds.
//!
//! ## Design Philosophy
//!
//! 1. Integers for money. Micro-USDC in, micro-USDC out.
//! 2. A failed transaction changes nothing.
//! 3. Badges and points never go backwards.
//! 4. Presentation (delays, display strings, tips) stays outside the reducer.

pub mod advisory;
pub mod config;
pub mod session;
pub mod vault;

pub use session::{
    FailedTransaction, PendingTransaction, SessionError, SessionSnapshot, VaultSession,
};
