//! Error types for vault transactions.
//!
//! Every reducer failure is a [`VaultError`]. None of them are fatal: the
//! caller leaves state untouched and shows [`VaultError::user_message`].

use thiserror::Error;

use super::amount::format_amount;

/// Errors that can occur while applying a transaction intent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    /// A deposit asked for more than the wallet holds.
    #[error(
        "insufficient liquid funds: available {} USDC, requested {} USDC",
        format_amount(*.available),
        format_amount(*.requested)
    )]
    InsufficientLiquidFunds {
        /// Current liquid wallet balance in micro-USDC.
        available: u64,
        /// Amount the deposit asked for.
        requested: u64,
    },

    /// A withdrawal asked for more than the vault holds.
    #[error(
        "insufficient vault funds: available {} USDC, requested {} USDC",
        format_amount(*.available),
        format_amount(*.requested)
    )]
    InsufficientVaultFunds {
        /// Current vault balance in micro-USDC.
        available: u64,
        /// Amount the withdrawal asked for.
        requested: u64,
    },

    /// The amount was zero, negative, or not a number.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Checked arithmetic failed. Someone is moving more than 18 trillion
    /// USDC through a transit vault, which is a bug or an attack.
    #[error("arithmetic overflow while computing {0}")]
    Overflow(&'static str),
}

impl VaultError {
    /// Stable machine-readable code, used by the HTTP layer and metrics.
    pub fn code(&self) -> &'static str {
        match self {
            VaultError::InsufficientLiquidFunds { .. } => "insufficient_liquid_funds",
            VaultError::InsufficientVaultFunds { .. } => "insufficient_vault_funds",
            VaultError::InvalidAmount(_) => "invalid_amount",
            VaultError::Overflow(_) => "overflow",
        }
    }

    /// Short message naming the account that came up short.
    pub fn user_message(&self) -> &'static str {
        match self {
            VaultError::InsufficientLiquidFunds { .. } => "Insufficient Wallet Balance",
            VaultError::InsufficientVaultFunds { .. } => "Insufficient Vault Funds",
            VaultError::InvalidAmount(_) => "Enter an amount greater than zero",
            VaultError::Overflow(_) => "Amount is too large",
        }
    }
}
