//! # Vault Session
//!
//! The single owner of a user's wallet/vault pair for the lifetime of a
//! session. The reducer decides what a transaction does; the session decides
//! *when* it happens and keeps the books.
//!
//! ## Pending model
//!
//! A transaction goes through two steps:
//!
//! 1. [`submit`](VaultSession::submit) validates the intent against the
//!    current state (dry run) and parks it as the pending transaction. Only
//!    one transaction may be pending at a time.
//! 2. [`commit`](VaultSession::commit) applies it for real and records a
//!    receipt, or [`cancel`](VaultSession::cancel) drops it.
//!
//! Whatever happens between the two (a spinner, a two-second timer) belongs
//! to the caller. [`execute`](VaultSession::execute) does both steps at once.
//!
//! The wallet provider may report a new balance while a transaction waits
//! ([`sync_balance`](VaultSession::sync_balance)), so commit re-runs the
//! reducer. A transaction rejected at that point is kept as
//! [`last_failure`](VaultSession::last_failure) until the next submit.
//!
//! The session is `Send` but not `Sync`; share it behind a mutex.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::vault::account::{VaultAccount, WalletAccount};
use crate::vault::error::VaultError;
use crate::vault::receipt::TransactionReceipt;
use crate::vault::reducer::{
    apply_transaction, apply_transaction_at, TransactionIntent, VaultSnapshot,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from session operations. All are recoverable.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The reducer rejected the transaction.
    #[error(transparent)]
    Vault(#[from] VaultError),

    /// Vault operations need a connected wallet.
    #[error("wallet is not connected")]
    WalletDisconnected,

    /// Another transaction is still in flight.
    #[error("transaction {0} is still pending")]
    TransactionPending(Uuid),

    /// Commit or cancel with nothing pending.
    #[error("no transaction is pending")]
    NoPendingTransaction,

    /// A commit arrived for a transaction that is no longer the pending one
    /// (it was cancelled and something else was submitted).
    #[error("pending transaction is {current}, not {requested}")]
    PendingMismatch {
        /// The transaction actually pending.
        current: Uuid,
        /// The transaction the caller tried to commit.
        requested: Uuid,
    },
}

impl SessionError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::Vault(err) => err.code(),
            SessionError::WalletDisconnected => "wallet_disconnected",
            SessionError::TransactionPending(_) => "transaction_pending",
            SessionError::NoPendingTransaction => "no_pending_transaction",
            SessionError::PendingMismatch { .. } => "pending_mismatch",
        }
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A validated intent waiting to be committed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    pub id: Uuid,
    pub intent: TransactionIntent,
    pub submitted_at: DateTime<Utc>,
}

/// A pending transaction the reducer rejected at commit time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedTransaction {
    pub id: Uuid,
    pub intent: TransactionIntent,
    /// Machine-readable reason, e.g. `insufficient_liquid_funds`.
    pub code: String,
    /// Short message fit for a toast.
    pub reason: String,
    pub failed_at: DateTime<Utc>,
}

/// Everything worth persisting about a session. Pending transactions are
/// left out: a restart drops whatever was in flight.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub wallet: WalletAccount,
    pub vault: VaultAccount,
    #[serde(default)]
    pub receipts: Vec<TransactionReceipt>,
}

// ---------------------------------------------------------------------------
// VaultSession
// ---------------------------------------------------------------------------

/// State-owning service for one user's wallet and vault.
#[derive(Clone, Debug)]
pub struct VaultSession {
    wallet: WalletAccount,
    vault: VaultAccount,
    pending: Option<PendingTransaction>,
    last_failure: Option<FailedTransaction>,
    receipts: Vec<TransactionReceipt>,
}

impl VaultSession {
    /// A session with a disconnected wallet and the given vault.
    pub fn new(vault: VaultAccount) -> Self {
        Self {
            wallet: WalletAccount::disconnected(),
            vault,
            pending: None,
            last_failure: None,
            receipts: Vec::new(),
        }
    }

    /// A session seeded like the demo dashboard.
    pub fn demo() -> Self {
        Self::new(VaultAccount::demo())
    }

    /// Restores a persisted session.
    pub fn from_snapshot(snapshot: SessionSnapshot) -> Self {
        Self {
            wallet: snapshot.wallet,
            vault: snapshot.vault,
            pending: None,
            last_failure: None,
            receipts: snapshot.receipts,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            wallet: self.wallet.clone(),
            vault: self.vault.clone(),
            receipts: self.receipts.clone(),
        }
    }

    pub fn wallet(&self) -> &WalletAccount {
        &self.wallet
    }

    pub fn vault(&self) -> &VaultAccount {
        &self.vault
    }

    pub fn pending(&self) -> Option<&PendingTransaction> {
        self.pending.as_ref()
    }

    pub fn receipts(&self) -> &[TransactionReceipt] {
        &self.receipts
    }

    pub fn last_failure(&self) -> Option<&FailedTransaction> {
        self.last_failure.as_ref()
    }

    // -----------------------------------------------------------------------
    // Wallet lifecycle
    // -----------------------------------------------------------------------

    /// Connects (or reconnects) the wallet with provider-supplied values.
    ///
    /// # Errors
    ///
    /// [`SessionError::TransactionPending`] while a transaction waits for
    /// commit.
    pub fn connect(
        &mut self,
        address: impl Into<String>,
        liquid_balance: u64,
    ) -> Result<(), SessionError> {
        if let Some(p) = &self.pending {
            return Err(SessionError::TransactionPending(p.id));
        }
        self.wallet = WalletAccount::connected(address, liquid_balance);
        tracing::info!(
            address = self.wallet.address.as_deref().unwrap_or_default(),
            liquid_balance,
            "wallet connected"
        );
        Ok(())
    }

    /// Replaces the liquid balance with the provider's latest figure. Allowed
    /// while a transaction is pending; its commit sees the new balance.
    pub fn sync_balance(&mut self, liquid_balance: u64) -> Result<(), SessionError> {
        if !self.wallet.connected {
            return Err(SessionError::WalletDisconnected);
        }
        tracing::info!(
            previous = self.wallet.liquid_balance,
            liquid_balance,
            "wallet balance synced"
        );
        self.wallet.liquid_balance = liquid_balance;
        Ok(())
    }

    /// Resets the wallet and drops any pending transaction, which is
    /// returned so the caller can stop its timer.
    pub fn disconnect(&mut self) -> Option<PendingTransaction> {
        let dropped = self.pending.take();
        if let Some(p) = &dropped {
            tracing::info!(id = %p.id, "pending transaction cancelled by disconnect");
        }
        self.wallet = WalletAccount::disconnected();
        tracing::info!("wallet disconnected");
        dropped
    }

    // -----------------------------------------------------------------------
    // Transactions
    // -----------------------------------------------------------------------

    /// Validates `intent` and parks it as the pending transaction.
    ///
    /// # Errors
    ///
    /// [`SessionError::WalletDisconnected`], [`SessionError::TransactionPending`],
    /// or the reducer's verdict as [`SessionError::Vault`]. State is
    /// untouched on every error.
    pub fn submit(&mut self, intent: TransactionIntent) -> Result<PendingTransaction, SessionError> {
        if !self.wallet.connected {
            return Err(SessionError::WalletDisconnected);
        }
        if let Some(p) = &self.pending {
            return Err(SessionError::TransactionPending(p.id));
        }

        if let Err(err) = apply_transaction(&self.wallet, &self.vault, &intent) {
            tracing::info!(
                direction = %intent.direction,
                amount = intent.amount,
                reason = err.code(),
                "transaction rejected"
            );
            return Err(err.into());
        }

        let pending = PendingTransaction {
            id: Uuid::new_v4(),
            intent,
            submitted_at: Utc::now(),
        };
        tracing::debug!(id = %pending.id, "transaction pending");
        self.last_failure = None;
        self.pending = Some(pending.clone());
        Ok(pending)
    }

    /// Applies the pending transaction `id` and records its receipt.
    ///
    /// The intent is re-applied against current state rather than trusting
    /// the dry run. If the reducer now rejects it, the pending slot is
    /// cleared, the rejection is kept as [`last_failure`](Self::last_failure)
    /// and the error returned with balances unchanged.
    pub fn commit(&mut self, id: Uuid) -> Result<TransactionReceipt, SessionError> {
        match self.pending.as_ref().map(|p| p.id) {
            None => return Err(SessionError::NoPendingTransaction),
            Some(current) if current != id => {
                return Err(SessionError::PendingMismatch {
                    current,
                    requested: id,
                })
            }
            Some(_) => {}
        }
        let pending = self.pending.take().ok_or(SessionError::NoPendingTransaction)?;

        let now = Utc::now();
        let outcome = match apply_transaction_at(&self.wallet, &self.vault, &pending.intent, now) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(
                    id = %pending.id,
                    direction = %pending.intent.direction,
                    amount = pending.intent.amount,
                    reason = err.code(),
                    "transaction failed at commit"
                );
                self.last_failure = Some(FailedTransaction {
                    id: pending.id,
                    intent: pending.intent,
                    code: err.code().to_string(),
                    reason: err.user_message().to_string(),
                    failed_at: now,
                });
                return Err(err.into());
            }
        };
        let receipt = TransactionReceipt::new(&pending.intent, &outcome, now);

        let VaultSnapshot { wallet, vault } = outcome.snapshot;
        self.wallet = wallet;
        self.vault = vault;

        tracing::info!(
            id = %receipt.id,
            direction = %receipt.direction,
            amount = receipt.amount,
            points_awarded = receipt.points_awarded,
            tiers_unlocked = ?receipt.tiers_unlocked,
            vault_balance = receipt.vault_balance_after,
            "transaction committed"
        );

        self.receipts.push(receipt.clone());
        Ok(receipt)
    }

    /// Drops the pending transaction.
    pub fn cancel(&mut self) -> Result<PendingTransaction, SessionError> {
        let pending = self.pending.take().ok_or(SessionError::NoPendingTransaction)?;
        tracing::info!(id = %pending.id, "pending transaction cancelled");
        Ok(pending)
    }

    /// Submit and commit in one go, no delay.
    pub fn execute(&mut self, intent: TransactionIntent) -> Result<TransactionReceipt, SessionError> {
        let pending = self.submit(intent)?;
        self.commit(pending.id)
    }
}

impl Default for VaultSession {
    fn default() -> Self {
        Self::new(VaultAccount::new())
    }
}
