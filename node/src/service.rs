//! # Vault Service
//!
//! Shares one [`VaultSession`] between request handlers and runs the commit
//! timer. Submitting a transaction parks it in the session and spawns a task
//! that sleeps for the processing delay, then commits. Cancelling (or
//! disconnecting the wallet) aborts that task.
//!
//! Lock order is always session first, then the timer slot.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use arc_vault::advisory::{advise, Advisory, InsightAdvisor};
use arc_vault::vault::TransactionIntent;
use arc_vault::{PendingTransaction, SessionError, VaultSession};

use crate::metrics::SharedMetrics;
use crate::store;

#[derive(Clone)]
pub struct VaultService {
    session: Arc<Mutex<VaultSession>>,
    commit_task: Arc<Mutex<Option<JoinHandle<()>>>>,
    metrics: SharedMetrics,
    processing_delay: Duration,
    state_file: Option<Arc<PathBuf>>,
}

impl VaultService {
    pub fn new(
        session: VaultSession,
        metrics: SharedMetrics,
        processing_delay: Duration,
        state_file: Option<PathBuf>,
    ) -> Self {
        metrics.observe_session(&session);
        Self {
            session: Arc::new(Mutex::new(session)),
            commit_task: Arc::new(Mutex::new(None)),
            metrics,
            processing_delay,
            state_file: state_file.map(Arc::new),
        }
    }

    pub fn processing_delay(&self) -> Duration {
        self.processing_delay
    }

    /// Runs `f` against the session under the lock.
    pub fn read<R>(&self, f: impl FnOnce(&VaultSession) -> R) -> R {
        f(&self.session.lock())
    }

    /// Connects the wallet. Refused while a transaction is pending.
    pub fn connect(&self, address: String, liquid_balance: u64) -> Result<(), SessionError> {
        let mut session = self.session.lock();
        session.connect(address, liquid_balance)?;
        self.after_change(&session);
        Ok(())
    }

    /// Takes the provider's latest wallet balance. A pending transaction
    /// keeps its timer and is checked against the new balance at commit.
    pub fn sync_balance(&self, liquid_balance: u64) -> Result<(), SessionError> {
        let mut session = self.session.lock();
        session.sync_balance(liquid_balance)?;
        self.after_change(&session);
        Ok(())
    }

    /// Disconnects and stops any commit timer. Returns the dropped
    /// transaction, if one was pending.
    pub fn disconnect(&self) -> Option<PendingTransaction> {
        let mut session = self.session.lock();
        let dropped = session.disconnect();
        if let Some(p) = &dropped {
            self.abort_timer();
            self.metrics
                .record_transaction(p.intent.direction.as_str(), "cancelled");
        }
        self.after_change(&session);
        dropped
    }

    /// Validates and parks `intent`, then schedules its commit.
    pub fn submit(&self, intent: TransactionIntent) -> Result<PendingTransaction, SessionError> {
        let direction = intent.direction;
        let mut session = self.session.lock();

        let pending = match session.submit(intent) {
            Ok(p) => p,
            Err(err) => {
                self.metrics.record_transaction(direction.as_str(), "rejected");
                return Err(err);
            }
        };
        self.metrics.record_transaction(direction.as_str(), "pending");
        self.metrics.observe_session(&session);

        // Spawned while the session is locked, so the task cannot commit
        // before its handle is stored.
        let svc = self.clone();
        let id = pending.id;
        let delay = self.processing_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            svc.commit(id);
        });
        *self.commit_task.lock() = Some(handle);

        Ok(pending)
    }

    /// Drops the pending transaction and its timer.
    pub fn cancel(&self) -> Result<PendingTransaction, SessionError> {
        let mut session = self.session.lock();
        let pending = session.cancel()?;
        self.abort_timer();
        self.metrics
            .record_transaction(pending.intent.direction.as_str(), "cancelled");
        self.metrics.observe_session(&session);
        Ok(pending)
    }

    /// Asks `advisor` for a tip on the current position. The session lock is
    /// released before the advisor is awaited.
    pub async fn advisory(&self, advisor: &dyn InsightAdvisor, timeout: Duration) -> Advisory {
        let (balance, points) = self.read(|s| (s.vault().vault_balance, s.vault().points));
        let advisory = advise(advisor, balance, points, timeout).await;
        let source = if advisory.is_fallback() { "fallback" } else { "advisor" };
        self.metrics
            .advisory_requests_total
            .with_label_values(&[source])
            .inc();
        advisory
    }

    fn commit(&self, id: Uuid) {
        let mut session = self.session.lock();
        let submitted_at = session.pending().map(|p| p.submitted_at);

        match session.commit(id) {
            Ok(receipt) => {
                if let Some(at) = submitted_at {
                    let elapsed = (Utc::now() - at).to_std().unwrap_or_default();
                    self.metrics
                        .commit_latency_seconds
                        .observe(elapsed.as_secs_f64());
                }
                self.metrics
                    .record_transaction(receipt.direction.as_str(), "committed");
                for tier in &receipt.tiers_unlocked {
                    self.metrics
                        .tiers_unlocked_total
                        .with_label_values(&[tier.as_str()])
                        .inc();
                }
                self.after_change(&session);
                // Still under the session lock, so the slot holds this task.
                self.commit_task.lock().take();
            }
            Err(SessionError::Vault(err)) => {
                // The session kept the rejection as `last_failure`.
                let direction = session
                    .last_failure()
                    .map(|f| f.intent.direction.as_str())
                    .unwrap_or("unknown");
                tracing::warn!(%id, error = %err, "scheduled commit rejected");
                self.metrics.record_transaction(direction, "failed");
                self.after_change(&session);
                self.commit_task.lock().take();
            }
            Err(err) => {
                tracing::debug!(%id, error = %err, "stale commit ignored");
                self.metrics.observe_session(&session);
            }
        }
    }

    fn abort_timer(&self) {
        if let Some(handle) = self.commit_task.lock().take() {
            handle.abort();
        }
    }

    fn after_change(&self, session: &VaultSession) {
        self.metrics.observe_session(session);
        if let Some(path) = &self.state_file {
            if let Err(e) = store::save(path, &session.snapshot()) {
                tracing::error!(error = %e, "failed to persist session");
            }
        }
    }
}
