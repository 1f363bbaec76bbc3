//! # Prometheus Metrics
//!
//! Operational metrics for the vault service, scraped at `/metrics` on the
//! metrics port. Everything lives in a dedicated [`prometheus::Registry`]
//! with the `arc_vault` prefix.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

use arc_vault::VaultSession;

/// Metric handles for the service. Prometheus handles are `Arc`s inside, so
/// cloning is cheap.
#[derive(Clone)]
pub struct VaultMetrics {
    registry: Registry,
    /// Transactions by `direction` and `outcome`
    /// (`pending`, `committed`, `failed`, `rejected`, `cancelled`).
    /// `failed` means accepted, then refused by the reducer at commit.
    pub transactions_total: IntCounterVec,
    /// Badges minted, by tier.
    pub tiers_unlocked_total: IntCounterVec,
    /// Advisory lookups by `source` (`advisor` or `fallback`).
    pub advisory_requests_total: IntCounterVec,
    pub liquid_balance_micros: IntGauge,
    pub vault_balance_micros: IntGauge,
    pub points_micros: IntGauge,
    /// 1 while a transaction is waiting for its commit timer.
    pub pending_transactions: IntGauge,
    /// Time from submit to commit.
    pub commit_latency_seconds: Histogram,
}

impl VaultMetrics {
    pub fn new() -> Self {
        let registry = Registry::new_custom(Some("arc_vault".into()), None)
            .expect("failed to create prometheus registry");

        let transactions_total = IntCounterVec::new(
            Opts::new("transactions_total", "Vault transactions by direction and outcome"),
            &["direction", "outcome"],
        )
        .expect("metric creation");
        registry
            .register(Box::new(transactions_total.clone()))
            .expect("metric registration");

        let tiers_unlocked_total = IntCounterVec::new(
            Opts::new("tiers_unlocked_total", "Tier badges minted"),
            &["tier"],
        )
        .expect("metric creation");
        registry
            .register(Box::new(tiers_unlocked_total.clone()))
            .expect("metric registration");

        let advisory_requests_total = IntCounterVec::new(
            Opts::new("advisory_requests_total", "Advisory lookups by text source"),
            &["source"],
        )
        .expect("metric creation");
        registry
            .register(Box::new(advisory_requests_total.clone()))
            .expect("metric registration");

        let liquid_balance_micros =
            IntGauge::new("liquid_balance_micros", "Connected wallet balance in micro-USDC")
                .expect("metric creation");
        registry
            .register(Box::new(liquid_balance_micros.clone()))
            .expect("metric registration");

        let vault_balance_micros =
            IntGauge::new("vault_balance_micros", "Vault balance in micro-USDC")
                .expect("metric creation");
        registry
            .register(Box::new(vault_balance_micros.clone()))
            .expect("metric registration");

        let points_micros = IntGauge::new("points_micros", "Loyalty points in micro-points")
            .expect("metric creation");
        registry
            .register(Box::new(points_micros.clone()))
            .expect("metric registration");

        let pending_transactions =
            IntGauge::new("pending_transactions", "Transactions awaiting commit")
                .expect("metric creation");
        registry
            .register(Box::new(pending_transactions.clone()))
            .expect("metric registration");

        let commit_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "commit_latency_seconds",
                "Time between submitting and committing a transaction",
            )
            .buckets(vec![0.01, 0.1, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 5.0, 10.0]),
        )
        .expect("metric creation");
        registry
            .register(Box::new(commit_latency_seconds.clone()))
            .expect("metric registration");

        Self {
            registry,
            transactions_total,
            tiers_unlocked_total,
            advisory_requests_total,
            liquid_balance_micros,
            vault_balance_micros,
            points_micros,
            pending_transactions,
            commit_latency_seconds,
        }
    }

    /// Counts one transaction event.
    pub fn record_transaction(&self, direction: &str, outcome: &str) {
        self.transactions_total
            .with_label_values(&[direction, outcome])
            .inc();
    }

    /// Refreshes the balance gauges from the session.
    pub fn observe_session(&self, session: &VaultSession) {
        self.liquid_balance_micros
            .set(saturating_i64(session.wallet().liquid_balance));
        self.vault_balance_micros
            .set(saturating_i64(session.vault().vault_balance));
        self.points_micros.set(saturating_i64(session.vault().points));
        self.pending_transactions
            .set(i64::from(session.pending().is_some()));
    }

    /// Encodes all registered metrics into the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer).expect("prometheus output is valid utf-8"))
    }
}

impl Default for VaultMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn saturating_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

pub type SharedMetrics = Arc<VaultMetrics>;

/// `GET /metrics` in Prometheus text format. 500 if encoding fails.
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arc_vault::vault::{units, TransactionIntent};

    #[test]
    fn encode_includes_prefixed_names() {
        let m = VaultMetrics::new();
        m.record_transaction("DEPOSIT", "committed");
        let text = m.encode().unwrap();
        assert!(text.contains("arc_vault_transactions_total"));
        assert!(text.contains("direction=\"DEPOSIT\""));
    }

    #[test]
    fn observe_session_sets_gauges() {
        let m = VaultMetrics::new();
        let mut s = VaultSession::default();
        s.connect("0xm", units(100)).unwrap();
        s.execute(TransactionIntent::deposit(units(40))).unwrap();
        m.observe_session(&s);

        assert_eq!(m.liquid_balance_micros.get(), 60_000_000);
        assert_eq!(m.vault_balance_micros.get(), 40_000_000);
        assert_eq!(m.points_micros.get(), 40_000_000);
        assert_eq!(m.pending_transactions.get(), 0);
    }
}
