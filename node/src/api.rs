//! # REST API
//!
//! Builds the axum router for the vault service. All endpoints share
//! application state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path                          | Description                        |
//! |--------|-------------------------------|------------------------------------|
//! | GET    | `/health`                     | Liveness probe                     |
//! | GET    | `/status`                     | Service status summary             |
//! | GET    | `/wallet`                     | Wallet snapshot                    |
//! | POST   | `/wallet/connect`             | Connect the wallet                 |
//! | POST   | `/wallet/balance`             | Sync the provider's wallet balance |
//! | POST   | `/wallet/disconnect`          | Disconnect, cancelling any pending |
//! | GET    | `/vault`                      | Vault, projection and next tier    |
//! | GET    | `/vault/tiers`                | Tier catalog with unlock flags     |
//! | GET    | `/vault/locks`                | Lock policy table                  |
//! | POST   | `/vault/transactions`         | Submit a deposit or withdrawal     |
//! | DELETE | `/vault/transactions/pending` | Cancel the pending transaction     |
//! | GET    | `/vault/receipts`             | Committed transactions             |
//! | GET    | `/vault/advisory`             | Advisor tip (never fails)          |
//!
//! Amounts travel two ways: raw micro-units (`u64`) for machines, and a
//! `*_display` string for people. Request amounts are decimal strings.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use arc_vault::advisory::{Advisory, InsightAdvisor};
use arc_vault::vault::{
    annual_yield, format_amount, format_bps_percent, format_points, lock_policy, parse_amount,
    project_vault, tier_progress, Direction, LockPeriod, ProjectionPoint, TierBadge, TierProgress,
    TierSpec, TransactionIntent, TransactionReceipt, VaultError, TIER_CATALOG,
};
use arc_vault::{FailedTransaction, PendingTransaction, SessionError};

use crate::service::VaultService;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub version: String,
    pub service: VaultService,
    pub advisor: Arc<dyn InsightAdvisor>,
    pub advisory_timeout: Duration,
    /// Wallet used by `/wallet/connect` when the request leaves it out.
    pub default_address: String,
    pub default_balance: u64,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full [`Router`] with all routes, CORS and request tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/wallet", get(wallet_handler))
        .route("/wallet/connect", post(connect_handler))
        .route("/wallet/balance", post(balance_handler))
        .route("/wallet/disconnect", post(disconnect_handler))
        .route("/vault", get(vault_handler))
        .route("/vault/tiers", get(tiers_handler))
        .route("/vault/locks", get(locks_handler))
        .route("/vault/transactions", post(submit_handler))
        .route("/vault/transactions/pending", delete(cancel_handler))
        .route("/vault/receipts", get(receipts_handler))
        .route("/vault/advisory", get(advisory_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request Types
// ---------------------------------------------------------------------------

/// Body of `POST /wallet/connect`. Both fields fall back to the configured
/// demo wallet.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectRequest {
    pub address: Option<String>,
    /// Decimal USDC, e.g. `"145.50"`.
    pub balance: Option<String>,
}

/// Body of `POST /wallet/balance`.
#[derive(Debug, Deserialize)]
pub struct BalanceRequest {
    /// Decimal USDC, e.g. `"120.00"`.
    pub balance: String,
}

/// Body of `POST /vault/transactions`.
#[derive(Debug, Deserialize)]
pub struct TransactionRequest {
    pub direction: Direction,
    /// Decimal USDC, e.g. `"50.00"`.
    pub amount: String,
    /// Lock key such as `"1_YEAR"`. Omit to keep the current lock; an
    /// unrecognized key counts as `NONE`.
    pub lock: Option<String>,
}

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// Response payload for `GET /status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub version: String,
    pub wallet_connected: bool,
    /// Id of the transaction awaiting commit, if any.
    pub pending: Option<Uuid>,
    pub receipt_count: usize,
    /// Last accepted transaction the reducer refused at commit, cleared by
    /// the next submit.
    pub last_failure: Option<FailedTransaction>,
    pub processing_delay_ms: u64,
    /// ISO-8601 timestamp of the response.
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WalletResponse {
    pub connected: bool,
    pub address: Option<String>,
    pub short_address: Option<String>,
    pub liquid_balance: u64,
    pub liquid_balance_display: String,
}

/// Response payload for `GET /vault`.
#[derive(Debug, Serialize, Deserialize)]
pub struct VaultResponse {
    pub vault_balance: u64,
    pub vault_balance_display: String,
    pub yield_earned: u64,
    pub yield_earned_display: String,
    pub points: u64,
    pub points_display: String,
    pub apy_bps: u32,
    pub apy_display: String,
    /// Yield a full year at the current APY would add.
    pub annual_yield: u64,
    pub annual_yield_display: String,
    pub lock_period: LockPeriod,
    /// Multiplier of the current lock, e.g. `"2x"`.
    pub multiplier: String,
    pub unlocked_tiers: Vec<TierBadge>,
    pub projection: Vec<ProjectionPoint>,
    pub next_tier: Option<TierProgress>,
    pub pending: Option<PendingTransaction>,
    pub last_failure: Option<FailedTransaction>,
}

/// One catalog entry for `GET /vault/tiers`.
#[derive(Debug, Serialize)]
pub struct TierResponse {
    #[serde(flatten)]
    pub spec: TierSpec,
    pub unlocked: bool,
    pub date_earned: Option<DateTime<Utc>>,
}

/// One row for `GET /vault/locks`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LockResponse {
    pub period: LockPeriod,
    pub label: String,
    pub apy_bps: u32,
    pub apy_display: String,
    pub multiplier_bps: u32,
    pub multiplier: String,
}

/// Response payload for `POST /vault/transactions`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    #[serde(flatten)]
    pub pending: PendingTransaction,
    pub commits_in_ms: u64,
}

/// A receipt plus its display hash.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReceiptResponse {
    #[serde(flatten)]
    pub receipt: TransactionReceipt,
    pub digest: String,
}

/// Error body returned by every endpoint on failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short message fit for a toast.
    pub error: String,
    /// Stable machine-readable code.
    pub code: String,
    /// Full error text.
    pub detail: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Handler error, rendered as an [`ErrorResponse`].
#[derive(Debug)]
pub struct ApiError(SessionError);

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError(err)
    }
}

impl From<VaultError> for ApiError {
    fn from(err: VaultError) -> Self {
        ApiError(SessionError::Vault(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = match &err {
            SessionError::Vault(VaultError::InvalidAmount(_))
            | SessionError::Vault(VaultError::Overflow(_)) => StatusCode::BAD_REQUEST,
            SessionError::Vault(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SessionError::WalletDisconnected
            | SessionError::TransactionPending(_)
            | SessionError::PendingMismatch { .. } => StatusCode::CONFLICT,
            SessionError::NoPendingTransaction => StatusCode::NOT_FOUND,
        };
        let error = match &err {
            SessionError::Vault(v) => v.user_message().to_string(),
            other => other.to_string(),
        };
        let body = ErrorResponse {
            error,
            code: err.code().to_string(),
            detail: err.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health`. 200 while the process is alive.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let (wallet_connected, pending, receipt_count, last_failure) = state.service.read(|s| {
        (
            s.wallet().connected,
            s.pending().map(|p| p.id),
            s.receipts().len(),
            s.last_failure().cloned(),
        )
    });

    Json(StatusResponse {
        version: state.version.clone(),
        wallet_connected,
        pending,
        receipt_count,
        last_failure,
        processing_delay_ms: delay_ms(&state),
        timestamp: Utc::now().to_rfc3339(),
    })
}

async fn wallet_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.service.read(|s| wallet_response(s.wallet())))
}

/// `POST /wallet/connect`. Connects with the given or default wallet.
///
/// An empty body is accepted and means "use the defaults". 409 while a
/// transaction is pending.
async fn connect_handler(
    State(state): State<AppState>,
    body: Option<Json<ConnectRequest>>,
) -> Result<Json<WalletResponse>, ApiError> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let balance = match req.balance.as_deref() {
        Some(text) => parse_amount(text)?,
        None => state.default_balance,
    };
    let address = req
        .address
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| state.default_address.clone());

    state.service.connect(address, balance)?;
    Ok(Json(state.service.read(|s| wallet_response(s.wallet()))))
}

/// `POST /wallet/balance`. Replaces the liquid balance with the provider's
/// figure. A pending transaction commits against the new balance.
async fn balance_handler(
    State(state): State<AppState>,
    Json(req): Json<BalanceRequest>,
) -> Result<Json<WalletResponse>, ApiError> {
    let balance = parse_amount(&req.balance)?;
    state.service.sync_balance(balance)?;
    Ok(Json(state.service.read(|s| wallet_response(s.wallet()))))
}

/// `POST /wallet/disconnect`. The vault is kept; only the wallet resets.
async fn disconnect_handler(State(state): State<AppState>) -> impl IntoResponse {
    let cancelled = state.service.disconnect();
    Json(serde_json::json!({
        "connected": false,
        "cancelled": cancelled.map(|p| p.id),
    }))
}

async fn vault_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.service.read(|s| {
        let vault = s.vault();
        let yearly = annual_yield(vault.vault_balance, vault.apy_bps);
        VaultResponse {
            vault_balance: vault.vault_balance,
            vault_balance_display: format_amount(vault.vault_balance),
            yield_earned: vault.yield_earned,
            yield_earned_display: format_amount(vault.yield_earned),
            points: vault.points,
            points_display: format_points(vault.points),
            apy_bps: vault.apy_bps,
            apy_display: format!("{}%", format_bps_percent(vault.apy_bps)),
            annual_yield: yearly,
            annual_yield_display: format_amount(yearly),
            lock_period: vault.lock_period,
            multiplier: vault.lock_period.multiplier_label(),
            unlocked_tiers: vault.unlocked_tiers.clone(),
            projection: project_vault(vault),
            next_tier: tier_progress(vault),
            pending: s.pending().cloned(),
            last_failure: s.last_failure().cloned(),
        }
    }))
}

async fn tiers_handler(State(state): State<AppState>) -> impl IntoResponse {
    let tiers: Vec<TierResponse> = state.service.read(|s| {
        TIER_CATALOG
            .iter()
            .map(|spec| {
                let badge = s
                    .vault()
                    .unlocked_tiers
                    .iter()
                    .find(|b| b.tier == spec.tier);
                TierResponse {
                    spec: *spec,
                    unlocked: badge.is_some(),
                    date_earned: badge.map(|b| b.date_earned),
                }
            })
            .collect()
    });
    Json(tiers)
}

async fn locks_handler() -> impl IntoResponse {
    let rows: Vec<LockResponse> = lock_policy()
        .into_iter()
        .map(|terms| LockResponse {
            period: terms.period,
            label: terms.period.label().to_string(),
            apy_bps: terms.apy_bps,
            apy_display: format!("{}%", format_bps_percent(terms.apy_bps)),
            multiplier_bps: terms.multiplier_bps,
            multiplier: terms.period.multiplier_label(),
        })
        .collect();
    Json(rows)
}

/// `POST /vault/transactions`. Validates and parks the transaction, then
/// answers 202. The commit lands after the processing delay.
async fn submit_handler(
    State(state): State<AppState>,
    Json(req): Json<TransactionRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let lock = req.lock.as_deref().map(LockPeriod::from_key);
    let intent = TransactionIntent::from_input(req.direction, &req.amount, lock)?;
    let pending = state.service.submit(intent)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitResponse {
            pending,
            commits_in_ms: delay_ms(&state),
        }),
    ))
}

async fn cancel_handler(
    State(state): State<AppState>,
) -> Result<Json<PendingTransaction>, ApiError> {
    Ok(Json(state.service.cancel()?))
}

async fn receipts_handler(State(state): State<AppState>) -> impl IntoResponse {
    let receipts: Vec<ReceiptResponse> = state.service.read(|s| {
        s.receipts()
            .iter()
            .map(|r| ReceiptResponse {
                digest: r.digest(),
                receipt: r.clone(),
            })
            .collect()
    });
    Json(receipts)
}

async fn advisory_handler(State(state): State<AppState>) -> Json<Advisory> {
    Json(
        state
            .service
            .advisory(state.advisor.as_ref(), state.advisory_timeout)
            .await,
    )
}

fn delay_ms(state: &AppState) -> u64 {
    u64::try_from(state.service.processing_delay().as_millis()).unwrap_or(u64::MAX)
}

fn wallet_response(wallet: &arc_vault::vault::WalletAccount) -> WalletResponse {
    WalletResponse {
        connected: wallet.connected,
        address: wallet.address.clone(),
        short_address: wallet.short_address(),
        liquid_balance: wallet.liquid_balance,
        liquid_balance_display: format_amount(wallet.liquid_balance),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
