// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Arc Vault Service
//!
//! Entry point for the `arc-vault` binary. Parses CLI arguments, initializes
//! logging and metrics, and serves the vault session over HTTP.
//!
//! Subcommands:
//!
//! - `run`: start the API and metrics servers
//! - `apply`: apply one transaction to a state file
//! - `version`: print build version information

mod api;
mod cli;
mod logging;
mod metrics;
mod service;
mod store;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

use arc_vault::advisory::RuleBasedAdvisor;
use arc_vault::config::{DEMO_WALLET_ADDRESS, DEMO_WALLET_BALANCE, ENGINE_VERSION};
use arc_vault::vault::{parse_amount, TransactionIntent, VaultAccount};
use arc_vault::VaultSession;

use cli::{ArcVaultCli, Commands};
use logging::LogFormat;
use metrics::VaultMetrics;
use service::VaultService;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = ArcVaultCli::parse();

    match cli.command {
        Commands::Run(args) => run_service(args).await,
        Commands::Apply(args) => apply_once(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Starts the API server and the metrics endpoint and runs until a
/// shutdown signal arrives.
async fn run_service(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(
        logging::DEFAULT_FILTER,
        LogFormat::from_str_lossy(&args.log_format),
    );

    tracing::info!(
        port = args.port,
        metrics_port = args.metrics_port,
        state_file = ?args.state_file,
        processing_delay_ms = args.processing_delay_ms,
        "starting arc-vault"
    );

    // --- Session ---
    let session = open_session(args.state_file.as_deref(), !args.no_demo_seed)?;

    // --- Metrics ---
    let vault_metrics = Arc::new(VaultMetrics::new());

    // --- Application state ---
    let service = VaultService::new(
        session,
        Arc::clone(&vault_metrics),
        Duration::from_millis(args.processing_delay_ms),
        args.state_file.clone(),
    );
    let app_state = api::AppState {
        version: format!("{} (engine {})", env!("CARGO_PKG_VERSION"), ENGINE_VERSION),
        service,
        advisor: Arc::new(RuleBasedAdvisor::new()),
        advisory_timeout: Duration::from_millis(args.advisory_timeout_ms),
        default_address: DEMO_WALLET_ADDRESS.to_string(),
        default_balance: DEMO_WALLET_BALANCE,
    };

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = format!("{}:{}", args.host, args.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", api_addr))?;
    tracing::info!("API server listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&vault_metrics));
    let metrics_addr = format!("{}:{}", args.host, args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("Metrics server listening on {}", metrics_addr);

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("Metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received");
        }
    }

    tracing::info!("arc-vault stopped");
    Ok(())
}

/// Loads the session from `state_file` if it exists, otherwise starts a new
/// one (demo-seeded unless `demo_seed` is false).
fn open_session(state_file: Option<&Path>, demo_seed: bool) -> Result<VaultSession> {
    if let Some(path) = state_file {
        if let Some(snapshot) = store::load(path)? {
            tracing::info!(
                path = %path.display(),
                receipts = snapshot.receipts.len(),
                "session restored"
            );
            return Ok(VaultSession::from_snapshot(snapshot));
        }
    }
    Ok(if demo_seed {
        VaultSession::demo()
    } else {
        VaultSession::new(VaultAccount::new())
    })
}

/// Applies one transaction to the state file with no delay and prints the
/// receipt and resulting snapshot as JSON on stdout.
fn apply_once(args: cli::ApplyArgs) -> Result<()> {
    logging::init_logging("arc_vault=warn", LogFormat::Pretty);

    let mut session = open_session(Some(&args.state_file), true)?;
    if !session.wallet().connected {
        let balance = parse_amount(&args.balance).context("invalid --balance")?;
        session
            .connect(args.address.clone(), balance)
            .context("failed to connect wallet")?;
    }

    let intent = TransactionIntent::from_input(args.direction, &args.amount, args.lock)
        .context("invalid amount")?;
    let receipt = session
        .execute(intent)
        .context("transaction rejected")?;

    store::save(&args.state_file, &session.snapshot())?;

    let out = serde_json::json!({
        "receipt": receipt,
        "digest": receipt.digest(),
        "snapshot": session.snapshot(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn print_version() {
    println!("arc-vault {}", env!("CARGO_PKG_VERSION"));
    println!("engine    {}", ENGINE_VERSION);
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
