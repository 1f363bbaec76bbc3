//! # CLI Interface
//!
//! Command-line structure for `arc-vault`, built with `clap` derive. Every
//! runtime option can also come from an `ARC_VAULT_*` environment variable.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use arc_vault::config::{ADVISORY_TIMEOUT, DEMO_WALLET_ADDRESS, PROCESSING_DELAY_MS};
use arc_vault::vault::{Direction, LockPeriod};

/// Transit Arc vault service.
///
/// Serves the vault engine over HTTP with Prometheus metrics, or applies
/// single transactions to a JSON state file.
#[derive(Parser, Debug)]
#[command(
    name = "arc-vault",
    about = "Transit Arc vault service",
    version,
    propagate_version = true
)]
pub struct ArcVaultCli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API and metrics servers.
    Run(RunArgs),
    /// Apply one deposit or withdrawal to a state file and print the result.
    Apply(ApplyArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Address to bind both servers to.
    #[arg(long, env = "ARC_VAULT_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port for the REST API.
    #[arg(long, env = "ARC_VAULT_PORT", default_value_t = 8787)]
    pub port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "ARC_VAULT_METRICS_PORT", default_value_t = 9787)]
    pub metrics_port: u16,

    /// JSON snapshot to load at start and rewrite after every change.
    ///
    /// Without it the session lives in memory only.
    #[arg(long, short = 's', env = "ARC_VAULT_STATE_FILE")]
    pub state_file: Option<PathBuf>,

    /// Delay between accepting a transaction and committing it.
    #[arg(long, env = "ARC_VAULT_PROCESSING_DELAY_MS", default_value_t = PROCESSING_DELAY_MS)]
    pub processing_delay_ms: u64,

    /// Upper bound on an advisory lookup before the fallback text is used.
    #[arg(
        long,
        env = "ARC_VAULT_ADVISORY_TIMEOUT_MS",
        default_value_t = u64::try_from(ADVISORY_TIMEOUT.as_millis()).unwrap_or(u64::MAX)
    )]
    pub advisory_timeout_ms: u64,

    /// Start a fresh session with an empty vault instead of the demo seed.
    #[arg(long, env = "ARC_VAULT_NO_DEMO_SEED")]
    pub no_demo_seed: bool,

    /// Log format: `pretty` or `json`.
    #[arg(long, env = "ARC_VAULT_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

/// Arguments for the `apply` subcommand.
#[derive(Parser, Debug)]
pub struct ApplyArgs {
    /// State file to read and update. Created if missing.
    #[arg(long, short = 's', env = "ARC_VAULT_STATE_FILE")]
    pub state_file: PathBuf,

    /// `deposit` or `withdraw`.
    #[arg(value_parser = parse_direction)]
    pub direction: Direction,

    /// Decimal USDC amount, e.g. `50.00`.
    pub amount: String,

    /// Lock period for a deposit: NONE, 30_DAYS, 90_DAYS or 1_YEAR.
    #[arg(long, value_parser = parse_lock)]
    pub lock: Option<LockPeriod>,

    /// Wallet address used if the state file has no connected wallet.
    #[arg(long, default_value = DEMO_WALLET_ADDRESS)]
    pub address: String,

    /// Wallet balance used if the state file has no connected wallet.
    #[arg(long, default_value = "145.50")]
    pub balance: String,
}

fn parse_direction(s: &str) -> Result<Direction, String> {
    match s.to_ascii_lowercase().as_str() {
        "deposit" => Ok(Direction::Deposit),
        "withdraw" => Ok(Direction::Withdraw),
        other => Err(format!("unknown direction {other:?} (expected deposit or withdraw)")),
    }
}

fn parse_lock(s: &str) -> Result<LockPeriod, String> {
    LockPeriod::parse_strict(s).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        ArcVaultCli::command().debug_assert();
    }

    #[test]
    fn apply_parses_direction_and_lock() {
        let cli = ArcVaultCli::try_parse_from([
            "arc-vault", "apply", "-s", "state.json", "Deposit", "50.00", "--lock", "1_year",
        ])
        .unwrap();
        match cli.command {
            Commands::Apply(args) => {
                assert_eq!(args.direction, Direction::Deposit);
                assert_eq!(args.lock, Some(LockPeriod::OneYear));
                assert_eq!(args.amount, "50.00");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn apply_rejects_unknown_direction() {
        let res = ArcVaultCli::try_parse_from(["arc-vault", "apply", "-s", "s.json", "borrow", "1"]);
        assert!(res.is_err());
    }

    #[test]
    fn run_defaults() {
        let cli = ArcVaultCli::try_parse_from(["arc-vault", "run"]).unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.port, 8787);
                assert_eq!(args.processing_delay_ms, 2_000);
                assert!(args.state_file.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
