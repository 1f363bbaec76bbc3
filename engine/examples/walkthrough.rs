//! Terminal walkthrough of a rider's first week with the vault.
//!
//! Connects the demo wallet, makes a few deposits with different locks,
//! tries an overdraft, withdraws below a threshold, and asks the advisor
//! for a tip along the way. Output uses ANSI colors.
//!
//! Run with:
//!   cargo run --example walkthrough --release

use std::time::Instant;

use arc_vault::advisory::{advise, RuleBasedAdvisor};
use arc_vault::config::{ADVISORY_TIMEOUT, DEMO_WALLET_ADDRESS, DEMO_WALLET_BALANCE};
use arc_vault::vault::{
    format_amount, format_bps_percent, format_points, lock_policy, project_vault, tier_progress,
    LockPeriod, TransactionIntent,
};
use arc_vault::VaultSession;

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

const BG_BLUE: &str = "\x1b[44m";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn banner() {
    println!();
    println!("{BG_BLUE}{BOLD}{WHITE}                                                          {RESET}");
    println!("{BG_BLUE}{BOLD}{WHITE}    TRANSIT ARC  --  Vault Walkthrough                    {RESET}");
    println!("{BG_BLUE}{BOLD}{WHITE}                                                          {RESET}");
    println!();
}

fn section(num: u32, title: &str) {
    println!();
    println!("{BOLD}{CYAN}===[{YELLOW} Step {num} {CYAN}]============================================{RESET}");
    println!("{BOLD}{WHITE}  {title}{RESET}");
}

fn success(text: &str) {
    println!("{GREEN}  [OK] {text}{RESET}");
}

fn failure(text: &str) {
    println!("{RED}  [REJECTED] {text}{RESET}");
}

fn info(label: &str, value: &str) {
    println!("{WHITE}  {BOLD}{label}:{RESET} {YELLOW}{value}{RESET}");
}

fn show_state(session: &VaultSession) {
    let vault = session.vault();
    info("Wallet", &format!("{} USDC", format_amount(session.wallet().liquid_balance)));
    info("Vault", &format!("{} USDC", format_amount(vault.vault_balance)));
    info("Points", &format_points(vault.points));
    info(
        "Lock",
        &format!(
            "{} at {}% APY ({})",
            vault.lock_period.label(),
            format_bps_percent(vault.apy_bps),
            vault.lock_period.multiplier_label()
        ),
    );
    let badges: Vec<_> = vault.unlocked_tiers.iter().map(|b| b.name.as_str()).collect();
    info("Badges", &if badges.is_empty() { "none yet".to_string() } else { badges.join(", ") });
}

fn run(session: &mut VaultSession, intent: TransactionIntent) {
    let label = format!("{} {} USDC", intent.direction, format_amount(intent.amount));
    match session.execute(intent) {
        Ok(receipt) => {
            success(&label);
            println!("{DIM}  tx {}{RESET}", receipt.digest());
            for tier in &receipt.tiers_unlocked {
                println!("{BOLD}{YELLOW}  * Unlocked {tier}{RESET}");
            }
        }
        Err(err) => failure(&format!("{label}: {err}")),
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    let started = Instant::now();
    let advisor = RuleBasedAdvisor::new();

    banner();

    section(1, "Lock policy");
    for terms in lock_policy() {
        info(
            terms.period.label(),
            &format!(
                "{}% APY, {} points",
                format_bps_percent(terms.apy_bps),
                terms.period.multiplier_label()
            ),
        );
    }

    section(2, "Connect wallet");
    let mut session = VaultSession::demo();
    if let Err(err) = session.connect(DEMO_WALLET_ADDRESS, DEMO_WALLET_BALANCE) {
        failure(&format!("connect: {err}"));
        return;
    }
    info("Address", &session.wallet().short_address().unwrap_or_default());
    show_state(&session);

    section(3, "First deposit, no lock");
    run(&mut session, TransactionIntent::deposit(50_000_000));
    show_state(&session);

    section(4, "Locked deposit for a year");
    run(
        &mut session,
        TransactionIntent::deposit_with_lock(40_000_000, LockPeriod::OneYear),
    );
    show_state(&session);

    section(5, "Overdraft attempt");
    run(&mut session, TransactionIntent::deposit(500_000_000));
    show_state(&session);

    section(6, "Withdraw below Bronze");
    run(&mut session, TransactionIntent::withdraw(60_000_000));
    show_state(&session);

    section(7, "Outlook");
    if let Some(progress) = tier_progress(session.vault()) {
        info(
            "Next tier",
            &format!("{} in {} USDC", progress.next_tier, format_amount(progress.remaining)),
        );
    }
    for point in project_vault(session.vault()) {
        println!("{DIM}  +{}mo  {} USDC{RESET}", point.month_offset, format_amount(point.value));
    }
    let tip = advise(
        &advisor,
        session.vault().vault_balance,
        session.vault().points,
        ADVISORY_TIMEOUT,
    )
    .await;
    info("Advisor", &tip.text);

    println!();
    println!(
        "{DIM}  {} receipts in {:.2} ms{RESET}",
        session.receipts().len(),
        started.elapsed().as_secs_f64() * 1000.0
    );
}
