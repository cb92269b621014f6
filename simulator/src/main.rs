//! Workload driver for the overdrive ledger.
//!
//! Registers a roster of accounts over an in-memory engine, hammers it with a
//! seeded random mix of economy operations from concurrent workers, and then
//! checks the books: balances never went negative (unsigned and
//! overflow-checked, so any violation would have trapped earlier) and every
//! currency is conserved against the tallied credits and debits.

use anyhow::{bail, ensure, Context as _, Result};
use clap::Parser;
use commonware_runtime::{tokio, Metrics, Runner as _, Spawner};
use overdrive_ledger::{Ledger, LedgerError, Memory};
use overdrive_types::{AccountId, Currency, EconomyRules, UpgradeKind, WagerOutcome};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Concurrent workload driver for the overdrive ledger")]
struct Args {
    /// Economy rules file (YAML, partial files override only named fields).
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Accounts to register. Each claims a distinct letter slot, so at most
    /// 25 fit beside the house.
    #[arg(long, default_value = "8")]
    accounts: usize,

    /// Operations per worker.
    #[arg(long, default_value = "10000")]
    operations: u64,

    /// Concurrent workers.
    #[arg(long, default_value = "4")]
    workers: usize,

    /// Workload seed.
    #[arg(long, default_value = "42")]
    seed: u64,
}

/// Credits and debits applied across the run, for the conservation check.
#[derive(Default)]
struct Tallies {
    applied: AtomicU64,
    rejected: AtomicU64,
    reloads: AtomicU64,
    coins_minted: AtomicU64,
    winnings: AtomicU64,
    prizes: AtomicU64,
    commissions: AtomicU64,
    losses: AtomicU64,
    payouts: AtomicU64,
    cash_spent: AtomicU64,
    coins_spent: AtomicU64,
}

impl Tallies {
    fn add(&self, counter: &AtomicU64, amount: u64) {
        counter.fetch_add(amount, Ordering::Relaxed);
    }
}

fn load_rules(path: Option<&PathBuf>) -> Result<EconomyRules> {
    let Some(path) = path else {
        return Ok(EconomyRules::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("could not read rules file {}", path.display()))?;
    serde_yaml::from_str(&raw).context("could not parse rules file")
}

/// Distinct-letter roster beside the house's reserved slot.
fn roster_names(rules: &EconomyRules, accounts: usize) -> Result<Vec<String>> {
    let house_letter = rules
        .house_name
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase());
    let names: Vec<String> = ('A'..='Z')
        .filter(|letter| Some(*letter) != house_letter)
        .take(accounts)
        .map(|letter| format!("{letter}racer"))
        .collect();
    ensure!(
        names.len() == accounts,
        "at most {} accounts fit beside the house",
        names.len()
    );
    Ok(names)
}

async fn run_worker(
    ledger: Arc<Ledger<tokio::Context, Memory>>,
    roster: Arc<Vec<AccountId>>,
    tallies: Arc<Tallies>,
    operations: u64,
    mut rng: StdRng,
) -> Result<()> {
    let rules = ledger.rules().clone();
    for _ in 0..operations {
        let id = &roster[rng.gen_range(0..roster.len())];
        let outcome = match rng.gen_range(0..9u8) {
            0 => {
                let amount = rng.gen_range(1..=1_000u64);
                ledger.reload(id, amount).await.map(|_| {
                    tallies.add(&tallies.reloads, amount);
                    tallies.add(
                        &tallies.coins_minted,
                        amount * rules.reload_conversion_rate,
                    );
                })
            }
            1 => ledger.buy_ticket_bundle(id).await.map(|_| {
                tallies.add(&tallies.cash_spent, rules.ticket_bundle.cost);
            }),
            2 => ledger.spend_ticket(id).await.map(|_| ()),
            3 => ledger.earn_tickets(id).await.map(|_| ()),
            4 => {
                let rank = rng.gen_range(1..=5u8);
                ledger.race_complete(id, rank).await.map(|_| {
                    tallies.add(&tallies.prizes, rules.race_payout(rank));
                })
            }
            5 => {
                let bet = rng.gen_range(1..=200u64);
                ledger.resolve_wager(id, bet, WagerOutcome::Won).await.map(|_| {
                    tallies.add(&tallies.winnings, bet);
                })
            }
            6 => {
                let bet = rng.gen_range(1..=200u64);
                ledger.resolve_wager(id, bet, WagerOutcome::Lost).await.map(|_| {
                    tallies.add(&tallies.losses, bet);
                    tallies.add(&tallies.commissions, rules.commission(bet));
                })
            }
            7 => {
                let kind = match rng.gen_range(0..4u8) {
                    0 => UpgradeKind::Engine,
                    1 => UpgradeKind::Rims,
                    2 => UpgradeKind::Turbo,
                    _ => UpgradeKind::CarSpeed,
                };
                let cost = rules.upgrade_cost(kind);
                ledger.buy_upgrade(id, kind).await.map(|_| {
                    match cost.currency {
                        Currency::Cash => tallies.add(&tallies.cash_spent, cost.amount),
                        Currency::Coins => tallies.add(&tallies.coins_spent, cost.amount),
                    }
                })
            }
            _ => ledger.withdraw(id, "0771234567").await.map(|_| {
                tallies.add(&tallies.payouts, rules.withdrawal_payout);
            }),
        };
        match outcome {
            Ok(()) => tallies.add(&tallies.applied, 1),
            Err(LedgerError::Validation(_)) | Err(LedgerError::Precondition(_)) => {
                tallies.add(&tallies.rejected, 1)
            }
            Err(err) => bail!("unexpected ledger failure: {err}"),
        }
    }
    Ok(())
}

async fn run(context: tokio::Context, args: Args) -> Result<()> {
    let rules = load_rules(args.rules.as_ref())?;
    let names = roster_names(&rules, args.accounts)?;

    let ledger = Arc::new(Ledger::init(context.clone(), rules, Memory::default()).await?);
    let mut roster = Vec::with_capacity(names.len());
    for name in &names {
        roster.push(ledger.register(name).await?.id);
    }
    let roster = Arc::new(roster);
    info!(accounts = roster.len(), workers = args.workers, "roster registered");

    let tallies = Arc::new(Tallies::default());
    let mut handles = Vec::with_capacity(args.workers);
    for worker in 0..args.workers {
        let ledger = ledger.clone();
        let roster = roster.clone();
        let tallies = tallies.clone();
        let operations = args.operations;
        let rng = StdRng::seed_from_u64(args.seed.wrapping_add(worker as u64));
        handles.push(
            context
                .with_label("worker")
                .spawn(move |_| run_worker(ledger, roster, tallies, operations, rng)),
        );
    }
    for handle in handles {
        handle.await.map_err(|err| anyhow::anyhow!("worker task failed: {err:?}"))??;
    }

    // The books must balance: total cash equals everything credited minus
    // everything debited, and likewise for coins.
    let mut total_cash: u64 = 0;
    let mut total_coins: u64 = 0;
    for id in roster.iter().chain(std::iter::once(ledger.house())) {
        let view = ledger.account(id).await?;
        total_cash += view.real_balance;
        total_coins += view.game_currency;
    }
    let credits = tallies.reloads.load(Ordering::Relaxed) as i128
        + tallies.winnings.load(Ordering::Relaxed) as i128
        + tallies.prizes.load(Ordering::Relaxed) as i128
        + tallies.commissions.load(Ordering::Relaxed) as i128;
    let debits = tallies.losses.load(Ordering::Relaxed) as i128
        + tallies.payouts.load(Ordering::Relaxed) as i128
        + tallies.cash_spent.load(Ordering::Relaxed) as i128;
    ensure!(
        total_cash as i128 == credits - debits,
        "cash not conserved: held {total_cash}, expected {}",
        credits - debits
    );
    let coins_expected = tallies.coins_minted.load(Ordering::Relaxed) as i128
        - tallies.coins_spent.load(Ordering::Relaxed) as i128;
    ensure!(
        total_coins as i128 == coins_expected,
        "coins not conserved: held {total_coins}, expected {coins_expected}"
    );

    let pending = ledger.pending_withdrawals().await?;
    info!(
        applied = tallies.applied.load(Ordering::Relaxed),
        rejected = tallies.rejected.load(Ordering::Relaxed),
        cash = total_cash,
        coins = total_coins,
        pending_withdrawals = pending.len(),
        "workload complete, books balance"
    );
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();
    let args = Args::parse();

    let executor = tokio::Runner::new(tokio::Config::default());
    executor.start(|context| async move { run(context, args).await })
}
