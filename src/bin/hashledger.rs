#![forbid(unsafe_code)]
use clap::Parser;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use hashledger::config::{default_config_path, load_config, validate_config};
use hashledger::crypto::{Address, KeyPair};
use hashledger::transaction::{Transaction, TransferTx};
use hashledger::Blockchain;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Builds a small ledger, moves value between two wallets and checks the chain.
#[derive(Parser, Debug)]
#[command(name = "hashledger", version, about)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Leading zero hex characters required per block
    #[arg(long)]
    difficulty: Option<u32>,

    /// Amount credited for each mined block
    #[arg(long)]
    reward: Option<u64>,

    /// Give up on a block after this many nonce attempts
    #[arg(long)]
    max_attempts: Option<u64>,

    /// Rewrite a reward in block 2 after mining and show what validation reports
    #[arg(long)]
    tamper: bool,

    /// Print the chain as JSON at the end
    #[arg(long)]
    dump: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = load_config(&config_path)?;
    if let Some(difficulty) = cli.difficulty {
        config.chain.difficulty = difficulty;
    }
    if let Some(reward) = cli.reward {
        config.chain.mining_reward = reward;
    }
    if let Some(max_attempts) = cli.max_attempts {
        config.miner.max_attempts = Some(max_attempts);
    }
    validate_config(&config)?;
    info!(path = %config_path.display(), ?config, "loaded configuration");

    let mut chain = Blockchain::from_config(&config.chain).with_limits(config.miner.limits());

    let alice = KeyPair::generate();
    let bob = KeyPair::generate();
    let miner = config
        .miner
        .beneficiary
        .clone()
        .map(Address::new)
        .unwrap_or_else(|| alice.address());

    println!("{}", "hashledger demo".bold());
    println!("Alice:  {}", alice.address());
    println!("Bob:    {}", bob.address());
    println!("Miner:  {}", miner);
    println!(
        "Difficulty {} / reward {}\n",
        chain.difficulty, chain.mining_reward
    );

    let rounds: [(&KeyPair, Address, u64); 3] = [
        (&alice, bob.address(), 50),
        (&bob, alice.address(), 20),
        (&alice, bob.address(), 10),
    ];

    for (from, to, amount) in rounds {
        let tx: Transaction = TransferTx::create(from, to, amount)?.into();
        chain.add_transaction(tx)?;
        mine_round(&mut chain, &miner)?;
    }

    print_balances(&chain, &[("Alice", alice.address()), ("Bob", bob.address()), ("Miner", miner)]);
    report_validity(&chain);

    if cli.tamper {
        tamper(&mut chain);
        report_validity(&chain);
    }

    if cli.dump {
        println!("{}", chain.to_json()?);
    }

    Ok(())
}

fn mine_round(chain: &mut Blockchain, miner: &Address) -> Result<(), Box<dyn std::error::Error>> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(format!(
        "mining block {} ({} pending)",
        chain.len(),
        chain.pending.len()
    ));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = chain.mine_pending_transactions(miner);
    spinner.finish_and_clear();
    let stats = result?;

    let block = chain.last_block();
    println!(
        "{} block {} {} nonce={} attempts={} in {} ({:.0} H/s)",
        "mined".green(),
        chain.len() - 1,
        &block.hash_hex()[..16],
        stats.nonce,
        stats.attempts,
        humantime::format_duration(Duration::from_millis(stats.elapsed.as_millis() as u64)),
        stats.hash_rate()
    );
    Ok(())
}

fn print_balances(chain: &Blockchain, wallets: &[(&str, Address)]) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Wallet", "Address", "Balance"]);
    for (name, address) in wallets {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{}…", address.short())),
            Cell::new(chain.balance_of(address)),
        ]);
    }
    println!("\n{table}");

    let pending: u64 = chain.pending_transactions().iter().map(Transaction::amount).sum();
    println!("Pending (next block): {}", pending);
}

fn report_validity(chain: &Blockchain) {
    match chain.validate() {
        Ok(()) => println!("Chain valid: {}", "yes".green().bold()),
        Err(violation) => println!("Chain valid: {} ({})", "no".red().bold(), violation),
    }
}

fn tamper(chain: &mut Blockchain) {
    let Some(block) = chain.blocks.get_mut(2) else {
        println!("Not enough blocks to tamper with");
        return;
    };
    for tx in &mut block.transactions {
        if let Transaction::Reward(reward) = tx {
            reward.amount = reward.amount.saturating_mul(10);
        }
    }
    block.hash = block.calculate_hash();
    println!("\n{}", "Rewrote the reward in block 2 and recomputed its hash".yellow());
}
