//! Intent Market - Binary Entry Point
//!
//! Runs a scripted session on the simulation host: three makers stake
//! intents on a WETH/DAI market, then a taker fills one order on each side
//! against whichever maker quotes best.

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use intent_market::config::{ConfigError, EngineConfig};
use intent_market::engine::MatchExecutor;
use intent_market::error::{MatchError, RegistryError};
use intent_market::indexer::LocalIndexer;
use intent_market::sim::{RuleCounterparty, SimHost};
use intent_market::types::amount::{from_units, to_units};
use intent_market::types::{Address, Locator};

const DECIMALS: u32 = 6;

#[derive(Parser)]
#[command(name = "intent-market")]
#[command(about = "Staked-intent market demo", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Candidates considered per fill (overrides the config)
    #[arg(long, value_name = "N")]
    max_intents: Option<usize>,
}

#[derive(Error, Debug)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error("Invalid demo amount: {0}")]
    Amount(String),
}

fn main() -> Result<(), DemoError> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    setup_tracing(&config.log_level);

    let max_intents = cli.max_intents.unwrap_or(config.executor.max_intents);
    run_demo(&config, max_intents)
}

fn setup_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn units(s: &str) -> Result<u128, DemoError> {
    to_units(s, DECIMALS).ok_or_else(|| DemoError::Amount(s.to_string()))
}

fn price(s: &str) -> Result<Decimal, DemoError> {
    Decimal::from_str(s).map_err(|_| DemoError::Amount(s.to_string()))
}

fn run_demo(config: &EngineConfig, max_intents: usize) -> Result<(), DemoError> {
    let weth = Address::from_low_u64(0x10);
    let dai = Address::from_low_u64(0x11);
    let settlement = Address::from_low_u64(0x5e);
    let executor_id = Address::from_low_u64(0xe0);
    let taker = Address::from_low_u64(0xca);

    info!("===========================================");
    info!("  Intent Market - simulation");
    info!("===========================================");

    let mut indexer = LocalIndexer::with_config(
        Address::from_low_u64(0x1d),
        Address::from_low_u64(0x0a),
        config.registry.clone(),
    );
    indexer.create_market(weth, dai)?;

    let mut host = SimHost::new(settlement);
    host.set_now(1_700_000_000);

    // (name, identity, stake, WETH per DAI, max DAI)
    let makers = [
        ("alice", 0xa1, "2000", "0.00052", "5000"),
        ("bob", 0xb0, "500", "0.00049", "5000"),
        ("carol", 0xc0, "1500", "0.00050", "200"),
    ];
    for (name, id, stake, rate, max) in makers {
        let maker = Address::from_low_u64(id);
        let locator = Locator::from_address(maker);

        indexer.set_intent(maker, weth, dai, units(stake)?, u64::MAX, locator)?;
        host.add_counterparty(
            locator,
            RuleCounterparty::new(maker, maker).with_rule(weth, dai, units(max)?, price(rate)?),
        );
        host.mint(dai, maker, units("10000")?);
        host.set_allowance(dai, maker, settlement, u128::MAX);
        info!(name, %maker, stake, rate, "maker staked");
    }

    if let Some(market) = indexer.market(weth, dai) {
        for (rank, intent) in market.iter().enumerate() {
            info!(
                rank,
                staker = %intent.staker(),
                stake = %from_units(intent.stake_amount, DECIMALS),
                "market entry"
            );
        }
    }

    let events = indexer.take_events(weth, dai)?;
    info!(count = events.len(), "market events drained");

    host.mint(weth, taker, units("10")?);
    host.set_allowance(weth, taker, executor_id, u128::MAX);

    let executor = MatchExecutor::new(executor_id, settlement, &indexer, config.executor.clone());

    // Buy 1000 DAI at the lowest WETH cost
    let fill = executor.fill_best_sender_side_order(&mut host, taker, units("1000")?, dai, weth, max_intents)?;
    info!(
        maker = %fill.counterparty,
        paid_weth = %from_units(fill.signer_amount, DECIMALS),
        got_dai = %from_units(fill.sender_amount, DECIMALS),
        "sender-side fill"
    );

    // Spend 0.1 WETH for the most DAI; a new timestamp keeps the nonce fresh
    host.advance(1);
    let fill = executor.fill_best_signer_side_order(&mut host, taker, units("0.1")?, weth, dai, max_intents)?;
    info!(
        maker = %fill.counterparty,
        paid_weth = %from_units(fill.signer_amount, DECIMALS),
        got_dai = %from_units(fill.sender_amount, DECIMALS),
        "signer-side fill"
    );

    info!(
        weth = %from_units(host.balance_of(weth, taker), DECIMALS),
        dai = %from_units(host.balance_of(dai, taker), DECIMALS),
        settled = host.settled().len(),
        "taker balances"
    );
    Ok(())
}
