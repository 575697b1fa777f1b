//! Pool rehearsal driver - runs scripted operations against the simulated pool
//!
//! Usage:
//!   amm-sim --op swap:A:1 --op add:2:5000 --op remove:100
//!   amm-sim --config config/simulator.toml --op swap:B:2500 --json
//!   AMM__GENESIS__RESERVE0=500 amm-sim --no-latency --op remove:10

mod script;

use amm_config::SimulatorConfig;
use anyhow::Result;
use clap::Parser;
use pool_state::{AmmFacade, Mode, OfflineRemote, StoreStats};
use rust_decimal::Decimal;
use script::{run_op, OpReport, ScriptOp};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "amm-sim")]
#[command(about = "Constant product pool rehearsal driver")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,

    /// Operation to run, in order: swap:A|B:<amount>, add:<a0>:<a1>, remove:<shares>, reset
    #[arg(long = "op")]
    ops: Vec<ScriptOp>,

    /// Skip the artificial transaction latency
    #[arg(long)]
    no_latency: bool,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,
}

/// Final state printed after the run
#[derive(Debug, Serialize)]
struct Snapshot {
    mode: Mode,
    token0: String,
    token1: String,
    reserve0: Decimal,
    reserve1: Decimal,
    total_shares: Decimal,
    k: Decimal,
    price: Decimal,
    balance_a: Decimal,
    balance_b: Decimal,
    lp_shares: Decimal,
    pool_share_pct: Decimal,
    stats: StoreStats,
    operations: Vec<OpReport>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = SimulatorConfig::load(args.config.as_deref())?;
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.json = true;
    }
    if args.no_latency {
        config.simulation.swap_latency_ms = 0;
        config.simulation.liquidity_latency_ms = 0;
    }
    init_logging(&config)?;

    info!("Starting pool rehearsal");
    if let Some(path) = &args.config {
        info!("Configuration: {}", path.display());
    }
    if config.start_remote()? {
        warn!("No remote pool client in this driver; running in simulated mode");
        config.simulation.mode = "simulated".to_string();
    }

    let facade = AmmFacade::from_config(&config, Arc::new(OfflineRemote))?;
    let pool = facade.pool_state();
    info!(
        "Genesis pool: reserve0={} reserve1={} total_shares={} price={}",
        pool.reserve0,
        pool.reserve1,
        pool.total_shares,
        pool.price()
    );
    log_latency(facade.settings().swap_latency, facade.settings().liquidity_latency);

    let mut operations = Vec::with_capacity(args.ops.len());
    for op in &args.ops {
        let report = run_op(&facade, op).await;
        if report.ok {
            info!("{}: {}", report.op, report.detail);
        } else {
            error!("{} failed: {}", report.op, report.detail);
        }
        operations.push(report);
    }

    let pool = facade.pool_state();
    let position = facade.user_balances();
    let snapshot = Snapshot {
        mode: facade.mode(),
        token0: format!("0x{}", hex::encode(pool.token0)),
        token1: format!("0x{}", hex::encode(pool.token1)),
        reserve0: pool.reserve0,
        reserve1: pool.reserve1,
        total_shares: pool.total_shares,
        k: pool.k(),
        price: pool.price(),
        balance_a: position.balance_a,
        balance_b: position.balance_b,
        lp_shares: position.lp_shares,
        pool_share_pct: position.pool_share(&pool),
        stats: facade.store_stats(),
        operations,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_snapshot(&snapshot);
    }

    Ok(())
}

fn init_logging(config: &SimulatorConfig) -> Result<()> {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))?;

    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    Ok(())
}

fn log_latency(swap: Duration, liquidity: Duration) {
    if swap.is_zero() && liquidity.is_zero() {
        info!("Artificial latency disabled");
    } else {
        info!(
            "Artificial latency: swap {}ms, liquidity {}ms",
            swap.as_millis(),
            liquidity.as_millis()
        );
    }
}

fn print_snapshot(snapshot: &Snapshot) {
    println!("mode:          {:?}", snapshot.mode);
    println!("token0:        {}", snapshot.token0);
    println!("token1:        {}", snapshot.token1);
    println!("reserve0:      {}", snapshot.reserve0);
    println!("reserve1:      {}", snapshot.reserve1);
    println!("total shares:  {}", snapshot.total_shares);
    println!("k:             {}", snapshot.k);
    println!("price:         {}", snapshot.price);
    println!(
        "wallet:        {} token0, {} token1, {} LP ({}% of pool)",
        snapshot.balance_a, snapshot.balance_b, snapshot.lp_shares, snapshot.pool_share_pct
    );
    println!(
        "operations:    {} applied, {} rejected, {} resets",
        snapshot.stats.applied, snapshot.stats.rejected, snapshot.stats.resets
    );
    for report in &snapshot.operations {
        let mark = if report.ok { "ok " } else { "err" };
        println!("  [{}] {}: {}", mark, report.op, report.detail);
    }
}
