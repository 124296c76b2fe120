//! Command line interface for the range position backtester.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use rangesim_data::{CsvSnapshotWriter, DEFAULT_LOG_BATCH, RpcLogProvider, TraceStore};
use rangesim_domain::PoolConfig;
use rangesim_simulation::engine::BacktestEngine;
use rangesim_simulation::state::BacktestConfig;
use rangesim_simulation::strategies::LazyRecenter;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rangesim")]
#[command(about = "Backtester for lazily re-centered concentrated-liquidity positions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch swap logs and persist the trace for a pool
    Ingest {
        /// Pool contract address
        #[arg(short, long)]
        pool: String,

        /// First block of the trace when no file exists yet
        #[arg(long, default_value_t = 0)]
        start_block: u64,

        /// Directory holding trace files
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Blocks per log query window
        #[arg(long, default_value_t = DEFAULT_LOG_BATCH)]
        batch: u64,

        /// JSON-RPC endpoint (falls back to RPC_URL)
        #[arg(long)]
        rpc_url: Option<String>,
    },
    /// Replay a persisted trace against a lazily re-centered position
    Backtest {
        /// Pool contract address
        #[arg(short, long)]
        pool: String,

        /// First block of the trace when no file exists yet
        #[arg(long, default_value_t = 0)]
        start_block: u64,

        /// Tick spacing of the pool
        #[arg(long, default_value_t = 200)]
        tick_spacing: i32,

        /// Decimals of token0
        #[arg(long, default_value_t = 18, value_parser = clap::value_parser!(u32).range(0..=28))]
        decimals0: u32,

        /// Decimals of token1
        #[arg(long, default_value_t = 18, value_parser = clap::value_parser!(u32).range(0..=28))]
        decimals1: u32,

        /// Directory holding trace and snapshot files
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Position width in tick spacings
        #[arg(short, long, default_value_t = 20)]
        width: i32,

        /// Snapshot every Nth observation
        #[arg(short, long, default_value_t = 1_000)]
        interval: u64,

        /// Seed notional in token0 human units
        #[arg(long, default_value_t = 1.0)]
        notional0: f64,

        /// Seed notional in token1 human units
        #[arg(long, default_value_t = 1.0)]
        notional1: f64,

        /// Snapshot CSV path (defaults to snapshots-<pool>.csv in the data dir)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Sync the trace from the RPC endpoint before replaying
        #[arg(long)]
        sync: bool,

        /// JSON-RPC endpoint (falls back to RPC_URL)
        #[arg(long)]
        rpc_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Ingest {
            pool,
            start_block,
            data_dir,
            batch,
            rpc_url,
        } => {
            let url = rpc_endpoint(rpc_url);
            let pool_config = PoolConfig::new(pool).with_start_block(*start_block);

            fs::create_dir_all(data_dir)
                .with_context(|| format!("creating {}", data_dir.display()))?;
            let path = trace_path(data_dir, pool);
            let mut store = TraceStore::new(&path, pool_config).with_log_batch(*batch);

            println!("📡 Syncing swap trace for {}...", pool);
            let provider = RpcLogProvider::new(url);
            let observations = store.sync(&provider).await?;

            println!("✅ {} swaps on disk at {}", observations.len(), path.display());
            if let (Some(first), Some(last)) = (observations.first(), observations.last()) {
                println!(
                    "   Blocks {} to {}",
                    first.block_number(),
                    last.block_number()
                );
            }
        }
        Commands::Backtest {
            pool,
            start_block,
            tick_spacing,
            decimals0,
            decimals1,
            data_dir,
            width,
            interval,
            notional0,
            notional1,
            out,
            sync,
            rpc_url,
        } => {
            let pool_config = PoolConfig::new(pool)
                .with_start_block(*start_block)
                .with_tick_spacing(*tick_spacing)
                .with_decimals(*decimals0, *decimals1);

            fs::create_dir_all(data_dir)
                .with_context(|| format!("creating {}", data_dir.display()))?;
            let path = trace_path(data_dir, pool);
            let mut store = TraceStore::new(&path, pool_config.clone());

            let observations = if *sync {
                let url = rpc_endpoint(rpc_url);
                println!("📡 Syncing swap trace for {}...", pool);
                let provider = RpcLogProvider::new(url);
                store.sync(&provider).await?
            } else {
                store.load().observations
            };

            if observations.is_empty() {
                println!("❌ No swaps in {}. Run `rangesim ingest` first.", path.display());
                return Ok(());
            }

            let notional0 =
                Decimal::from_f64(*notional0).context("notional0 is not a finite number")?;
            let notional1 =
                Decimal::from_f64(*notional1).context("notional1 is not a finite number")?;
            let config = BacktestConfig::default()
                .with_snapshot_interval(*interval)
                .with_notionals(notional0, notional1);
            let policy = LazyRecenter::from_spacings(*width, *tick_spacing)?;
            let engine = BacktestEngine::new(pool_config, config, policy);

            let snapshot_path = out
                .clone()
                .unwrap_or_else(|| data_dir.join(format!("snapshots-{}.csv", pool.to_lowercase())));
            let mut sink = CsvSnapshotWriter::create(&snapshot_path)
                .with_context(|| format!("creating {}", snapshot_path.display()))?;

            println!("🚀 Replaying {} swaps...", observations.len());
            let report = engine.run(&observations, &mut sink)?;

            println!("\n📊 Backtest Results");
            println!("════════════════════════════════════");
            println!("Observations:    {}", report.observations);
            println!("Block span:      {} to {}", report.first_block, report.last_block);
            println!("Re-centers:      {}", report.rebalances.len());
            println!("Blocks in range: {}", report.blocks_in_range);
            println!(
                "Time in Range:   {:.2}%",
                report.in_range_fraction * Decimal::from(100)
            );
            println!(
                "Final range:     [{}, {}]",
                report.final_position.range.tick_lower, report.final_position.range.tick_upper
            );
            println!("Final liquidity: {:.4}", report.final_position.liquidity);
            println!(
                "Snapshots:       {} rows at {}",
                report.snapshots_written,
                snapshot_path.display()
            );
            println!("════════════════════════════════════");
        }
    }

    Ok(())
}

fn rpc_endpoint(flag: &Option<String>) -> String {
    flag.clone()
        .unwrap_or_else(|| env::var("RPC_URL").expect("RPC_URL must be set in .env or environment"))
}

fn trace_path(data_dir: &Path, pool: &str) -> PathBuf {
    data_dir.join(format!("swaps-{}.csv", pool.to_lowercase()))
}
