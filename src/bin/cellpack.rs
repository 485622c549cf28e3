//! `cellpack`: balance cell impedances across packs from a CSV of readings.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;
use u_cellpack::balance::{
    BalanceConfig, BalanceEvent, Balancer, ChannelObserver, Strategy,
    DEFAULT_CONVERGENCE_THRESHOLD,
};
use u_cellpack::ingest::{read_csv_path, AssemblyOrder, IngestConfig, DEFAULT_CELLS_PER_PACK};
use u_cellpack::model::InventoryStats;
use u_cellpack::report;

#[derive(Debug, Parser)]
#[command(name = "cellpack", version, about = "Balance battery cell impedance across packs")]
struct Args {
    /// CSV file with `cell_id` and `cell_value` columns
    input: PathBuf,

    /// Number of cells in each pack
    #[arg(short = 'n', long, default_value_t = DEFAULT_CELLS_PER_PACK)]
    cells_per_pack: usize,

    /// Pack selection strategy
    #[arg(short, long, value_enum, default_value_t = StrategyArg::RandomPair)]
    strategy: StrategyArg,

    /// Consecutive non-improving trials before stopping
    #[arg(short, long, default_value_t = DEFAULT_CONVERGENCE_THRESHOLD)]
    threshold: usize,

    /// Random seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many seconds even if not converged
    #[arg(long)]
    max_seconds: Option<u64>,

    /// Deal readings into packs from the end of the file
    #[arg(long)]
    reversed: bool,

    /// Write the ranked result to this CSV file
    #[arg(short, long)]
    export: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    RandomPair,
    WorstFirst,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::RandomPair => Strategy::RandomPair,
            StrategyArg::WorstFirst => Strategy::WorstFirst,
        }
    }
}

/// `RUST_LOG` if set and valid, `info` otherwise.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(env_filter()).init();

    let args = Args::parse();

    let ingest = IngestConfig::default()
        .with_cells_per_pack(args.cells_per_pack)
        .with_order(if args.reversed {
            AssemblyOrder::Reversed
        } else {
            AssemblyOrder::Sequential
        });
    let inventory = read_csv_path(&args.input, &ingest)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    print_stats("before", &inventory.stats());

    let mut config = BalanceConfig::default()
        .with_strategy(args.strategy.into())
        .with_convergence_threshold(args.threshold)
        .with_progress_interval(1_000);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(secs) = args.max_seconds {
        config = config.with_max_duration(Duration::from_secs(secs));
    }

    let mut balancer = Balancer::new(inventory, config)?;
    let stop = balancer.stop_handle();
    ctrlc::set_handler(move || {
        stop.stop();
    })
    .context("failed to install Ctrl-C handler")?;

    let (observer, events) = ChannelObserver::bounded(16);
    balancer.start_with(observer)?;
    info!("balancing, press Ctrl-C to stop");

    while balancer.is_running() {
        if let Some(BalanceEvent::Progress(p)) = events.recv_timeout(Duration::from_millis(500)) {
            info!(
                trial = p.trial,
                average = %report::format_spread(p.stats.average_spread),
                worst = %report::format_spread(p.stats.max_spread),
                "progress"
            );
        }
    }

    if let Some(result) = balancer.wait() {
        info!(
            trials = result.trials,
            accepted = result.accepted,
            converged = result.converged,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "finished"
        );
    }

    let rows = report::rank(&balancer.snapshot());
    for row in &rows {
        let cells: Vec<String> = row.cells.iter().map(report::format_cell).collect();
        println!(
            "{:>4}  {:<8} {:>8}  {}",
            row.rank,
            row.id,
            report::format_spread(row.spread),
            cells.join(", ")
        );
    }
    print_stats("after", &balancer.stats());

    if let Some(path) = &args.export {
        let file = std::fs::File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        report::write_csv(file, &rows)?;
        info!(path = %path.display(), "exported");
    }
    Ok(())
}

fn print_stats(label: &str, stats: &InventoryStats) {
    println!(
        "{label}: {} packs, {} cells, average {}, lowest {}, highest {}",
        stats.pack_count,
        stats.cell_count,
        report::format_spread(stats.average_spread),
        report::format_spread(stats.min_spread),
        report::format_spread(stats.max_spread),
    );
}
