//! bandrev CLI: run, sweep, and synthetic-data commands.
//!
//! Commands:
//! - `run`: backtest one CSV with one window/multiplier pair and print the report
//! - `sweep`: evaluate a window × multiplier grid and print the ranking
//! - `synth`: write a seeded synthetic bar CSV
//!
//! Trade events and diagnostics go to stderr through `tracing`; reports go
//! to stdout. `RUST_LOG` overrides the default filter.

use anyhow::{bail, Context, Result};
use bandrev_runner::{
    generate_synthetic_bars, load_csv, render_report, run_single_backtest, run_sweep,
    save_artifacts, write_bars_csv, BacktestConfig, SweepGrid, SweepRow,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "bandrev",
    version,
    about = "bandrev: Bollinger mean-reversion backtester"
)]
struct Cli {
    /// Log engine decisions at debug level.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    /// Only log warnings and errors (hides the trade tape).
    #[arg(long, short, global = true, default_value_t = false, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest a single parameter pair and print the report.
    Run {
        /// CSV with timestamp,open,high,low,close[,volume]. Overrides `[data] path`.
        csv: Option<PathBuf>,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Rolling window length in bars.
        #[arg(long)]
        window: Option<usize>,

        /// Band width in standard deviations.
        #[arg(long)]
        multiplier: Option<f64>,

        /// Write manifest.json, trades.csv and summary.json under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Evaluate every window × multiplier combination.
    Sweep {
        /// CSV with timestamp,open,high,low,close[,volume].
        csv: PathBuf,

        /// Comma-separated window lengths.
        #[arg(long, value_delimiter = ',', default_value = "10,20,30")]
        windows: Vec<usize>,

        /// Comma-separated band multipliers.
        #[arg(long, value_delimiter = ',', default_value = "1.5,2.0,2.5")]
        multipliers: Vec<f64>,

        /// Only print the best N rows.
        #[arg(long)]
        top: Option<usize>,
    },
    /// Write a seeded synthetic bar series as CSV.
    Synth {
        /// Number of one-minute bars.
        #[arg(long, default_value_t = 10_000)]
        bars: usize,

        /// RNG seed.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output CSV path.
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Run {
            csv,
            config,
            window,
            multiplier,
            output_dir,
        } => run_cmd(csv, config, window, multiplier, output_dir),
        Commands::Sweep {
            csv,
            windows,
            multipliers,
            top,
        } => sweep_cmd(csv, windows, multipliers, top),
        Commands::Synth { bars, seed, out } => synth_cmd(bars, seed, out),
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_cmd(
    csv: Option<PathBuf>,
    config_path: Option<PathBuf>,
    window: Option<usize>,
    multiplier: Option<f64>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let mut config = match &config_path {
        Some(path) => BacktestConfig::from_file(path)?,
        None => BacktestConfig::default(),
    };

    // Flags override file values.
    if let Some(path) = csv {
        config.data.path = Some(path);
    }
    if let Some(w) = window {
        config.strategy.window = w;
    }
    if let Some(k) = multiplier {
        config.strategy.multiplier = k;
    }
    if let Some(dir) = output_dir {
        config.output.dir = Some(dir);
    }
    if config.data.path.is_none() {
        bail!("no input CSV: pass a file or set [data] path in the config");
    }

    let result = run_single_backtest(&config)?;
    print!("{}", render_report(&result));

    if let Some(dir) = &config.output.dir {
        let run_dir = save_artifacts(&result, dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }

    Ok(())
}

fn sweep_cmd(
    csv: PathBuf,
    windows: Vec<usize>,
    multipliers: Vec<f64>,
    top: Option<usize>,
) -> Result<()> {
    let grid = SweepGrid::new(windows, multipliers);
    if grid.size() == 0 {
        bail!("empty grid: pass at least one window and one multiplier");
    }

    let loaded = load_csv(&csv)?;
    let rows = run_sweep(&loaded.bars, &grid)?;
    info!(rows = rows.len(), "sweep complete");

    let shown = top.unwrap_or(rows.len()).min(rows.len());
    print_sweep_table(&rows[..shown]);
    Ok(())
}

fn synth_cmd(bars: usize, seed: u64, out: PathBuf) -> Result<()> {
    if bars == 0 {
        bail!("--bars must be at least 1");
    }
    let loaded = generate_synthetic_bars(bars, seed);
    write_bars_csv(&out, &loaded.bars)
        .with_context(|| format!("failed to write {}", out.display()))?;
    println!(
        "Wrote {} synthetic bars (seed {seed}) to {}",
        loaded.bars.len(),
        out.display()
    );
    Ok(())
}

fn print_sweep_table(rows: &[SweepRow]) {
    println!();
    println!(
        "{:>4} {:>7} {:>6} {:>7} {:>12} {:>12} {:>9} {:>8}",
        "Rank", "Window", "Mult", "Trades", "Total P&L", "Max DD", "Win Rate", "PF"
    );
    println!("{}", "-".repeat(72));
    for (i, row) in rows.iter().enumerate() {
        let win_rate = row
            .summary
            .win_rate
            .map_or_else(|| "-".to_string(), |w| format!("{w:.1}%"));
        let pf = row
            .summary
            .profit_factor
            .map_or_else(|| "-".to_string(), |p| format!("{p:.2}"));
        println!(
            "{:>4} {:>7} {:>6.2} {:>7} {:>12.2} {:>12.2} {:>9} {:>8}",
            i + 1,
            row.params.window,
            row.params.multiplier,
            row.state.total_trades,
            row.state.running_pnl,
            row.state.max_drawdown,
            win_rate,
            pf
        );
    }
    println!();
}
