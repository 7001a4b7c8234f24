//! bandrev runner: configuration, data loading, reports and sweeps.
//!
//! This crate builds on `bandrev-core` to provide:
//! - TOML configuration with a deterministic config hash
//! - CSV bar loading with malformed-row skipping, plus seeded synthetic data
//! - Single-backtest runner with a logged trade tape
//! - Text report and on-disk artifacts (manifest, trades CSV, summary)
//! - Parallel window × multiplier parameter sweeps

pub mod config;
pub mod data_loader;
pub mod export;
pub mod report;
pub mod runner;
pub mod sweep;
pub mod trade_log;

pub use config::{BacktestConfig, ConfigError};
pub use data_loader::{
    compute_dataset_hash, generate_synthetic_bars, load_csv, load_from_reader, write_bars_csv,
    DataSource, LoadError, LoadedBars,
};
pub use export::{export_json, export_trades_csv, import_json, load_artifacts, save_artifacts};
pub use report::render_report;
pub use runner::{run_backtest_from_data, run_single_backtest, BacktestResult, RunError};
pub use sweep::{run_sweep, SweepGrid, SweepRow};
pub use trade_log::{format_event, LoggingSink};
