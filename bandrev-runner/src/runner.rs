//! Backtest runner: wires together config, data loading, and the engine.
//!
//! Two entry points:
//! - `run_single_backtest()`: loads the CSV named by the config, then runs. Used by CLI.
//! - `run_backtest_from_data()`: takes pre-loaded bars. Used by sweeps and tests.

use bandrev_core::engine::{run_backtest, BacktestOutcome, EngineError, TradeEvent};
use bandrev_core::StrategyParams;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{BacktestConfig, ConfigError};
use crate::data_loader::{load_csv, DataSource, LoadError, LoadedBars};
use crate::trade_log::LoggingSink;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("no input data: set [data] path in the config or pass a CSV file")]
    NoDataPath,
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub config_hash: String,
    pub params: StrategyParams,
    pub source: DataSource,
    pub dataset_hash: String,
    pub bar_count: usize,
    pub skipped_rows: usize,
    pub first_timestamp: Option<String>,
    pub last_timestamp: Option<String>,
    pub outcome: BacktestOutcome,
    /// Every entry and exit, in order.
    pub events: Vec<TradeEvent>,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl BacktestResult {
    pub fn has_synthetic(&self) -> bool {
        matches!(self.source, DataSource::Synthetic { .. })
    }
}

/// Run a single backtest from a config (loads data from `[data] path`).
///
/// Parameters are validated before the file is opened.
pub fn run_single_backtest(config: &BacktestConfig) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let path = config.data.path.as_deref().ok_or(RunError::NoDataPath)?;
    let loaded = load_csv(path)?;
    run_backtest_from_data(&loaded, config)
}

/// Run a backtest with pre-loaded bars: no I/O.
pub fn run_backtest_from_data(
    loaded: &LoadedBars,
    config: &BacktestConfig,
) -> Result<BacktestResult, RunError> {
    let params = config.params();
    params.validate()?;
    if loaded.is_synthetic() {
        warn!("running on SYNTHETIC data, results are tagged as synthetic");
    }
    info!(
        source = %loaded.source,
        bars = loaded.bars.len(),
        window = params.window,
        multiplier = params.multiplier,
        "running backtest"
    );

    let mut sink = LoggingSink::new();
    let outcome = run_backtest(&loaded.bars, &params, &mut sink)?;

    if loaded.bars.len() < params.window {
        warn!(
            bars = loaded.bars.len(),
            window = params.window,
            "fewer bars than the window, no signals possible"
        );
    }
    if let Some(side) = outcome.state.position.side() {
        warn!(%side, "position still open at end of data, excluded from metrics");
    }
    info!(
        trades = outcome.state.total_trades,
        pnl = outcome.state.running_pnl,
        max_drawdown = outcome.state.max_drawdown,
        "backtest complete"
    );

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        config_hash: config.config_hash(),
        params,
        source: loaded.source.clone(),
        dataset_hash: loaded.dataset_hash.clone(),
        bar_count: loaded.bars.len(),
        skipped_rows: loaded.skipped_rows,
        first_timestamp: loaded.bars.first().map(|b| b.label(0)),
        last_timestamp: loaded
            .bars
            .last()
            .map(|b| b.label(loaded.bars.len() - 1)),
        outcome,
        events: sink.into_events(),
    })
}
