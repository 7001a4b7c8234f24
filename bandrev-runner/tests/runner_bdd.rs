//! BDD tests for the runner: CSV on disk → backtest → report → artifacts.

use std::path::{Path, PathBuf};

use bandrev_core::PositionSide;
use bandrev_runner::{
    generate_synthetic_bars, load_artifacts, load_csv, render_report, run_single_backtest,
    run_sweep, save_artifacts, write_bars_csv, BacktestConfig, ConfigError, RunError, SweepGrid,
};

/// Closes that produce one long round trip and one short round trip at k = 1.5.
const TWO_TRADE_CLOSES: [f64; 13] = [
    100.0, 100.0, 100.0, 100.0, 100.0, 90.0, 100.0, 100.0, 100.0, 100.0, 100.0, 110.0, 100.0,
];

fn write_closes(dir: &Path, closes: &[f64]) -> PathBuf {
    let path = dir.join("bars.csv");
    let mut csv = String::from("timestamp,open,high,low,close,volume\n");
    for (i, c) in closes.iter().enumerate() {
        csv.push_str(&format!("2024-03-01T10:{i:02}:00Z,{c},{c},{c},{c},100\n"));
    }
    std::fs::write(&path, csv).unwrap();
    path
}

fn config_for(path: &Path, window: usize, multiplier: f64) -> BacktestConfig {
    let toml = format!(
        "[data]\npath = {:?}\n\n[strategy]\nwindow = {window}\nmultiplier = {multiplier:?}\n",
        path.display().to_string()
    );
    BacktestConfig::from_toml(&toml).unwrap()
}

#[test]
fn bdd_scenario_mean_reversion_round_trips() {
    // GIVEN a CSV with a dip below and a spike above a flat baseline
    let dir = tempfile::tempdir().unwrap();
    let path = write_closes(dir.path(), &TWO_TRADE_CLOSES);

    // WHEN the runner executes with window 5 and multiplier 1.5
    let result = run_single_backtest(&config_for(&path, 5, 1.5)).unwrap();

    // THEN a long and a short trade complete, each worth 10
    let trades = &result.outcome.trades;
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0].side, PositionSide::Long);
    assert_eq!(trades[0].entry_timestamp, "2024-03-01T10:05:00Z");
    assert_eq!(trades[1].side, PositionSide::Short);
    assert_eq!(trades[1].exit_index, 12);

    let state = &result.outcome.state;
    assert_eq!(state.total_trades, 2);
    assert_eq!(state.winning_trades, 2);
    assert!((state.running_pnl - 20.0).abs() < 1e-9);
    assert_eq!(state.max_drawdown, 0.0);

    // AND the event tape reads BUY, SELL, SHORT, COVER
    let actions: Vec<&str> = result.events.iter().map(|e| e.action()).collect();
    assert_eq!(actions, vec!["BUY", "SELL", "SHORT", "COVER"]);
}

#[test]
fn bdd_scenario_exact_two_sigma_outlier_does_not_trade() {
    // GIVEN the same series at the default 2.0 multiplier
    let dir = tempfile::tempdir().unwrap();
    let path = write_closes(dir.path(), &TWO_TRADE_CLOSES);

    // WHEN the runner executes
    let result = run_single_backtest(&config_for(&path, 5, 2.0)).unwrap();

    // THEN a lone outlier sits exactly on the band and the strict test rejects it
    assert_eq!(result.outcome.state.total_trades, 0);
    assert!(result.events.is_empty());
    assert!(result.outcome.summary.is_empty());
}

#[test]
fn bdd_scenario_report_and_artifacts() {
    // GIVEN a finished run
    let dir = tempfile::tempdir().unwrap();
    let path = write_closes(dir.path(), &TWO_TRADE_CLOSES);
    let result = run_single_backtest(&config_for(&path, 5, 1.5)).unwrap();

    // WHEN the report is rendered
    let report = render_report(&result);

    // THEN it carries the statistics and performance sections
    assert!(report.contains("Trading Statistics:"));
    assert!(report.contains("Total Trades:      2"));
    assert!(report.contains("Total P&L:         $20.00"));
    assert!(report.contains("Max Drawdown:      $0.00"));

    // WHEN artifacts are saved
    let out = dir.path().join("results");
    let run_dir = save_artifacts(&result, &out).unwrap();

    // THEN the directory is named by config and dataset hashes
    let name = run_dir.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with(&result.config_hash[..12]));
    assert!(name.ends_with(&result.dataset_hash[..12]));

    // AND the trade tape has one row per completed trade
    let trades_csv = std::fs::read_to_string(run_dir.join("trades.csv")).unwrap();
    assert_eq!(trades_csv.lines().count(), 3);
    assert!(trades_csv.lines().nth(1).unwrap().starts_with("Long,5,"));

    // AND the manifest loads back to the same result
    let loaded = load_artifacts(&run_dir).unwrap();
    assert_eq!(loaded, result);
}

#[test]
fn bdd_scenario_malformed_rows_are_skipped() {
    // GIVEN a CSV with two broken rows among valid ones
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dirty.csv");
    std::fs::write(
        &path,
        "timestamp,open,high,low,close\n\
         d0,1,1,1,100\n\
         d1,1,1,1,oops\n\
         d2,1,1,1,101\n\
         d3,1,1\n\
         d4,1,1,1,102\n",
    )
    .unwrap();

    // WHEN the runner executes
    let result = run_single_backtest(&config_for(&path, 2, 2.0)).unwrap();

    // THEN only clean rows reach the engine, and the skip count is reported
    assert_eq!(result.bar_count, 3);
    assert_eq!(result.skipped_rows, 2);
    assert_eq!(result.first_timestamp.as_deref(), Some("d0"));
    assert_eq!(result.last_timestamp.as_deref(), Some("d4"));
}

#[test]
fn bdd_scenario_bad_config_fails_before_data() {
    // GIVEN a config with a zero multiplier pointing at a missing file
    let toml = "[data]\npath = \"/nonexistent.csv\"\n[strategy]\nmultiplier = 0.0\n";

    // WHEN it is parsed
    let err = BacktestConfig::from_toml(toml).unwrap_err();

    // THEN validation rejects it without touching the file system
    assert!(matches!(err, ConfigError::Invalid(_)));

    // AND a valid config with a missing file surfaces a data error
    let mut config = BacktestConfig::default();
    config.data.path = Some("/nonexistent.csv".into());
    assert!(matches!(
        run_single_backtest(&config).unwrap_err(),
        RunError::Data(_)
    ));
}

#[test]
fn bdd_scenario_sweep_over_synthetic_csv() {
    // GIVEN synthetic bars written to disk and loaded back
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("synth.csv");
    write_bars_csv(&path, &generate_synthetic_bars(2_000, 3).bars).unwrap();
    let loaded = load_csv(&path).unwrap();

    // WHEN a 3×3 grid is swept
    let rows = run_sweep(&loaded.bars, &SweepGrid::default_grid()).unwrap();

    // THEN each combination appears once, best P&L first
    assert_eq!(rows.len(), 9);
    assert!(rows
        .windows(2)
        .all(|w| w[0].state.running_pnl >= w[1].state.running_pnl));

    // AND the top row matches a single run with the same parameters
    let best = &rows[0];
    let mut config = BacktestConfig::default();
    config.data.path = Some(path);
    config.strategy.window = best.params.window;
    config.strategy.multiplier = best.params.multiplier;
    let single = run_single_backtest(&config).unwrap();
    assert_eq!(single.outcome.state, best.state);
}
