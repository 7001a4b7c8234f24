//! Artifact export to JSON and CSV.
//!
//! Layout: `<output_dir>/<config_hash[..12]>_<dataset_hash[..12]>/`
//! - `manifest.json`: the full `BacktestResult`, schema-versioned
//! - `trades.csv`: completed trades in chronological order
//! - `summary.json`: final accumulator state and derived ratios
//!
//! Unknown schema versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use bandrev_core::TradeRecord;
use serde::Serialize;

use crate::runner::{BacktestResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

#[derive(Serialize)]
struct SummaryArtifact<'a> {
    schema_version: u32,
    generated_at: String,
    window: usize,
    multiplier: f64,
    state: &'a bandrev_core::PerformanceState,
    summary: &'a bandrev_core::Summary,
}

fn export_summary_json(result: &BacktestResult) -> Result<String> {
    let artifact = SummaryArtifact {
        schema_version: SCHEMA_VERSION,
        generated_at: chrono::Utc::now().to_rfc3339(),
        window: result.params.window,
        multiplier: result.params.multiplier,
        state: &result.outcome.state,
        summary: &result.outcome.summary,
    };
    serde_json::to_string_pretty(&artifact).context("failed to serialize summary")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export a trade list as CSV.
///
/// Columns: side, entry_index, entry_timestamp, entry_price, exit_index,
/// exit_timestamp, exit_price, pnl, bars_held, return_pct
pub fn export_trades_csv(trades: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "side",
        "entry_index",
        "entry_timestamp",
        "entry_price",
        "exit_index",
        "exit_timestamp",
        "exit_price",
        "pnl",
        "bars_held",
        "return_pct",
    ])?;

    for t in trades {
        wtr.write_record([
            &t.side.to_string(),
            &t.entry_index.to_string(),
            &t.entry_timestamp,
            &format!("{:.6}", t.entry_price),
            &t.exit_index.to_string(),
            &t.exit_timestamp,
            &format!("{:.6}", t.exit_price),
            &format!("{:.6}", t.pnl),
            &t.bars_held().to_string(),
            &format!("{:.6}", t.return_pct()),
        ])?;
    }

    let bytes = wtr.into_inner().context("failed to flush trades CSV")?;
    String::from_utf8(bytes).context("trades CSV is not valid UTF-8")
}

// ─── Artifact directory ─────────────────────────────────────────────

/// Write the full artifact set for one run. Returns the run directory.
///
/// Re-running the same config on the same data overwrites the same directory.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        short_hash(&result.config_hash),
        short_hash(&result.dataset_hash)
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("manifest.json"), export_json(result)?)?;
    std::fs::write(
        run_dir.join("trades.csv"),
        export_trades_csv(&result.outcome.trades)?,
    )?;
    std::fs::write(run_dir.join("summary.json"), export_summary_json(result)?)?;

    Ok(run_dir)
}

/// Load a `BacktestResult` from an artifact directory's manifest.json.
pub fn load_artifacts(dir: &Path) -> Result<BacktestResult> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BacktestConfig;
    use crate::data_loader::generate_synthetic_bars;
    use crate::runner::run_backtest_from_data;

    fn sample_result() -> BacktestResult {
        let loaded = generate_synthetic_bars(2_000, 5);
        run_backtest_from_data(&loaded, &BacktestConfig::default()).unwrap()
    }

    #[test]
    fn json_roundtrip() {
        let result = sample_result();
        let json = export_json(&result).unwrap();
        let back = import_json(&json).unwrap();
        assert_eq!(back.outcome.trades, result.outcome.trades);
        assert_eq!(back.outcome.state.total_trades, result.outcome.state.total_trades);
        assert_eq!(back.config_hash, result.config_hash);
    }

    #[test]
    fn future_schema_rejected() {
        let mut result = sample_result();
        result.schema_version = SCHEMA_VERSION + 1;
        let json = export_json(&result).unwrap();
        assert!(import_json(&json).is_err());
    }

    #[test]
    fn trades_csv_has_header_and_one_row_per_trade() {
        let result = sample_result();
        let csv = export_trades_csv(&result.outcome.trades).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert!(lines[0].starts_with("side,entry_index,entry_timestamp"));
        assert_eq!(lines.len(), result.outcome.trades.len() + 1);
    }

    #[test]
    fn save_and_load_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let result = sample_result();
        let run_dir = save_artifacts(&result, dir.path()).unwrap();

        assert!(run_dir.join("manifest.json").exists());
        assert!(run_dir.join("trades.csv").exists());
        assert!(run_dir.join("summary.json").exists());

        let loaded = load_artifacts(&run_dir).unwrap();
        assert_eq!(loaded.dataset_hash, result.dataset_hash);

        let summary: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(run_dir.join("summary.json")).unwrap())
                .unwrap();
        assert_eq!(summary["window"], 20);
        assert_eq!(
            summary["state"]["total_trades"],
            result.outcome.state.total_trades
        );
    }
}
