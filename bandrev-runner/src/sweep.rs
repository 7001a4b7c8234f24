//! Parameter sweep over window × multiplier grids.
//!
//! Each combination runs an independent pass over the same read-only bars,
//! so the grid parallelizes with rayon. Ranking is deterministic regardless
//! of thread count.

use bandrev_core::engine::{run_backtest_quiet, EngineError, PerformanceState, Summary};
use bandrev_core::{Bar, StrategyParams};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::info;

/// Parameter grid specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepGrid {
    pub windows: Vec<usize>,
    pub multipliers: Vec<f64>,
}

impl SweepGrid {
    pub fn new(windows: Vec<usize>, multipliers: Vec<f64>) -> Self {
        Self {
            windows,
            multipliers,
        }
    }

    /// Windows 10/20/30 × multipliers 1.5/2.0/2.5.
    pub fn default_grid() -> Self {
        Self::new(vec![10, 20, 30], vec![1.5, 2.0, 2.5])
    }

    /// Returns the total number of combinations in this grid.
    pub fn size(&self) -> usize {
        self.windows.len() * self.multipliers.len()
    }

    /// All combinations, windows outermost.
    pub fn combinations(&self) -> Vec<StrategyParams> {
        self.windows
            .iter()
            .flat_map(|&w| {
                self.multipliers
                    .iter()
                    .map(move |&k| StrategyParams::new(w, k))
            })
            .collect()
    }
}

/// One evaluated grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRow {
    pub params: StrategyParams,
    pub state: PerformanceState,
    pub summary: Summary,
}

impl SweepRow {
    pub fn total_pnl(&self) -> f64 {
        self.state.running_pnl
    }
}

/// Evaluate every grid combination on `bars`.
///
/// All combinations are validated before any pass runs. Rows come back
/// sorted by total P&L descending, ties broken by window then multiplier.
pub fn run_sweep(bars: &[Bar], grid: &SweepGrid) -> Result<Vec<SweepRow>, EngineError> {
    let combos = grid.combinations();
    for params in &combos {
        params.validate()?;
    }

    info!(
        combinations = combos.len(),
        bars = bars.len(),
        "starting parameter sweep"
    );

    let mut rows = combos
        .par_iter()
        .map(|params| {
            let outcome = run_backtest_quiet(bars, params)?;
            Ok(SweepRow {
                params: *params,
                state: outcome.state,
                summary: outcome.summary,
            })
        })
        .collect::<Result<Vec<_>, EngineError>>()?;

    rows.sort_by(compare_rows);
    Ok(rows)
}

fn compare_rows(a: &SweepRow, b: &SweepRow) -> Ordering {
    b.total_pnl()
        .total_cmp(&a.total_pnl())
        .then_with(|| a.params.window.cmp(&b.params.window))
        .then_with(|| a.params.multiplier.total_cmp(&b.params.multiplier))
}
