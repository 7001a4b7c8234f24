//! Rolling mean and population standard deviation of close.
//!
//! Every value is computed directly from its own window: no running sums are
//! carried between indices, so a per-index query and the whole-series
//! precompute agree bit for bit.
//! Lookback: window - 1.

use crate::domain::Bar;
use serde::{Deserialize, Serialize};

/// Mean and population standard deviation over one window of closes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingStat {
    pub mean: f64,
    pub stdev: f64,
}

/// Statistics over closes of `bars[index + 1 - window ..= index]`.
///
/// Returns `None` while fewer than `window` bars of history exist, when
/// `index` is past the end, or when `window` is zero.
pub fn rolling_stat(bars: &[Bar], index: usize, window: usize) -> Option<RollingStat> {
    if window == 0 || index >= bars.len() || index + 1 < window {
        return None;
    }
    let slice = &bars[index + 1 - window..=index];
    let n = window as f64;

    // Shift by the first close so an all-equal window yields that close exactly
    // instead of whatever rounding a raw sum would leave behind.
    let pivot = slice[0].close;
    let mean = pivot + slice.iter().map(|bar| bar.close - pivot).sum::<f64>() / n;

    // Population variance: divide by N. Identical closes give exact zeros.
    let variance = slice
        .iter()
        .map(|bar| {
            let diff = bar.close - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;

    Some(RollingStat {
        mean,
        stdev: variance.sqrt(),
    })
}

/// Whole-series precompute of [`rolling_stat`] for a fixed window.
#[derive(Debug, Clone)]
pub struct RollingStats {
    window: usize,
    name: String,
}

impl RollingStats {
    pub fn new(window: usize) -> Self {
        assert!(window >= 1, "rolling window must be >= 1");
        Self {
            window,
            name: format!("rolling_close_{window}"),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Bars needed before the first value: `window - 1`.
    pub fn lookback(&self) -> usize {
        self.window.saturating_sub(1)
    }

    /// One entry per bar; the first `lookback()` entries are `None`.
    pub fn compute(&self, bars: &[Bar]) -> Vec<Option<RollingStat>> {
        (0..bars.len())
            .map(|i| rolling_stat(bars, i, self.window))
            .collect()
    }
}
