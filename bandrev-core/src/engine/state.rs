//! Performance accumulator: the single mutable aggregate of a run.

use crate::domain::Position;
use serde::{Deserialize, Serialize};

/// Running realized P&L, drawdown, and trade counts.
///
/// Owned by exactly one run. Invariants after every call:
/// - `total_trades == winning_trades + losing_trades`
/// - `peak_equity == max(0, every running_pnl seen by mark_bar)`
/// - `max_drawdown` never decreases
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceState {
    pub position: Position,
    pub running_pnl: f64,
    pub peak_equity: f64,
    pub max_drawdown: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub total_win_amount: f64,
    /// Stored as a magnitude.
    pub total_loss_amount: f64,
}

impl PerformanceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Book one completed trade. Zero P&L counts as a loss.
    pub fn record_trade(&mut self, pnl: f64) {
        self.running_pnl += pnl;
        self.total_trades += 1;
        if pnl > 0.0 {
            self.winning_trades += 1;
            self.total_win_amount += pnl;
        } else {
            self.losing_trades += 1;
            self.total_loss_amount += pnl.abs();
        }
    }

    /// Drawdown bookkeeping, once per bar whether or not a trade closed.
    ///
    /// Realized P&L only: an open position's paper loss is not a drawdown.
    pub fn mark_bar(&mut self) {
        if self.running_pnl > self.peak_equity {
            self.peak_equity = self.running_pnl;
        }
        let drawdown = self.peak_equity - self.running_pnl;
        if drawdown > self.max_drawdown {
            self.max_drawdown = drawdown;
        }
    }

    pub fn has_open_position(&self) -> bool {
        !self.position.is_flat()
    }
}
