//! Derived ratios over a finished run.
//!
//! Every field is `None` when its precondition is unmet; an absent value is
//! never reported as zero or infinity.

use super::state::PerformanceState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    /// Percent of trades with positive P&L (0–100).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub win_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_win: Option<f64>,
    /// Magnitude of the average losing trade.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_factor: Option<f64>,
}

impl Summary {
    pub fn from_state(state: &PerformanceState) -> Self {
        let win_rate = (state.total_trades > 0)
            .then(|| state.winning_trades as f64 / state.total_trades as f64 * 100.0);
        let avg_win = (state.winning_trades > 0)
            .then(|| state.total_win_amount / state.winning_trades as f64);
        let avg_loss = (state.losing_trades > 0)
            .then(|| state.total_loss_amount / state.losing_trades as f64);
        // Breakeven-only losses leave a zero denominator.
        let profit_factor = (state.winning_trades > 0
            && state.losing_trades > 0
            && state.total_loss_amount > 0.0)
            .then(|| state.total_win_amount / state.total_loss_amount);

        Self {
            win_rate,
            avg_win,
            avg_loss,
            profit_factor,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.win_rate.is_none()
            && self.avg_win.is_none()
            && self.avg_loss.is_none()
            && self.profit_factor.is_none()
    }
}
