//! TradeRecord: a completed round-trip trade.

use super::position::PositionSide;
use serde::{Deserialize, Serialize};

/// A complete round trip: entry → exit, one unit of the instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub side: PositionSide,

    // ── Entry ──
    pub entry_index: usize,
    pub entry_timestamp: String,
    pub entry_price: f64,

    // ── Exit ──
    pub exit_index: usize,
    pub exit_timestamp: String,
    pub exit_price: f64,

    // ── PnL ──
    pub pnl: f64,
}

impl TradeRecord {
    pub fn bars_held(&self) -> usize {
        self.exit_index.saturating_sub(self.entry_index)
    }

    /// Return on the trade as a fraction of entry price.
    pub fn return_pct(&self) -> f64 {
        if self.entry_price == 0.0 {
            return 0.0;
        }
        self.pnl / self.entry_price
    }

    /// Zero P&L counts as a loss.
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }
}
