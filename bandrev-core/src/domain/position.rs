//! Position state for the single traded instrument.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of an open position or completed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    /// Signed P&L of a one-unit round trip in this direction.
    pub fn pnl(self, entry_price: f64, exit_price: f64) -> f64 {
        match self {
            PositionSide::Long => exit_price - entry_price,
            PositionSide::Short => entry_price - exit_price,
        }
    }
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionSide::Long => write!(f, "Long"),
            PositionSide::Short => write!(f, "Short"),
        }
    }
}

/// Current exposure. At most one position is open at a time, and an open
/// position always carries its entry price.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Position {
    #[default]
    Flat,
    Long {
        entry_price: f64,
    },
    Short {
        entry_price: f64,
    },
}

impl Position {
    pub fn open(side: PositionSide, entry_price: f64) -> Self {
        match side {
            PositionSide::Long => Position::Long { entry_price },
            PositionSide::Short => Position::Short { entry_price },
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, Position::Flat)
    }

    pub fn side(&self) -> Option<PositionSide> {
        match self {
            Position::Flat => None,
            Position::Long { .. } => Some(PositionSide::Long),
            Position::Short { .. } => Some(PositionSide::Short),
        }
    }

    pub fn entry_price(&self) -> Option<f64> {
        match *self {
            Position::Flat => None,
            Position::Long { entry_price } | Position::Short { entry_price } => Some(entry_price),
        }
    }

    /// Mark-to-market P&L of the open position at `price`. Zero when flat.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        match (self.side(), self.entry_price()) {
            (Some(side), Some(entry)) => side.pnl(entry, price),
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_by_default() {
        let pos = Position::default();
        assert!(pos.is_flat());
        assert_eq!(pos.side(), None);
        assert_eq!(pos.entry_price(), None);
        assert_eq!(pos.unrealized_pnl(123.0), 0.0);
    }

    #[test]
    fn long_and_short_pnl_signs() {
        assert_eq!(PositionSide::Long.pnl(90.0, 100.0), 10.0);
        assert_eq!(PositionSide::Short.pnl(110.0, 100.0), 10.0);
        assert_eq!(PositionSide::Short.pnl(100.0, 110.0), -10.0);
    }

    #[test]
    fn open_carries_entry_price() {
        let pos = Position::open(PositionSide::Short, 110.0);
        assert_eq!(pos, Position::Short { entry_price: 110.0 });
        assert_eq!(pos.side(), Some(PositionSide::Short));
        assert_eq!(pos.unrealized_pnl(105.0), 5.0);
    }
}
