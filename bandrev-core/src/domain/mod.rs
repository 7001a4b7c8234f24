//! Domain types: bars, positions, completed trades.

pub mod bar;
pub mod position;
pub mod trade;

pub use bar::Bar;
pub use position::{Position, PositionSide};
pub use trade::TradeRecord;
