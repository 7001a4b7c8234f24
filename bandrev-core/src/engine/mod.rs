//! Backtesting engine: rolling statistics in, position transitions and
//! performance accounting out.
//!
//! One forward pass over the bars. Per bar:
//! 1. Rolling mean and stdev of close over the trailing window
//! 2. Band state machine (Flat / Long / Short)
//! 3. Realized P&L drawdown update

pub mod events;
pub mod loop_runner;
pub mod machine;
pub mod params;
pub mod state;
pub mod summary;

pub use events::{EventKind, EventSink, FnSink, NullSink, TradeEvent};
pub use loop_runner::{run_backtest, run_backtest_quiet, BacktestOutcome, Backtester};
pub use machine::{BandMachine, Transition};
pub use params::{EngineError, StrategyParams, DEFAULT_MULTIPLIER, DEFAULT_WINDOW};
pub use state::PerformanceState;
pub use summary::Summary;
