//! Bandrev Core: single-asset Bollinger mean-reversion backtesting engine.
//!
//! This crate contains the pure computation:
//! - Domain types (bars, positions, completed trades)
//! - Rolling mean / population stdev of close, and the bands built from them
//! - Flat / Long / Short band-crossing state machine
//! - Realized P&L accumulator with drawdown tracking
//! - Summary ratios (win rate, averages, profit factor)
//!
//! No I/O happens here. Trade events go to a caller-supplied `EventSink`.

pub mod domain;
pub mod engine;
pub mod indicators;

pub use domain::{Bar, Position, PositionSide, TradeRecord};
pub use engine::{
    run_backtest, run_backtest_quiet, BacktestOutcome, Backtester, EngineError, EventKind,
    EventSink, PerformanceState, StrategyParams, Summary, TradeEvent,
};
pub use indicators::{rolling_stat, BollingerBands, RollingStat, RollingStats};
