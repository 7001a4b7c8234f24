//! Single forward pass over the bar sequence.
//!
//! Per bar:
//! 1. Rolling statistics for the window ending at the bar
//! 2. State machine transition (may emit events and close a trade)
//! 3. Drawdown bookkeeping

use crate::domain::{Bar, TradeRecord};
use crate::indicators::{RollingStat, RollingStats};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::events::{EventSink, NullSink};
use super::machine::{BandMachine, Transition};
use super::params::{EngineError, StrategyParams};
use super::state::PerformanceState;
use super::summary::Summary;

/// Final state of one run plus everything derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestOutcome {
    pub params: StrategyParams,
    pub state: PerformanceState,
    /// Completed trades in chronological order.
    pub trades: Vec<TradeRecord>,
    pub summary: Summary,
    pub bars_processed: usize,
    /// Bars with ready statistics and non-zero stdev.
    pub bars_evaluated: usize,
    /// Close of the last bar, for valuing an unclosed position.
    pub last_close: Option<f64>,
}

impl BacktestOutcome {
    /// Paper P&L of a position left open at end of data. Not part of any metric.
    pub fn open_position_pnl(&self) -> Option<f64> {
        let close = self.last_close?;
        self.state
            .position
            .side()
            .map(|_| self.state.position.unrealized_pnl(close))
    }
}

/// Incremental driver: owns the accumulator and the state machine for one run.
///
/// Bars must be fed in order, each exactly once.
#[derive(Debug, Clone)]
pub struct Backtester {
    params: StrategyParams,
    machine: BandMachine,
    state: PerformanceState,
    trades: Vec<TradeRecord>,
    bars_processed: usize,
    bars_evaluated: usize,
    last_close: Option<f64>,
}

impl Backtester {
    pub fn new(params: StrategyParams) -> Result<Self, EngineError> {
        params.validate()?;
        Ok(Self {
            params,
            machine: BandMachine::new(params.multiplier),
            state: PerformanceState::new(),
            trades: Vec::new(),
            bars_processed: 0,
            bars_evaluated: 0,
            last_close: None,
        })
    }

    pub fn params(&self) -> StrategyParams {
        self.params
    }

    pub fn state(&self) -> &PerformanceState {
        &self.state
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    /// Process bar `index` given its precomputed statistics.
    pub fn step(
        &mut self,
        index: usize,
        bar: &Bar,
        stat: Option<RollingStat>,
        sink: &mut dyn EventSink,
    ) -> Transition {
        let transition = self
            .machine
            .on_bar(&mut self.state, index, bar, stat, sink);
        self.state.mark_bar();
        self.bars_processed += 1;
        self.last_close = Some(bar.close);
        if transition != Transition::Skipped {
            self.bars_evaluated += 1;
        }
        if let Transition::Exited(trade) = &transition {
            self.trades.push(trade.clone());
        }
        transition
    }

    pub fn finish(self) -> BacktestOutcome {
        let summary = Summary::from_state(&self.state);
        BacktestOutcome {
            params: self.params,
            state: self.state,
            trades: self.trades,
            summary,
            bars_processed: self.bars_processed,
            bars_evaluated: self.bars_evaluated,
            last_close: self.last_close,
        }
    }
}

/// Run the strategy over `bars`, reporting every entry and exit to `sink`.
///
/// Fails only on invalid parameters, before any bar is processed. Too few
/// bars is not an error: the run completes with zero trades.
pub fn run_backtest(
    bars: &[Bar],
    params: &StrategyParams,
    sink: &mut dyn EventSink,
) -> Result<BacktestOutcome, EngineError> {
    let mut backtester = Backtester::new(*params)?;
    let stats = RollingStats::new(params.window).compute(bars);

    for (index, (bar, stat)) in bars.iter().zip(stats).enumerate() {
        backtester.step(index, bar, stat, sink);
    }

    let outcome = backtester.finish();
    debug!(
        window = params.window,
        multiplier = params.multiplier,
        bars = outcome.bars_processed,
        trades = outcome.state.total_trades,
        pnl = outcome.state.running_pnl,
        "backtest pass complete"
    );
    Ok(outcome)
}

/// [`run_backtest`] without event delivery.
pub fn run_backtest_quiet(
    bars: &[Bar],
    params: &StrategyParams,
) -> Result<BacktestOutcome, EngineError> {
    run_backtest(bars, params, &mut NullSink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::events::TradeEvent;
    use crate::indicators::make_bars;

    #[test]
    fn invalid_params_fail_before_processing() {
        let bars = make_bars(&[1.0, 2.0, 3.0]);
        let mut events: Vec<TradeEvent> = Vec::new();
        let err = run_backtest(&bars, &StrategyParams::new(0, 2.0), &mut events).unwrap_err();
        assert_eq!(err, EngineError::InvalidWindow(0));
        assert!(events.is_empty());
    }

    #[test]
    fn empty_input_is_an_empty_result() {
        let outcome = run_backtest_quiet(&[], &StrategyParams::default()).unwrap();
        assert_eq!(outcome.bars_processed, 0);
        assert_eq!(outcome.state, PerformanceState::new());
        assert!(outcome.summary.is_empty());
        assert_eq!(outcome.open_position_pnl(), None);
    }

    #[test]
    fn counts_processed_and_evaluated_bars() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 12.0, 12.0, 13.0]);
        let outcome = run_backtest_quiet(&bars, &StrategyParams::new(3, 2.0)).unwrap();
        assert_eq!(outcome.bars_processed, 6);
        // index 0,1 not ready; index 4 window [12,12,12] has zero stdev
        assert_eq!(outcome.bars_evaluated, 3);
    }

    #[test]
    fn open_position_left_open_at_end() {
        let bars = make_bars(&[100.0, 100.0, 100.0, 100.0, 80.0, 79.0]);
        let outcome = run_backtest_quiet(&bars, &StrategyParams::new(5, 1.0)).unwrap();
        assert_eq!(outcome.state.total_trades, 0);
        assert_eq!(
            outcome.state.position,
            crate::domain::Position::Long { entry_price: 80.0 }
        );
        assert_eq!(outcome.open_position_pnl(), Some(-1.0));
        assert_eq!(outcome.state.max_drawdown, 0.0);
    }
}
