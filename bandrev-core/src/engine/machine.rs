//! Band-crossing state machine: Flat → Long/Short → Flat.
//!
//! Entries fire on a close strictly outside the bands; exits fire when the
//! close returns to the rolling mean. One position at a time, no re-entry on
//! the bar that closed a position.

use crate::domain::{Bar, Position, PositionSide, TradeRecord};
use crate::indicators::{BollingerBands, RollingStat};
use tracing::debug;

use super::events::{EventKind, EventSink, TradeEvent};
use super::state::PerformanceState;

/// What happened on one bar.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// No stats yet, or zero-width bands.
    Skipped,
    /// Evaluated, state unchanged.
    Hold,
    Entered(PositionSide),
    Exited(TradeRecord),
}

/// Entry bookkeeping the trade tape needs but `Position` does not carry.
#[derive(Debug, Clone)]
struct OpenLeg {
    entry_index: usize,
    entry_timestamp: String,
}

#[derive(Debug, Clone)]
pub struct BandMachine {
    multiplier: f64,
    open_leg: Option<OpenLeg>,
}

impl BandMachine {
    pub fn new(multiplier: f64) -> Self {
        Self {
            multiplier,
            open_leg: None,
        }
    }

    /// Evaluate one bar against its rolling statistics.
    ///
    /// The caller runs `PerformanceState::mark_bar` afterwards.
    pub fn on_bar(
        &mut self,
        perf: &mut PerformanceState,
        index: usize,
        bar: &Bar,
        stat: Option<RollingStat>,
        sink: &mut dyn EventSink,
    ) -> Transition {
        let Some(stat) = stat else {
            return Transition::Skipped;
        };
        let bands = BollingerBands::from_stat(stat, self.multiplier);
        if bands.is_collapsed() {
            return Transition::Skipped;
        }
        let close = bar.close;

        let position = perf.position;
        match position {
            Position::Flat => {
                let entry = if close < bands.lower {
                    Some((PositionSide::Long, bands.lower))
                } else if close > bands.upper {
                    Some((PositionSide::Short, bands.upper))
                } else {
                    None
                };
                let Some((side, band)) = entry else {
                    return Transition::Hold;
                };

                perf.position = Position::open(side, close);
                let timestamp = bar.label(index);
                self.open_leg = Some(OpenLeg {
                    entry_index: index,
                    entry_timestamp: timestamp.clone(),
                });
                debug!(index, %side, price = close, band, "entry");
                sink.on_event(&TradeEvent {
                    kind: EventKind::Entry,
                    side,
                    bar_index: index,
                    timestamp,
                    price: close,
                    mean: bands.middle,
                    reference: band,
                    entry_price: None,
                    pnl: None,
                });
                Transition::Entered(side)
            }
            Position::Long { entry_price } if close >= bands.middle => {
                self.close_position(perf, PositionSide::Long, entry_price, index, bar, bands, sink)
            }
            Position::Short { entry_price } if close <= bands.middle => {
                self.close_position(perf, PositionSide::Short, entry_price, index, bar, bands, sink)
            }
            Position::Long { .. } | Position::Short { .. } => Transition::Hold,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn close_position(
        &mut self,
        perf: &mut PerformanceState,
        side: PositionSide,
        entry_price: f64,
        index: usize,
        bar: &Bar,
        bands: BollingerBands,
        sink: &mut dyn EventSink,
    ) -> Transition {
        let close = bar.close;
        let pnl = side.pnl(entry_price, close);
        perf.record_trade(pnl);
        perf.position = Position::Flat;

        let timestamp = bar.label(index);
        let leg = self.open_leg.take();
        let (entry_index, entry_timestamp) = match leg {
            Some(leg) => (leg.entry_index, leg.entry_timestamp),
            None => (index, timestamp.clone()),
        };

        debug!(index, %side, price = close, entry_price, pnl, "exit");
        sink.on_event(&TradeEvent {
            kind: EventKind::Exit,
            side,
            bar_index: index,
            timestamp: timestamp.clone(),
            price: close,
            mean: bands.middle,
            reference: bands.middle,
            entry_price: Some(entry_price),
            pnl: Some(pnl),
        });

        Transition::Exited(TradeRecord {
            side,
            entry_index,
            entry_timestamp,
            entry_price,
            exit_index: index,
            exit_timestamp: timestamp,
            exit_price: close,
            pnl,
        })
    }
}
