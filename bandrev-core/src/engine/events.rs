//! Trade events emitted by the state machine.
//!
//! The engine never writes output itself. Every entry and exit is handed to an
//! [`EventSink`]; callers decide whether to collect, log, or drop them.

use crate::domain::PositionSide;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Entry,
    Exit,
}

/// One position transition.
///
/// `reference` is the band that triggered an entry (lower for longs, upper for
/// shorts) or the rolling mean that triggered an exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub kind: EventKind,
    pub side: PositionSide,
    pub bar_index: usize,
    pub timestamp: String,
    pub price: f64,
    pub mean: f64,
    pub reference: f64,
    /// Entry price of the position being closed. Exit events only.
    pub entry_price: Option<f64>,
    /// Realized P&L. Exit events only.
    pub pnl: Option<f64>,
}

impl TradeEvent {
    /// Conventional verb: BUY / SHORT on entry, SELL / COVER on exit.
    pub fn action(&self) -> &'static str {
        match (self.kind, self.side) {
            (EventKind::Entry, PositionSide::Long) => "BUY",
            (EventKind::Entry, PositionSide::Short) => "SHORT",
            (EventKind::Exit, PositionSide::Long) => "SELL",
            (EventKind::Exit, PositionSide::Short) => "COVER",
        }
    }
}

/// Receiver for trade events.
pub trait EventSink {
    fn on_event(&mut self, event: &TradeEvent);
}

/// Collects every event in order.
impl EventSink for Vec<TradeEvent> {
    fn on_event(&mut self, event: &TradeEvent) {
        self.push(event.clone());
    }
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn on_event(&mut self, _event: &TradeEvent) {}
}

/// Adapts a closure into a sink.
pub struct FnSink<F>(pub F);

impl<F: FnMut(&TradeEvent)> EventSink for FnSink<F> {
    fn on_event(&mut self, event: &TradeEvent) {
        (self.0)(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(side: PositionSide) -> TradeEvent {
        TradeEvent {
            kind: EventKind::Entry,
            side,
            bar_index: 5,
            timestamp: "t5".into(),
            price: 90.0,
            mean: 98.0,
            reference: 92.0,
            entry_price: None,
            pnl: None,
        }
    }

    #[test]
    fn action_names() {
        assert_eq!(entry(PositionSide::Long).action(), "BUY");
        assert_eq!(entry(PositionSide::Short).action(), "SHORT");
        let mut exit = entry(PositionSide::Long);
        exit.kind = EventKind::Exit;
        assert_eq!(exit.action(), "SELL");
        exit.side = PositionSide::Short;
        assert_eq!(exit.action(), "COVER");
    }

    #[test]
    fn vec_sink_collects_in_order() {
        let mut sink: Vec<TradeEvent> = Vec::new();
        sink.on_event(&entry(PositionSide::Long));
        sink.on_event(&entry(PositionSide::Short));
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[1].side, PositionSide::Short);
    }

    #[test]
    fn fn_sink_forwards() {
        let mut count = 0;
        {
            let mut sink = FnSink(|_: &TradeEvent| count += 1);
            sink.on_event(&entry(PositionSide::Long));
            sink.on_event(&entry(PositionSide::Long));
        }
        assert_eq!(count, 2);
    }
}
