//! Event sinks that turn engine transitions into log lines.

use bandrev_core::engine::{EventKind, EventSink, TradeEvent};
use bandrev_core::PositionSide;
use tracing::info;

/// Human-readable one-liner for an event.
///
/// `BUY at t: Price=90.00, SMA=98.00, Lower Band=92.00`
/// `SELL at t: Price=100.00, Entry=90.00, PnL=10.00`
pub fn format_event(event: &TradeEvent) -> String {
    match event.kind {
        EventKind::Entry => {
            let band = match event.side {
                PositionSide::Long => "Lower Band",
                PositionSide::Short => "Upper Band",
            };
            format!(
                "{} at {}: Price={:.2}, SMA={:.2}, {}={:.2}",
                event.action(),
                event.timestamp,
                event.price,
                event.mean,
                band,
                event.reference
            )
        }
        EventKind::Exit => format!(
            "{} at {}: Price={:.2}, Entry={:.2}, PnL={:.2}",
            event.action(),
            event.timestamp,
            event.price,
            event.entry_price.unwrap_or(f64::NAN),
            event.pnl.unwrap_or(f64::NAN)
        ),
    }
}

/// Logs every event at `info` and keeps a copy for the result.
#[derive(Debug, Default)]
pub struct LoggingSink {
    events: Vec<TradeEvent>,
}

impl LoggingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[TradeEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<TradeEvent> {
        self.events
    }
}

impl EventSink for LoggingSink {
    fn on_event(&mut self, event: &TradeEvent) {
        info!(
            bar = event.bar_index,
            action = event.action(),
            "{}",
            format_event(event)
        );
        self.events.push(event.clone());
    }
}
