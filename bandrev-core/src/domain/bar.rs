//! Bar: the fundamental market data unit.

use serde::{Deserialize, Serialize};

/// OHLCV bar for a single interval.
///
/// `timestamp` is an opaque label carried through for reporting. The engine
/// never parses or re-sorts it; bar order is the order of the slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Returns true if every OHLCV field is a finite number.
    ///
    /// Loaders reject non-finite bars; the engine assumes this holds.
    pub fn is_finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }

    /// Basic OHLC sanity check: high >= low, high bounds open/close, low bounds open/close.
    pub fn is_sane(&self) -> bool {
        if !self.is_finite() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }

    /// Label used in event logs and reports.
    ///
    /// An empty timestamp degrades to the bar's position in the sequence.
    pub fn label(&self, index: usize) -> String {
        if self.timestamp.is_empty() {
            format!("#{index}")
        } else {
            self.timestamp.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> Bar {
        Bar {
            timestamp: "2024-01-02T09:30:00Z".into(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000.0,
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_detects_non_finite() {
        let mut bar = sample_bar();
        bar.close = f64::INFINITY;
        assert!(!bar.is_finite());
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut bar = sample_bar();
        bar.high = 97.0; // below low
        assert!(!bar.is_sane());
    }

    #[test]
    fn empty_timestamp_falls_back_to_index() {
        let mut bar = sample_bar();
        assert_eq!(bar.label(3), "2024-01-02T09:30:00Z");
        bar.timestamp.clear();
        assert_eq!(bar.label(3), "#3");
    }

    #[test]
    fn bar_serialization_roundtrip() {
        let bar = sample_bar();
        let json = serde_json::to_string(&bar).unwrap();
        let deser: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar, deser);
    }
}
