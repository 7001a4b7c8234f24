//! Bollinger Bands: rolling mean +/- multiplier * population stddev.

use super::rolling::RollingStat;
use serde::{Deserialize, Serialize};

/// Band levels at one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl BollingerBands {
    pub fn from_stat(stat: RollingStat, multiplier: f64) -> Self {
        let half_width = multiplier * stat.stdev;
        Self {
            upper: stat.mean + half_width,
            middle: stat.mean,
            lower: stat.mean - half_width,
        }
    }

    /// Zero-width bands carry no signal.
    pub fn is_collapsed(&self) -> bool {
        self.upper <= self.lower
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn bands_symmetric_around_mean() {
        let bands = BollingerBands::from_stat(
            RollingStat {
                mean: 98.0,
                stdev: 4.0,
            },
            2.0,
        );
        assert_approx(bands.upper, 106.0, DEFAULT_EPSILON);
        assert_approx(bands.lower, 90.0, DEFAULT_EPSILON);
        assert_eq!(bands.middle, 98.0);
        assert!(!bands.is_collapsed());
    }

    #[test]
    fn zero_stdev_collapses_to_mean() {
        let bands = BollingerBands::from_stat(
            RollingStat {
                mean: 100.0,
                stdev: 0.0,
            },
            2.0,
        );
        assert_eq!(bands.upper, 100.0);
        assert_eq!(bands.lower, 100.0);
        assert!(bands.is_collapsed());
    }
}
