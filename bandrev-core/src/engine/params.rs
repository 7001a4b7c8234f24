//! Strategy parameters and engine errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_WINDOW: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

/// Errors that prevent a run from starting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("window must be >= 1, got {0}")]
    InvalidWindow(usize),
    #[error("multiplier must be a finite number > 0, got {0}")]
    InvalidMultiplier(f64),
}

/// Rolling window length and band width for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyParams {
    pub window: usize,
    pub multiplier: f64,
}

impl StrategyParams {
    pub fn new(window: usize, multiplier: f64) -> Self {
        Self { window, multiplier }
    }

    /// Reject parameters before any bar is touched.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.window < 1 {
            return Err(EngineError::InvalidWindow(self.window));
        }
        if !self.multiplier.is_finite() || self.multiplier <= 0.0 {
            return Err(EngineError::InvalidMultiplier(self.multiplier));
        }
        Ok(())
    }
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}
