//! Strategy parameters: indicator windows and signal thresholds.

use std::fmt;
use std::str::FromStr;

/// Named RSI threshold pairs.
///
/// `Classic` is the textbook oversold/overbought band (30/70). `Relaxed`
/// (50/55) fires far more often on short histories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdPreset {
    #[default]
    Classic,
    Relaxed,
}

impl ThresholdPreset {
    pub fn buy_threshold(self) -> f64 {
        match self {
            ThresholdPreset::Classic => 30.0,
            ThresholdPreset::Relaxed => 50.0,
        }
    }

    pub fn sell_threshold(self) -> f64 {
        match self {
            ThresholdPreset::Classic => 70.0,
            ThresholdPreset::Relaxed => 55.0,
        }
    }
}

impl fmt::Display for ThresholdPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdPreset::Classic => write!(f, "classic"),
            ThresholdPreset::Relaxed => write!(f, "relaxed"),
        }
    }
}

impl FromStr for ThresholdPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "classic" => Ok(ThresholdPreset::Classic),
            "relaxed" => Ok(ThresholdPreset::Relaxed),
            other => Err(format!("unknown threshold preset '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyParams {
    pub rsi_period: usize,
    pub short_window: usize,
    pub long_window: usize,
    pub buy_threshold: f64,
    pub sell_threshold: f64,
}

impl StrategyParams {
    pub fn with_preset(preset: ThresholdPreset) -> Self {
        Self {
            buy_threshold: preset.buy_threshold(),
            sell_threshold: preset.sell_threshold(),
            ..Self::default()
        }
    }

    /// Rows needed before every indicator is defined.
    pub fn longest_window(&self) -> usize {
        self.rsi_period.max(self.short_window).max(self.long_window)
    }
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            short_window: 20,
            long_window: 50,
            buy_threshold: ThresholdPreset::Classic.buy_threshold(),
            sell_threshold: ThresholdPreset::Classic.sell_threshold(),
        }
    }
}
