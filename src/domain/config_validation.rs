//! Configuration validation.
//!
//! Validates all config fields before a backtest runs.

use crate::domain::error::AlgotraderError;
use crate::domain::strategy::{StrategyParams, ThresholdPreset};
use crate::domain::universe::parse_tickers;
use crate::logging::{is_valid_format, is_valid_level};
use crate::ports::config_port::ConfigPort;

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), AlgotraderError> {
    read_strategy_params(config).map(|_| ())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), AlgotraderError> {
    validate_tickers(config)?;
    validate_parallel(config)?;
    Ok(())
}

pub fn validate_logging_config(config: &dyn ConfigPort) -> Result<(), AlgotraderError> {
    if let Some(level) = config.get_string("logging", "level") {
        if !is_valid_level(&level) {
            return Err(invalid("logging", "level", format!("unknown level '{level}'")));
        }
    }
    if let Some(format) = config.get_string("logging", "format") {
        if !is_valid_format(&format) {
            return Err(invalid(
                "logging",
                "format",
                format!("'{format}' is not one of pretty, json"),
            ));
        }
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> AlgotraderError {
    AlgotraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn read_window(
    config: &dyn ConfigPort,
    key: &str,
    default: usize,
) -> Result<usize, AlgotraderError> {
    let Some(raw) = config.get_string("strategy", key) else {
        return Ok(default);
    };
    let value: usize = raw
        .trim()
        .parse()
        .map_err(|_| invalid("strategy", key, format!("'{raw}' is not a whole number")))?;
    if value == 0 {
        return Err(invalid("strategy", key, format!("{key} must be at least 1")));
    }
    Ok(value)
}

fn read_threshold(
    config: &dyn ConfigPort,
    key: &str,
    default: f64,
) -> Result<f64, AlgotraderError> {
    let Some(raw) = config.get_string("strategy", key) else {
        return Ok(default);
    };
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid("strategy", key, format!("'{raw}' is not a number")))?;
    if !(0.0..=100.0).contains(&value) {
        return Err(invalid("strategy", key, format!("{key} must be between 0 and 100")));
    }
    Ok(value)
}

/// Reads `[strategy]`, applying the threshold preset and explicit overrides.
pub fn read_strategy_params(config: &dyn ConfigPort) -> Result<StrategyParams, AlgotraderError> {
    let preset = match config.get_string("strategy", "threshold_preset") {
        Some(raw) => raw
            .parse::<ThresholdPreset>()
            .map_err(|e| invalid("strategy", "threshold_preset", e))?,
        None => ThresholdPreset::default(),
    };
    let defaults = StrategyParams::with_preset(preset);

    let params = StrategyParams {
        rsi_period: read_window(config, "rsi_period", defaults.rsi_period)?,
        short_window: read_window(config, "short_window", defaults.short_window)?,
        long_window: read_window(config, "long_window", defaults.long_window)?,
        buy_threshold: read_threshold(config, "buy_threshold", defaults.buy_threshold)?,
        sell_threshold: read_threshold(config, "sell_threshold", defaults.sell_threshold)?,
    };

    if params.short_window >= params.long_window {
        return Err(invalid(
            "strategy",
            "short_window",
            "short_window must be less than long_window",
        ));
    }

    Ok(params)
}

fn validate_tickers(config: &dyn ConfigPort) -> Result<(), AlgotraderError> {
    if let Some(raw) = config.get_string("backtest", "tickers") {
        if !raw.trim().is_empty() {
            parse_tickers(&raw).map_err(|e| invalid("backtest", "tickers", e.to_string()))?;
        }
    }
    Ok(())
}

fn validate_parallel(config: &dyn ConfigPort) -> Result<(), AlgotraderError> {
    if let Some(raw) = config.get_string("backtest", "parallel") {
        let known = ["true", "yes", "1", "false", "no", "0"];
        if !known.contains(&raw.trim().to_lowercase().as_str()) {
            return Err(invalid("backtest", "parallel", format!("'{raw}' is not a boolean")));
        }
    }
    Ok(())
}
