//! Per-instrument indicator table: close, RSI and both moving averages by date.

use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::price::PriceSeries;
use crate::domain::strategy::StrategyParams;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub close: f64,
    pub rsi: Option<f64>,
    pub short_ma: Option<f64>,
    pub long_ma: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    pub ticker: String,
    pub rows: Vec<IndicatorRow>,
}

impl IndicatorFrame {
    pub fn closes(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.close).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn compute_indicator_frame(series: &PriceSeries, params: &StrategyParams) -> IndicatorFrame {
    let closes = series.closes();
    let rsi = calculate_rsi(&closes, params.rsi_period);
    let short_ma = calculate_sma(&closes, params.short_window);
    let long_ma = calculate_sma(&closes, params.long_window);

    let rows = series
        .points()
        .iter()
        .enumerate()
        .map(|(i, point)| IndicatorRow {
            date: point.date,
            close: point.close,
            rsi: rsi.get(i),
            short_ma: short_ma.get(i),
            long_ma: long_ma.get(i),
        })
        .collect();

    IndicatorFrame {
        ticker: series.ticker.clone(),
        rows,
    }
}
