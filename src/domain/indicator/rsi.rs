//! RSI (Relative Strength Index) indicator.
//!
//! Wilder smoothing expressed as an exponentially weighted mean:
//! - alpha = 1/n, no bias adjustment
//! - the first close has no prior, its change counts as zero and seeds both averages
//! - avg[i] = (1 - alpha) * avg[i-1] + alpha * x[i]
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n-1 closes are undefined.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};

pub fn calculate_rsi(closes: &[f64], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries::undefined(IndicatorType::Rsi(period), closes.len());
    }

    let alpha = 1.0 / period as f64;
    let mut values = Vec::with_capacity(closes.len());
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for (i, &close) in closes.iter().enumerate() {
        let change = if i == 0 { 0.0 } else { close - closes[i - 1] };
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };

        if i == 0 {
            avg_gain = gain;
            avg_loss = loss;
        } else {
            avg_gain = (1.0 - alpha) * avg_gain + alpha * gain;
            avg_loss = (1.0 - alpha) * avg_loss + alpha * loss;
        }

        if i + 1 < period {
            values.push(None);
        } else {
            values.push(Some(rsi_value(avg_gain, avg_loss)));
        }
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
