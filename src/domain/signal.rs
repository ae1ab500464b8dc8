//! Buy/sell signal generation.
//!
//! # Semantics
//!
//! - Buy: RSI below `buy_threshold` AND short MA crosses above long MA on this row
//! - Sell: RSI above `sell_threshold` AND long MA crosses above short MA on this row
//! - Crossovers are edge-triggered: `left > right` now and `left <= right` on the
//!   previous row. Sustained dominance does not re-fire.
//! - Any undefined input, including the missing previous row at index 0, is a non-match.

use crate::domain::indicator_frame::IndicatorFrame;
use crate::domain::strategy::StrategyParams;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signal {
    pub buy: bool,
    pub sell: bool,
}

impl Signal {
    pub const NONE: Signal = Signal {
        buy: false,
        sell: false,
    };
}

/// True when `left` moves from `<= right` on the previous row to `> right` now.
pub fn crossed_above(
    left_curr: Option<f64>,
    right_curr: Option<f64>,
    left_prev: Option<f64>,
    right_prev: Option<f64>,
) -> bool {
    match (left_curr, right_curr, left_prev, right_prev) {
        (Some(lc), Some(rc), Some(lp), Some(rp)) => lc > rc && lp <= rp,
        _ => false,
    }
}

/// Crossover flags of `left` over `right`; index 0 is always false.
pub fn detect_crossover(left: &[Option<f64>], right: &[Option<f64>]) -> Vec<bool> {
    let len = left.len().min(right.len());
    (0..len)
        .map(|i| i > 0 && crossed_above(left[i], right[i], left[i - 1], right[i - 1]))
        .collect()
}

pub fn generate_signals(frame: &IndicatorFrame, params: &StrategyParams) -> Vec<Signal> {
    let short: Vec<Option<f64>> = frame.rows.iter().map(|r| r.short_ma).collect();
    let long: Vec<Option<f64>> = frame.rows.iter().map(|r| r.long_ma).collect();

    let bullish = detect_crossover(&short, &long);
    let bearish = detect_crossover(&long, &short);

    frame
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let oversold = row.rsi.is_some_and(|rsi| rsi < params.buy_threshold);
            let overbought = row.rsi.is_some_and(|rsi| rsi > params.sell_threshold);
            Signal {
                buy: oversold && bullish[i],
                sell: overbought && bearish[i],
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator_frame::IndicatorRow;
    use chrono::NaiveDate;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    fn frame(rows: &[(Option<f64>, Option<f64>, Option<f64>)]) -> IndicatorFrame {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        IndicatorFrame {
            ticker: "TEST".into(),
            rows: rows
                .iter()
                .enumerate()
                .map(|(i, &(rsi, short_ma, long_ma))| IndicatorRow {
                    date: start + chrono::Duration::days(i as i64),
                    close: 100.0,
                    rsi,
                    short_ma,
                    long_ma,
                })
                .collect(),
        }
    }

    #[test]
    fn crossover_fires_only_on_inversion() {
        let short = some(&[1.0, 2.0, 3.0, 4.0]);
        let long = some(&[4.0, 3.0, 2.0, 1.0]);
        assert_eq!(
            detect_crossover(&short, &long),
            vec![false, false, true, false]
        );
    }

    #[test]
    fn crossover_from_equality_counts() {
        let short = some(&[2.0, 2.0, 3.0]);
        let long = some(&[2.0, 2.0, 2.0]);
        assert_eq!(detect_crossover(&short, &long), vec![false, false, true]);
    }

    #[test]
    fn sustained_dominance_does_not_refire() {
        let short = some(&[5.0, 6.0, 7.0, 8.0]);
        let long = some(&[1.0, 1.0, 1.0, 1.0]);
        assert!(detect_crossover(&short, &long).iter().all(|&c| !c));
    }

    #[test]
    fn crossover_ignores_undefined_previous() {
        let short = vec![None, Some(3.0), Some(4.0)];
        let long = vec![None, Some(2.0), Some(1.0)];
        assert_eq!(detect_crossover(&short, &long), vec![false, false, false]);
    }

    #[test]
    fn crossed_above_requires_all_inputs() {
        assert!(crossed_above(Some(2.0), Some(1.0), Some(1.0), Some(1.0)));
        assert!(!crossed_above(Some(2.0), None, Some(1.0), Some(1.0)));
        assert!(!crossed_above(Some(2.0), Some(1.0), None, Some(1.0)));
    }

    #[test]
    fn buy_needs_oversold_and_bullish_cross() {
        let f = frame(&[
            (Some(20.0), Some(1.0), Some(2.0)),
            (Some(20.0), Some(3.0), Some(2.0)),
        ]);
        let signals = generate_signals(&f, &StrategyParams::default());
        assert_eq!(signals[0], Signal::NONE);
        assert_eq!(signals[1], Signal { buy: true, sell: false });
    }

    #[test]
    fn bullish_cross_without_oversold_is_ignored() {
        let f = frame(&[
            (Some(45.0), Some(1.0), Some(2.0)),
            (Some(45.0), Some(3.0), Some(2.0)),
        ]);
        let signals = generate_signals(&f, &StrategyParams::default());
        assert_eq!(signals[1], Signal::NONE);
    }

    #[test]
    fn sell_needs_overbought_and_bearish_cross() {
        let f = frame(&[
            (Some(80.0), Some(3.0), Some(2.0)),
            (Some(80.0), Some(1.0), Some(2.0)),
        ]);
        let signals = generate_signals(&f, &StrategyParams::default());
        assert_eq!(signals[1], Signal { buy: false, sell: true });
    }

    #[test]
    fn undefined_rsi_never_signals() {
        let f = frame(&[(None, Some(1.0), Some(2.0)), (None, Some(3.0), Some(2.0))]);
        let signals = generate_signals(&f, &StrategyParams::default());
        assert!(signals.iter().all(|s| *s == Signal::NONE));
    }

    #[test]
    fn degenerate_thresholds_can_fire_both() {
        // overlapping thresholds: every defined RSI is both oversold and overbought
        let params = StrategyParams {
            buy_threshold: 100.0,
            sell_threshold: 0.0,
            ..StrategyParams::default()
        };
        let f = frame(&[
            (Some(50.0), Some(1.0), Some(2.0)),
            (Some(50.0), Some(3.0), Some(2.0)),
            (Some(50.0), Some(1.0), Some(2.0)),
        ]);
        let signals = generate_signals(&f, &params);
        assert_eq!(signals[1], Signal { buy: true, sell: false });
        assert_eq!(signals[2], Signal { buy: false, sell: true });
    }
}
