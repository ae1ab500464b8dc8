//! Period, strategy and cumulative returns.
//!
//! `strategy_return[t]` applies the position held at the end of row `t-1`
//! to the move from `t-1` to `t`. A signal on row `t` therefore earns
//! nothing until row `t+1`.

use crate::domain::position::PositionState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnRecord {
    pub period_return: Option<f64>,
    pub strategy_return: Option<f64>,
    pub cumulative_return: f64,
}

/// `close[t] / close[t-1] - 1`; undefined at row 0 and after a zero close.
pub fn period_returns(closes: &[f64]) -> Vec<Option<f64>> {
    (0..closes.len())
        .map(|t| {
            if t == 0 || closes[t - 1] == 0.0 {
                None
            } else {
                Some(closes[t] / closes[t - 1] - 1.0)
            }
        })
        .collect()
}

pub fn accumulate_returns(closes: &[f64], positions: &[PositionState]) -> Vec<ReturnRecord> {
    let period = period_returns(closes);
    let mut cumulative = 1.0;

    period
        .iter()
        .enumerate()
        .map(|(t, &period_return)| {
            let strategy_return = match (t.checked_sub(1), period_return) {
                (Some(prev), Some(r)) => positions.get(prev).map(|p| r * p.exposure()),
                _ => None,
            };
            cumulative *= 1.0 + strategy_return.unwrap_or(0.0);
            ReturnRecord {
                period_return,
                strategy_return,
                cumulative_return: cumulative,
            }
        })
        .collect()
}
