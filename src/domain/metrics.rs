//! Per-ticker performance summary.

use crate::domain::backtest::{BacktestResult, InstrumentResult};

#[derive(Debug, Clone, PartialEq)]
pub struct TickerSummary {
    pub ticker: String,
    pub buy_signals: usize,
    pub sell_signals: usize,
    pub trades: usize,
    pub total_pnl: f64,
    pub total_strategy_return: f64,
    pub cumulative_return: f64,
    pub win_ratio: f64,
}

impl TickerSummary {
    pub fn compute(result: &InstrumentResult) -> Self {
        let buy_signals = result.rows.iter().filter(|r| r.buy_signal).count();
        let sell_signals = result.rows.iter().filter(|r| r.sell_signal).count();
        // Fold from +0.0: an empty f64 sum is -0.0.
        let total_strategy_return = result
            .rows
            .iter()
            .filter_map(|r| r.strategy_return)
            .fold(0.0, |acc, r| acc + r);

        let trades = result.closed_trades.len();
        let total_pnl = result
            .closed_trades
            .iter()
            .map(|t| t.pnl())
            .fold(0.0, |acc, pnl| acc + pnl);
        let wins = result.closed_trades.iter().filter(|t| t.pnl() > 0.0).count();
        let win_ratio = if trades > 0 {
            wins as f64 / trades as f64
        } else {
            0.0
        };

        Self {
            ticker: result.ticker.clone(),
            buy_signals,
            sell_signals,
            trades,
            total_pnl,
            total_strategy_return,
            cumulative_return: result.final_cumulative_return().unwrap_or(1.0),
            win_ratio,
        }
    }

    pub fn compute_all(result: &BacktestResult) -> Vec<Self> {
        result.instruments.iter().map(Self::compute).collect()
    }
}
