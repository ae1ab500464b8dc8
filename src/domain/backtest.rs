//! Backtest orchestration.
//!
//! Runs indicators → signals → position machine → returns for every
//! instrument in a price table. Instruments are independent, so they are
//! processed with rayon when `parallel` is set; results are always merged in
//! discovery order.

use crate::domain::error::InstrumentIssue;
use crate::domain::indicator_frame::compute_indicator_frame;
use crate::domain::position::{ClosedTrade, OpenTrade, PositionState, run_position_machine};
use crate::domain::price::PriceSeries;
use crate::domain::returns::accumulate_returns;
use crate::domain::signal::generate_signals;
use crate::domain::strategy::StrategyParams;
use crate::domain::table::PriceTable;
use crate::domain::universe::{
    SkippedInstrument, discover_instruments, extract_series, select_instruments,
};
use chrono::NaiveDate;
use rayon::prelude::*;

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub params: StrategyParams,
    pub tickers: Option<Vec<String>>,
    pub parallel: bool,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            params: StrategyParams::default(),
            tickers: None,
            parallel: true,
        }
    }
}

/// One fully labelled row of an instrument's history.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestRow {
    pub date: NaiveDate,
    pub close: f64,
    pub rsi: Option<f64>,
    pub short_ma: Option<f64>,
    pub long_ma: Option<f64>,
    pub buy_signal: bool,
    pub sell_signal: bool,
    pub position: PositionState,
    pub buy_price: Option<f64>,
    pub sell_price: Option<f64>,
    pub daily_return: Option<f64>,
    pub strategy_return: Option<f64>,
    pub cumulative_return: f64,
}

#[derive(Debug, Clone)]
pub struct InstrumentResult {
    pub ticker: String,
    pub rows: Vec<BacktestRow>,
    pub closed_trades: Vec<ClosedTrade>,
    pub open_trade: Option<OpenTrade>,
    /// Non-fatal issues (dropped rows, short history).
    pub issues: Vec<InstrumentIssue>,
}

impl InstrumentResult {
    pub fn final_cumulative_return(&self) -> Option<f64> {
        self.rows.last().map(|r| r.cumulative_return)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BacktestResult {
    pub instruments: Vec<InstrumentResult>,
    pub skipped: Vec<SkippedInstrument>,
}

impl BacktestResult {
    /// No instrument produced a history; nothing can be reported.
    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    pub fn instrument(&self, ticker: &str) -> Option<&InstrumentResult> {
        self.instruments.iter().find(|i| i.ticker == ticker)
    }

    /// Concatenated rows ordered by (instrument, date).
    pub fn rows(&self) -> impl Iterator<Item = (&str, &BacktestRow)> {
        self.instruments
            .iter()
            .flat_map(|i| i.rows.iter().map(move |r| (i.ticker.as_str(), r)))
    }

    pub fn total_rows(&self) -> usize {
        self.instruments.iter().map(|i| i.rows.len()).sum()
    }
}

/// Full pipeline for a single instrument. Pure: depends only on `series`.
pub fn run_instrument(series: &PriceSeries, params: &StrategyParams) -> InstrumentResult {
    let frame = compute_indicator_frame(series, params);
    let signals = generate_signals(&frame, params);
    let history = run_position_machine(&series.ticker, &frame.rows, &signals);
    let returns = accumulate_returns(&frame.closes(), &history.states());

    let rows = frame
        .rows
        .iter()
        .zip(&signals)
        .zip(&history.records)
        .zip(&returns)
        .map(|(((ind, signal), pos), ret)| BacktestRow {
            date: ind.date,
            close: ind.close,
            rsi: ind.rsi,
            short_ma: ind.short_ma,
            long_ma: ind.long_ma,
            buy_signal: signal.buy,
            sell_signal: signal.sell,
            position: pos.position,
            buy_price: pos.entry_price,
            sell_price: pos.exit_price,
            daily_return: ret.period_return,
            strategy_return: ret.strategy_return,
            cumulative_return: ret.cumulative_return,
        })
        .collect();

    let mut issues = Vec::new();
    let required = params.longest_window();
    if series.len() < required {
        issues.push(InstrumentIssue::InsufficientHistory {
            bars: series.len(),
            required,
        });
    }

    InstrumentResult {
        ticker: series.ticker.clone(),
        rows,
        closed_trades: history.closed_trades,
        open_trade: history.open_trade,
        issues,
    }
}

fn prepare_and_run(
    table: &PriceTable,
    ticker: &str,
    params: &StrategyParams,
) -> Result<InstrumentResult, SkippedInstrument> {
    let extracted = extract_series(table, ticker).map_err(|reason| SkippedInstrument {
        ticker: ticker.to_string(),
        reason,
    })?;

    let mut result = run_instrument(&extracted.series, params);
    if extracted.dropped_rows > 0 {
        tracing::debug!(
            ticker,
            rows = extracted.dropped_rows,
            "dropped rows with unusable close"
        );
        result.issues.insert(
            0,
            InstrumentIssue::DataQuality {
                rows: extracted.dropped_rows,
            },
        );
    }
    Ok(result)
}

/// Backtests every instrument found in `table`.
///
/// Never fails: instruments that cannot be processed are listed in
/// [`BacktestResult::skipped`], and an empty result means no instrument was
/// usable.
pub fn run_backtest(table: &PriceTable, config: &BacktestConfig) -> BacktestResult {
    let discovered = discover_instruments(table);
    let (tickers, mut skipped) = select_instruments(table, discovered, config.tickers.as_deref());

    tracing::info!(
        instruments = tickers.len(),
        rows = table.rows().len(),
        parallel = config.parallel,
        "running backtest"
    );

    let outcomes: Vec<Result<InstrumentResult, SkippedInstrument>> = if config.parallel {
        tickers
            .par_iter()
            .map(|ticker| prepare_and_run(table, ticker, &config.params))
            .collect()
    } else {
        tickers
            .iter()
            .map(|ticker| prepare_and_run(table, ticker, &config.params))
            .collect()
    };

    let mut instruments = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            Ok(result) => {
                for issue in &result.issues {
                    tracing::warn!(ticker = %result.ticker, %issue, "instrument issue");
                }
                instruments.push(result);
            }
            Err(skip) => {
                tracing::warn!(ticker = %skip.ticker, reason = %skip.reason, "skipping instrument");
                skipped.push(skip);
            }
        }
    }

    if instruments.is_empty() {
        tracing::warn!(skipped = skipped.len(), "no instrument yielded usable data");
    }

    BacktestResult {
        instruments,
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::PricePoint;

    fn series(ticker: &str, closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceSeries::new(
            ticker,
            closes
                .iter()
                .enumerate()
                .map(|(i, &close)| PricePoint {
                    date: start + chrono::Duration::days(i as i64),
                    close,
                })
                .collect(),
        )
    }

    #[test]
    fn default_config() {
        let c = BacktestConfig::default();
        assert_eq!(c.params, StrategyParams::default());
        assert!(c.tickers.is_none());
        assert!(c.parallel);
    }

    #[test]
    fn run_instrument_rows_align() {
        let s = series("TCS", &[10.0, 11.0, 12.0, 11.0, 13.0]);
        let result = run_instrument(&s, &StrategyParams::default());
        assert_eq!(result.rows.len(), 5);
        assert_eq!(result.rows[0].daily_return, None);
        assert_eq!(result.rows[0].cumulative_return, 1.0);
        assert!(result.rows.iter().all(|r| r.position == PositionState::Flat));
    }

    #[test]
    fn short_history_is_flagged() {
        let s = series("TCS", &[10.0, 11.0, 12.0]);
        let result = run_instrument(&s, &StrategyParams::default());
        assert_eq!(
            result.issues,
            vec![InstrumentIssue::InsufficientHistory {
                bars: 3,
                required: 50
            }]
        );
    }

    #[test]
    fn empty_table_gives_empty_result() {
        let result = run_backtest(&PriceTable::default(), &BacktestConfig::default());
        assert!(result.is_empty());
        assert!(result.skipped.is_empty());
        assert_eq!(result.total_rows(), 0);
    }

    #[test]
    fn rows_iterate_in_instrument_order() {
        let mut table = PriceTable::with_columns(&["Close_B", "Close_A"]);
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        table.push_row(start, &["1", "2"]);
        table.push_row(start + chrono::Duration::days(1), &["1.5", "2.5"]);

        let result = run_backtest(&table, &BacktestConfig::default());
        let tickers: Vec<&str> = result.rows().map(|(t, _)| t).collect();
        assert_eq!(tickers, vec!["B", "B", "A", "A"]);
        assert!(result.instrument("A").is_some());
        assert!(result.instrument("C").is_none());
    }
}
