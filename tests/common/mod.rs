#![allow(dead_code)]

use algotrader::domain::error::AlgotraderError;
use algotrader::domain::strategy::StrategyParams;
use algotrader::domain::table::PriceTable;
use algotrader::ports::data_port::DataPort;
use chrono::NaiveDate;

/// Serves a fixed table, or fails the way an unreadable source would.
pub struct MockDataPort {
    pub table: PriceTable,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new(table: PriceTable) -> Self {
        Self { table, error: None }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            table: PriceTable::default(),
            error: Some(reason.to_string()),
        }
    }
}

impl DataPort for MockDataPort {
    fn load_table(&self) -> Result<PriceTable, AlgotraderError> {
        if let Some(reason) = &self.error {
            return Err(AlgotraderError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self.table.clone())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive calendar days starting 2024-01-01.
pub fn day(i: usize) -> NaiveDate {
    date(2024, 1, 1) + chrono::Duration::days(i as i64)
}

/// Wide table with one `Close_<T>` column per entry; shorter series leave
/// trailing cells blank.
pub fn wide_table(series: &[(&str, &[f64])]) -> PriceTable {
    let columns: Vec<String> = series.iter().map(|(t, _)| format!("Close_{t}")).collect();
    let mut table = PriceTable::with_columns(&columns);
    let len = series.iter().map(|(_, c)| c.len()).max().unwrap_or(0);
    for i in 0..len {
        let cells: Vec<String> = series
            .iter()
            .map(|(_, closes)| closes.get(i).map(|c| c.to_string()).unwrap_or_default())
            .collect();
        table.push_row(day(i), &cells);
    }
    table
}

/// Long table (`Ticker`, `Close`), rows interleaved by date.
pub fn long_table(series: &[(&str, &[f64])]) -> PriceTable {
    let mut table = PriceTable::with_columns(&["Ticker", "Close"]);
    let len = series.iter().map(|(_, c)| c.len()).max().unwrap_or(0);
    for i in 0..len {
        for (ticker, closes) in series {
            if let Some(close) = closes.get(i) {
                table.push_row(day(i), &[ticker.to_string(), close.to_string()]);
            }
        }
    }
    table
}

/// Fifty closes mixing dips and rallies; every indicator is defined on the
/// last row only.
pub fn fifty_closes() -> Vec<f64> {
    let mut closes = vec![
        10.0, 9.0, 11.0, 12.0, 8.0, 14.0, 15.0, 9.0, 8.0, 20.0, 21.0, 22.0, 7.0, 6.0, 19.0, 18.0,
        17.0, 30.0, 29.0, 28.0, 27.0, 26.0, 31.0, 32.0, 33.0, 34.0, 35.0, 5.0, 4.0, 3.0, 2.0, 1.0,
    ];
    closes.extend((40..=56).map(f64::from));
    closes.push(60.0);
    closes
}

/// Short windows with thresholds that never block a crossover, so signals
/// follow the moving averages alone.
pub fn crossover_only_params() -> StrategyParams {
    StrategyParams {
        rsi_period: 2,
        short_window: 2,
        long_window: 3,
        buy_threshold: 101.0,
        sell_threshold: -1.0,
    }
}

/// With [`crossover_only_params`]: buy on index 4 at 10, sell on index 7 at 9.
pub const ONE_TRADE_CLOSES: [f64; 10] = [10.0, 9.0, 8.0, 9.0, 10.0, 11.0, 10.0, 9.0, 8.0, 7.0];
