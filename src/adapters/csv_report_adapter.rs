//! CSV report adapters: the concatenated signal table, the per-ticker summary
//! and the trade log.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::AlgotraderError;
use crate::domain::metrics::TickerSummary;
use crate::domain::position::{ClosedTrade, OpenTrade};
use crate::ports::report_port::ReportPort;
use serde::Serialize;
use std::path::Path;

pub const SIGNAL_HEADERS: [&str; 14] = [
    "Date",
    "Ticker",
    "Close",
    "RSI",
    "20DMA",
    "50DMA",
    "Buy_Signal",
    "Sell_Signal",
    "Position",
    "Buy_Price",
    "Sell_Price",
    "Daily_Return",
    "Strategy_Return",
    "Cumulative_Strategy_Return",
];

pub const SUMMARY_HEADERS: [&str; 8] = [
    "Ticker",
    "Buy_Signals",
    "Sell_Signals",
    "Trades",
    "Total_PnL",
    "Total_Strategy_Return",
    "Cumulative_Return",
    "Win_Ratio",
];

pub const TRADE_HEADERS: [&str; 8] = [
    "Ticker",
    "Entry_Date",
    "Exit_Date",
    "Entry_Price",
    "Exit_Price",
    "PnL",
    "Return",
    "Holding_Days",
];

/// Field order must match [`SIGNAL_HEADERS`].
#[derive(Serialize)]
struct SignalRecord<'a> {
    date: String,
    ticker: &'a str,
    close: f64,
    rsi: Option<f64>,
    short_ma: Option<f64>,
    long_ma: Option<f64>,
    buy_signal: bool,
    sell_signal: bool,
    position: u8,
    buy_price: Option<f64>,
    sell_price: Option<f64>,
    daily_return: Option<f64>,
    strategy_return: Option<f64>,
    cumulative_return: f64,
}

/// Field order must match [`SUMMARY_HEADERS`].
#[derive(Serialize)]
struct SummaryRecord<'a> {
    ticker: &'a str,
    buy_signals: usize,
    sell_signals: usize,
    trades: usize,
    total_pnl: f64,
    total_strategy_return: f64,
    cumulative_return: f64,
    win_ratio: f64,
}

/// Field order must match [`TRADE_HEADERS`]. Open trades leave every exit
/// field empty.
#[derive(Serialize)]
struct TradeRecord<'a> {
    ticker: &'a str,
    entry_date: String,
    exit_date: Option<String>,
    entry_price: f64,
    exit_price: Option<f64>,
    pnl: Option<f64>,
    trade_return: Option<f64>,
    holding_days: Option<i64>,
}

impl<'a> TradeRecord<'a> {
    fn closed(trade: &'a ClosedTrade) -> Self {
        Self {
            ticker: &trade.ticker,
            entry_date: trade.entry_date.format("%Y-%m-%d").to_string(),
            exit_date: Some(trade.exit_date.format("%Y-%m-%d").to_string()),
            entry_price: trade.entry_price,
            exit_price: Some(trade.exit_price),
            pnl: Some(trade.pnl()),
            trade_return: trade.trade_return(),
            holding_days: Some(trade.holding_days()),
        }
    }

    fn open(trade: &'a OpenTrade) -> Self {
        Self {
            ticker: &trade.ticker,
            entry_date: trade.entry_date.format("%Y-%m-%d").to_string(),
            exit_date: None,
            entry_price: trade.entry_price,
            exit_price: None,
            pnl: None,
            trade_return: None,
            holding_days: None,
        }
    }
}

fn report_error(output_path: &Path, e: impl std::fmt::Display) -> AlgotraderError {
    AlgotraderError::Report {
        reason: format!("failed to write {}: {}", output_path.display(), e),
    }
}

fn open_writer(output_path: &Path) -> Result<csv::Writer<std::fs::File>, AlgotraderError> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(output_path)
        .map_err(|e| AlgotraderError::Report {
            reason: format!("failed to create {}: {}", output_path.display(), e),
        })
}

/// Writes every row of every instrument, one line per (ticker, date).
pub struct CsvReportAdapter;

impl ReportPort for CsvReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), AlgotraderError> {
        let mut wtr = open_writer(output_path)?;
        wtr.write_record(SIGNAL_HEADERS)
            .map_err(|e| report_error(output_path, e))?;

        for (ticker, row) in result.rows() {
            wtr.serialize(SignalRecord {
                date: row.date.format("%Y-%m-%d").to_string(),
                ticker,
                close: row.close,
                rsi: row.rsi,
                short_ma: row.short_ma,
                long_ma: row.long_ma,
                buy_signal: row.buy_signal,
                sell_signal: row.sell_signal,
                position: u8::from(row.position.is_long()),
                buy_price: row.buy_price,
                sell_price: row.sell_price,
                daily_return: row.daily_return,
                strategy_return: row.strategy_return,
                cumulative_return: row.cumulative_return,
            })
            .map_err(|e| report_error(output_path, e))?;
        }

        wtr.flush().map_err(|e| report_error(output_path, e))?;
        Ok(())
    }
}

/// Writes one summary line per backtested ticker.
pub struct CsvSummaryAdapter;

impl ReportPort for CsvSummaryAdapter {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), AlgotraderError> {
        let mut wtr = open_writer(output_path)?;
        wtr.write_record(SUMMARY_HEADERS)
            .map_err(|e| report_error(output_path, e))?;

        for summary in TickerSummary::compute_all(result) {
            wtr.serialize(SummaryRecord {
                ticker: &summary.ticker,
                buy_signals: summary.buy_signals,
                sell_signals: summary.sell_signals,
                trades: summary.trades,
                total_pnl: summary.total_pnl,
                total_strategy_return: summary.total_strategy_return,
                cumulative_return: summary.cumulative_return,
                win_ratio: summary.win_ratio,
            })
            .map_err(|e| report_error(output_path, e))?;
        }

        wtr.flush().map_err(|e| report_error(output_path, e))?;
        Ok(())
    }
}

/// Writes every closed trade, then any position still open at the end,
/// grouped by ticker.
pub struct CsvTradeLogAdapter;

impl ReportPort for CsvTradeLogAdapter {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), AlgotraderError> {
        let mut wtr = open_writer(output_path)?;
        wtr.write_record(TRADE_HEADERS)
            .map_err(|e| report_error(output_path, e))?;

        for instrument in &result.instruments {
            let closed = instrument.closed_trades.iter().map(TradeRecord::closed);
            let open = instrument.open_trade.iter().map(TradeRecord::open);
            for record in closed.chain(open) {
                wtr.serialize(record)
                    .map_err(|e| report_error(output_path, e))?;
            }
        }

        wtr.flush().map_err(|e| report_error(output_path, e))?;
        Ok(())
    }
}
