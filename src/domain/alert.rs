//! Buy/sell alert messages derived from position transitions.
//!
//! Only message construction lives here; delivery to a chat service is left
//! to whoever consumes the messages.

use crate::domain::backtest::BacktestResult;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalAlert {
    pub kind: AlertKind,
    pub ticker: String,
    pub date: NaiveDate,
    pub price: f64,
    /// Per-unit P&L against the matching entry (sells only).
    pub pnl: Option<f64>,
}

impl fmt::Display for SignalAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            AlertKind::Buy => "BUY",
            AlertKind::Sell => "SELL",
        };
        write!(
            f,
            "{} signal | Ticker: {} | Date: {} | Price: {:.2}",
            label, self.ticker, self.date, self.price
        )?;
        if let Some(pnl) = self.pnl {
            write!(f, " | P&L: {:.2}", pnl)?;
        }
        Ok(())
    }
}

/// One alert per entry or exit, ordered by instrument then date.
pub fn collect_alerts(result: &BacktestResult) -> Vec<SignalAlert> {
    let mut alerts = Vec::new();

    for instrument in &result.instruments {
        let mut last_entry: Option<f64> = None;
        for row in &instrument.rows {
            if let Some(price) = row.buy_price {
                last_entry = Some(price);
                alerts.push(SignalAlert {
                    kind: AlertKind::Buy,
                    ticker: instrument.ticker.clone(),
                    date: row.date,
                    price,
                    pnl: None,
                });
            }
            if let Some(price) = row.sell_price {
                alerts.push(SignalAlert {
                    kind: AlertKind::Sell,
                    ticker: instrument.ticker.clone(),
                    date: row.date,
                    price,
                    pnl: last_entry.take().map(|entry| price - entry),
                });
            }
        }
    }

    alerts
}
