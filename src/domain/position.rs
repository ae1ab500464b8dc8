//! Long-only position state machine and trade log.
//!
//! States: `Flat` (initial) and `Long`.
//! - Flat + buy  -> Long, entry price = close
//! - Long + sell -> Flat, exit price = close
//! - anything else holds
//!
//! The buy transition is evaluated first. It only fires from `Flat`, so a
//! single row can never both open and close a position. Row 0 is always
//! `Flat`: crossovers need a previous row, so no transition is evaluated there.

use crate::domain::indicator_frame::IndicatorRow;
use crate::domain::signal::Signal;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Long,
}

impl PositionState {
    /// Exposure used for return accrual: Flat = 0, Long = 1.
    pub fn exposure(self) -> f64 {
        match self {
            PositionState::Flat => 0.0,
            PositionState::Long => 1.0,
        }
    }

    pub fn is_long(self) -> bool {
        self == PositionState::Long
    }
}

/// Pure transition function.
pub fn transition(state: PositionState, signal: Signal) -> PositionState {
    match state {
        PositionState::Flat if signal.buy => PositionState::Long,
        PositionState::Long if signal.sell => PositionState::Flat,
        _ => state,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionRecord {
    pub position: PositionState,
    pub entry_price: Option<f64>,
    pub exit_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub ticker: String,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
}

impl ClosedTrade {
    /// Per-unit profit or loss.
    pub fn pnl(&self) -> f64 {
        self.exit_price - self.entry_price
    }

    /// `None` when the entry price is zero.
    pub fn trade_return(&self) -> Option<f64> {
        if self.entry_price == 0.0 {
            None
        } else {
            Some(self.exit_price / self.entry_price - 1.0)
        }
    }

    pub fn holding_days(&self) -> i64 {
        (self.exit_date - self.entry_date).num_days()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenTrade {
    pub ticker: String,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
}

impl OpenTrade {
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        price - self.entry_price
    }
}

/// One machine per instrument; owns the position exclusively.
#[derive(Debug, Clone)]
pub struct PositionStateMachine {
    ticker: String,
    state: PositionState,
    open: Option<OpenTrade>,
    closed: Vec<ClosedTrade>,
}

impl PositionStateMachine {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            state: PositionState::Flat,
            open: None,
            closed: Vec::new(),
        }
    }

    /// Applies one row's signal at its close and returns the row's record.
    pub fn step(&mut self, date: NaiveDate, close: f64, signal: Signal) -> PositionRecord {
        let next = transition(self.state, signal);
        let mut record = PositionRecord {
            position: next,
            ..PositionRecord::default()
        };

        match (self.state, next) {
            (PositionState::Flat, PositionState::Long) => {
                record.entry_price = Some(close);
                self.open = Some(OpenTrade {
                    ticker: self.ticker.clone(),
                    entry_date: date,
                    entry_price: close,
                });
            }
            (PositionState::Long, PositionState::Flat) => {
                record.exit_price = Some(close);
                if let Some(open) = self.open.take() {
                    self.closed.push(ClosedTrade {
                        ticker: open.ticker,
                        entry_date: open.entry_date,
                        exit_date: date,
                        entry_price: open.entry_price,
                        exit_price: close,
                    });
                }
            }
            _ => {}
        }

        self.state = next;
        record
    }

    /// Records a row without evaluating any transition.
    pub fn hold(&self) -> PositionRecord {
        PositionRecord {
            position: self.state,
            ..PositionRecord::default()
        }
    }

    pub fn finish(self) -> PositionHistory {
        PositionHistory {
            records: Vec::new(),
            closed_trades: self.closed,
            open_trade: self.open,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PositionHistory {
    pub records: Vec<PositionRecord>,
    pub closed_trades: Vec<ClosedTrade>,
    pub open_trade: Option<OpenTrade>,
}

impl PositionHistory {
    pub fn states(&self) -> Vec<PositionState> {
        self.records.iter().map(|r| r.position).collect()
    }
}

/// Walks `rows` and `signals` in time order.
pub fn run_position_machine(
    ticker: &str,
    rows: &[IndicatorRow],
    signals: &[Signal],
) -> PositionHistory {
    let mut machine = PositionStateMachine::new(ticker);
    let mut records = Vec::with_capacity(rows.len());

    for (i, (row, signal)) in rows.iter().zip(signals).enumerate() {
        let record = if i == 0 {
            machine.hold()
        } else {
            machine.step(row.date, row.close, *signal)
        };
        records.push(record);
    }

    let mut history = machine.finish();
    history.records = records;
    history
}
