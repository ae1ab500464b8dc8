//! Instrument discovery and per-instrument series extraction.
//!
//! Instruments come from column suffixes (wide tables) or distinct `Ticker`
//! values (long tables), in first-appearance order. Extraction drops rows
//! whose close is unusable and reports fatal problems as an
//! [`InstrumentIssue`] so the caller can skip the instrument and carry on.

use crate::domain::error::InstrumentIssue;
use crate::domain::price::{PricePoint, PriceSeries};
use crate::domain::table::{
    PriceTable, TICKER_COLUMN, TableLayout, WIDE_FIELDS, close_column_for, parse_close,
};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedInstrument {
    pub ticker: String,
    pub reason: InstrumentIssue,
}

#[derive(Debug, Clone)]
pub struct ExtractedSeries {
    pub series: PriceSeries,
    pub dropped_rows: usize,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),
}

/// Parses a comma-separated ticker filter such as `"RELIANCE, tcs"`.
pub fn parse_tickers(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let ticker = trimmed.to_uppercase();
        if !seen.insert(ticker.clone()) {
            return Err(UniverseError::DuplicateTicker(ticker));
        }
        tickers.push(ticker);
    }

    Ok(tickers)
}

fn wide_ticker(column: &str) -> Option<&str> {
    WIDE_FIELDS.iter().find_map(|field| {
        column
            .strip_prefix(field)
            .and_then(|rest| rest.strip_prefix('_'))
            .filter(|ticker| !ticker.is_empty())
    })
}

pub fn discover_instruments(table: &PriceTable) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tickers = Vec::new();

    match table.layout() {
        TableLayout::Wide => {
            for column in table.columns() {
                if let Some(ticker) = wide_ticker(column) {
                    if seen.insert(ticker.to_string()) {
                        tickers.push(ticker.to_string());
                    }
                }
            }
        }
        TableLayout::Long => {
            if let Some(idx) = table.column_index(TICKER_COLUMN) {
                for row in table.rows() {
                    let ticker = table.cell(row, idx).trim();
                    if !ticker.is_empty() && seen.insert(ticker.to_string()) {
                        tickers.push(ticker.to_string());
                    }
                }
            }
        }
    }

    tickers
}

/// Keeps discovered tickers named in `filter` (case-insensitive), in discovery
/// order. Requested tickers absent from the table come back as skipped.
pub fn select_instruments(
    table: &PriceTable,
    discovered: Vec<String>,
    filter: Option<&[String]>,
) -> (Vec<String>, Vec<SkippedInstrument>) {
    let Some(filter) = filter else {
        return (discovered, Vec::new());
    };

    let wanted: HashSet<String> = filter.iter().map(|t| t.to_uppercase()).collect();
    let found: HashSet<String> = discovered.iter().map(|t| t.to_uppercase()).collect();

    let selected = discovered
        .into_iter()
        .filter(|t| wanted.contains(&t.to_uppercase()))
        .collect();

    let layout = table.layout();
    let missing = filter
        .iter()
        .filter(|t| !found.contains(&t.to_uppercase()))
        .map(|t| SkippedInstrument {
            ticker: t.clone(),
            reason: match layout {
                TableLayout::Wide => InstrumentIssue::MissingColumn {
                    column: close_column_for(layout, t),
                },
                TableLayout::Long => InstrumentIssue::NoUsableRows,
            },
        })
        .collect();

    (selected, missing)
}

pub fn extract_series(
    table: &PriceTable,
    ticker: &str,
) -> Result<ExtractedSeries, InstrumentIssue> {
    let layout = table.layout();
    let close_column = close_column_for(layout, ticker);
    let close_idx = table
        .column_index(&close_column)
        .ok_or_else(|| InstrumentIssue::MissingColumn {
            column: close_column.clone(),
        })?;

    let ticker_idx = match layout {
        TableLayout::Long => table.column_index(TICKER_COLUMN),
        TableLayout::Wide => None,
    };

    let mut points = Vec::new();
    let mut dropped_rows = 0;

    for row in table.rows() {
        if let Some(idx) = ticker_idx {
            if table.cell(row, idx).trim() != ticker {
                continue;
            }
        }
        match parse_close(table.cell(row, close_idx)) {
            Some(close) => points.push(PricePoint {
                date: row.date,
                close,
            }),
            None => dropped_rows += 1,
        }
    }

    let usable = points.len();
    let series = PriceSeries::new(ticker, points);
    dropped_rows += usable - series.len();

    if series.is_empty() {
        return Err(InstrumentIssue::NoUsableRows);
    }

    Ok(ExtractedSeries {
        series,
        dropped_rows,
    })
}
