//! In-memory price table as delivered by the data source.
//!
//! Two layouts are recognised:
//! - wide: one column per field and instrument, e.g. `Close_RELIANCE`
//! - long: a `Ticker` column plus plain `Close`, `Open`, ... columns
//!
//! Cells are kept as raw text; numeric parsing happens when a series is
//! extracted so that bad values can be dropped per instrument.

use chrono::NaiveDate;

pub const DATE_COLUMN: &str = "Date";
pub const TICKER_COLUMN: &str = "Ticker";
pub const CLOSE_COLUMN: &str = "Close";

/// Field prefixes of wide-format columns (`<Field>_<TICKER>`).
pub const WIDE_FIELDS: &[&str] = &["Adj_Close", "Open", "High", "Low", "Close", "Volume"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableLayout {
    Wide,
    Long,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub date: NaiveDate,
    pub cells: Vec<String>,
}

/// Price table keyed by date. `columns` excludes the date column.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    columns: Vec<String>,
    rows: Vec<TableRow>,
}

impl PriceTable {
    pub fn new(columns: Vec<String>, rows: Vec<TableRow>) -> Self {
        Self { columns, rows }
    }

    pub fn with_columns<S: AsRef<str>>(columns: &[S]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row<S: AsRef<str>>(&mut self, date: NaiveDate, cells: &[S]) {
        self.rows.push(TableRow {
            date,
            cells: cells.iter().map(|c| c.as_ref().to_string()).collect(),
        });
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn layout(&self) -> TableLayout {
        if self.column_index(TICKER_COLUMN).is_some() {
            TableLayout::Long
        } else {
            TableLayout::Wide
        }
    }

    /// Raw cell text; short rows read as empty.
    pub fn cell<'a>(&self, row: &'a TableRow, column: usize) -> &'a str {
        row.cells.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parses a close price, rejecting blanks, text, non-finite and negative values.
pub fn parse_close(raw: &str) -> Option<f64> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(v),
        _ => None,
    }
}

/// Name of the close column holding `ticker` for the given layout.
pub fn close_column_for(layout: TableLayout, ticker: &str) -> String {
    match layout {
        TableLayout::Wide => format!("{CLOSE_COLUMN}_{ticker}"),
        TableLayout::Long => CLOSE_COLUMN.to_string(),
    }
}
