//! CSV file data adapter.
//!
//! Reads a delimited price file with a header row into a [`PriceTable`]. The
//! date column is the one named `Date` (any case), else the first column.
//! Header spaces become underscores so `Adj Close_TCS` reads as `Adj_Close_TCS`.

use crate::domain::error::AlgotraderError;
use crate::domain::table::{DATE_COLUMN, PriceTable, TableRow};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::path::PathBuf;

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let day = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

impl DataPort for CsvAdapter {
    fn load_table(&self) -> Result<PriceTable, AlgotraderError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| AlgotraderError::DataSource {
                reason: format!("failed to read {}: {}", self.path.display(), e),
            })?;

        let headers = rdr.headers()?.clone();
        if headers.is_empty() {
            return Err(AlgotraderError::DataSource {
                reason: format!("{} has no header row", self.path.display()),
            });
        }

        let date_idx = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(DATE_COLUMN))
            .unwrap_or(0);

        let columns: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != date_idx)
            .map(|(_, h)| h.trim().replace(' ', "_"))
            .collect();

        let mut rows = Vec::new();
        let mut bad_dates = 0usize;

        for result in rdr.records() {
            let record = result?;
            let Some(date) = record.get(date_idx).and_then(parse_date) else {
                bad_dates += 1;
                continue;
            };
            let cells = record
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != date_idx)
                .map(|(_, v)| v.to_string())
                .collect();
            rows.push(TableRow { date, cells });
        }

        if bad_dates > 0 {
            tracing::warn!(
                path = %self.path.display(),
                rows = bad_dates,
                "skipped rows with unparseable date"
            );
        }
        tracing::debug!(
            path = %self.path.display(),
            columns = columns.len(),
            rows = rows.len(),
            "loaded price table"
        );

        Ok(PriceTable::new(columns, rows))
    }
}
