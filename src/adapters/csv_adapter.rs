//! CSV file data adapter.
//!
//! One file per symbol, `<base>/<symbol>.csv`. Columns are located by header
//! name: `date` and `close` are required, the remaining price and volume
//! columns are loaded when present.

use crate::domain::config_validation::DATE_FORMAT;
use crate::domain::error::RuleTraderError;
use crate::domain::ohlcv::{BarFrame, Column};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

fn data_error(reason: impl Into<String>) -> RuleTraderError {
    RuleTraderError::Data {
        reason: reason.into(),
    }
}

struct Layout {
    date: usize,
    columns: Vec<(Column, usize)>,
}

impl Layout {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, RuleTraderError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let date = find("date").ok_or_else(|| data_error("missing date column"))?;
        let columns: Vec<(Column, usize)> = Column::ALL
            .into_iter()
            .filter_map(|c| find(c.name()).map(|idx| (c, idx)))
            .collect();
        if !columns.iter().any(|(c, _)| *c == Column::Close) {
            return Err(data_error("missing close column"));
        }
        Ok(Self { date, columns })
    }
}

fn parse_value(
    record: &csv::StringRecord,
    column: Column,
    idx: usize,
    line: u64,
) -> Result<f64, RuleTraderError> {
    let raw = record
        .get(idx)
        .ok_or_else(|| data_error(format!("line {}: missing {} value", line, column)))?;
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e| data_error(format!("line {}: invalid {} value: {}", line, column, e)))?;
    if !value.is_finite() {
        return Err(data_error(format!("line {}: non-finite {} value", line, column)));
    }
    if column == Column::Volume && value < 0.0 {
        return Err(data_error(format!("line {}: negative volume", line)));
    }
    Ok(value)
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<BarFrame, RuleTraderError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path)
            .map_err(|e| data_error(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| data_error(format!("CSV parse error: {}", e)))?
            .clone();
        let layout = Layout::from_headers(&headers)?;

        let mut rows: Vec<(NaiveDate, Vec<f64>)> = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| data_error(format!("CSV parse error: {}", e)))?;
            let line = record.position().map_or(0, |p| p.line());

            let date_str = record
                .get(layout.date)
                .ok_or_else(|| data_error(format!("line {}: missing date value", line)))?;
            let date = NaiveDate::parse_from_str(date_str.trim(), DATE_FORMAT).map_err(|e| {
                data_error(format!("line {}: invalid date format: {}", line, e))
            })?;

            if start_date.is_some_and(|s| date < s) || end_date.is_some_and(|e| date > e) {
                continue;
            }

            let values = layout
                .columns
                .iter()
                .map(|&(column, idx)| parse_value(&record, column, idx, line))
                .collect::<Result<Vec<f64>, _>>()?;
            rows.push((date, values));
        }

        rows.sort_by_key(|(date, _)| *date);
        if let Some(w) = rows.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(data_error(format!("duplicate date {} in {}", w[0].0, path.display())));
        }

        let dates = rows.iter().map(|(date, _)| *date).collect();
        let columns: BTreeMap<Column, Vec<f64>> = layout
            .columns
            .iter()
            .enumerate()
            .map(|(slot, &(column, _))| (column, rows.iter().map(|(_, v)| v[slot]).collect()))
            .collect();

        let frame =
            BarFrame::from_columns(dates, columns).map_err(|e| data_error(e.to_string()))?;
        tracing::info!(symbol, bars = frame.len(), "loaded bars from {}", path.display());
        Ok(frame)
    }

    fn list_symbols(&self) -> Result<Vec<String>, RuleTraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            data_error(format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| data_error(format!("directory entry error: {}", e)))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem() {
                    symbols.push(stem.to_string_lossy().into_owned());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
