//! OHLCV bar representation and the columnar frame rules are evaluated on.

use crate::domain::error::EvaluationError;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvBar {
    pub fn get(&self, column: Column) -> f64 {
        match column {
            Column::Open => self.open,
            Column::High => self.high,
            Column::Low => self.low,
            Column::Close => self.close,
            Column::Volume => self.volume,
        }
    }
}

/// Base data column a rule identifier can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Open,
        Column::High,
        Column::Low,
        Column::Close,
        Column::Volume,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Open => "open",
            Column::High => "high",
            Column::Low => "low",
            Column::Close => "close",
            Column::Volume => "volume",
        }
    }

    /// Exact (case-sensitive) lookup by column name.
    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Index-aligned columnar view of a bar sequence.
///
/// Dates are strictly increasing and every present column has one value per
/// date. `close` is always present; other columns may be absent when the
/// source did not provide them.
#[derive(Debug, Clone, PartialEq)]
pub struct BarFrame {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<Column, Vec<f64>>,
}

impl BarFrame {
    /// Build a frame holding every column from row-oriented bars.
    pub fn from_bars(bars: &[OhlcvBar]) -> Result<Self, EvaluationError> {
        let dates = bars.iter().map(|b| b.date).collect();
        let columns = Column::ALL
            .into_iter()
            .map(|c| (c, bars.iter().map(|b| b.get(c)).collect()))
            .collect();
        Self::from_columns(dates, columns)
    }

    pub fn from_columns(
        dates: Vec<NaiveDate>,
        columns: BTreeMap<Column, Vec<f64>>,
    ) -> Result<Self, EvaluationError> {
        if !columns.contains_key(&Column::Close) {
            return Err(EvaluationError::MissingColumn {
                column: Column::Close,
            });
        }
        for (column, values) in &columns {
            if values.len() != dates.len() {
                return Err(EvaluationError::LengthMismatch {
                    column: *column,
                    expected: dates.len(),
                    actual: values.len(),
                });
            }
        }
        if let Some(pos) = dates.windows(2).position(|w| w[1] <= w[0]) {
            return Err(EvaluationError::UnorderedDates { index: pos + 1 });
        }
        Ok(Self { dates, columns })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn column(&self, column: Column) -> Result<&[f64], EvaluationError> {
        self.columns
            .get(&column)
            .map(Vec::as_slice)
            .ok_or(EvaluationError::MissingColumn { column })
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains_key(&column)
    }

    pub fn close(&self) -> &[f64] {
        self.columns
            .get(&Column::Close)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
