#![allow(dead_code)]

use chrono::NaiveDate;
pub use ruletrader::domain::ohlcv::{BarFrame, Column, OhlcvBar};
use ruletrader::domain::error::RuleTraderError;
use ruletrader::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<BarFrame, RuleTraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(RuleTraderError::Data {
                reason: reason.clone(),
            });
        }
        let bars: Vec<OhlcvBar> = self
            .data
            .get(symbol)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|b| start_date.is_none_or(|s| b.date >= s) && end_date.is_none_or(|e| b.date <= e))
            .collect();
        BarFrame::from_bars(&bars).map_err(|e| RuleTraderError::Data {
            reason: e.to_string(),
        })
    }

    fn list_symbols(&self) -> Result<Vec<String>, RuleTraderError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: &str, close: f64) -> OhlcvBar {
    OhlcvBar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000.0,
    }
}

/// Consecutive daily bars with the given closes, starting 2024-01-01.
pub fn bars_from_closes(closes: &[f64]) -> Vec<OhlcvBar> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0 + i as f64,
        })
        .collect()
}

pub fn frame_from_closes(closes: &[f64]) -> BarFrame {
    BarFrame::from_bars(&bars_from_closes(closes)).unwrap()
}

/// Contents of a `<symbol>.csv` file for the given closes.
pub fn csv_from_closes(closes: &[f64]) -> String {
    let mut out = String::from("date,open,high,low,close,volume\n");
    for bar in bars_from_closes(closes) {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.date, bar.open, bar.high, bar.low, bar.close, bar.volume
        ));
    }
    out
}
