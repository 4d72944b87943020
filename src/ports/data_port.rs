//! Data access port trait.

use crate::domain::error::RuleTraderError;
use crate::domain::ohlcv::BarFrame;
use chrono::NaiveDate;

pub trait DataPort {
    /// Load bars for `symbol`, restricted to the inclusive date range when
    /// bounds are given. The returned frame is ordered by date.
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<BarFrame, RuleTraderError>;

    fn list_symbols(&self) -> Result<Vec<String>, RuleTraderError>;
}
