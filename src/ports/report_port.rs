//! Report generation port trait.

use crate::domain::backtest::BacktestReport;
use crate::domain::error::RuleTraderError;
use crate::domain::strategy::Strategy;
use std::path::Path;

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(
        &self,
        report: &BacktestReport,
        strategy: &Strategy,
        output_dir: &Path,
    ) -> Result<(), RuleTraderError>;
}
