//! CSV report adapter implementing ReportPort.
//!
//! Writes `trades.csv` (one row per closed trade) and `summary.csv`
//! (key/value pairs) into the output directory.

use std::fs;
use std::path::Path;

use crate::domain::backtest::BacktestReport;
use crate::domain::error::RuleTraderError;
use crate::domain::strategy::Strategy;
use crate::ports::report_port::ReportPort;

pub const TRADES_FILE: &str = "trades.csv";
pub const SUMMARY_FILE: &str = "summary.csv";

const TRADE_HEADER: [&str; 10] = [
    "entry_date",
    "entry_index",
    "entry_price",
    "exit_date",
    "exit_index",
    "exit_price",
    "pnl",
    "return",
    "bars_held",
    "forced_exit",
];

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }

    fn write_trades(report: &BacktestReport, path: &Path) -> Result<(), RuleTraderError> {
        let mut wtr = csv::Writer::from_path(path).map_err(std::io::Error::from)?;
        wtr.write_record(TRADE_HEADER)
            .map_err(std::io::Error::from)?;
        for trade in &report.trades {
            wtr.write_record([
                trade.entry_date.to_string(),
                trade.entry_index.to_string(),
                trade.entry_price.to_string(),
                trade.exit_date.to_string(),
                trade.exit_index.to_string(),
                trade.exit_price.to_string(),
                trade.pnl.to_string(),
                trade.trade_return.to_string(),
                trade.bars_held().to_string(),
                trade.forced_exit.to_string(),
            ])
            .map_err(std::io::Error::from)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_summary(
        report: &BacktestReport,
        strategy: &Strategy,
        path: &Path,
    ) -> Result<(), RuleTraderError> {
        let m = &report.metrics;
        let rows: Vec<(&str, String)> = vec![
            ("strategy", strategy.name.clone()),
            ("total_trades", m.total_trades.to_string()),
            ("trades_won", m.trades_won.to_string()),
            ("trades_lost", m.trades_lost.to_string()),
            ("trades_breakeven", m.trades_breakeven.to_string()),
            ("win_rate", m.win_rate.to_string()),
            ("total_pnl", report.total_pnl.to_string()),
            ("total_return", report.total_return.to_string()),
            ("max_drawdown", report.max_drawdown.to_string()),
            ("avg_return", m.avg_return.to_string()),
            ("largest_win", m.largest_win.to_string()),
            ("largest_loss", m.largest_loss.to_string()),
            ("avg_bars_held", m.avg_bars_held.to_string()),
            ("closed_at_end", report.closed_at_end.to_string()),
        ];

        let mut wtr = csv::Writer::from_path(path).map_err(std::io::Error::from)?;
        wtr.write_record(["metric", "value"])
            .map_err(std::io::Error::from)?;
        for (key, value) in &rows {
            wtr.write_record([*key, value.as_str()])
                .map_err(std::io::Error::from)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        report: &BacktestReport,
        strategy: &Strategy,
        output_dir: &Path,
    ) -> Result<(), RuleTraderError> {
        fs::create_dir_all(output_dir)?;
        Self::write_trades(report, &output_dir.join(TRADES_FILE))?;
        Self::write_summary(report, strategy, &output_dir.join(SUMMARY_FILE))?;
        tracing::info!(
            trades = report.trades.len(),
            "report written to {}",
            output_dir.display()
        );
        Ok(())
    }
}
