//! Single-position backtest state machine.
//!
//! FLAT -> LONG when the entry signal is true; LONG -> FLAT when the exit
//! signal is true on a later bar. Fills happen at the bar's close. A position
//! still open after the last bar is closed at the last close.

use super::metrics::{compounded_return, compute_drawdown, equity_curve, Metrics};
use super::ohlcv::BarFrame;
use super::position::{Position, Trade};
use crate::domain::rule_eval::Signals;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestReport {
    pub trades: Vec<Trade>,
    pub total_pnl: f64,
    /// Compounded: product of (1 + trade return) minus 1.
    pub total_return: f64,
    pub max_drawdown: f64,
    /// A position was still open at the end of data and force-closed.
    pub closed_at_end: bool,
    pub equity_curve: Vec<f64>,
    pub metrics: Metrics,
}

impl BacktestReport {
    fn from_trades(trades: Vec<Trade>, closed_at_end: bool) -> Self {
        let curve = equity_curve(&trades);
        BacktestReport {
            total_pnl: trades.iter().map(|t| t.pnl).sum(),
            total_return: compounded_return(&trades),
            max_drawdown: compute_drawdown(&curve),
            closed_at_end,
            metrics: Metrics::compute(&trades),
            equity_curve: curve,
            trades,
        }
    }
}

/// Run the backtest over index-aligned entry/exit signals.
///
/// Entry takes priority on a bar where both signals hold while flat; exit is
/// first checked on the following bar. An entry signal on the final bar is
/// ignored since no later bar exists to exit on. Signal values beyond the
/// frame length are ignored; missing values count as false.
pub fn run_backtest(entry: &[bool], exit: &[bool], frame: &BarFrame) -> BacktestReport {
    let closes = frame.close();
    let dates = frame.dates();
    let last = closes.len().saturating_sub(1);

    let mut open: Option<Position> = None;
    let mut trades: Vec<Trade> = Vec::new();

    for (i, (&close, &date)) in closes.iter().zip(dates).enumerate() {
        let entry_now = entry.get(i).copied().unwrap_or(false);
        let exit_now = exit.get(i).copied().unwrap_or(false);

        match open.take() {
            None => {
                if entry_now && i < last {
                    tracing::debug!(bar = i, %date, price = close, "open long");
                    open = Some(Position {
                        entry_index: i,
                        entry_date: date,
                        entry_price: close,
                    });
                }
            }
            Some(position) => {
                if exit_now {
                    let trade = position.close(i, date, close, false);
                    tracing::debug!(bar = i, %date, price = close, pnl = trade.pnl, "close long");
                    trades.push(trade);
                } else {
                    open = Some(position);
                }
            }
        }
    }

    let closed_at_end = open.is_some();
    if let Some(position) = open {
        let trade = position.close(last, dates[last], closes[last], true);
        tracing::debug!(bar = last, price = trade.exit_price, pnl = trade.pnl, "force close at end of data");
        trades.push(trade);
    }

    BacktestReport::from_trades(trades, closed_at_end)
}

/// Convenience wrapper over [`run_backtest`] for evaluated signals.
pub fn run_signals(signals: &Signals, frame: &BarFrame) -> BacktestReport {
    run_backtest(&signals.entry, &signals.exit, frame)
}
