//! Performance metrics and statistics.
//!
//! The equity curve is synthetic: it starts at 1.0 and compounds each closed
//! trade's return in order, one point per trade.

use super::position::Trade;

const INITIAL_EQUITY: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_trades: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub trades_breakeven: usize,
    pub win_rate: f64,
    pub avg_return: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub avg_bars_held: f64,
}

impl Metrics {
    pub fn compute(trades: &[Trade]) -> Self {
        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut trades_breakeven = 0usize;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;
        let mut total_bars = 0usize;

        for trade in trades {
            let pnl = trade.pnl;
            if pnl > 0.0 {
                trades_won += 1;
                if pnl > largest_win {
                    largest_win = pnl;
                }
            } else if pnl < 0.0 {
                trades_lost += 1;
                if pnl.abs() > largest_loss {
                    largest_loss = pnl.abs();
                }
            } else {
                trades_breakeven += 1;
            }
            total_bars += trade.bars_held();
        }

        let total_trades = trades.len();
        let (win_rate, avg_return, avg_bars_held) = if total_trades > 0 {
            let n = total_trades as f64;
            (
                trades_won as f64 / n,
                trades.iter().map(|t| t.trade_return).sum::<f64>() / n,
                total_bars as f64 / n,
            )
        } else {
            (0.0, 0.0, 0.0)
        };

        Metrics {
            total_trades,
            trades_won,
            trades_lost,
            trades_breakeven,
            win_rate,
            avg_return,
            largest_win,
            largest_loss,
            avg_bars_held,
        }
    }
}

/// Equity after each trade, starting from 1.0 (first point is the start).
pub fn equity_curve(trades: &[Trade]) -> Vec<f64> {
    let mut equity = INITIAL_EQUITY;
    let mut curve = Vec::with_capacity(trades.len() + 1);
    curve.push(equity);
    for trade in trades {
        equity *= 1.0 + trade.trade_return;
        curve.push(equity);
    }
    curve
}

/// Product of (1 + r) over all trades, minus 1.
pub fn compounded_return(trades: &[Trade]) -> f64 {
    trades
        .iter()
        .fold(INITIAL_EQUITY, |equity, t| equity * (1.0 + t.trade_return))
        - INITIAL_EQUITY
}

/// Largest peak-to-trough decline relative to the running peak.
pub fn compute_drawdown(equity_curve: &[f64]) -> f64 {
    let Some(&first) = equity_curve.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &equity in equity_curve {
        if equity > peak {
            peak = equity;
        } else if peak > 0.0 {
            let dd = (peak - equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}
