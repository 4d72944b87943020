//! Open position and closed trade records.

use chrono::NaiveDate;

/// A long position opened at a bar's close and not yet exited.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub entry_index: usize,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
}

impl Position {
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        price - self.entry_price
    }

    /// Realize the position at `exit_price`.
    pub fn close(self, exit_index: usize, exit_date: NaiveDate, exit_price: f64, forced: bool) -> Trade {
        let pnl = self.unrealized_pnl(exit_price);
        let trade_return = if self.entry_price > 0.0 {
            pnl / self.entry_price
        } else {
            0.0
        };
        Trade {
            entry_index: self.entry_index,
            entry_date: self.entry_date,
            entry_price: self.entry_price,
            exit_index,
            exit_date,
            exit_price,
            pnl,
            trade_return,
            forced_exit: forced,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_index: usize,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_index: usize,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    /// exit_price - entry_price, for one unit.
    pub pnl: f64,
    /// pnl / entry_price as a fraction (0.05 = 5%).
    pub trade_return: f64,
    /// Closed by the end of data rather than by the exit rule.
    pub forced_exit: bool,
}

impl Trade {
    pub fn bars_held(&self) -> usize {
        self.exit_index - self.entry_index
    }
}
