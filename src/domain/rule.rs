//! Validated rule tree.
//!
//! The validator lowers the untyped parse tree into two typed layers:
//! - `NumExpr`: produces a numeric series (columns, constants, indicators)
//! - `Condition`: produces a boolean signal (comparisons, crossings, AND/OR)
//!
//! A `ValidatedRuleSet` can only be obtained through
//! [`crate::domain::validator::validate`], so the evaluator never re-checks names,
//! arity or periods.

use crate::domain::ast::{BoolOp, CompareOp};
use crate::domain::ohlcv::Column;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum NumExpr {
    Column(Column),
    /// The column shifted back one bar (`yesterday_<column>`).
    Yesterday(Column),
    Constant(f64),
    Sma {
        source: Box<NumExpr>,
        period: usize,
    },
    Ema {
        source: Box<NumExpr>,
        period: usize,
    },
    Rsi {
        source: Box<NumExpr>,
        period: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        op: CompareOp,
        left: NumExpr,
        right: NumExpr,
    },
    CrossAbove {
        left: NumExpr,
        right: NumExpr,
    },
    CrossBelow {
        left: NumExpr,
        right: NumExpr,
    },
    Logical {
        op: BoolOp,
        left: Box<Condition>,
        right: Box<Condition>,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidatedRuleSet {
    entry: Option<Condition>,
    exit: Option<Condition>,
}

impl ValidatedRuleSet {
    pub(crate) fn new(entry: Option<Condition>, exit: Option<Condition>) -> Self {
        Self { entry, exit }
    }

    pub fn entry(&self) -> Option<&Condition> {
        self.entry.as_ref()
    }

    pub fn exit(&self) -> Option<&Condition> {
        self.exit.as_ref()
    }

    /// Base columns the rules read, directly or through `yesterday_*`.
    pub fn required_columns(&self) -> BTreeSet<Column> {
        let mut columns = BTreeSet::new();
        for cond in self.entry.iter().chain(self.exit.iter()) {
            collect_condition(cond, &mut columns);
        }
        columns
    }
}

fn collect_condition(cond: &Condition, out: &mut BTreeSet<Column>) {
    match cond {
        Condition::Compare { left, right, .. }
        | Condition::CrossAbove { left, right }
        | Condition::CrossBelow { left, right } => {
            collect_numeric(left, out);
            collect_numeric(right, out);
        }
        Condition::Logical { left, right, .. } => {
            collect_condition(left, out);
            collect_condition(right, out);
        }
    }
}

fn collect_numeric(expr: &NumExpr, out: &mut BTreeSet<Column>) {
    match expr {
        NumExpr::Column(c) | NumExpr::Yesterday(c) => {
            out.insert(*c);
        }
        NumExpr::Constant(_) => {}
        NumExpr::Sma { source, .. } | NumExpr::Ema { source, .. } | NumExpr::Rsi { source, .. } => {
            collect_numeric(source, out)
        }
    }
}

impl fmt::Display for NumExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumExpr::Column(c) => write!(f, "{}", c),
            NumExpr::Yesterday(c) => write!(f, "yesterday_{}", c),
            NumExpr::Constant(v) => write!(f, "{}", v),
            NumExpr::Sma { source, period } => write!(f, "SMA({}, {})", source, period),
            NumExpr::Ema { source, period } => write!(f, "EMA({}, {})", source, period),
            NumExpr::Rsi { source, period } => write!(f, "RSI({}, {})", source, period),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Compare { op, left, right } => write!(f, "({} {} {})", left, op, right),
            Condition::CrossAbove { left, right } => write!(f, "crosses_above({}, {})", left, right),
            Condition::CrossBelow { left, right } => write!(f, "crosses_below({}, {})", left, right),
            Condition::Logical { op, left, right } => write!(f, "({} {} {})", left, op, right),
        }
    }
}

impl fmt::Display for ValidatedRuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(entry) = &self.entry {
            writeln!(f, "ENTRY: {}", entry)?;
        }
        if let Some(exit) = &self.exit {
            writeln!(f, "EXIT: {}", exit)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_columns_walks_both_sides() {
        let entry = Condition::Logical {
            op: BoolOp::And,
            left: Box::new(Condition::Compare {
                op: CompareOp::Gt,
                left: NumExpr::Column(Column::Close),
                right: NumExpr::Sma {
                    source: Box::new(NumExpr::Column(Column::Close)),
                    period: 3,
                },
            }),
            right: Box::new(Condition::CrossAbove {
                left: NumExpr::Yesterday(Column::High),
                right: NumExpr::Constant(10.0),
            }),
        };
        let exit = Condition::Compare {
            op: CompareOp::Lt,
            left: NumExpr::Rsi {
                source: Box::new(NumExpr::Column(Column::Volume)),
                period: 14,
            },
            right: NumExpr::Constant(30.0),
        };
        let rules = ValidatedRuleSet::new(Some(entry), Some(exit));
        let cols: Vec<Column> = rules.required_columns().into_iter().collect();
        assert_eq!(cols, vec![Column::High, Column::Close, Column::Volume]);
    }

    #[test]
    fn empty_rule_set_requires_nothing() {
        assert!(ValidatedRuleSet::default().required_columns().is_empty());
    }

    #[test]
    fn display_shows_normalized_periods() {
        let cond = Condition::CrossBelow {
            left: NumExpr::Ema {
                source: Box::new(NumExpr::Column(Column::Close)),
                period: 1,
            },
            right: NumExpr::Yesterday(Column::Low),
        };
        assert_eq!(cond.to_string(), "crosses_below(EMA(close, 1), yesterday_low)");
    }
}
