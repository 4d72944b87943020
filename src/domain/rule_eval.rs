//! Rule evaluation engine.
//!
//! Walks a validated rule tree once, bottom-up, producing a series at every
//! node. No intermediate code is generated.
//!
//! # Evaluation Semantics
//!
//! - Column identifiers: the frame column as-is
//! - `yesterday_<column>`: the column shifted one bar, undefined at bar 0
//! - Comparisons: `false` wherever either operand is undefined
//! - `crosses_above`/`crosses_below`: `false` at bar 0 and wherever a current
//!   or previous operand value is undefined
//! - `AND`/`OR`: elementwise

use crate::domain::ast::BoolOp;
use crate::domain::error::EvaluationError;
use crate::domain::indicator::{self, Series};
use crate::domain::ohlcv::BarFrame;
use crate::domain::rule::{Condition, NumExpr, ValidatedRuleSet};

/// Boolean entry and exit signals, one value per bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Signals {
    pub entry: Vec<bool>,
    pub exit: Vec<bool>,
}

impl Signals {
    pub fn len(&self) -> usize {
        self.entry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_empty()
    }
}

/// Evaluate both sides of a rule set. A missing block yields an all-false signal.
pub fn evaluate(rules: &ValidatedRuleSet, frame: &BarFrame) -> Result<Signals, EvaluationError> {
    if frame.is_empty() {
        return Err(EvaluationError::EmptyData);
    }
    for column in rules.required_columns() {
        frame.column(column)?;
    }

    let entry = evaluate_side(rules.entry(), frame)?;
    let exit = evaluate_side(rules.exit(), frame)?;

    tracing::debug!(
        bars = frame.len(),
        entry_bars = entry.iter().filter(|&&b| b).count(),
        exit_bars = exit.iter().filter(|&&b| b).count(),
        "evaluated rule signals"
    );

    Ok(Signals { entry, exit })
}

fn evaluate_side(
    condition: Option<&Condition>,
    frame: &BarFrame,
) -> Result<Vec<bool>, EvaluationError> {
    match condition {
        Some(cond) => evaluate_condition(cond, frame),
        None => Ok(vec![false; frame.len()]),
    }
}

pub fn evaluate_condition(
    condition: &Condition,
    frame: &BarFrame,
) -> Result<Vec<bool>, EvaluationError> {
    match condition {
        Condition::Compare { op, left, right } => {
            let l = evaluate_numeric(left, frame)?;
            let r = evaluate_numeric(right, frame)?;
            Ok(l.iter()
                .zip(&r)
                .map(|pair| match pair {
                    (Some(a), Some(b)) => op.apply(*a, *b),
                    _ => false,
                })
                .collect())
        }
        Condition::CrossAbove { left, right } => {
            let l = evaluate_numeric(left, frame)?;
            let r = evaluate_numeric(right, frame)?;
            Ok(indicator::crosses_above(&l, &r))
        }
        Condition::CrossBelow { left, right } => {
            let l = evaluate_numeric(left, frame)?;
            let r = evaluate_numeric(right, frame)?;
            Ok(indicator::crosses_below(&l, &r))
        }
        Condition::Logical { op, left, right } => {
            let l = evaluate_condition(left, frame)?;
            let r = evaluate_condition(right, frame)?;
            Ok(l.iter()
                .zip(&r)
                .map(|(&a, &b)| match op {
                    BoolOp::And => a && b,
                    BoolOp::Or => a || b,
                })
                .collect())
        }
    }
}

pub fn evaluate_numeric(expr: &NumExpr, frame: &BarFrame) -> Result<Series, EvaluationError> {
    match expr {
        NumExpr::Column(column) => Ok(indicator::defined(frame.column(*column)?)),
        NumExpr::Yesterday(column) => {
            Ok(indicator::shift(&indicator::defined(frame.column(*column)?)))
        }
        NumExpr::Constant(v) => Ok(vec![Some(*v); frame.len()]),
        NumExpr::Sma { source, period } => Ok(indicator::calculate_sma(
            &evaluate_numeric(source, frame)?,
            *period,
        )),
        NumExpr::Ema { source, period } => Ok(indicator::calculate_ema(
            &evaluate_numeric(source, frame)?,
            *period,
        )),
        NumExpr::Rsi { source, period } => Ok(indicator::calculate_rsi(
            &evaluate_numeric(source, frame)?,
            *period,
        )),
    }
}
