//! Semantic validation of parsed rules.
//!
//! Checks identifiers against the allowed column table, function names and
//! arity against the function table, and normalizes period arguments. The
//! result is the typed [`ValidatedRuleSet`] the evaluator consumes.

use crate::domain::ast::{Node, RuleSet};
use crate::domain::error::ValidationError;
use crate::domain::ohlcv::Column;
use crate::domain::rule::{Condition, NumExpr, ValidatedRuleSet};

const YESTERDAY_PREFIX: &str = "yesterday_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Function {
    Sma,
    Ema,
    Rsi,
    CrossesAbove,
    CrossesBelow,
}

struct FunctionSpec {
    /// Upper-case lookup key; call sites may use any case.
    key: &'static str,
    display: &'static str,
    arity: usize,
    function: Function,
}

const FUNCTIONS: &[FunctionSpec] = &[
    FunctionSpec {
        key: "SMA",
        display: "SMA",
        arity: 2,
        function: Function::Sma,
    },
    FunctionSpec {
        key: "EMA",
        display: "EMA",
        arity: 2,
        function: Function::Ema,
    },
    FunctionSpec {
        key: "RSI",
        display: "RSI",
        arity: 2,
        function: Function::Rsi,
    },
    FunctionSpec {
        key: "CROSSES_ABOVE",
        display: "crosses_above",
        arity: 2,
        function: Function::CrossesAbove,
    },
    FunctionSpec {
        key: "CROSSES_BELOW",
        display: "crosses_below",
        arity: 2,
        function: Function::CrossesBelow,
    },
];

impl Function {
    fn is_boolean(self) -> bool {
        matches!(self, Function::CrossesAbove | Function::CrossesBelow)
    }
}

fn lookup_function(name: &str) -> Result<&'static FunctionSpec, ValidationError> {
    let key = name.to_ascii_uppercase();
    FUNCTIONS
        .iter()
        .find(|spec| spec.key == key)
        .ok_or_else(|| ValidationError::UnknownFunction {
            name: name.to_string(),
        })
}

fn check_arity(spec: &FunctionSpec, args: &[Node]) -> Result<(), ValidationError> {
    if args.len() != spec.arity {
        return Err(ValidationError::Arity {
            function: spec.display.to_string(),
            expected: spec.arity,
            actual: args.len(),
        });
    }
    Ok(())
}

/// Resolve a data identifier. Names are case-sensitive.
fn resolve_identifier(name: &str) -> Result<NumExpr, ValidationError> {
    if let Some(column) = Column::from_name(name) {
        return Ok(NumExpr::Column(column));
    }
    if let Some(column) = name.strip_prefix(YESTERDAY_PREFIX).and_then(Column::from_name) {
        return Ok(NumExpr::Yesterday(column));
    }
    Err(ValidationError::UnknownIdentifier {
        name: name.to_string(),
    })
}

/// Coerce a period argument: truncate to an integer and clamp to at least 1.
fn normalize_period(spec: &FunctionSpec, arg: &Node) -> Result<usize, ValidationError> {
    match arg {
        Node::NumberLiteral(v) => Ok(v.trunc().max(1.0) as usize),
        _ => Err(ValidationError::NonLiteralPeriod {
            function: spec.display.to_string(),
        }),
    }
}

fn mismatch(expected: &'static str, found: &'static str) -> ValidationError {
    ValidationError::TypeMismatch { expected, found }
}

fn lower_numeric(node: &Node) -> Result<NumExpr, ValidationError> {
    match node {
        Node::Identifier(name) => resolve_identifier(name),
        Node::NumberLiteral(v) => Ok(NumExpr::Constant(*v)),
        Node::FunctionCall { name, args } => {
            let spec = lookup_function(name)?;
            check_arity(spec, args)?;
            if spec.function.is_boolean() {
                lower_condition(node)?;
                return Err(mismatch("numeric", "boolean"));
            }
            let source = Box::new(lower_numeric(&args[0])?);
            let period = normalize_period(spec, &args[1])?;
            Ok(match spec.function {
                Function::Sma => NumExpr::Sma { source, period },
                Function::Ema => NumExpr::Ema { source, period },
                _ => NumExpr::Rsi { source, period },
            })
        }
        Node::Comparison { .. } | Node::BooleanOp { .. } => {
            lower_condition(node)?;
            Err(mismatch("numeric", "boolean"))
        }
    }
}

fn lower_condition(node: &Node) -> Result<Condition, ValidationError> {
    match node {
        Node::Comparison { op, left, right } => Ok(Condition::Compare {
            op: *op,
            left: lower_numeric(left)?,
            right: lower_numeric(right)?,
        }),
        Node::BooleanOp { op, left, right } => Ok(Condition::Logical {
            op: *op,
            left: Box::new(lower_condition(left)?),
            right: Box::new(lower_condition(right)?),
        }),
        Node::FunctionCall { name, args } => {
            let spec = lookup_function(name)?;
            check_arity(spec, args)?;
            if !spec.function.is_boolean() {
                lower_numeric(node)?;
                return Err(mismatch("boolean", "numeric"));
            }
            let left = lower_numeric(&args[0])?;
            let right = lower_numeric(&args[1])?;
            Ok(match spec.function {
                Function::CrossesAbove => Condition::CrossAbove { left, right },
                _ => Condition::CrossBelow { left, right },
            })
        }
        Node::Identifier(_) | Node::NumberLiteral(_) => {
            lower_numeric(node)?;
            Err(mismatch("boolean", "numeric"))
        }
    }
}

/// Validate a single expression that must produce a boolean signal.
pub fn validate_condition(node: &Node) -> Result<Condition, ValidationError> {
    lower_condition(node)
}

/// Validate both blocks of a parsed rule set.
///
/// Pure: the same tree always yields the same verdict.
pub fn validate(rules: &RuleSet) -> Result<ValidatedRuleSet, ValidationError> {
    let entry = rules.entry.as_ref().map(lower_condition).transpose()?;
    let exit = rules.exit.as_ref().map(lower_condition).transpose()?;
    Ok(ValidatedRuleSet::new(entry, exit))
}
