//! Untyped syntax tree produced by the rule parser.
//!
//! Trees are immutable once built. `Display` renders a fully parenthesized
//! form so precedence is visible.

use std::fmt;

/// Tolerance for `==` between floating-point values.
pub const EQ_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
            CompareOp::Eq => "==",
        }
    }

    pub fn apply(self, left: f64, right: f64) -> bool {
        match self {
            CompareOp::Gt => left > right,
            CompareOp::Lt => left < right,
            CompareOp::Ge => left >= right,
            CompareOp::Le => left <= right,
            CompareOp::Eq => (left - right).abs() < EQ_EPSILON,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BoolOp::And => "AND",
            BoolOp::Or => "OR",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Identifier(String),
    NumberLiteral(f64),
    FunctionCall {
        name: String,
        args: Vec<Node>,
    },
    Comparison {
        op: CompareOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    BooleanOp {
        op: BoolOp,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Identifier(name) => f.write_str(name),
            Node::NumberLiteral(v) => write!(f, "{}", v),
            Node::FunctionCall { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            Node::Comparison { op, left, right } => write!(f, "({} {} {})", left, op, right),
            Node::BooleanOp { op, left, right } => write!(f, "({} {} {})", left, op, right),
        }
    }
}

/// Parsed rule text: an optional entry and an optional exit expression.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleSet {
    pub entry: Option<Node>,
    pub exit: Option<Node>,
}

impl fmt::Display for RuleSet {
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
