//! Error taxonomy for the rule pipeline.
//!
//! Every stage raises its own error type; [`RuleTraderError`] wraps them for
//! callers that drive the whole pipeline (CLI, adapters).

use crate::domain::ohlcv::Column;

/// No token could be formed at `position`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("lex error at position {position}: unexpected character '{character}'")]
pub struct LexError {
    pub character: char,
    pub position: usize,
}

/// A parse error with position information for rule parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    ///
    /// Multi-line rule text is handled by rendering only the offending line.
    pub fn display_with_context(&self, input: &str) -> String {
        render_caret(input, self.position, &self.to_string())
    }
}

impl LexError {
    pub fn display_with_context(&self, input: &str) -> String {
        render_caret(input, self.position, &self.to_string())
    }
}

fn render_caret(input: &str, position: usize, message: &str) -> String {
    let position = position.min(input.len());
    let line_start = input[..position].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = input[position..]
        .find('\n')
        .map(|i| position + i)
        .unwrap_or(input.len());
    let line = &input[line_start..line_end];
    let column = input[line_start..position].chars().count();
    let caret = " ".repeat(column) + "^";
    format!("{line}\n{caret}\n{message}")
}

/// Lexing and parsing share a surface: `parse` fails with either.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl SyntaxError {
    pub fn position(&self) -> usize {
        match self {
            SyntaxError::Lex(e) => e.position,
            SyntaxError::Parse(e) => e.position,
        }
    }

    pub fn display_with_context(&self, input: &str) -> String {
        match self {
            SyntaxError::Lex(e) => e.display_with_context(input),
            SyntaxError::Parse(e) => e.display_with_context(input),
        }
    }
}

/// Semantic errors raised while lowering a parsed rule into its typed form.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("unknown identifier '{name}'")]
    UnknownIdentifier { name: String },

    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    #[error("{function} expects {expected} arguments, got {actual}")]
    Arity {
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("type mismatch: expected {expected} expression, found {found} expression")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("{function} period must be a number literal")]
    NonLiteralPeriod { function: String },
}

/// Data-shape problems detected while evaluating rules against bars.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("no bars to evaluate")]
    EmptyData,

    #[error("column '{column}' is not present in the data")]
    MissingColumn { column: Column },

    #[error("column '{column}' has {actual} values, expected {expected}")]
    LengthMismatch {
        column: Column,
        expected: usize,
        actual: usize,
    },

    #[error("bar dates are not strictly increasing at index {index}")]
    UnorderedDates { index: usize },
}

/// Top-level error type for ruletrader.
#[derive(Debug, thiserror::Error)]
pub enum RuleTraderError {
    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error("rule translation failed: {reason}")]
    Translation { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<LexError> for RuleTraderError {
    fn from(err: LexError) -> Self {
        RuleTraderError::Syntax(err.into())
    }
}

impl From<ParseError> for RuleTraderError {
    fn from(err: ParseError) -> Self {
        RuleTraderError::Syntax(err.into())
    }
}

impl RuleTraderError {
    /// Process exit status for this error, grouped by pipeline stage.
    pub fn exit_status(&self) -> u8 {
        match self {
            RuleTraderError::Io(_) => 1,
            RuleTraderError::ConfigParse { .. }
            | RuleTraderError::ConfigMissing { .. }
            | RuleTraderError::ConfigInvalid { .. } => 2,
            RuleTraderError::Data { .. } => 3,
            RuleTraderError::Syntax(_)
            | RuleTraderError::Validation(_)
            | RuleTraderError::Translation { .. } => 4,
            RuleTraderError::Evaluation(_) => 5,
        }
    }
}

impl From<&RuleTraderError> for std::process::ExitCode {
    fn from(err: &RuleTraderError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_caret_on_single_line() {
        let err = ParseError {
            message: "expected expression, found ')'".into(),
            position: 8,
        };
        let rendered = err.display_with_context("close > )");
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "close > )");
        assert_eq!(lines[1], "        ^");
        assert!(lines[2].contains("position 8"));
    }

    #[test]
    fn caret_renders_only_offending_line() {
        let input = "ENTRY: close > 1\nEXIT: close $ 2";
        let err = LexError {
            character: '$',
            position: input.find('$').unwrap(),
        };
        let rendered = err.display_with_context(input);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "EXIT: close $ 2");
        assert_eq!(lines[1], "            ^");
    }

    #[test]
    fn arity_message_names_function_and_counts() {
        let err = ValidationError::Arity {
            function: "SMA".into(),
            expected: 2,
            actual: 1,
        };
        assert_eq!(err.to_string(), "SMA expects 2 arguments, got 1");
    }

    #[test]
    fn exit_codes_by_stage() {
        let syntax: RuleTraderError = LexError {
            character: '$',
            position: 0,
        }
        .into();
        assert_eq!(syntax.exit_status(), 4);

        let eval: RuleTraderError = EvaluationError::EmptyData.into();
        assert_eq!(eval.exit_status(), 5);

        let config = RuleTraderError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        };
        assert_eq!(config.exit_status(), 2);
    }
}
