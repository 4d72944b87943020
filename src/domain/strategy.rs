//! Strategy composition: rule text compiled once, run against any frame.

use crate::domain::backtest::{run_signals, BacktestReport};
use crate::domain::error::{EvaluationError, RuleTraderError};
use crate::domain::ohlcv::BarFrame;
use crate::domain::rule::ValidatedRuleSet;
use crate::domain::rule_eval::evaluate;
use crate::domain::rule_parser;
use crate::domain::validator::validate;
use crate::ports::translator_port::RuleTranslator;

#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    pub name: String,
    pub description: String,
    /// Rule text as written.
    pub source: String,
    pub rules: ValidatedRuleSet,
}

impl Strategy {
    /// Parse and validate rule text.
    pub fn compile(
        name: impl Into<String>,
        description: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<Self, RuleTraderError> {
        let source = source.into();
        let parsed = rule_parser::parse(&source)?;
        let rules = validate(&parsed)?;
        let name = name.into();
        tracing::debug!(strategy = %name, "compiled rules:\n{}", rules);
        Ok(Strategy {
            name,
            description: description.into(),
            source,
            rules,
        })
    }

    /// Compile rule text produced by an upstream translator.
    pub fn from_translation(
        name: impl Into<String>,
        translator: &dyn RuleTranslator,
        request: &str,
    ) -> Result<Self, RuleTraderError> {
        let source = translator
            .translate(request)
            .map_err(|e| RuleTraderError::Translation {
                reason: e.to_string(),
            })?;
        Strategy::compile(name, request, source)
    }

    pub fn run(&self, frame: &BarFrame) -> Result<BacktestReport, EvaluationError> {
        let signals = evaluate(&self.rules, frame)?;
        Ok(run_signals(&signals, frame))
    }
}
