//! Upstream natural-language translator port.
//!
//! Implementations turn free-form text into rule-language text. The core
//! treats them as opaque: output is parsed and validated like any other rule
//! text.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{reason}")]
pub struct TranslateError {
    pub reason: String,
}

pub trait RuleTranslator {
    fn translate(&self, request: &str) -> Result<String, TranslateError>;
}
