//! Core domain types and logic.

pub mod ast;
pub mod backtest;
pub mod config_validation;
pub mod error;
pub mod indicator;
pub mod lexer;
pub mod metrics;
pub mod ohlcv;
pub mod position;
pub mod rule;
pub mod rule_eval;
pub mod rule_parser;
pub mod strategy;
pub mod validator;
