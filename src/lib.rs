//! ruletrader: a small trading-rule language and single-position backtester.
//!
//! Rule text flows through [`domain::lexer`], [`domain::rule_parser`],
//! [`domain::validator`] and [`domain::rule_eval`] into
//! [`domain::backtest`]. Hexagonal architecture: domain logic in [`domain`],
//! port traits in [`ports`], concrete implementations in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;

pub use domain::backtest::{run_backtest, BacktestReport};
pub use domain::error::RuleTraderError;
pub use domain::rule_eval::{evaluate, Signals};
pub use domain::rule_parser::parse;
pub use domain::validator::validate;
