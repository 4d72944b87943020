//! Configuration validation.
//!
//! Checks the `[strategy]` and `[data]` sections before any file is read.

use crate::domain::error::RuleTraderError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// `symbol_override` stands in for `[data] symbol` when given.
pub fn validate_config(
    config: &dyn ConfigPort,
    symbol_override: Option<&str>,
) -> Result<(), RuleTraderError> {
    validate_rules_source(config)?;
    require_non_empty(config, "data", "path")?;
    if symbol_override.is_none_or(|s| s.trim().is_empty()) {
        require_non_empty(config, "data", "symbol")?;
    }
    validate_dates(config)?;
    Ok(())
}

fn non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .filter(|v| !v.trim().is_empty())
}

fn require_non_empty(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<String, RuleTraderError> {
    non_empty(config, section, key).ok_or_else(|| RuleTraderError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    })
}

fn validate_rules_source(config: &dyn ConfigPort) -> Result<(), RuleTraderError> {
    let inline = non_empty(config, "strategy", "rules");
    let file = non_empty(config, "strategy", "rules_file");
    match (inline, file) {
        (Some(_), None) | (None, Some(_)) => Ok(()),
        (Some(_), Some(_)) => Err(RuleTraderError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "rules".to_string(),
            reason: "rules and rules_file are mutually exclusive".to_string(),
        }),
        (None, None) => Err(RuleTraderError::ConfigMissing {
            section: "strategy".to_string(),
            key: "rules".to_string(),
        }),
    }
}

/// Parse an optional `[data]` date key.
pub fn parse_date(config: &dyn ConfigPort, key: &str) -> Result<Option<NaiveDate>, RuleTraderError> {
    match non_empty(config, "data", key) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Some)
            .map_err(|_| RuleTraderError::ConfigInvalid {
                section: "data".to_string(),
                key: key.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", key),
            }),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), RuleTraderError> {
    let start = parse_date(config, "start_date")?;
    let end = parse_date(config, "end_date")?;
    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(RuleTraderError::ConfigInvalid {
                section: "data".to_string(),
                key: "start_date".to_string(),
                reason: "start_date must be before end_date".to_string(),
            });
        }
    }
    Ok(())
}
