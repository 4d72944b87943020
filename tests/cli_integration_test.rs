//! CLI integration tests with real INI, rules and CSV files on disk.
//!
//! Tests cover:
//! - Config loading and strategy construction (build_strategy, load_rules_text)
//! - Exit codes of each sub-command for success and each failure stage
//! - Report files written by `backtest -o`

mod common;

use common::*;
use ruletrader::adapters::csv_report_adapter::{SUMMARY_FILE, TRADES_FILE};
use ruletrader::adapters::file_config_adapter::FileConfigAdapter;
use ruletrader::cli::{self, Cli, Command};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tempfile::TempDir;

// ExitCode doesn't implement PartialEq, so compare Debug renderings.
fn assert_exit(actual: ExitCode, expected: u8) {
    assert_eq!(format!("{:?}", actual), format!("{:?}", ExitCode::from(expected)));
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let ws = Self {
            dir: TempDir::new().unwrap(),
        };
        fs::create_dir(ws.path("data")).unwrap();
        fs::write(ws.path("data/BHP.csv"), csv_from_closes(&[10.0, 11.0, 12.0, 9.0, 13.0, 14.0])).unwrap();
        fs::write(ws.path("data/CBA.csv"), csv_from_closes(&[5.0, 4.0, 3.0])).unwrap();
        ws
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, content).unwrap();
        path
    }
}

const VALID_INI: &str = "\
[strategy]
name = SMA trend
description = Long above the 3-bar average
rules = ENTRY: close > SMA(close, 3) EXIT: close < SMA(close, 3)

[data]
path = data
symbol = BHP
";

fn backtest(config: &Path, output: Option<PathBuf>, symbol: Option<&str>) -> ExitCode {
    cli::run(Cli {
        command: Command::Backtest {
            config: config.to_path_buf(),
            output,
            symbol: symbol.map(str::to_string),
        },
    })
}

mod config_loading {
    use super::*;

    #[test]
    fn build_strategy_from_inline_rules() {
        let config = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let strategy = cli::build_strategy(&config, Path::new("config.ini")).unwrap();
        assert_eq!(strategy.name, "SMA trend");
        assert_eq!(strategy.description, "Long above the 3-bar average");
        assert!(strategy.rules.entry().is_some());
        assert!(strategy.rules.exit().is_some());
    }

    #[test]
    fn rules_file_is_relative_to_config() {
        let ws = Workspace::new();
        ws.write("rules.txt", "# trend\nENTRY: close > SMA(close, 3)\nEXIT: close < SMA(close, 3)\n");
        let config_path = ws.write(
            "config.ini",
            "[strategy]\nrules_file = rules.txt\n[data]\npath = data\nsymbol = BHP\n",
        );
        let config = FileConfigAdapter::from_file(&config_path).unwrap();
        let text = cli::load_rules_text(&config, &config_path).unwrap();
        assert!(text.starts_with("# trend"));
    }

    #[test]
    fn build_strategy_rejects_bad_rules() {
        let config =
            FileConfigAdapter::from_string("[strategy]\nrules = ENTRY: close >> 1\n").unwrap();
        assert!(cli::build_strategy(&config, Path::new("c.ini")).is_err());
    }
}

mod backtest_command {
    use super::*;

    #[test]
    fn succeeds_and_writes_report() {
        let ws = Workspace::new();
        let config = ws.write("config.ini", VALID_INI);
        let out = ws.path("out");

        assert_exit(backtest(&config, Some(out.clone()), None), 0);

        let trades = fs::read_to_string(out.join(TRADES_FILE)).unwrap();
        let lines: Vec<&str> = trades.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("2024-01-03,2,12,2024-01-04,3,9,-3,"));
        assert!(lines[2].ends_with(",true"));

        let summary = fs::read_to_string(out.join(SUMMARY_FILE)).unwrap();
        assert!(summary.contains("strategy,SMA trend"));
        assert!(summary.contains("total_trades,2"));
    }

    #[test]
    fn symbol_override() {
        let ws = Workspace::new();
        let config = ws.write("config.ini", VALID_INI);
        let out = ws.path("out");

        assert_exit(backtest(&config, Some(out.clone()), Some("CBA")), 0);
        let trades = fs::read_to_string(out.join(TRADES_FILE)).unwrap();
        assert_eq!(trades.lines().count(), 1);
    }

    #[test]
    fn symbol_flag_stands_in_for_config_symbol() {
        let ws = Workspace::new();
        let config = ws.write(
            "config.ini",
            "[strategy]\nrules = ENTRY: close > SMA(close, 3)\n[data]\npath = data\n",
        );
        assert_exit(backtest(&config, None, Some("BHP")), 0);
        assert_exit(backtest(&config, None, None), 2);
    }

    #[test]
    fn missing_config_file_is_config_error() {
        let ws = Workspace::new();
        assert_exit(backtest(&ws.path("nope.ini"), None, None), 2);
    }

    #[test]
    fn invalid_config_is_config_error() {
        let ws = Workspace::new();
        let config = ws.write("config.ini", "[strategy]\nname = x\n[data]\npath = data\nsymbol = BHP\n");
        assert_exit(backtest(&config, None, None), 2);
    }

    #[test]
    fn missing_symbol_file_is_data_error() {
        let ws = Workspace::new();
        let config = ws.write("config.ini", VALID_INI);
        assert_exit(backtest(&config, None, Some("XYZ")), 3);
    }

    #[test]
    fn bad_rules_are_rule_errors() {
        let ws = Workspace::new();
        let syntax = ws.write(
            "syntax.ini",
            "[strategy]\nrules = ENTRY: close > (1\n[data]\npath = data\nsymbol = BHP\n",
        );
        assert_exit(backtest(&syntax, None, None), 4);

        let semantic = ws.write(
            "semantic.ini",
            "[strategy]\nrules = ENTRY: RSI(close) < 30\n[data]\npath = data\nsymbol = BHP\n",
        );
        assert_exit(backtest(&semantic, None, None), 4);
    }

    #[test]
    fn missing_rules_file_is_io_error() {
        let ws = Workspace::new();
        let config = ws.write(
            "config.ini",
            "[strategy]\nrules_file = missing.txt\n[data]\npath = data\nsymbol = BHP\n",
        );
        assert_exit(backtest(&config, None, None), 1);
    }

    #[test]
    fn date_window_excluding_all_bars_is_evaluation_error() {
        let ws = Workspace::new();
        let config = ws.write(
            "config.ini",
            &format!("{VALID_INI}start_date = 2030-01-01\nend_date = 2030-12-31\n"),
        );
        assert_exit(backtest(&config, None, None), 5);
    }

    #[test]
    fn missing_column_is_evaluation_error() {
        let ws = Workspace::new();
        ws.write("data/CLOSEONLY.csv", "date,close\n2024-01-01,1\n2024-01-02,2\n");
        let config = ws.write(
            "config.ini",
            "[strategy]\nrules = ENTRY: volume > 0\n[data]\npath = data\nsymbol = CLOSEONLY\n",
        );
        assert_exit(backtest(&config, None, None), 5);
    }
}

mod rules_commands {
    use super::*;

    #[test]
    fn validate_accepts_good_rules() {
        let ws = Workspace::new();
        let rules = ws.write("rules.txt", "entry: sma(close, 2.9) > ema(close, 0)");
        assert_exit(cli::run(Cli { command: Command::Validate { rules } }), 0);
    }

    #[test]
    fn validate_rejects_unknown_function() {
        let ws = Workspace::new();
        let rules = ws.write("rules.txt", "ENTRY: MACD(close, 3) > 1");
        assert_exit(cli::run(Cli { command: Command::Validate { rules } }), 4);
    }

    #[test]
    fn parse_reports_syntax_errors() {
        let ws = Workspace::new();
        let rules = ws.write("rules.txt", "ENTRY close > 1");
        assert_exit(cli::run(Cli { command: Command::Parse { rules } }), 4);
    }

    #[test]
    fn parse_does_not_validate_names() {
        let ws = Workspace::new();
        let rules = ws.write("rules.txt", "ENTRY: foo(bar) > 1");
        assert_exit(cli::run(Cli { command: Command::Parse { rules } }), 0);
    }

    #[test]
    fn missing_rules_file() {
        let ws = Workspace::new();
        let rules = ws.path("absent.txt");
        assert_exit(cli::run(Cli { command: Command::Validate { rules } }), 1);
    }

    #[test]
    fn list_symbols_succeeds() {
        let ws = Workspace::new();
        let config = ws.write("config.ini", VALID_INI);
        assert_exit(cli::run(Cli { command: Command::ListSymbols { config } }), 0);
    }
}
