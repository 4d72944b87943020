//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::BacktestReport;
use crate::domain::config_validation::{parse_date, validate_config};
use crate::domain::error::RuleTraderError;
use crate::domain::rule_parser;
use crate::domain::strategy::Strategy;
use crate::domain::validator::validate;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "ruletrader", about = "Rule-language strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Directory for trades.csv and summary.csv
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override [data] symbol
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Parse and validate a rules file
    Validate {
        #[arg(short, long)]
        rules: PathBuf,
    },
    /// Print the parsed syntax tree of a rules file
    Parse {
        #[arg(short, long)]
        rules: PathBuf,
    },
    /// List symbols available in the configured data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            output,
            symbol,
        } => run_backtest(&config, output.as_deref(), symbol.as_deref()),
        Command::Validate { rules } => run_validate(&rules),
        Command::Parse { rules } => run_parse(&rules),
        Command::ListSymbols { config } => run_list_symbols(&config),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => code,
    }
}

fn fail(err: RuleTraderError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

/// Report an error from the rule pipeline, pointing at the offending text
/// when the error carries a position.
fn fail_rules(err: RuleTraderError, source: &str) -> ExitCode {
    match &err {
        RuleTraderError::Syntax(e) => eprintln!("error: {}", e.display_with_context(source)),
        _ => eprintln!("error: {err}"),
    }
    (&err).into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(fail)
}

fn read_rules(path: &Path) -> Result<String, ExitCode> {
    fs::read_to_string(path).map_err(|e| {
        eprintln!("error: failed to read {}: {}", path.display(), e);
        (&RuleTraderError::from(e)).into()
    })
}

/// Paths in a config file are relative to the file's directory.
pub fn resolve_path(config_path: &Path, value: &str) -> PathBuf {
    let value = Path::new(value.trim());
    if value.is_absolute() {
        return value.to_path_buf();
    }
    config_path
        .parent()
        .map_or_else(|| value.to_path_buf(), |dir| dir.join(value))
}

fn required(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, ExitCode> {
    config
        .get_string(section, key)
        .ok_or_else(|| {
            fail(RuleTraderError::ConfigMissing {
                section: section.into(),
                key: key.into(),
            })
        })
}

/// Rules text from `[strategy] rules`, or the contents of `rules_file`.
pub fn load_rules_text(config: &dyn ConfigPort, config_path: &Path) -> Result<String, ExitCode> {
    if let Some(rules) = config
        .get_string("strategy", "rules")
        .filter(|s| !s.trim().is_empty())
    {
        return Ok(rules);
    }
    let file = required(config, "strategy", "rules_file")?;
    let path = resolve_path(config_path, &file);
    eprintln!("Loading rules from {}", path.display());
    read_rules(&path)
}

pub fn build_strategy(config: &dyn ConfigPort, config_path: &Path) -> Result<Strategy, ExitCode> {
    let name = config
        .get_string("strategy", "name")
        .unwrap_or_else(|| "Unnamed".to_string());
    let description = config
        .get_string("strategy", "description")
        .unwrap_or_default();
    let text = load_rules_text(config, config_path)?;
    Strategy::compile(name, description, text.as_str()).map_err(|e| fail_rules(e, &text))
}

fn run_backtest(
    config_path: &Path,
    output_dir: Option<&Path>,
    symbol_override: Option<&str>,
) -> Result<(), ExitCode> {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let config = load_config(config_path)?;
    validate_config(&config, symbol_override).map_err(fail)?;

    // Stage 2: Compile rules
    let strategy = build_strategy(&config, config_path)?;
    eprintln!("Loading strategy: {}", strategy.name);

    // Stage 3: Load data
    let symbol = match symbol_override.filter(|s| !s.trim().is_empty()) {
        Some(s) => s.trim().to_string(),
        None => required(&config, "data", "symbol")?,
    };
    let start_date = parse_date(&config, "start_date").map_err(fail)?;
    let end_date = parse_date(&config, "end_date").map_err(fail)?;
    let data_path = resolve_path(config_path, &required(&config, "data", "path")?);
    let data_port = CsvAdapter::new(data_path);
    let frame = data_port
        .fetch_bars(&symbol, start_date, end_date)
        .map_err(fail)?;
    eprintln!("Running backtest: {} bars of {}", frame.len(), symbol);

    // Stage 4: Run
    let report = strategy
        .run(&frame)
        .map_err(|e| fail(RuleTraderError::from(e)))?;
    tracing::info!(
        strategy = %strategy.name,
        trades = report.trades.len(),
        total_return = report.total_return,
        "backtest complete"
    );

    // Stage 5: Summary and report
    print_summary(&report);
    if let Some(dir) = output_dir {
        CsvReportAdapter::new()
            .write(&report, &strategy, dir)
            .map_err(fail)?;
        eprintln!("\nReport written to: {}", dir.display());
    }
    Ok(())
}

fn print_summary(report: &BacktestReport) {
    println!("=== Results ===");
    println!("Total Return:     {:.2}%", report.total_return * 100.0);
    println!("Total PnL:        {:.4}", report.total_pnl);
    println!("Max Drawdown:     -{:.1}%", report.max_drawdown * 100.0);
    println!("Total Trades:     {}", report.metrics.total_trades);
    println!("Win Rate:         {:.1}%", report.metrics.win_rate * 100.0);
    if report.closed_at_end {
        println!("Last position closed at end of data");
    }

    if !report.trades.is_empty() {
        println!("\n=== Trades ===");
        for t in &report.trades {
            println!(
                "  {} @ {:.4} -> {} @ {:.4}  {:+.2}%{}",
                t.entry_date,
                t.entry_price,
                t.exit_date,
                t.exit_price,
                t.trade_return * 100.0,
                if t.forced_exit { " (end of data)" } else { "" },
            );
        }
    }
}

fn run_validate(rules_path: &Path) -> Result<(), ExitCode> {
    eprintln!("Validating rules: {}", rules_path.display());
    let text = read_rules(rules_path)?;
    let parsed = rule_parser::parse(&text).map_err(|e| fail_rules(e.into(), &text))?;
    let validated = validate(&parsed).map_err(|e| fail(e.into()))?;

    print!("{}", validated);
    eprintln!("Rules are valid.");
    Ok(())
}

fn run_parse(rules_path: &Path) -> Result<(), ExitCode> {
    let text = read_rules(rules_path)?;
    let parsed = rule_parser::parse(&text).map_err(|e| fail_rules(e.into(), &text))?;
    print!("{}", parsed);
    Ok(())
}

fn run_list_symbols(config_path: &Path) -> Result<(), ExitCode> {
    let config = load_config(config_path)?;
    let data_path = resolve_path(config_path, &required(&config, "data", "path")?);
    let symbols = CsvAdapter::new(data_path).list_symbols().map_err(fail)?;

    if symbols.is_empty() {
        eprintln!("No symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}
