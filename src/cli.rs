//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::{
    CsvReportAdapter, CsvSummaryAdapter, CsvTradeLogAdapter,
};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::alert::collect_alerts;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{
    read_strategy_params, validate_backtest_config, validate_logging_config,
    validate_strategy_config,
};
use crate::domain::error::AlgotraderError;
use crate::domain::metrics::TickerSummary;
use crate::domain::universe::parse_tickers;
use crate::logging;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_INPUT: &str = "data/stock_data.csv";
pub const DEFAULT_OUTPUT: &str = "data/backtest_signals.csv";

#[derive(Parser, Debug)]
#[command(name = "algotrader", about = "RSI and moving-average crossover backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest and write the signal table
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Price file, overrides [backtest] input
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Signal table, overrides [backtest] output
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Per-ticker summary file, overrides [backtest] summary
        #[arg(long)]
        summary: Option<PathBuf>,
        /// Trade log file, overrides [backtest] trades
        #[arg(long)]
        trades: Option<PathBuf>,
        /// Comma-separated ticker filter, overrides [backtest] tickers
        #[arg(long)]
        tickers: Option<String>,
        /// Process instruments one at a time
        #[arg(long)]
        sequential: bool,
    },
    /// Validate a configuration file without running anything
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Run a backtest and print buy/sell alert messages
    Alerts {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct BacktestOverrides {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub summary: Option<PathBuf>,
    pub trades: Option<PathBuf>,
    pub tickers: Option<String>,
    pub sequential: bool,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            input,
            output,
            summary,
            trades,
            tickers,
            sequential,
        } => run_backtest(
            &config,
            BacktestOverrides {
                input,
                output,
                summary,
                trades,
                tickers,
                sequential,
            },
        ),
        Command::Validate { config } => run_validate(&config),
        Command::Alerts { config, input } => run_alerts(&config, input),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = AlgotraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn init_logging_from(config: &dyn ConfigPort) {
    let level = config
        .get_string("logging", "level")
        .unwrap_or_else(|| logging::DEFAULT_LEVEL.to_string());
    let format = config
        .get_string("logging", "format")
        .unwrap_or_else(|| logging::DEFAULT_FORMAT.to_string());
    logging::init_logging(&level.to_lowercase(), &format);
}

/// Loads, validates and starts logging; any failure is already reported.
fn prepare(config_path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    let adapter = load_config(config_path)?;
    if let Err(e) = validate_all(&adapter) {
        eprintln!("error: {e}");
        return Err((&e).into());
    }
    init_logging_from(&adapter);
    Ok(adapter)
}

pub fn validate_all(config: &dyn ConfigPort) -> Result<(), AlgotraderError> {
    validate_logging_config(config)?;
    validate_strategy_config(config)?;
    validate_backtest_config(config)?;
    Ok(())
}

fn tickers_from(raw: &str, key: &str) -> Result<Option<Vec<String>>, AlgotraderError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_tickers(raw)
        .map(Some)
        .map_err(|e| AlgotraderError::ConfigInvalid {
            section: "backtest".into(),
            key: key.into(),
            reason: e.to_string(),
        })
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, AlgotraderError> {
    let params = read_strategy_params(adapter)?;
    let tickers = match adapter.get_string("backtest", "tickers") {
        Some(raw) => tickers_from(&raw, "tickers")?,
        None => None,
    };

    Ok(BacktestConfig {
        params,
        tickers,
        parallel: adapter.get_bool("backtest", "parallel", true),
    })
}

/// Command-line path if given, else the `[backtest]` key when non-blank.
pub fn resolve_path(
    cli_value: Option<PathBuf>,
    config: &dyn ConfigPort,
    key: &str,
) -> Option<PathBuf> {
    cli_value.or_else(|| {
        config
            .get_string("backtest", key)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
    })
}

/// Like [`resolve_path`], falling back to `default`.
pub fn resolve_path_or(
    cli_value: Option<PathBuf>,
    config: &dyn ConfigPort,
    key: &str,
    default: &str,
) -> PathBuf {
    resolve_path(cli_value, config, key).unwrap_or_else(|| PathBuf::from(default))
}

/// Loads the table, runs every instrument and fails when none was usable.
pub fn execute_backtest(
    data_port: &dyn DataPort,
    bt_config: &BacktestConfig,
) -> Result<BacktestResult, AlgotraderError> {
    let table = data_port.load_table()?;
    let result = backtest_engine::run_backtest(&table, bt_config);
    if result.is_empty() {
        return Err(AlgotraderError::NoResult {
            skipped: result.skipped.len(),
        });
    }
    Ok(result)
}

/// Runs the backtest and writes the signal table plus the optional summary
/// and trade log.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    bt_config: &BacktestConfig,
    output_path: &Path,
    summary_path: Option<&Path>,
    trades_path: Option<&Path>,
) -> Result<BacktestResult, AlgotraderError> {
    let result = execute_backtest(data_port, bt_config)?;

    CsvReportAdapter.write(&result, output_path)?;
    tracing::info!(
        path = %output_path.display(),
        rows = result.total_rows(),
        "signal table written"
    );

    if let Some(path) = summary_path {
        CsvSummaryAdapter.write(&result, path)?;
        tracing::info!(path = %path.display(), "summary written");
    }

    if let Some(path) = trades_path {
        CsvTradeLogAdapter.write(&result, path)?;
        tracing::info!(path = %path.display(), "trade log written");
    }

    Ok(result)
}

fn print_summary(result: &BacktestResult) {
    eprintln!("\n=== Per-Ticker Summary ===");
    for s in TickerSummary::compute_all(result) {
        let pnl_sign = if s.total_pnl >= 0.0 { "+" } else { "" };
        eprintln!(
            "  {}:  {} buys, {} sells, {} trades, {:.1}% win rate, {}{:.2} P&L, cumulative {:.4}",
            s.ticker,
            s.buy_signals,
            s.sell_signals,
            s.trades,
            s.win_ratio * 100.0,
            pnl_sign,
            s.total_pnl,
            s.cumulative_return,
        );
    }

    let open: Vec<_> = result
        .instruments
        .iter()
        .filter_map(|i| i.open_trade.as_ref())
        .collect();
    if !open.is_empty() {
        eprintln!("\n=== Open Positions ===");
        for trade in open {
            eprintln!(
                "  {}:  long since {} at {:.2}",
                trade.ticker, trade.entry_date, trade.entry_price
            );
        }
    }

    if !result.skipped.is_empty() {
        eprintln!("\n=== Skipped ===");
        for skip in &result.skipped {
            eprintln!("  {}:  {}", skip.ticker, skip.reason);
        }
    }
}

fn run_backtest(config_path: &Path, overrides: BacktestOverrides) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match prepare(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let mut bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Some(raw) = overrides.tickers.as_deref() {
        match tickers_from(raw, "tickers") {
            Ok(tickers) => bt_config.tickers = tickers,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
    }
    if overrides.sequential {
        bt_config.parallel = false;
    }

    let input = resolve_path_or(overrides.input, &adapter, "input", DEFAULT_INPUT);
    let output = resolve_path_or(overrides.output, &adapter, "output", DEFAULT_OUTPUT);
    let summary = resolve_path(overrides.summary, &adapter, "summary");
    let trades = resolve_path(overrides.trades, &adapter, "trades");

    eprintln!(
        "Running backtest on {} (RSI {}, SMA {}/{}, thresholds {}/{})",
        input.display(),
        bt_config.params.rsi_period,
        bt_config.params.short_window,
        bt_config.params.long_window,
        bt_config.params.buy_threshold,
        bt_config.params.sell_threshold,
    );

    let data_port = CsvAdapter::new(input);
    match run_backtest_pipeline(
        &data_port,
        &bt_config,
        &output,
        summary.as_deref(),
        trades.as_deref(),
    ) {
        Ok(result) => {
            print_summary(&result);
            eprintln!("\nSignals written to: {}", output.display());
            if let Some(path) = &summary {
                eprintln!("Summary written to: {}", path.display());
            }
            if let Some(path) = &trades {
                eprintln!("Trades written to: {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_all(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let p = &bt_config.params;
    eprintln!("\nStrategy:");
    eprintln!("  rsi_period:     {}", p.rsi_period);
    eprintln!("  short_window:   {}", p.short_window);
    eprintln!("  long_window:    {}", p.long_window);
    eprintln!("  buy_threshold:  {}", p.buy_threshold);
    eprintln!("  sell_threshold: {}", p.sell_threshold);

    eprintln!("\nBacktest:");
    let input = resolve_path_or(None, &adapter, "input", DEFAULT_INPUT);
    let output = resolve_path_or(None, &adapter, "output", DEFAULT_OUTPUT);
    eprintln!("  input:    {}", input.display());
    eprintln!("  output:   {}", output.display());
    match resolve_path(None, &adapter, "summary") {
        Some(summary) => eprintln!("  summary:  {}", summary.display()),
        None => eprintln!("  summary:  (none)"),
    }
    match resolve_path(None, &adapter, "trades") {
        Some(trades) => eprintln!("  trades:   {}", trades.display()),
        None => eprintln!("  trades:   (none)"),
    }
    match &bt_config.tickers {
        Some(tickers) => eprintln!("  tickers:  {}", tickers.join(", ")),
        None => eprintln!("  tickers:  (all)"),
    }
    eprintln!("  parallel: {}", bt_config.parallel);

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_alerts(config_path: &Path, input_override: Option<PathBuf>) -> ExitCode {
    let adapter = match prepare(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let input = resolve_path_or(input_override, &adapter, "input", DEFAULT_INPUT);

    let result = match execute_backtest(&CsvAdapter::new(input), &bt_config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let alerts = collect_alerts(&result);
    if alerts.is_empty() {
        eprintln!("No buy or sell signals.");
    }
    for alert in &alerts {
        println!("{alert}");
    }
    ExitCode::SUCCESS
}
