//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_prediction_adapter::CsvPredictionAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{
    validate_backtest_config, validate_strategy_config, window_dates,
};
use crate::domain::error::AlgoTraderError;
use crate::domain::metrics::{CodeResult, PerformanceSummary};
use crate::domain::universe::{load_universe, parse_codes};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::prediction_port::PredictionPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "algotrader", about = "RSI/SMA strategy backtester")]
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
        /// Backtest a single code instead of the configured list
        #[arg(long)]
        code: Option<String>,
        /// Directory for CSV reports (overrides [report] output_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List codes available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show data range for code(s)
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Backtest {
            config,
            code,
            output,
        } => run_backtest(&config, code.as_deref(), output.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config } => run_list_symbols(&config),
        Command::Info { config, code } => run_info(&config, code.as_deref()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, AlgoTraderError> {
    FileConfigAdapter::from_file(path)
}

fn usize_setting(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, AlgoTraderError> {
    let value = config.get_int(section, key, default as i64);
    usize::try_from(value).map_err(|_| AlgoTraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: format!("{key} must be a non-negative integer"),
    })
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, AlgoTraderError> {
    let defaults = BacktestConfig::default();
    let bt_config = BacktestConfig {
        initial_capital: config.get_double("backtest", "initial_capital", defaults.initial_capital),
        risk_per_trade: config.get_double("strategy", "risk_per_trade", defaults.risk_per_trade),
        rsi_period: usize_setting(config, "strategy", "rsi_period", defaults.rsi_period)?,
        rsi_oversold: config.get_double("strategy", "rsi_oversold", defaults.rsi_oversold),
        rsi_overbought: config.get_double("strategy", "rsi_overbought", defaults.rsi_overbought),
        short_ma_period: usize_setting(
            config,
            "strategy",
            "short_ma_period",
            defaults.short_ma_period,
        )?,
        long_ma_period: usize_setting(
            config,
            "strategy",
            "long_ma_period",
            defaults.long_ma_period,
        )?,
        min_history: usize_setting(config, "backtest", "min_history", defaults.min_history)?,
        prediction_threshold: config.get_double(
            "backtest",
            "prediction_threshold",
            defaults.prediction_threshold,
        ),
    };
    bt_config.validate()?;
    Ok(bt_config)
}

/// Codes to backtest: the override if given, else `codes`, else `code`.
pub fn resolve_codes(
    code_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Vec<String>, AlgoTraderError> {
    let (key, raw) = match code_override {
        Some(c) => ("code", Some(c.to_string())),
        None => match config.get_string("backtest", "codes") {
            Some(c) if !c.trim().is_empty() => ("codes", Some(c)),
            _ => ("code", config.get_string("backtest", "code")),
        },
    };

    let raw = raw.ok_or_else(|| AlgoTraderError::ConfigMissing {
        section: "backtest".to_string(),
        key: "codes".to_string(),
    })?;

    parse_codes(&raw).map_err(|e| AlgoTraderError::ConfigInvalid {
        section: "backtest".to_string(),
        key: key.to_string(),
        reason: e.to_string(),
    })
}

pub fn data_port_from_config(config: &dyn ConfigPort) -> Result<CsvAdapter, AlgoTraderError> {
    match config.get_string("backtest", "data_dir") {
        Some(dir) if !dir.trim().is_empty() => Ok(CsvAdapter::new(PathBuf::from(dir.trim()))),
        _ => Err(AlgoTraderError::ConfigMissing {
            section: "backtest".to_string(),
            key: "data_dir".to_string(),
        }),
    }
}

pub fn prediction_port_from_config(
    config: &dyn ConfigPort,
) -> Result<Option<CsvPredictionAdapter>, AlgoTraderError> {
    match config.get_string("backtest", "prediction_file") {
        Some(path) if !path.trim().is_empty() => {
            let path = Path::new(path.trim());
            let adapter = CsvPredictionAdapter::from_path(path)?;
            if adapter.is_empty() {
                warn!("{} has no usable predictions, entries are not gated", path.display());
            } else {
                info!("loaded {} predictions from {}", adapter.len(), path.display());
            }
            Ok(Some(adapter))
        }
        _ => Ok(None),
    }
}

pub struct BacktestOutcome {
    pub result: BacktestResult,
    pub summary: PerformanceSummary,
    pub code_results: Vec<CodeResult>,
}

/// Load the universe, simulate it, and analyze the trades.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    predictor: Option<&dyn PredictionPort>,
    bt_config: &BacktestConfig,
    codes: &[String],
    window: (Option<chrono::NaiveDate>, Option<chrono::NaiveDate>),
    risk_free_rate: f64,
) -> Result<BacktestOutcome, AlgoTraderError> {
    info!("Loading {} code(s)", codes.len());
    let loaded = load_universe(data_port, codes, window.0, window.1)?;

    info!(
        "Running backtest: {} code(s), warm-up {} bars",
        loaded.codes.len(),
        bt_config.warmup_bars()
    );
    let mut result = backtest_engine::run_backtest(&loaded.codes, bt_config, predictor)?;

    let mut skipped = loaded.skipped;
    skipped.append(&mut result.skipped);
    result.skipped = skipped;

    let summary = PerformanceSummary::compute(&result, risk_free_rate);
    let code_results = CodeResult::compute_per_code(&result.trades);
    Ok(BacktestOutcome {
        result,
        summary,
        code_results,
    })
}

fn print_summary(outcome: &BacktestOutcome) {
    let s = &outcome.summary;
    eprintln!("\n=== Aggregate Results ===");
    eprintln!("Initial Capital:  {:.2}", s.initial_capital);
    eprintln!("Final Capital:    {:.2}", s.final_capital);
    eprintln!("Total Return:     {:.2}%", s.total_return * 100.0);
    eprintln!("Annualized:       {:.2}%", s.annualized_return * 100.0);
    eprintln!("Sharpe Ratio:     {:.2}", s.sharpe_ratio);
    eprintln!("Max Drawdown:     {:.1}%", s.max_drawdown * 100.0);
    eprintln!("Total Trades:     {}", s.total_trades);
    eprintln!(
        "Win Rate:         {:.1}% ({} won, {} lost)",
        s.win_rate * 100.0,
        s.winning_trades,
        s.losing_trades
    );
    eprintln!("Profit Factor:    {:.2}", s.profit_factor);
    eprintln!("Forced Closures:  {}", s.forced_closures);

    if !outcome.code_results.is_empty() {
        eprintln!("\n=== Per-Code Summary ===");
        for cr in &outcome.code_results {
            let pnl_sign = if cr.total_pnl >= 0.0 { "+" } else { "" };
            eprintln!(
                "  {}:  {} trades, {:.1}% win rate, {}{:.2}",
                cr.code,
                cr.total_trades,
                cr.win_rate * 100.0,
                pnl_sign,
                cr.total_pnl,
            );
        }
    }

    if !outcome.result.skipped.is_empty() {
        eprintln!("\n=== Skipped ===");
        for sk in &outcome.result.skipped {
            eprintln!("  {}: {}", sk.code, sk.reason);
        }
    }
}

fn run_backtest(
    config_path: &Path,
    code_override: Option<&str>,
    output_override: Option<&Path>,
) -> Result<(), AlgoTraderError> {
    info!("Loading config from {}", config_path.display());
    let config = load_config(config_path)?;
    validate_backtest_config(&config)?;
    validate_strategy_config(&config)?;

    let bt_config = build_backtest_config(&config)?;
    let codes = resolve_codes(code_override, &config)?;
    let window = window_dates(&config)?;
    let risk_free_rate = config.get_double("backtest", "risk_free_rate", 0.0);
    let data_port = data_port_from_config(&config)?;
    let predictor = prediction_port_from_config(&config)?;

    let outcome = run_backtest_pipeline(
        &data_port,
        predictor.as_ref().map(|p| p as &dyn PredictionPort),
        &bt_config,
        &codes,
        window,
        risk_free_rate,
    )?;
    print_summary(&outcome);

    let output_dir = output_override
        .map(Path::to_path_buf)
        .or_else(|| {
            config
                .get_string("report", "output_dir")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
        });
    if let Some(dir) = output_dir {
        CsvReportAdapter::new().write_with_codes(
            &outcome.result,
            &outcome.summary,
            &outcome.code_results,
            &dir,
        )?;
        eprintln!("\nReports written to: {}", dir.display());
    }

    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), AlgoTraderError> {
    eprintln!("Validating config: {}", config_path.display());
    let config = load_config(config_path)?;
    validate_backtest_config(&config)?;
    validate_strategy_config(&config)?;

    let bt_config = build_backtest_config(&config)?;
    let codes = resolve_codes(None, &config)?;
    let (start, end) = window_dates(&config)?;

    eprintln!("\nStrategy:");
    eprintln!("  RSI period:       {}", bt_config.rsi_period);
    eprintln!(
        "  RSI thresholds:   oversold < {}, overbought > {}",
        bt_config.rsi_oversold, bt_config.rsi_overbought
    );
    eprintln!(
        "  Moving averages:  SMA({}) / SMA({})",
        bt_config.short_ma_period, bt_config.long_ma_period
    );
    eprintln!("  Risk per trade:   {:.2}%", bt_config.risk_per_trade * 100.0);
    eprintln!("  Warm-up bars:     {}", bt_config.warmup_bars());

    eprintln!("\nUniverse:");
    eprintln!("  codes: {}", codes.join(", "));
    eprintln!(
        "  window: {} to {}",
        start.map_or_else(|| "start of data".to_string(), |d| d.to_string()),
        end.map_or_else(|| "end of data".to_string(), |d| d.to_string())
    );

    eprintln!("\nConfiguration is valid.");
    Ok(())
}

fn run_list_symbols(config_path: &Path) -> Result<(), AlgoTraderError> {
    let config = load_config(config_path)?;
    let data_port = data_port_from_config(&config)?;

    let symbols = data_port.list_symbols()?;
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

fn run_info(config_path: &Path, code: Option<&str>) -> Result<(), AlgoTraderError> {
    let config = load_config(config_path)?;
    let data_port = data_port_from_config(&config)?;
    let codes = resolve_codes(code, &config)?;

    for c in &codes {
        match data_port.get_data_range(c) {
            Ok(Some((first, last, count))) => {
                println!("{}: {} bars, {} to {}", c, count, first, last);
            }
            Ok(None) => eprintln!("{}: no data found", c),
            Err(e) => eprintln!("error querying {}: {}", c, e),
        }
    }
    Ok(())
}
