//! CSV report adapter implementing ReportPort.
//!
//! Writes `trade_log.csv` and `portfolio_summary.csv` into the output
//! directory, plus `code_results.csv` when a per-code breakdown is supplied.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::AlgoTraderError;
use crate::domain::metrics::{CodeResult, PerformanceSummary};
use crate::ports::report_port::ReportPort;

pub const TRADE_LOG_FILE: &str = "trade_log.csv";
pub const SUMMARY_FILE: &str = "portfolio_summary.csv";
pub const CODE_RESULTS_FILE: &str = "code_results.csv";

#[derive(Serialize)]
struct SummaryRow<'a> {
    metric: &'a str,
    value: String,
}

#[derive(Serialize)]
struct CodeRow<'a> {
    code: &'a str,
    total_trades: usize,
    winning_trades: usize,
    losing_trades: usize,
    win_rate: f64,
    total_pnl: f64,
}

fn report_err(context: &str, e: impl std::fmt::Display) -> AlgoTraderError {
    AlgoTraderError::Report {
        reason: format!("{context}: {e}"),
    }
}

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }

    fn write_trade_log(result: &BacktestResult, path: &Path) -> Result<(), AlgoTraderError> {
        let mut wtr = csv::Writer::from_path(path).map_err(|e| report_err(TRADE_LOG_FILE, e))?;
        if result.trades.is_empty() {
            wtr.write_record([
                "code",
                "entry_date",
                "exit_date",
                "quantity",
                "entry_price",
                "exit_price",
                "pnl",
                "exit_reason",
            ])
            .map_err(|e| report_err(TRADE_LOG_FILE, e))?;
        }
        for trade in &result.trades {
            wtr.serialize(trade)
                .map_err(|e| report_err(TRADE_LOG_FILE, e))?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_summary(
        result: &BacktestResult,
        summary: &PerformanceSummary,
        path: &Path,
    ) -> Result<(), AlgoTraderError> {
        let mut wtr = csv::Writer::from_path(path).map_err(|e| report_err(SUMMARY_FILE, e))?;
        for (metric, value) in summary.rows() {
            wtr.serialize(SummaryRow { metric, value })
                .map_err(|e| report_err(SUMMARY_FILE, e))?;
        }
        for skipped in &result.skipped {
            wtr.serialize(SummaryRow {
                metric: "skipped",
                value: format!("{} ({})", skipped.code, skipped.reason),
            })
            .map_err(|e| report_err(SUMMARY_FILE, e))?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_code_results(results: &[CodeResult], path: &Path) -> Result<(), AlgoTraderError> {
        let mut wtr =
            csv::Writer::from_path(path).map_err(|e| report_err(CODE_RESULTS_FILE, e))?;
        for r in results {
            wtr.serialize(CodeRow {
                code: &r.code,
                total_trades: r.total_trades,
                winning_trades: r.winning_trades,
                losing_trades: r.losing_trades,
                win_rate: r.win_rate,
                total_pnl: r.total_pnl,
            })
            .map_err(|e| report_err(CODE_RESULTS_FILE, e))?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        summary: &PerformanceSummary,
        output_dir: &Path,
    ) -> Result<(), AlgoTraderError> {
        fs::create_dir_all(output_dir)?;
        Self::write_trade_log(result, &output_dir.join(TRADE_LOG_FILE))?;
        Self::write_summary(result, summary, &output_dir.join(SUMMARY_FILE))?;
        Ok(())
    }

    fn write_with_codes(
        &self,
        result: &BacktestResult,
        summary: &PerformanceSummary,
        code_results: &[CodeResult],
        output_dir: &Path,
    ) -> Result<(), AlgoTraderError> {
        self.write(result, summary, output_dir)?;
        Self::write_code_results(code_results, &output_dir.join(CODE_RESULTS_FILE))
    }
}
