//! Report output port.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::AlgoTraderError;
use crate::domain::metrics::{CodeResult, PerformanceSummary};
use std::path::Path;

/// Port for writing backtest reports into an output directory.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        summary: &PerformanceSummary,
        output_dir: &Path,
    ) -> Result<(), AlgoTraderError>;

    /// Default implementation ignores the per-code breakdown.
    fn write_with_codes(
        &self,
        result: &BacktestResult,
        summary: &PerformanceSummary,
        _code_results: &[CodeResult],
        output_dir: &Path,
    ) -> Result<(), AlgoTraderError> {
        self.write(result, summary, output_dir)
    }
}
