//! Backtest driver.
//!
//! Instruments are processed one after another in input order, each walked
//! once in chronological order from its warm-up index. All instruments share
//! one ledger and therefore one capital pool. Positions still open after the
//! last instrument are force-closed at their own final close, in input order.

use chrono::NaiveDate;
use log::{debug, info};
use std::collections::HashMap;

use crate::domain::capital::CapitalState;
use crate::domain::code_data::CodeData;
use crate::domain::error::AlgoTraderError;
use crate::domain::execution::{
    close_all_positions, enter_long, exit_position, EntryResult, FinalMark,
};
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::compute_indicators;
use crate::domain::ledger::Ledger;
use crate::domain::position::{ExitReason, Trade};
use crate::domain::signal::{generate_signal, Signal, SignalInput, SignalThresholds};
use crate::domain::universe::{SkipReason, SkippedCode};
use crate::ports::prediction_port::PredictionPort;

pub const DEFAULT_MIN_HISTORY: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub risk_per_trade: f64,
    pub rsi_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub short_ma_period: usize,
    pub long_ma_period: usize,
    pub min_history: usize,
    pub prediction_threshold: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 100_000.0,
            risk_per_trade: 0.02,
            rsi_period: 14,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            short_ma_period: 20,
            long_ma_period: 50,
            min_history: DEFAULT_MIN_HISTORY,
            prediction_threshold: 0.5,
        }
    }
}

impl BacktestConfig {
    pub fn thresholds(&self) -> SignalThresholds {
        SignalThresholds {
            rsi_oversold: self.rsi_oversold,
            rsi_overbought: self.rsi_overbought,
        }
    }

    /// Bars required before the first signal is evaluated.
    pub fn warmup_bars(&self) -> usize {
        self.min_history
            .max(self.long_ma_period)
            .max(self.short_ma_period)
            .max(self.rsi_period + 1)
    }

    pub fn indicator_types(&self) -> [IndicatorType; 3] {
        [
            IndicatorType::Rsi(self.rsi_period),
            IndicatorType::Sma(self.short_ma_period),
            IndicatorType::Sma(self.long_ma_period),
        ]
    }

    pub fn validate(&self) -> Result<(), AlgoTraderError> {
        let invalid = |section: &str, key: &str, reason: &str| AlgoTraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.to_string(),
        };

        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(invalid(
                "backtest",
                "initial_capital",
                "initial_capital must be positive",
            ));
        }
        if !(self.risk_per_trade > 0.0 && self.risk_per_trade <= 1.0) {
            return Err(invalid(
                "strategy",
                "risk_per_trade",
                "risk_per_trade must be in (0, 1]",
            ));
        }
        if self.rsi_period == 0 {
            return Err(invalid("strategy", "rsi_period", "rsi_period must be positive"));
        }
        if self.short_ma_period == 0 {
            return Err(invalid(
                "strategy",
                "short_ma_period",
                "short_ma_period must be positive",
            ));
        }
        if self.long_ma_period == 0 {
            return Err(invalid(
                "strategy",
                "long_ma_period",
                "long_ma_period must be positive",
            ));
        }
        if self.short_ma_period >= self.long_ma_period {
            return Err(invalid(
                "strategy",
                "short_ma_period",
                "short_ma_period must be less than long_ma_period",
            ));
        }
        if !(self.rsi_oversold >= 0.0
            && self.rsi_oversold < self.rsi_overbought
            && self.rsi_overbought <= 100.0)
        {
            return Err(invalid(
                "strategy",
                "rsi_oversold",
                "thresholds must satisfy 0 <= rsi_oversold < rsi_overbought <= 100",
            ));
        }
        if !(self.prediction_threshold >= 0.0 && self.prediction_threshold <= 1.0) {
            return Err(invalid(
                "backtest",
                "prediction_threshold",
                "prediction_threshold must be between 0 and 1",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    pub capital: CapitalState,
    pub skipped: Vec<SkippedCode>,
    pub processed_codes: Vec<String>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

impl BacktestResult {
    pub fn initial_capital(&self) -> f64 {
        self.capital.initial()
    }

    pub fn final_capital(&self) -> f64 {
        self.capital.cash()
    }

    pub fn forced_closures(&self) -> usize {
        self.trades
            .iter()
            .filter(|t| t.exit_reason == ExitReason::EndOfWindow)
            .count()
    }

    /// Calendar days from the earliest to the latest processed bar.
    pub fn window_days(&self) -> i64 {
        match (self.first_date, self.last_date) {
            (Some(first), Some(last)) => (last - first).num_days(),
            _ => 0,
        }
    }
}

/// Run the strategy over every instrument in `universe`.
///
/// Fails before simulating anything if the configuration or any bar sequence
/// is invalid. Instruments shorter than the warm-up length are skipped and
/// reported in the result.
pub fn run_backtest(
    universe: &[CodeData],
    config: &BacktestConfig,
    predictor: Option<&dyn PredictionPort>,
) -> Result<BacktestResult, AlgoTraderError> {
    config.validate()?;
    if universe.is_empty() {
        return Err(AlgoTraderError::invalid_input("universe", "no instruments"));
    }
    for code_data in universe {
        code_data.validate()?;
    }

    let warmup = config.warmup_bars();
    let indicator_types = config.indicator_types();
    let mut ledger = Ledger::new(config.initial_capital);
    let mut skipped = Vec::new();
    let mut processed_codes = Vec::new();
    let mut marks: Vec<FinalMark> = Vec::new();
    let mut first_date: Option<NaiveDate> = None;
    let mut last_date: Option<NaiveDate> = None;

    for code_data in universe {
        let bars = code_data.bar_count();
        if bars < warmup {
            info!(
                "skipping {} (only {} bars, minimum {} required)",
                code_data.code, bars, warmup
            );
            skipped.push(SkippedCode {
                code: code_data.code.clone(),
                reason: SkipReason::InsufficientBars {
                    bars,
                    required: warmup,
                },
            });
            continue;
        }

        let indicators = compute_indicators(&code_data.bars, &indicator_types)?;
        let series = StrategySeries {
            rsi: lookup(&indicators, IndicatorType::Rsi(config.rsi_period))?,
            short_ma: lookup(&indicators, IndicatorType::Sma(config.short_ma_period))?,
            long_ma: lookup(&indicators, IndicatorType::Sma(config.long_ma_period))?,
        };
        let steps = simulate_code(&mut ledger, code_data, &series, config, predictor, warmup);
        info!(
            "{}: {} bars, {} entries, {} exits",
            code_data.code, bars, steps.entries, steps.exits
        );

        if let Some(bar) = code_data.bars.last() {
            marks.push(FinalMark {
                code: code_data.code.clone(),
                price: bar.close,
                date: bar.date,
            });
        }
        first_date = min_date(first_date, code_data.first_date());
        last_date = max_date(last_date, code_data.last_date());
        processed_codes.push(code_data.code.clone());
    }

    let price_map: HashMap<String, f64> =
        marks.iter().map(|m| (m.code.clone(), m.price)).collect();
    debug!(
        "equity before forced closure: {:.2}",
        ledger.total_equity(&price_map)
    );

    let forced = close_all_positions(&mut ledger, &marks);
    if forced > 0 {
        info!("force-closed {} open position(s) at end of window", forced);
    }

    let (capital, trades) = ledger.into_parts();
    Ok(BacktestResult {
        trades,
        capital,
        skipped,
        processed_codes,
        first_date,
        last_date,
    })
}

struct StrategySeries<'a> {
    rsi: &'a IndicatorSeries,
    short_ma: &'a IndicatorSeries,
    long_ma: &'a IndicatorSeries,
}

fn lookup(
    indicators: &HashMap<IndicatorType, IndicatorSeries>,
    indicator_type: IndicatorType,
) -> Result<&IndicatorSeries, AlgoTraderError> {
    indicators
        .get(&indicator_type)
        .ok_or_else(|| AlgoTraderError::invalid_input("indicator", format!("{indicator_type} not computed")))
}

#[derive(Debug, Default, Clone, Copy)]
struct StepCounts {
    entries: usize,
    exits: usize,
}

fn simulate_code(
    ledger: &mut Ledger,
    code_data: &CodeData,
    series: &StrategySeries<'_>,
    config: &BacktestConfig,
    predictor: Option<&dyn PredictionPort>,
    warmup: usize,
) -> StepCounts {
    let code = code_data.code.as_str();
    let StrategySeries {
        rsi,
        short_ma,
        long_ma,
    } = *series;
    let thresholds = config.thresholds();
    let mut counts = StepCounts::default();

    for i in warmup..code_data.bars.len() {
        let bar = &code_data.bars[i];
        let input = SignalInput {
            close: bar.close,
            rsi: rsi.values[i].value,
            short_ma: short_ma.values[i].value,
            prev_short_ma: short_ma.values[i - 1].value,
            long_ma: long_ma.values[i].value,
            prev_long_ma: long_ma.values[i - 1].value,
            has_position: ledger.has_position(code),
        };

        match generate_signal(&input, &thresholds) {
            Signal::EnterLong => {
                if !prediction_confirms(predictor, code, bar.date, config.prediction_threshold) {
                    continue;
                }
                if let EntryResult::Entered { .. } =
                    enter_long(ledger, code, bar.close, bar.date, config.risk_per_trade)
                {
                    counts.entries += 1;
                }
            }
            Signal::ExitLong => {
                if exit_position(ledger, code, bar.close, bar.date, ExitReason::Signal).is_some() {
                    counts.exits += 1;
                }
            }
            Signal::Hold => {}
        }
    }

    counts
}

/// A missing predictor or missing prediction never blocks an entry.
fn prediction_confirms(
    predictor: Option<&dyn PredictionPort>,
    code: &str,
    date: NaiveDate,
    threshold: f64,
) -> bool {
    let Some(predictor) = predictor else {
        return true;
    };
    match predictor.predict_up(code, date) {
        Some(probability) if probability < threshold => {
            debug!("{code} {date}: entry vetoed, up-probability {probability:.2} < {threshold:.2}");
            false
        }
        _ => true,
    }
}

fn min_date(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Option<NaiveDate> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (x, y) => x.or(y),
    }
}

fn max_date(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Option<NaiveDate> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (x, y) => x.or(y),
    }
}
