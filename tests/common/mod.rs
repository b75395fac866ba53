#![allow(dead_code)]

use algotrader::domain::backtest::BacktestConfig;
use algotrader::domain::code_data::CodeData;
use algotrader::domain::error::AlgoTraderError;
pub use algotrader::domain::ohlcv::PriceBar;
use algotrader::ports::data_port::DataPort;
use algotrader::ports::prediction_port::PredictionPort;
use chrono::NaiveDate;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, code: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(code.to_string(), bars);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        code: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, AlgoTraderError> {
        if let Some(reason) = self.errors.get(code) {
            return Err(AlgoTraderError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(code)
            .map(|bars| {
                bars.iter()
                    .filter(|b| start_date.is_none_or(|s| b.date >= s))
                    .filter(|b| end_date.is_none_or(|e| b.date <= e))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, AlgoTraderError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        code: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, AlgoTraderError> {
        match self.data.get(code) {
            Some(bars) if !bars.is_empty() => {
                let first = bars.first().unwrap().date;
                let last = bars.last().unwrap().date;
                Ok(Some((first, last, bars.len())))
            }
            _ => Ok(None),
        }
    }
}

/// Predictor returning the same answer for every code and date.
pub struct FixedPredictor(pub Option<f64>);

impl PredictionPort for FixedPredictor {
    fn predict_up(&self, _code: &str, _date: NaiveDate) -> Option<f64> {
        self.0
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn start_date() -> NaiveDate {
    date(2023, 1, 2)
}

pub fn make_bar(code: &str, date: &str, close: f64) -> PriceBar {
    PriceBar {
        code: code.to_string(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1000,
    }
}

/// One bar per calendar day from `start_date()`.
pub fn bars_from_closes(code: &str, closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            code: code.to_string(),
            date: start_date() + chrono::Duration::days(i as i64),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1000 + i as u64,
        })
        .collect()
}

pub fn make_code_data(code: &str, closes: &[f64]) -> CodeData {
    CodeData::new(code.to_string(), bars_from_closes(code, closes))
}

/// 60 closes rising by 1 each day.
pub fn monotonic_closes() -> Vec<f64> {
    (0..60).map(|i| 100.0 + i as f64).collect()
}

/// 60 closes: a steady climb to 144, a 9-day slide of 3 per day, then a
/// recovery of 4 per day.
///
/// With the default strategy RSI(14) first drops below 30 at index 51
/// (close 123) while SMA(20) is still above SMA(50). The recovery never
/// lifts RSI above 70 and the averages never cross, so the position is
/// force-closed at the final close of 141.
pub fn dip_then_recovery_closes() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..45).map(|i| 100.0 + i as f64).collect();
    for k in 1..=9 {
        closes.push(144.0 - 3.0 * k as f64);
    }
    for k in 1..=6 {
        closes.push(117.0 + 4.0 * k as f64);
    }
    closes
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig::default()
}
