//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorType`: Indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: A time series aligned one-to-one with the input bars
//!
//! Every series has exactly one point per input bar. Points produced before an
//! indicator has a full lookback window carry `warmup = true` and a value set
//! by that indicator's warm-up policy rather than by its formula.

pub mod rsi;
pub mod sma;

use chrono::NaiveDate;
use std::fmt;

pub use rsi::{calculate_rsi, rsi_values, RSI_NEUTRAL};
pub use sma::{calculate_sma, sma_values};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndicatorError {
    #[error("indicator input series is empty")]
    EmptySeries,

    #[error("indicator period must be positive, got {period}")]
    InvalidPeriod { period: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub warmup: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
        }
    }
}

pub(crate) fn check_input(len: usize, period: usize) -> Result<(), IndicatorError> {
    if len == 0 {
        return Err(IndicatorError::EmptySeries);
    }
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod { period });
    }
    Ok(())
}
