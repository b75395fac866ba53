//! RSI (Relative Strength Index) indicator implementation.
//!
//! Uses a simple trailing average of gains and losses:
//! - delta[k] = C[k+1] - C[k]
//! - gain = max(delta, 0), loss = max(-delta, 0)
//! - avg_gain / avg_loss = mean over the `n` deltas ending at the current bar
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: bars with fewer than `n` prior deltas (indices 0..n) are set to the
//! neutral value 50.

use super::{check_input, IndicatorError, IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::{closes, PriceBar};

pub const RSI_NEUTRAL: f64 = 50.0;

/// Raw RSI values aligned with `closes`.
pub fn rsi_values(closes: &[f64], period: usize) -> Result<Vec<f64>, IndicatorError> {
    check_input(closes.len(), period)?;

    let mut gains = Vec::with_capacity(closes.len().saturating_sub(1));
    let mut losses = Vec::with_capacity(closes.len().saturating_sub(1));
    for pair in closes.windows(2) {
        let change = pair[1] - pair[0];
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    let mut values = Vec::with_capacity(closes.len());
    for i in 0..closes.len() {
        if i < period {
            values.push(RSI_NEUTRAL);
            continue;
        }

        let window = i - period..i;
        let avg_gain = gains[window.clone()].iter().sum::<f64>() / period as f64;
        let avg_loss = losses[window].iter().sum::<f64>() / period as f64;

        let rsi = if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
        };
        values.push(rsi.clamp(0.0, 100.0));
    }

    Ok(values)
}

pub fn calculate_rsi(bars: &[PriceBar], period: usize) -> Result<IndicatorSeries, IndicatorError> {
    let values = rsi_values(&closes(bars), period)?;

    let points = bars
        .iter()
        .zip(values)
        .enumerate()
        .map(|(i, (bar, value))| IndicatorPoint {
            date: bar.date,
            value,
            warmup: i < period,
        })
        .collect();

    Ok(IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values: points,
    })
}
