//! Simple Moving Average indicator.
//!
//! SMA[i] = mean(C[i-n+1..=i]), summed afresh for every window.
//! Warmup: for the first (n-1) bars the SMA is the bar's own close, which is a
//! best-effort stand-in rather than a true average.

use super::{check_input, IndicatorError, IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::{closes, PriceBar};

/// Raw SMA values aligned with `closes`.
pub fn sma_values(closes: &[f64], period: usize) -> Result<Vec<f64>, IndicatorError> {
    check_input(closes.len(), period)?;

    let values = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            if i + 1 < period {
                close
            } else {
                window_mean(&closes[i + 1 - period..=i])
            }
        })
        .collect();

    Ok(values)
}

/// Mean taken as an offset from the window's first close, so a flat window
/// averages to exactly its price whatever its length.
fn window_mean(window: &[f64]) -> f64 {
    let anchor = window[0];
    let offset: f64 = window.iter().map(|c| c - anchor).sum();
    anchor + offset / window.len() as f64
}

pub fn calculate_sma(bars: &[PriceBar], period: usize) -> Result<IndicatorSeries, IndicatorError> {
    let values = sma_values(&closes(bars), period)?;

    let points = bars
        .iter()
        .zip(values)
        .enumerate()
        .map(|(i, (bar, value))| IndicatorPoint {
            date: bar.date,
            value,
            warmup: i + 1 < period,
        })
        .collect();

    Ok(IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values: points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn make_bars(prices: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                code: "TEST".into(),
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn sma_warmup_uses_close() {
        let values = sma_values(&[10.0, 20.0, 30.0, 40.0, 50.0], 3).unwrap();
        assert_relative_eq!(values[0], 10.0);
        assert_relative_eq!(values[1], 20.0);
        assert_relative_eq!(values[2], 20.0);
        assert_relative_eq!(values[3], 30.0);
        assert_relative_eq!(values[4], 40.0);
    }

    #[test]
    fn sma_period_one_is_identity() {
        let prices = [3.0, 1.0, 4.0, 1.0, 5.0];
        assert_eq!(sma_values(&prices, 1).unwrap(), prices.to_vec());
    }

    #[test]
    fn sma_shorter_than_period_is_all_warmup() {
        let series = calculate_sma(&make_bars(&[10.0, 11.0, 12.0]), 5).unwrap();
        assert_eq!(series.len(), 3);
        assert!(series.values.iter().all(|p| p.warmup));
        assert_relative_eq!(series.values[2].value, 12.0);
    }

    #[test]
    fn sma_series_flags_and_dates() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0]);
        let series = calculate_sma(&bars, 2).unwrap();

        assert_eq!(series.indicator_type, IndicatorType::Sma(2));
        assert!(series.values[0].warmup);
        assert!(!series.values[1].warmup);
        assert_eq!(series.values[3].date, bars[3].date);
        assert_relative_eq!(series.values[3].value, 35.0);
    }

    #[test]
    fn flat_series_gives_identical_averages_for_any_period() {
        for price in [0.1, 0.7, 14.8, 33.3, 123.45] {
            let closes = vec![price; 60];
            let short = sma_values(&closes, 20).unwrap();
            let long = sma_values(&closes, 50).unwrap();
            for i in 49..60 {
                assert_eq!(short[i].to_bits(), long[i].to_bits(), "price {price} at {i}");
                assert_eq!(long[i], price);
            }
        }
    }

    #[test]
    fn flat_tail_after_trend_settles_exactly() {
        let mut closes: Vec<f64> = (0..10).map(|i| 10.0 + 0.1 * i as f64).collect();
        closes.extend(std::iter::repeat_n(14.8, 30));
        let short = sma_values(&closes, 5).unwrap();
        let long = sma_values(&closes, 20).unwrap();
        assert_eq!(short[39], 14.8);
        assert_eq!(long[39], 14.8);
    }

    #[test]
    fn sma_empty_series_fails() {
        assert_eq!(sma_values(&[], 3), Err(IndicatorError::EmptySeries));
    }

    #[test]
    fn sma_zero_period_fails() {
        assert_eq!(
            sma_values(&[1.0, 2.0], 0),
            Err(IndicatorError::InvalidPeriod { period: 0 })
        );
    }

    proptest! {
        #[test]
        fn sma_warmup_matches_input(
            prices in prop::collection::vec(1.0f64..1000.0, 1..120),
            period in 1usize..60,
        ) {
            let values = sma_values(&prices, period).unwrap();
            prop_assert_eq!(values.len(), prices.len());
            for i in 0..prices.len().min(period - 1) {
                prop_assert_eq!(values[i], prices[i]);
            }
        }

        #[test]
        fn sma_is_deterministic(
            prices in prop::collection::vec(1.0f64..1000.0, 1..120),
            period in 1usize..60,
        ) {
            let first = sma_values(&prices, period).unwrap();
            let second = sma_values(&prices, period).unwrap();
            prop_assert_eq!(
                first.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
                second.iter().map(|v| v.to_bits()).collect::<Vec<_>>()
            );
        }
    }
}
