//! Bulk indicator computation for one instrument.

use std::collections::HashMap;

use crate::domain::indicator::{
    calculate_rsi, calculate_sma, IndicatorError, IndicatorSeries, IndicatorType,
};
use crate::domain::ohlcv::PriceBar;

/// Compute every requested indicator over `bars`, keyed by type.
///
/// Duplicate types are computed once.
pub fn compute_indicators(
    bars: &[PriceBar],
    indicator_types: &[IndicatorType],
) -> Result<HashMap<IndicatorType, IndicatorSeries>, IndicatorError> {
    let mut out = HashMap::with_capacity(indicator_types.len());

    for &indicator_type in indicator_types {
        if out.contains_key(&indicator_type) {
            continue;
        }
        let series = match indicator_type {
            IndicatorType::Sma(period) => calculate_sma(bars, period)?,
            IndicatorType::Rsi(period) => calculate_rsi(bars, period)?,
        };
        out.insert(indicator_type, series);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(count: usize) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..count)
            .map(|i| PriceBar {
                code: "TEST".into(),
                date: start + chrono::Duration::days(i as i64),
                open: 100.0 + i as f64,
                high: 101.0 + i as f64,
                low: 99.0 + i as f64,
                close: 100.0 + i as f64,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn computes_each_requested_indicator() {
        let bars = make_bars(30);
        let types = [
            IndicatorType::Sma(5),
            IndicatorType::Sma(20),
            IndicatorType::Rsi(14),
        ];
        let map = compute_indicators(&bars, &types).unwrap();

        assert_eq!(map.len(), 3);
        for t in &types {
            assert_eq!(map[t].len(), 30);
            assert_eq!(map[t].indicator_type, *t);
        }
    }

    #[test]
    fn duplicates_collapse() {
        let bars = make_bars(10);
        let map = compute_indicators(&bars, &[IndicatorType::Sma(3), IndicatorType::Sma(3)])
            .unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn propagates_invalid_period() {
        let bars = make_bars(10);
        let err = compute_indicators(&bars, &[IndicatorType::Rsi(0)]).unwrap_err();
        assert_eq!(err, IndicatorError::InvalidPeriod { period: 0 });
    }

    #[test]
    fn empty_bars_fail() {
        let err = compute_indicators(&[], &[IndicatorType::Sma(3)]).unwrap_err();
        assert_eq!(err, IndicatorError::EmptySeries);
    }
}
