//! One instrument's bar sequence.

use crate::domain::error::AlgoTraderError;
use crate::domain::ohlcv::PriceBar;
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct CodeData {
    pub code: String,
    pub bars: Vec<PriceBar>,
}

impl CodeData {
    pub fn new(code: String, bars: Vec<PriceBar>) -> Self {
        Self { code, bars }
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Check the provider contract: non-empty, strictly increasing dates,
    /// positive finite prices with open and close inside low..=high.
    pub fn validate(&self) -> Result<(), AlgoTraderError> {
        if self.bars.is_empty() {
            return Err(AlgoTraderError::invalid_input(&self.code, "empty bar sequence"));
        }

        for (i, bar) in self.bars.iter().enumerate() {
            if !bar.has_valid_prices() {
                return Err(AlgoTraderError::invalid_input(
                    &self.code,
                    format!("non-positive or non-finite price on {}", bar.date),
                ));
            }
            if !bar.is_consistent() {
                return Err(AlgoTraderError::invalid_input(
                    &self.code,
                    format!("open/close outside low..high on {}", bar.date),
                ));
            }
            if i > 0 && bar.date <= self.bars[i - 1].date {
                return Err(AlgoTraderError::invalid_input(
                    &self.code,
                    format!("dates not strictly increasing at {}", bar.date),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_bar(code: &str, date: &str, close: f64) -> PriceBar {
        PriceBar {
            code: code.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 1000,
        }
    }

    #[test]
    fn date_bounds() {
        let cd = CodeData::new(
            "INFY".into(),
            vec![
                make_bar("INFY", "2024-01-01", 100.0),
                make_bar("INFY", "2024-01-02", 101.0),
                make_bar("INFY", "2024-01-03", 102.0),
            ],
        );

        assert_eq!(cd.bar_count(), 3);
        assert_eq!(cd.first_date(), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(cd.last_date(), NaiveDate::from_ymd_opt(2024, 1, 3));
    }

    #[test]
    fn validate_accepts_ordered_bars() {
        let cd = CodeData::new(
            "INFY".into(),
            vec![
                make_bar("INFY", "2024-01-01", 100.0),
                make_bar("INFY", "2024-01-02", 101.0),
            ],
        );
        assert!(cd.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty() {
        let cd = CodeData::new("INFY".into(), vec![]);
        let err = cd.validate().unwrap_err();
        assert!(matches!(err, AlgoTraderError::InvalidInput { code, .. } if code == "INFY"));
    }

    #[test]
    fn validate_rejects_duplicate_dates() {
        let cd = CodeData::new(
            "INFY".into(),
            vec![
                make_bar("INFY", "2024-01-02", 100.0),
                make_bar("INFY", "2024-01-02", 101.0),
            ],
        );
        assert!(cd.validate().is_err());
    }

    #[test]
    fn validate_rejects_unsorted_dates() {
        let cd = CodeData::new(
            "INFY".into(),
            vec![
                make_bar("INFY", "2024-01-03", 100.0),
                make_bar("INFY", "2024-01-01", 101.0),
            ],
        );
        assert!(cd.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_positive_price() {
        let mut bar = make_bar("INFY", "2024-01-01", 100.0);
        bar.low = 0.0;
        let cd = CodeData::new("INFY".into(), vec![bar]);
        assert!(cd.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let mut bar = make_bar("INFY", "2024-01-05", 150.0);
        bar.open = 100.0;
        bar.high = 50.0;
        bar.low = 200.0;
        let cd = CodeData::new("INFY".into(), vec![make_bar("INFY", "2024-01-04", 100.0), bar]);
        let err = cd.validate().unwrap_err();
        assert!(matches!(
            err,
            AlgoTraderError::InvalidInput { code, reason } if code == "INFY" && reason.contains("2024-01-05")
        ));
    }

    #[test]
    fn validate_rejects_close_above_high() {
        let mut bar = make_bar("INFY", "2024-01-01", 100.0);
        bar.high = 99.5;
        let cd = CodeData::new("INFY".into(), vec![bar]);
        assert!(cd.validate().is_err());
    }
}
