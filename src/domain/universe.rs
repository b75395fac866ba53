//! Instrument universe.
//!
//! Parses code lists from configuration and loads each code's bars through a
//! [`DataPort`]. Codes without data are skipped rather than failing the run.

use crate::domain::code_data::CodeData;
use crate::domain::error::AlgoTraderError;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use log::{info, warn};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in code list")]
    EmptyToken,

    #[error("duplicate code: {0}")]
    DuplicateCode(String),
}

pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = trimmed.to_uppercase();
        if !seen.insert(code.clone()) {
            return Err(UniverseError::DuplicateCode(code));
        }
        codes.push(code);
    }

    Ok(codes)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedCode {
    pub code: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData,
    InsufficientBars { bars: usize, required: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoData => write!(f, "no data"),
            SkipReason::InsufficientBars { bars, required } => {
                write!(f, "only {bars} bars, minimum {required} required")
            }
        }
    }
}

pub struct LoadedUniverse {
    pub codes: Vec<CodeData>,
    pub skipped: Vec<SkippedCode>,
}

/// Fetch bars for every code in `codes`, keeping their order.
///
/// Fails only if no code yields any data.
pub fn load_universe(
    data_port: &dyn DataPort,
    codes: &[String],
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<LoadedUniverse, AlgoTraderError> {
    let mut loaded = Vec::new();
    let mut skipped = Vec::new();

    for code in codes {
        let bars = match data_port.fetch_ohlcv(code, start_date, end_date) {
            Ok(bars) if !bars.is_empty() => bars,
            Ok(_) => {
                warn!("skipping {code} (no data in window)");
                skipped.push(SkippedCode {
                    code: code.clone(),
                    reason: SkipReason::NoData,
                });
                continue;
            }
            Err(e) => {
                warn!("skipping {code} ({e})");
                skipped.push(SkippedCode {
                    code: code.clone(),
                    reason: SkipReason::NoData,
                });
                continue;
            }
        };

        info!("  {}: {} bars loaded", code, bars.len());
        loaded.push(CodeData::new(code.clone(), bars));
    }

    if loaded.is_empty() {
        return Err(AlgoTraderError::NoData {
            code: codes.join(","),
        });
    }

    Ok(LoadedUniverse {
        codes: loaded,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::PriceBar;

    struct StubDataPort;

    impl DataPort for StubDataPort {
        fn fetch_ohlcv(
            &self,
            code: &str,
            _start: Option<NaiveDate>,
            _end: Option<NaiveDate>,
        ) -> Result<Vec<PriceBar>, AlgoTraderError> {
            match code {
                "GOOD" => Ok(vec![PriceBar {
                    code: code.to_string(),
                    date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                    open: 10.0,
                    high: 11.0,
                    low: 9.0,
                    close: 10.5,
                    volume: 100,
                }]),
                "EMPTY" => Ok(vec![]),
                _ => Err(AlgoTraderError::NoData {
                    code: code.to_string(),
                }),
            }
        }

        fn list_symbols(&self) -> Result<Vec<String>, AlgoTraderError> {
            Ok(vec!["EMPTY".into(), "GOOD".into()])
        }

        fn get_data_range(
            &self,
            _code: &str,
        ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, AlgoTraderError> {
            Ok(None)
        }
    }

    #[test]
    fn test_parse_codes_basic() {
        let result = parse_codes("AAPL,MSFT,NVDA").unwrap();
        assert_eq!(result, vec!["AAPL", "MSFT", "NVDA"]);
    }

    #[test]
    fn test_parse_codes_trims_and_uppercases() {
        let result = parse_codes("  aapl , msft ,Nvda").unwrap();
        assert_eq!(result, vec!["AAPL", "MSFT", "NVDA"]);
    }

    #[test]
    fn test_parse_codes_empty_token() {
        assert_eq!(parse_codes("AAPL,,MSFT"), Err(UniverseError::EmptyToken));
    }

    #[test]
    fn test_parse_codes_duplicate() {
        assert_eq!(
            parse_codes("AAPL,MSFT,aapl"),
            Err(UniverseError::DuplicateCode("AAPL".into()))
        );
    }

    #[test]
    fn test_load_universe_skips_missing() {
        let codes = vec!["MISSING".to_string(), "GOOD".to_string(), "EMPTY".to_string()];
        let loaded = load_universe(&StubDataPort, &codes, None, None).unwrap();

        assert_eq!(loaded.codes.len(), 1);
        assert_eq!(loaded.codes[0].code, "GOOD");
        assert_eq!(
            loaded.skipped,
            vec![
                SkippedCode {
                    code: "MISSING".into(),
                    reason: SkipReason::NoData
                },
                SkippedCode {
                    code: "EMPTY".into(),
                    reason: SkipReason::NoData
                },
            ]
        );
    }

    #[test]
    fn test_load_universe_all_missing_fails() {
        let codes = vec!["MISSING".to_string()];
        let result = load_universe(&StubDataPort, &codes, None, None);
        assert!(matches!(result, Err(AlgoTraderError::NoData { .. })));
    }

    #[test]
    fn test_skip_reason_display() {
        let reason = SkipReason::InsufficientBars {
            bars: 10,
            required: 50,
        };
        assert_eq!(reason.to_string(), "only 10 bars, minimum 50 required");
    }
}
