//! Configuration validation.
//!
//! Checks raw INI values before any data is loaded, so bad settings are
//! reported against their section and key.

use crate::domain::error::AlgoTraderError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), AlgoTraderError> {
    validate_initial_capital(config)?;
    validate_min_history(config)?;
    validate_risk_free_rate(config)?;
    validate_prediction_threshold(config)?;
    window_dates(config)?;
    validate_data_dir(config)?;
    validate_codes(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), AlgoTraderError> {
    validate_risk_per_trade(config)?;
    validate_periods(config)?;
    validate_thresholds(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> AlgoTraderError {
    AlgoTraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), AlgoTraderError> {
    let value = config.get_double("backtest", "initial_capital", 100_000.0);
    if !(value.is_finite() && value > 0.0) {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_min_history(config: &dyn ConfigPort) -> Result<(), AlgoTraderError> {
    if config.get_int("backtest", "min_history", 50) < 1 {
        return Err(invalid(
            "backtest",
            "min_history",
            "min_history must be at least 1",
        ));
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), AlgoTraderError> {
    let value = config.get_double("backtest", "risk_free_rate", 0.0);
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "backtest",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_prediction_threshold(config: &dyn ConfigPort) -> Result<(), AlgoTraderError> {
    let value = config.get_double("backtest", "prediction_threshold", 0.5);
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(
            "backtest",
            "prediction_threshold",
            "prediction_threshold must be between 0 and 1",
        ));
    }
    Ok(())
}

/// Optional simulation window from `[backtest] start_date` / `end_date`.
pub fn window_dates(
    config: &dyn ConfigPort,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>), AlgoTraderError> {
    let start = parse_date(config.get_string("backtest", "start_date"), "start_date")?;
    let end = parse_date(config.get_string("backtest", "end_date"), "end_date")?;

    if let (Some(s), Some(e)) = (start, end) {
        if s >= e {
            return Err(invalid(
                "backtest",
                "start_date",
                "start_date must be before end_date",
            ));
        }
    }
    Ok((start, end))
}

fn parse_date(value: Option<String>, field: &str) -> Result<Option<NaiveDate>, AlgoTraderError> {
    match value {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                invalid(
                    "backtest",
                    field,
                    format!("invalid {field} format, expected YYYY-MM-DD"),
                )
            }),
    }
}

fn validate_data_dir(config: &dyn ConfigPort) -> Result<(), AlgoTraderError> {
    match config.get_string("backtest", "data_dir") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(AlgoTraderError::ConfigMissing {
            section: "backtest".to_string(),
            key: "data_dir".to_string(),
        }),
    }
}

fn validate_codes(config: &dyn ConfigPort) -> Result<(), AlgoTraderError> {
    let codes = config.get_string("backtest", "codes");
    let code = config.get_string("backtest", "code");

    match (codes, code) {
        (Some(c), _) if !c.trim().is_empty() => Ok(()),
        (_, Some(c)) if !c.trim().is_empty() => Ok(()),
        _ => Err(AlgoTraderError::ConfigMissing {
            section: "backtest".to_string(),
            key: "codes".to_string(),
        }),
    }
}

fn validate_risk_per_trade(config: &dyn ConfigPort) -> Result<(), AlgoTraderError> {
    let value = config.get_double("strategy", "risk_per_trade", 0.02);
    if !(value > 0.0 && value <= 1.0) {
        return Err(invalid(
            "strategy",
            "risk_per_trade",
            "risk_per_trade must be in (0, 1]",
        ));
    }
    Ok(())
}

fn validate_periods(config: &dyn ConfigPort) -> Result<(), AlgoTraderError> {
    for (key, default) in [
        ("rsi_period", 14),
        ("short_ma_period", 20),
        ("long_ma_period", 50),
    ] {
        if config.get_int("strategy", key, default) < 1 {
            return Err(invalid("strategy", key, format!("{key} must be positive")));
        }
    }

    let short = config.get_int("strategy", "short_ma_period", 20);
    let long = config.get_int("strategy", "long_ma_period", 50);
    if short >= long {
        return Err(invalid(
            "strategy",
            "short_ma_period",
            "short_ma_period must be less than long_ma_period",
        ));
    }
    Ok(())
}

fn validate_thresholds(config: &dyn ConfigPort) -> Result<(), AlgoTraderError> {
    let oversold = config.get_double("strategy", "rsi_oversold", 30.0);
    let overbought = config.get_double("strategy", "rsi_overbought", 70.0);

    if !(0.0..=100.0).contains(&oversold) {
        return Err(invalid(
            "strategy",
            "rsi_oversold",
            "rsi_oversold must be between 0 and 100",
        ));
    }
    if !(0.0..=100.0).contains(&overbought) {
        return Err(invalid(
            "strategy",
            "rsi_overbought",
            "rsi_overbought must be between 0 and 100",
        ));
    }
    if oversold >= overbought {
        return Err(invalid(
            "strategy",
            "rsi_oversold",
            "rsi_oversold must be below rsi_overbought",
        ));
    }
    Ok(())
}
