//! Domain error types.

use crate::domain::indicator::IndicatorError;

/// Top-level error type for algotrader.
#[derive(Debug, thiserror::Error)]
pub enum AlgoTraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid input for {code}: {reason}")]
    InvalidInput { code: String, reason: String },

    #[error("no data for {code}")]
    NoData { code: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AlgoTraderError {
    pub fn invalid_input(code: &str, reason: impl Into<String>) -> Self {
        AlgoTraderError::InvalidInput {
            code: code.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<IndicatorError> for AlgoTraderError {
    fn from(err: IndicatorError) -> Self {
        AlgoTraderError::InvalidInput {
            code: "indicator".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<&AlgoTraderError> for std::process::ExitCode {
    fn from(err: &AlgoTraderError) -> Self {
        let code: u8 = match err {
            AlgoTraderError::Io(_) => 1,
            AlgoTraderError::ConfigParse { .. }
            | AlgoTraderError::ConfigMissing { .. }
            | AlgoTraderError::ConfigInvalid { .. } => 2,
            AlgoTraderError::Data { .. } | AlgoTraderError::NoData { .. } => 3,
            AlgoTraderError::InvalidInput { .. } => 4,
            AlgoTraderError::Report { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
