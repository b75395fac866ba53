//! Prediction source backed by a CSV of `code,date,probability` rows.

use crate::domain::error::AlgoTraderError;
use crate::ports::prediction_port::PredictionPort;
use chrono::NaiveDate;
use log::warn;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct PredictionRow {
    code: String,
    date: NaiveDate,
    probability: f64,
}

pub struct CsvPredictionAdapter {
    predictions: HashMap<(String, NaiveDate), f64>,
}

impl CsvPredictionAdapter {
    /// Load predictions. Unreadable rows and probabilities outside [0, 1]
    /// are logged and dropped.
    pub fn from_path(path: &Path) -> Result<Self, AlgoTraderError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| AlgoTraderError::Data {
                reason: format!("failed to read {}: {}", path.display(), e),
            })?;

        let mut predictions = HashMap::new();
        for (line, result) in rdr.deserialize::<PredictionRow>().enumerate() {
            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    warn!("{}: skipping row {}: {}", path.display(), line + 2, e);
                    continue;
                }
            };
            if !(0.0..=1.0).contains(&row.probability) {
                warn!(
                    "{}: skipping row {}: probability {} out of range",
                    path.display(),
                    line + 2,
                    row.probability
                );
                continue;
            }
            predictions.insert((row.code.to_uppercase(), row.date), row.probability);
        }

        Ok(Self { predictions })
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}

impl PredictionPort for CsvPredictionAdapter {
    fn predict_up(&self, code: &str, date: NaiveDate) -> Option<f64> {
        self.predictions.get(&(code.to_uppercase(), date)).copied()
    }
}
