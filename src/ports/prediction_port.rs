//! Optional up-move probability source used to confirm entries.

use chrono::NaiveDate;

pub trait PredictionPort {
    /// Probability in [0, 1] that `code` moves up after `date`, if known.
    fn predict_up(&self, code: &str, date: NaiveDate) -> Option<f64>;
}
