//! Market data port.

use crate::domain::error::AlgoTraderError;
use crate::domain::ohlcv::PriceBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Bars for `code` in ascending date order, restricted to the inclusive
    /// window. `None` leaves that side of the window open.
    fn fetch_ohlcv(
        &self,
        code: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, AlgoTraderError>;

    fn list_symbols(&self) -> Result<Vec<String>, AlgoTraderError>;

    /// First date, last date and bar count, or `None` if the code has no data.
    fn get_data_range(
        &self,
        code: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, AlgoTraderError>;
}
