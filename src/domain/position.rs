//! Open positions and completed trades.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// An open long position. At most one exists per instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub code: String,
    pub quantity: u64,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
}

impl Position {
    pub fn cost_basis(&self) -> f64 {
        self.quantity as f64 * self.entry_price
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity as f64 * price
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    Signal,
    EndOfWindow,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Signal => write!(f, "signal"),
            ExitReason::EndOfWindow => write!(f, "end_of_window"),
        }
    }
}

/// A completed round trip. Only built once both legs are known.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub code: String,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub quantity: u64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl: f64,
    pub exit_reason: ExitReason,
}

impl Trade {
    pub fn close(
        position: Position,
        exit_price: f64,
        exit_date: NaiveDate,
        exit_reason: ExitReason,
    ) -> Self {
        let pnl = (exit_price - position.entry_price) * position.quantity as f64;
        Trade {
            code: position.code,
            entry_date: position.entry_date,
            exit_date,
            quantity: position.quantity,
            entry_price: position.entry_price,
            exit_price,
            pnl,
            exit_reason,
        }
    }

    /// pnl relative to the capital committed at entry.
    pub fn return_pct(&self) -> f64 {
        let cost = self.entry_price * self.quantity as f64;
        if cost > 0.0 { self.pnl / cost } else { 0.0 }
    }

    pub fn holding_days(&self) -> i64 {
        (self.exit_date - self.entry_date).num_days()
    }
}
