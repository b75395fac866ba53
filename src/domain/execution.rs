//! Trade execution against the ledger.
//!
//! Implements entry sizing, signal-driven exits and the end-of-window forced
//! closure. Fills happen at the supplied price; there is no slippage or
//! commission model.

use chrono::NaiveDate;
use log::debug;

use super::ledger::Ledger;
use super::position::{ExitReason, Position, Trade};

/// Result of an entry attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered { quantity: u64, cost: f64 },
    InsufficientCapital,
    AlreadyLong,
}

/// Whole-share quantity for `risk_fraction` of `cash` at `price`.
pub fn position_size(cash: f64, risk_fraction: f64, price: f64) -> u64 {
    if price <= 0.0 || cash <= 0.0 || risk_fraction <= 0.0 {
        return 0;
    }
    let raw = (risk_fraction * cash / price).floor();
    if raw.is_finite() && raw > 0.0 {
        raw as u64
    } else {
        0
    }
}

/// Enter a long position.
///
/// Steps:
/// 1. Refuse if the instrument is already LONG
/// 2. quantity = floor(risk_fraction * cash / price)
/// 3. If quantity == 0, return InsufficientCapital (the step becomes a hold)
/// 4. Debit quantity * price from the capital pool
/// 5. Record the position
pub fn enter_long(
    ledger: &mut Ledger,
    code: &str,
    price: f64,
    date: NaiveDate,
    risk_fraction: f64,
) -> EntryResult {
    if ledger.has_position(code) {
        return EntryResult::AlreadyLong;
    }

    let quantity = position_size(ledger.capital().cash(), risk_fraction, price);
    if quantity == 0 {
        debug!("{code} {date}: entry skipped, sized quantity is zero at {price:.2}");
        return EntryResult::InsufficientCapital;
    }

    let position = Position {
        code: code.to_string(),
        quantity,
        entry_price: price,
        entry_date: date,
    };
    let cost = position.cost_basis();
    if ledger.capital_mut().debit(cost).is_err() {
        return EntryResult::InsufficientCapital;
    }

    if ledger.open(position).is_err() {
        ledger.capital_mut().credit(cost);
        return EntryResult::AlreadyLong;
    }

    debug!("{code} {date}: ENTER_LONG {quantity} @ {price:.2}");
    EntryResult::Entered { quantity, cost }
}

/// Exit a position.
///
/// Steps:
/// 1. Remove the position (None if FLAT)
/// 2. Credit quantity * price back to the pool
/// 3. Record and return the closed trade
pub fn exit_position(
    ledger: &mut Ledger,
    code: &str,
    price: f64,
    date: NaiveDate,
    reason: ExitReason,
) -> Option<Trade> {
    let position = ledger.take_position(code)?;
    ledger.capital_mut().credit(position.market_value(price));

    let trade = Trade::close(position, price, date, reason);
    debug!(
        "{code} {date}: EXIT_LONG ({reason}) {} @ {price:.2}, pnl {:.2}",
        trade.quantity, trade.pnl
    );
    ledger.record_trade(trade.clone());
    Some(trade)
}

/// Last observed bar of an instrument, used for forced closure.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalMark {
    pub code: String,
    pub price: f64,
    pub date: NaiveDate,
}

/// Force-close every instrument still LONG, in `marks` order.
///
/// Returns the number of positions closed.
pub fn close_all_positions(ledger: &mut Ledger, marks: &[FinalMark]) -> usize {
    marks
        .iter()
        .filter_map(|mark| {
            exit_position(
                ledger,
                &mark.code,
                mark.price,
                mark.date,
                ExitReason::EndOfWindow,
            )
        })
        .count()
}
