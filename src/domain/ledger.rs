//! Position & capital ledger.
//!
//! Per instrument the ledger is either FLAT (no entry in `positions`) or LONG
//! (exactly one `Position`). Closed round trips are appended to `trades` and
//! never touched again.

use std::collections::HashMap;

use super::capital::CapitalState;
use super::position::{Position, Trade};

#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    capital: CapitalState,
    positions: HashMap<String, Position>,
    trades: Vec<Trade>,
}

impl Ledger {
    pub fn new(initial_capital: f64) -> Self {
        Ledger {
            capital: CapitalState::new(initial_capital),
            positions: HashMap::new(),
            trades: Vec::new(),
        }
    }

    pub fn capital(&self) -> &CapitalState {
        &self.capital
    }

    pub(crate) fn capital_mut(&mut self) -> &mut CapitalState {
        &mut self.capital
    }

    pub fn has_position(&self, code: &str) -> bool {
        self.positions.contains_key(code)
    }

    pub fn position(&self, code: &str) -> Option<&Position> {
        self.positions.get(code)
    }

    pub fn open_positions(&self) -> usize {
        self.positions.len()
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Open a position. Returns the position back if the instrument is already LONG.
    pub(crate) fn open(&mut self, position: Position) -> Result<(), Position> {
        if self.positions.contains_key(&position.code) {
            return Err(position);
        }
        self.positions.insert(position.code.clone(), position);
        Ok(())
    }

    pub(crate) fn take_position(&mut self, code: &str) -> Option<Position> {
        self.positions.remove(code)
    }

    pub(crate) fn record_trade(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    /// Cash plus the market value of open positions at the given prices.
    pub fn total_equity(&self, price_map: &HashMap<String, f64>) -> f64 {
        let position_value: f64 = self
            .positions
            .values()
            .map(|pos| {
                let price = price_map.get(&pos.code).copied().unwrap_or(pos.entry_price);
                pos.market_value(price)
            })
            .sum();
        self.capital.cash() + position_value
    }

    pub fn into_parts(self) -> (CapitalState, Vec<Trade>) {
        (self.capital, self.trades)
    }
}
