//! Shared cash pool for one backtest run.
//!
//! All cash movement goes through `debit` and `credit`.

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("insufficient cash: requested {requested:.2}, available {available:.2}")]
pub struct InsufficientCash {
    pub requested: f64,
    pub available: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapitalState {
    initial: f64,
    cash: f64,
}

impl CapitalState {
    pub fn new(initial_capital: f64) -> Self {
        CapitalState {
            initial: initial_capital,
            cash: initial_capital,
        }
    }

    pub fn initial(&self) -> f64 {
        self.initial
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    /// Remove `amount` from the pool. Cash never goes negative.
    pub fn debit(&mut self, amount: f64) -> Result<(), InsufficientCash> {
        if amount > self.cash {
            return Err(InsufficientCash {
                requested: amount,
                available: self.cash,
            });
        }
        self.cash -= amount;
        Ok(())
    }

    pub fn credit(&mut self, amount: f64) {
        self.cash += amount;
    }
}
