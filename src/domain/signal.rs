//! Signal generation from one step of indicator values.
//!
//! # Evaluation Semantics
//!
//! - Exit is evaluated first and only when a position is open:
//!   `RSI > overbought` OR bearish crossover (`short < long` now, `short >= long` on the previous step)
//! - Entry is evaluated only when flat:
//!   `RSI < oversold` AND `short > long`
//! - Everything else is `Hold`
//!
//! The generator is stateless; the caller supplies the position state.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    EnterLong,
    ExitLong,
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::EnterLong => write!(f, "ENTER_LONG"),
            Signal::ExitLong => write!(f, "EXIT_LONG"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalThresholds {
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        SignalThresholds {
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
        }
    }
}

/// Indicator values for the current and previous step of one instrument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalInput {
    pub close: f64,
    pub rsi: f64,
    pub short_ma: f64,
    pub prev_short_ma: f64,
    pub long_ma: f64,
    pub prev_long_ma: f64,
    pub has_position: bool,
}

impl SignalInput {
    pub fn bearish_crossover(&self) -> bool {
        self.short_ma < self.long_ma && self.prev_short_ma >= self.prev_long_ma
    }

    pub fn bullish_trend(&self) -> bool {
        self.short_ma > self.long_ma
    }
}

pub fn generate_signal(input: &SignalInput, thresholds: &SignalThresholds) -> Signal {
    if input.has_position {
        if input.rsi > thresholds.rsi_overbought || input.bearish_crossover() {
            return Signal::ExitLong;
        }
        return Signal::Hold;
    }

    if input.rsi < thresholds.rsi_oversold && input.bullish_trend() {
        return Signal::EnterLong;
    }

    Signal::Hold
}
