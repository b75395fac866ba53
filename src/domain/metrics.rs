//! Performance metrics over a finished backtest.
//!
//! Everything here is derived from the trade log and the capital pool; the
//! capital trajectory is rebuilt by replaying trades in exit-date order.

use super::backtest::BacktestResult;
use super::position::Trade;

const DAYS_PER_YEAR: f64 = 365.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    pub initial_capital: f64,
    pub final_capital: f64,
    pub total_pnl: f64,
    pub total_return: f64,
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    /// Worst peak-to-trough move as a non-positive fraction.
    pub max_drawdown: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub breakeven_trades: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    /// Magnitude of the average losing trade.
    pub avg_loss: f64,
    pub largest_win: f64,
    /// Magnitude of the worst losing trade.
    pub largest_loss: f64,
    pub avg_trade_duration_days: f64,
    pub forced_closures: usize,
    pub skipped_instruments: usize,
    pub window_days: i64,
}

impl PerformanceSummary {
    pub fn compute(result: &BacktestResult, risk_free_rate: f64) -> Self {
        let trades = &result.trades;
        let initial_capital = result.initial_capital();
        let final_capital = result.final_capital();
        let window_days = result.window_days();

        let total_pnl: f64 = trades.iter().map(|t| t.pnl).sum();
        let total_return = if initial_capital > 0.0 {
            (final_capital - initial_capital) / initial_capital
        } else {
            0.0
        };
        let annualized_return = annualize(total_return, window_days);
        let max_drawdown = compute_drawdown(trades, initial_capital);
        let sharpe_ratio = compute_sharpe(trades, window_days, risk_free_rate);

        let mut winning_trades = 0usize;
        let mut losing_trades = 0usize;
        let mut breakeven_trades = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;
        let mut total_duration_days = 0i64;

        for trade in trades {
            let pnl = trade.pnl;
            if pnl > 0.0 {
                winning_trades += 1;
                total_wins += pnl;
                largest_win = largest_win.max(pnl);
            } else if pnl < 0.0 {
                losing_trades += 1;
                total_losses += pnl.abs();
                largest_loss = largest_loss.max(pnl.abs());
            } else {
                breakeven_trades += 1;
            }
            total_duration_days += trade.holding_days();
        }

        let total_trades = trades.len();
        let win_rate = if total_trades > 0 {
            winning_trades as f64 / total_trades as f64
        } else {
            0.0
        };

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let avg_win = if winning_trades > 0 {
            total_wins / winning_trades as f64
        } else {
            0.0
        };

        let avg_loss = if losing_trades > 0 {
            total_losses / losing_trades as f64
        } else {
            0.0
        };

        let avg_trade_duration_days = if total_trades > 0 {
            total_duration_days as f64 / total_trades as f64
        } else {
            0.0
        };

        PerformanceSummary {
            initial_capital,
            final_capital,
            total_pnl,
            total_return,
            annualized_return,
            sharpe_ratio,
            max_drawdown,
            total_trades,
            winning_trades,
            losing_trades,
            breakeven_trades,
            win_rate,
            profit_factor,
            avg_win,
            avg_loss,
            largest_win,
            largest_loss,
            avg_trade_duration_days,
            forced_closures: result.forced_closures(),
            skipped_instruments: result.skipped.len(),
            window_days,
        }
    }

    /// Metric name and formatted value pairs, in report order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("initial_capital", format!("{:.2}", self.initial_capital)),
            ("final_capital", format!("{:.2}", self.final_capital)),
            ("total_pnl", format!("{:.2}", self.total_pnl)),
            ("total_return", format!("{:.6}", self.total_return)),
            ("annualized_return", format!("{:.6}", self.annualized_return)),
            ("sharpe_ratio", format!("{:.4}", self.sharpe_ratio)),
            ("max_drawdown", format!("{:.6}", self.max_drawdown)),
            ("total_trades", self.total_trades.to_string()),
            ("winning_trades", self.winning_trades.to_string()),
            ("losing_trades", self.losing_trades.to_string()),
            ("breakeven_trades", self.breakeven_trades.to_string()),
            ("win_rate", format!("{:.6}", self.win_rate)),
            ("profit_factor", format!("{:.4}", self.profit_factor)),
            ("avg_win", format!("{:.2}", self.avg_win)),
            ("avg_loss", format!("{:.2}", self.avg_loss)),
            ("largest_win", format!("{:.2}", self.largest_win)),
            ("largest_loss", format!("{:.2}", self.largest_loss)),
            (
                "avg_trade_duration_days",
                format!("{:.2}", self.avg_trade_duration_days),
            ),
            ("forced_closures", self.forced_closures.to_string()),
            ("skipped_instruments", self.skipped_instruments.to_string()),
            ("window_days", self.window_days.to_string()),
        ]
    }
}

/// Linear scaling up to a year, compounding beyond it.
fn annualize(total_return: f64, window_days: i64) -> f64 {
    if window_days <= 0 || !total_return.is_finite() {
        return 0.0;
    }
    let days = window_days as f64;
    if days <= DAYS_PER_YEAR {
        total_return * DAYS_PER_YEAR / days
    } else {
        (1.0 + total_return).powf(DAYS_PER_YEAR / days) - 1.0
    }
}

fn compute_drawdown(trades: &[Trade], initial_capital: f64) -> f64 {
    let mut ordered: Vec<&Trade> = trades.iter().collect();
    ordered.sort_by_key(|t| t.exit_date);

    let mut capital = initial_capital;
    let mut peak = initial_capital;
    let mut max_dd = 0.0_f64;

    for trade in ordered {
        capital += trade.pnl;
        if capital > peak {
            peak = capital;
        } else if peak > 0.0 {
            max_dd = max_dd.min((capital - peak) / peak);
        }
    }

    max_dd
}

fn compute_sharpe(trades: &[Trade], window_days: i64, risk_free_rate: f64) -> f64 {
    if trades.len() < 2 || window_days <= 0 {
        return 0.0;
    }

    let returns: Vec<f64> = trades.iter().map(Trade::return_pct).collect();
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();
    if stddev <= 0.0 {
        return 0.0;
    }

    let trades_per_year = n * DAYS_PER_YEAR / window_days as f64;
    let rf_per_trade = risk_free_rate / trades_per_year;
    (mean - rf_per_trade) / stddev * trades_per_year.sqrt()
}

/// Per-instrument breakdown of the trade log.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeResult {
    pub code: String,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub total_pnl: f64,
}

impl CodeResult {
    /// One entry per instrument in order of first appearance.
    pub fn compute_per_code(trades: &[Trade]) -> Vec<CodeResult> {
        let mut results: Vec<CodeResult> = Vec::new();

        for trade in trades {
            let idx = match results.iter().position(|r| r.code == trade.code) {
                Some(idx) => idx,
                None => {
                    results.push(CodeResult {
                        code: trade.code.clone(),
                        total_trades: 0,
                        winning_trades: 0,
                        losing_trades: 0,
                        win_rate: 0.0,
                        total_pnl: 0.0,
                    });
                    results.len() - 1
                }
            };
            let entry = &mut results[idx];
            entry.total_trades += 1;
            entry.total_pnl += trade.pnl;
            if trade.pnl > 0.0 {
                entry.winning_trades += 1;
            } else if trade.pnl < 0.0 {
                entry.losing_trades += 1;
            }
        }

        for r in &mut results {
            r.win_rate = r.winning_trades as f64 / r.total_trades as f64;
        }
        results
    }
}
