//! Portfolio accounting: positions, cash, trades, equity curve,
//! performance metrics (spec §3, §4.5).
//!
//! The update law and performance-metric formulas are ported directly
//! from `original_source/.../trading/portfolio.py`'s `TradingPortfolio`
//! (average-cost-basis update, single-pass max-drawdown scan, 252-day
//! Sharpe annualization); the struct-with-methods idiom and the
//! `Decimal`-for-money discipline follow `bog-core/src/execution/types.rs`.

use crate::order::{Side, Trade};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::SystemTime;

/// Per-symbol position (spec §3). `quantity` is signed: positive long,
/// negative short, zero flat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub quantity: Decimal,
    pub average_cost: Decimal,
    pub realized_pnl: Decimal,
    pub unrealized_pnl: Decimal,
}

/// -1, 0, or 1 as a `Decimal`, matching the sign convention used by
/// the position update law without depending on a `Signed` impl.
fn sign_of(d: Decimal) -> Decimal {
    if d > Decimal::ZERO {
        Decimal::ONE
    } else if d < Decimal::ZERO {
        -Decimal::ONE
    } else {
        Decimal::ZERO
    }
}

impl Position {
    pub fn flat(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            quantity: Decimal::ZERO,
            average_cost: Decimal::ZERO,
            realized_pnl: Decimal::ZERO,
            unrealized_pnl: Decimal::ZERO,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.quantity.is_zero()
    }

    pub fn is_long(&self) -> bool {
        self.quantity > Decimal::ZERO
    }

    pub fn is_short(&self) -> bool {
        self.quantity < Decimal::ZERO
    }

    /// Apply a trade against this position per the spec §3 update law:
    /// same-direction trades widen the position and blend cost basis;
    /// opposite-direction trades realize P&L against the existing
    /// basis and may cross through zero, reopening on the other side.
    pub fn apply_trade(&mut self, side: Side, quantity: Decimal, price: Decimal) {
        let signed_qty = Decimal::from(side.sign()) * quantity;
        let same_direction = self.quantity.is_zero() || sign_of(self.quantity) == sign_of(signed_qty);

        if same_direction {
            let abs_q = self.quantity.abs();
            let new_qty = self.quantity + signed_qty;
            self.average_cost = if new_qty.is_zero() {
                Decimal::ZERO
            } else {
                (abs_q * self.average_cost + quantity * price) / (abs_q + quantity)
            };
            self.quantity = new_qty;
        } else {
            let closing_qty = quantity.min(self.quantity.abs());
            self.realized_pnl += sign_of(self.quantity) * (price - self.average_cost) * closing_qty;
            let new_qty = self.quantity + signed_qty;

            if new_qty.is_zero() {
                self.quantity = Decimal::ZERO;
                self.average_cost = Decimal::ZERO;
            } else if sign_of(new_qty) != sign_of(self.quantity) && !self.quantity.is_zero() {
                // Crossed through zero: residual reopens on the other side.
                self.quantity = new_qty;
                self.average_cost = price;
            } else {
                self.quantity = new_qty;
            }
        }
    }

    pub fn mark_to_market(&mut self, current_price: Decimal) {
        self.unrealized_pnl = sign_of(self.quantity) * (current_price - self.average_cost) * self.quantity.abs();
    }

    pub fn total_pnl(&self) -> Decimal {
        self.realized_pnl + self.unrealized_pnl
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PerformanceMetrics {
    pub total_return_pct: f64,
    pub realized_pnl: f64,
    pub unrealized_pnl: f64,
    pub total_pnl: f64,
    pub num_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub max_drawdown_pct: f64,
    pub current_drawdown_pct: f64,
    pub sharpe_ratio: f64,
}

/// The book of record: cash, positions, trade history, and equity
/// curve for one trading session.
#[derive(Debug, Clone)]
pub struct Portfolio {
    pub initial_cash: Decimal,
    pub cash: Decimal,
    pub positions: HashMap<String, Position>,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<(SystemTime, Decimal)>,
    pub high_water_mark: Decimal,
}

impl Portfolio {
    pub fn new(initial_cash: Decimal) -> Self {
        Self {
            initial_cash,
            cash: initial_cash,
            positions: HashMap::new(),
            trades: Vec::new(),
            equity_curve: Vec::new(),
            high_water_mark: initial_cash,
        }
    }

    /// Apply a trade's cash flow and position update.
    pub fn process_trade(&mut self, trade: Trade) {
        self.cash += trade.cash_flow();
        let position = self
            .positions
            .entry(trade.symbol.clone())
            .or_insert_with(|| Position::flat(trade.symbol.clone()));
        position.apply_trade(trade.side, trade.quantity, trade.price);
        self.trades.push(trade);
    }

    /// Recompute unrealized P&L for every held position against a
    /// current price map.
    pub fn update_prices(&mut self, prices: &HashMap<String, Decimal>) {
        for (symbol, position) in self.positions.iter_mut() {
            if let Some(&price) = prices.get(symbol) {
                position.mark_to_market(price);
            }
        }
    }

    pub fn total_value(&self) -> Decimal {
        let positions_value: Decimal = self
            .positions
            .values()
            .map(|p| p.quantity * p.average_cost + p.unrealized_pnl)
            .sum();
        self.cash + positions_value
    }

    /// Append an equity-curve sample and bump the high-water-mark.
    pub fn record_equity(&mut self, timestamp: SystemTime) {
        let value = self.total_value();
        self.equity_curve.push((timestamp, value));
        if value > self.high_water_mark {
            self.high_water_mark = value;
        }
    }

    /// Gross exposure: sum of `|qty| * current_price` across positions
    /// (spec §8 invariant 2), using each position's mark price.
    pub fn gross_exposure(&self, prices: &HashMap<String, Decimal>) -> Decimal {
        self.positions
            .values()
            .filter_map(|p| prices.get(&p.symbol).map(|&price| p.quantity.abs() * price))
            .sum()
    }

    pub fn performance_metrics(&self) -> PerformanceMetrics {
        let total_value = self.total_value();
        let initial = self.initial_cash.to_f64().unwrap_or(0.0);
        let total_value_f = total_value.to_f64().unwrap_or(0.0);

        let total_return_pct = if initial != 0.0 {
            (total_value_f - initial) / initial * 100.0
        } else {
            0.0
        };

        let realized_pnl: f64 = self
            .positions
            .values()
            .map(|p| p.realized_pnl.to_f64().unwrap_or(0.0))
            .sum();
        let unrealized_pnl: f64 = self
            .positions
            .values()
            .map(|p| p.unrealized_pnl.to_f64().unwrap_or(0.0))
            .sum();
        let total_pnl = realized_pnl + unrealized_pnl;

        let num_trades = self.trades.len();

        // Win/loss counts derive from realized P&L of closing trades:
        // approximate by sign of per-position realized_pnl, consistent
        // with the teacher-source's closed-trade accounting.
        let (winning_trades, losing_trades, wins_sum, losses_sum) = self.positions.values().fold(
            (0usize, 0usize, 0.0f64, 0.0f64),
            |(w, l, ws, ls), p| {
                let r = p.realized_pnl.to_f64().unwrap_or(0.0);
                if r > 0.0 {
                    (w + 1, l, ws + r, ls)
                } else if r < 0.0 {
                    (w, l + 1, ws, ls + r)
                } else {
                    (w, l, ws, ls)
                }
            },
        );

        let win_rate = if winning_trades + losing_trades > 0 {
            winning_trades as f64 / (winning_trades + losing_trades) as f64 * 100.0
        } else {
            0.0
        };
        let avg_win = if winning_trades > 0 { wins_sum / winning_trades as f64 } else { 0.0 };
        let avg_loss = if losing_trades > 0 { losses_sum / losing_trades as f64 } else { 0.0 };

        let max_drawdown_pct = self.max_drawdown() * 100.0;
        let hwm = self.high_water_mark.to_f64().unwrap_or(initial);
        let current_drawdown_pct = if hwm > 0.0 {
            ((hwm - total_value_f) / hwm).max(0.0) * 100.0
        } else {
            0.0
        };

        PerformanceMetrics {
            total_return_pct,
            realized_pnl,
            unrealized_pnl,
            total_pnl,
            num_trades,
            winning_trades,
            losing_trades,
            win_rate,
            avg_win,
            avg_loss,
            max_drawdown_pct,
            current_drawdown_pct,
            sharpe_ratio: self.sharpe_ratio(),
        }
    }

    /// Single-pass peak scan: max of `1 - value/running_peak` over the
    /// equity curve (spec §4.5, §8 invariant 6).
    fn max_drawdown(&self) -> f64 {
        let mut peak = f64::NEG_INFINITY;
        let mut max_dd = 0.0f64;
        for (_, value) in &self.equity_curve {
            let v = value.to_f64().unwrap_or(0.0);
            if v > peak {
                peak = v;
            }
            if peak > 0.0 {
                let dd = 1.0 - v / peak;
                if dd > max_dd {
                    max_dd = dd;
                }
            }
        }
        if peak.is_finite() {
            max_dd
        } else {
            0.0
        }
    }

    /// Annualized Sharpe ratio of equity-curve percentage returns,
    /// 252-trading-day convention, risk-free rate assumed zero.
    fn sharpe_ratio(&self) -> f64 {
        if self.equity_curve.len() < 2 {
            return 0.0;
        }
        let values: Vec<f64> = self.equity_curve.iter().map(|(_, v)| v.to_f64().unwrap_or(0.0)).collect();
        let returns: Vec<f64> = values
            .windows(2)
            .filter_map(|w| if w[0] != 0.0 { Some((w[1] - w[0]) / w[0]) } else { None })
            .collect();
        if returns.len() < 2 {
            return 0.0;
        }
        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();
        if std_dev == 0.0 {
            0.0
        } else {
            (mean / std_dev) * (252.0f64).sqrt()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderId;
    use rust_decimal_macros::dec;

    fn trade(side: Side, qty: Decimal, price: Decimal) -> Trade {
        Trade::new(OrderId::new_random(), "sma", "AAPL", side, qty, price)
    }

    #[test]
    fn round_trip_buy_sell_realizes_expected_pnl() {
        let mut pf = Portfolio::new(dec!(100_000));
        pf.process_trade(trade(Side::Buy, dec!(10), dec!(100)));
        pf.process_trade(trade(Side::Sell, dec!(10), dec!(110)));

        let pos = &pf.positions["AAPL"];
        assert_eq!(pos.realized_pnl, dec!(100));
        assert_eq!(pos.quantity, Decimal::ZERO);
        assert_eq!(pf.cash, dec!(100_000) + dec!(100));
    }

    #[test]
    fn crossing_through_zero_reopens_on_other_side() {
        let mut pf = Portfolio::new(dec!(100_000));
        pf.process_trade(trade(Side::Buy, dec!(10), dec!(100)));
        pf.process_trade(trade(Side::Sell, dec!(15), dec!(110)));

        let pos = &pf.positions["AAPL"];
        assert_eq!(pos.quantity, dec!(-5));
        assert_eq!(pos.average_cost, dec!(110));
        assert_eq!(pos.realized_pnl, dec!(100));
    }

    #[test]
    fn high_water_mark_never_decreases() {
        let mut pf = Portfolio::new(dec!(100_000));
        pf.record_equity(SystemTime::now());
        pf.cash -= dec!(5_000);
        pf.record_equity(SystemTime::now());
        assert_eq!(pf.high_water_mark, dec!(100_000));
    }

    #[test]
    fn max_drawdown_matches_peak_scan_definition() {
        let mut pf = Portfolio::new(dec!(100_000));
        for v in [dec!(100_000), dec!(110_000), dec!(99_000), dec!(105_000)] {
            pf.equity_curve.push((SystemTime::now(), v));
        }
        let dd = pf.max_drawdown();
        let expected = 1.0 - 99_000.0 / 110_000.0;
        assert!((dd - expected).abs() < 1e-9);
    }

    #[test]
    fn empty_equity_curve_yields_zero_metrics() {
        let pf = Portfolio::new(dec!(100_000));
        let m = pf.performance_metrics();
        assert_eq!(m.max_drawdown_pct, 0.0);
        assert_eq!(m.sharpe_ratio, 0.0);
    }
}
