//! Pairs trading: track the price spread between two correlated
//! symbols and trade its z-score mean reversion.
//!
//! Grounded on `original_source/.../strategies/pairs_trading.py`:
//! a fixed `symbol_pair` tuple, `lookback=50`, `entry_threshold=2.0`,
//! `exit_threshold=0.5`, and an optional fixed `hedge_ratio` (defaults
//! to 1.0, i.e. a one-for-one spread) applied to the second leg before
//! differencing.
//!
//! Like [`crate::cross_sectional_momentum`], this strategy reads ticks
//! for either leg and reacts on whichever leg ticks last, using
//! [`PortfolioSnapshot`]'s by-symbol accessors to reach the other leg's
//! state.

use ridge_core::order::{Order, Side, TimeInForce};
use ridge_core::strategy::{size_order, PortfolioSnapshot, Strategy};
use ridge_core::tick::Tick;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct PairsTradingConfig {
    pub symbol_a: String,
    pub symbol_b: String,
    pub lookback: usize,
    pub entry_threshold: f64,
    pub exit_threshold: f64,
    pub hedge_ratio: f64,
    pub position_size: Decimal,
    pub max_position: Decimal,
}

impl PairsTradingConfig {
    pub fn new(symbol_a: impl Into<String>, symbol_b: impl Into<String>) -> Self {
        Self {
            symbol_a: symbol_a.into(),
            symbol_b: symbol_b.into(),
            lookback: 50,
            entry_threshold: 2.0,
            exit_threshold: 0.5,
            hedge_ratio: 1.0,
            position_size: dec!(10000),
            max_position: dec!(100),
        }
    }
}

/// Which side of the spread, if any, is currently open. `LongSpread`
/// means long `symbol_a` and short `symbol_b`; `ShortSpread` is the
/// mirror image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpreadPosition {
    Flat,
    LongSpread,
    ShortSpread,
}

/// Trades both legs of the spread: long one symbol and short the other
/// when the z-score is extreme, closing both legs on reversion.
pub struct PairsTrading {
    config: PairsTradingConfig,
    last_a: Option<f64>,
    last_b: Option<f64>,
    spread_history: VecDeque<f64>,
    position: SpreadPosition,
}

impl PairsTrading {
    pub fn new(config: PairsTradingConfig) -> Self {
        Self {
            config,
            last_a: None,
            last_b: None,
            spread_history: VecDeque::new(),
            position: SpreadPosition::Flat,
        }
    }

    fn spread(&self) -> Option<f64> {
        Some(self.last_a? - self.config.hedge_ratio * self.last_b?)
    }

    fn zscore(&self, spread: f64) -> Option<f64> {
        if self.spread_history.len() < self.config.lookback {
            return None;
        }
        let mean = self.spread_history.iter().sum::<f64>() / self.spread_history.len() as f64;
        let variance = self
            .spread_history
            .iter()
            .map(|s| (s - mean).powi(2))
            .sum::<f64>()
            / self.spread_history.len() as f64;
        let std_dev = variance.sqrt();
        if std_dev == 0.0 {
            return None;
        }
        Some((spread - mean) / std_dev)
    }
}

impl Strategy for PairsTrading {
    fn name(&self) -> &str {
        "pairs_trading"
    }

    fn on_tick(&mut self, tick: &Tick, portfolio: &PortfolioSnapshot) -> anyhow::Result<Vec<Order>> {
        let price = tick.price.to_f64().unwrap_or(0.0);
        if tick.symbol == self.config.symbol_a {
            self.last_a = Some(price);
        } else if tick.symbol == self.config.symbol_b {
            self.last_b = Some(price);
        } else {
            return Ok(Vec::new());
        }

        let Some(spread) = self.spread() else {
            return Ok(Vec::new());
        };
        self.spread_history.push_back(spread);
        if self.spread_history.len() > self.config.lookback {
            self.spread_history.pop_front();
        }
        let Some(z) = self.zscore(spread) else {
            return Ok(Vec::new());
        };

        let mut orders = Vec::new();
        let (Some(a_price), Some(b_price)) = (self.last_a, self.last_b) else {
            return Ok(Vec::new());
        };
        let (Ok(a_price), Ok(b_price)) = (Decimal::try_from(a_price), Decimal::try_from(b_price)) else {
            return Ok(Vec::new());
        };
        let qty_a = portfolio.position_quantity(&self.config.symbol_a);
        let qty_b = portfolio.position_quantity(&self.config.symbol_b);

        match self.position {
            SpreadPosition::LongSpread if z.abs() <= self.config.exit_threshold => {
                if qty_a > Decimal::ZERO {
                    orders.push(Order::market(self.name(), &self.config.symbol_a, Side::Sell, qty_a, TimeInForce::Day));
                }
                if qty_b < Decimal::ZERO {
                    orders.push(Order::market(self.name(), &self.config.symbol_b, Side::Buy, qty_b.abs(), TimeInForce::Day));
                }
                self.position = SpreadPosition::Flat;
            }
            SpreadPosition::ShortSpread if z.abs() <= self.config.exit_threshold => {
                if qty_a < Decimal::ZERO {
                    orders.push(Order::market(self.name(), &self.config.symbol_a, Side::Buy, qty_a.abs(), TimeInForce::Day));
                }
                if qty_b > Decimal::ZERO {
                    orders.push(Order::market(self.name(), &self.config.symbol_b, Side::Sell, qty_b, TimeInForce::Day));
                }
                self.position = SpreadPosition::Flat;
            }
            SpreadPosition::Flat if z <= -self.config.entry_threshold => {
                let size_a = size_order(self.config.position_size, a_price, self.config.max_position);
                let size_b = size_order(
                    self.config.position_size * Decimal::try_from(self.config.hedge_ratio).unwrap_or(Decimal::ONE),
                    b_price,
                    self.config.max_position,
                );
                if size_a > Decimal::ZERO && size_b > Decimal::ZERO {
                    orders.push(Order::market(self.name(), &self.config.symbol_a, Side::Buy, size_a, TimeInForce::Day));
                    orders.push(Order::market(self.name(), &self.config.symbol_b, Side::Sell, size_b, TimeInForce::Day));
                    self.position = SpreadPosition::LongSpread;
                }
            }
            SpreadPosition::Flat if z >= self.config.entry_threshold => {
                let size_a = size_order(self.config.position_size, a_price, self.config.max_position);
                let size_b = size_order(
                    self.config.position_size * Decimal::try_from(self.config.hedge_ratio).unwrap_or(Decimal::ONE),
                    b_price,
                    self.config.max_position,
                );
                if size_a > Decimal::ZERO && size_b > Decimal::ZERO {
                    orders.push(Order::market(self.name(), &self.config.symbol_a, Side::Sell, size_a, TimeInForce::Day));
                    orders.push(Order::market(self.name(), &self.config.symbol_b, Side::Buy, size_b, TimeInForce::Day));
                    self.position = SpreadPosition::ShortSpread;
                }
            }
            _ => {}
        }
        Ok(orders)
    }

    fn warmup_done(&self, symbol: &str) -> bool {
        (symbol == self.config.symbol_a || symbol == self.config.symbol_b)
            && self.spread_history.len() >= self.config.lookback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_pairs_trading_parameters() {
        let config = PairsTradingConfig::new("AAPL", "MSFT");
        assert_eq!(config.lookback, 50);
        assert_eq!(config.entry_threshold, 2.0);
        assert_eq!(config.exit_threshold, 0.5);
    }
}
