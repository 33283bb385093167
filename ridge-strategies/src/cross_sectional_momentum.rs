//! Cross-sectional momentum: rank the whole tracked symbol universe by
//! trailing return at each rebalance boundary and hold the
//! top-percentile performers.
//!
//! Grounded on `original_source/.../strategies/cross_sectional_momentum.py`:
//! `lookback=20`, `rebalance_period=50`, `long_percentile=0.2`,
//! `short_percentile=0.2`, `enable_shorting=false`, `min_stocks=3`
//! (too small a tracked universe skips the rebalance rather than
//! over-concentrating).
//!
//! Unlike the single-symbol strategies elsewhere in this crate, this
//! one reads and writes state for the *whole* symbol universe on every
//! tick, since a rank is only meaningful across symbols. It relies on
//! [`PortfolioSnapshot::position_quantity`] and
//! [`PortfolioSnapshot::price`] accepting any symbol, not just the one
//! the current tick belongs to.

use ridge_core::order::{Order, Side, TimeInForce};
use ridge_core::strategy::{size_order, PortfolioSnapshot, Strategy};
use ridge_core::tick::Tick;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct CrossSectionalMomentumConfig {
    pub lookback: usize,
    pub rebalance_period: u64,
    pub long_percentile: f64,
    pub short_percentile: f64,
    pub enable_shorting: bool,
    pub min_stocks: usize,
    pub position_size: Decimal,
    pub max_position: Decimal,
}

impl Default for CrossSectionalMomentumConfig {
    fn default() -> Self {
        Self {
            lookback: 20,
            rebalance_period: 50,
            long_percentile: 0.2,
            short_percentile: 0.2,
            enable_shorting: false,
            min_stocks: 3,
            position_size: dec!(10000),
            max_position: dec!(100),
        }
    }
}

pub struct CrossSectionalMomentum {
    config: CrossSectionalMomentumConfig,
    history: HashMap<String, VecDeque<f64>>,
    held: HashSet<String>,
    shorted: HashSet<String>,
    global_ticks: u64,
    warm: bool,
}

impl CrossSectionalMomentum {
    pub fn new(config: CrossSectionalMomentumConfig) -> Self {
        Self {
            config,
            history: HashMap::new(),
            held: HashSet::new(),
            shorted: HashSet::new(),
            global_ticks: 0,
            warm: false,
        }
    }

    fn momentum(history: &VecDeque<f64>) -> Option<f64> {
        let first = *history.front()?;
        let last = *history.back()?;
        if first == 0.0 {
            return None;
        }
        Some((last - first) / first)
    }
}

impl Strategy for CrossSectionalMomentum {
    fn name(&self) -> &str {
        "cross_sectional_momentum"
    }

    fn on_tick(&mut self, tick: &Tick, portfolio: &PortfolioSnapshot) -> anyhow::Result<Vec<Order>> {
        let price = tick.price.to_f64().unwrap_or(0.0);
        let window = self.history.entry(tick.symbol.clone()).or_insert_with(VecDeque::new);
        window.push_back(price);
        if window.len() > self.config.lookback + 1 {
            window.pop_front();
        }
        self.global_ticks += 1;

        let eligible = self.history.len() >= self.config.min_stocks;
        if !eligible || self.global_ticks % self.config.rebalance_period != 0 {
            return Ok(Vec::new());
        }

        let mut scores: Vec<(String, f64)> = self
            .history
            .iter()
            .filter(|(_, h)| h.len() > self.config.lookback)
            .filter_map(|(symbol, h)| Self::momentum(h).map(|m| (symbol.clone(), m)))
            .collect();
        if scores.len() < self.config.min_stocks {
            return Ok(Vec::new());
        }
        scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let n_long = ((scores.len() as f64 * self.config.long_percentile).ceil() as usize).max(1);
        let long_set: HashSet<String> = scores.iter().take(n_long).map(|(s, _)| s.clone()).collect();

        let short_set: HashSet<String> = if self.config.enable_shorting {
            let n_short = ((scores.len() as f64 * self.config.short_percentile).ceil() as usize).max(1);
            scores
                .iter()
                .rev()
                .take(n_short)
                .map(|(s, _)| s.clone())
                .collect()
        } else {
            HashSet::new()
        };
        self.warm = true;

        let mut orders = Vec::new();

        // Exit names that fell out of the long set.
        for symbol in self.held.clone() {
            if !long_set.contains(&symbol) {
                let qty = portfolio.position_quantity(&symbol);
                if qty > Decimal::ZERO {
                    orders.push(Order::market(self.name(), &symbol, Side::Sell, qty, TimeInForce::Day));
                }
                self.held.remove(&symbol);
            }
        }

        // Cover names that fell out of the short list.
        for symbol in self.shorted.clone() {
            if !short_set.contains(&symbol) {
                let qty = portfolio.position_quantity(&symbol);
                if qty < Decimal::ZERO {
                    orders.push(Order::market(self.name(), &symbol, Side::Buy, qty.abs(), TimeInForce::Day));
                }
                self.shorted.remove(&symbol);
            }
        }

        // Enter newly selected long names.
        for symbol in &long_set {
            if self.held.contains(symbol) {
                continue;
            }
            let Some(price) = portfolio.price(symbol) else {
                continue;
            };
            let size = size_order(self.config.position_size, price, self.config.max_position);
            if size > Decimal::ZERO {
                orders.push(Order::market(self.name(), symbol, Side::Buy, size, TimeInForce::Day));
                self.held.insert(symbol.clone());
            }
        }

        // Enter newly selected short names.
        for symbol in &short_set {
            if self.shorted.contains(symbol) {
                continue;
            }
            let Some(price) = portfolio.price(symbol) else {
                continue;
            };
            let size = size_order(self.config.position_size, price, self.config.max_position);
            if size > Decimal::ZERO {
                orders.push(Order::market(self.name(), symbol, Side::Sell, size, TimeInForce::Day));
                self.shorted.insert(symbol.clone());
            }
        }

        Ok(orders)
    }

    fn warmup_done(&self, symbol: &str) -> bool {
        self.warm
            && self
                .history
                .get(symbol)
                .map(|h| h.len() > self.config.lookback)
                .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_cross_sectional_parameters() {
        let config = CrossSectionalMomentumConfig::default();
        assert_eq!(config.lookback, 20);
        assert_eq!(config.rebalance_period, 50);
        assert_eq!(config.min_stocks, 3);
        assert_eq!(config.short_percentile, 0.2);
        assert!(!config.enable_shorting);
    }
}
