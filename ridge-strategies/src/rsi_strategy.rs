//! RSI oversold/overbought mean reversion with optional profit-target
//! and stop-loss exits.
//!
//! Grounded on `original_source/.../strategies/rsi_strategy.py`:
//! `period=14`, `oversold=30`, `overbought=70`, `position_size=10000`,
//! `max_position=100`, with an optional profit target / stop loss
//! measured against the entry price.

use ridge_core::indicators::Rsi;
use ridge_core::order::{Order, Side, TimeInForce};
use ridge_core::strategy::{size_order, PortfolioSnapshot, Strategy};
use ridge_core::tick::Tick;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use crate::common::{entry_allowed, exit_allowed};

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct RsiStrategyConfig {
    pub period: usize,
    pub oversold: f64,
    pub overbought: f64,
    pub position_size: Decimal,
    pub max_position: Decimal,
    /// Fractional gain (e.g. 0.05 for 5%) above entry at which the
    /// position is closed regardless of RSI. `None` disables it.
    pub profit_target: Option<f64>,
    /// Fractional loss below entry at which the position is closed
    /// regardless of RSI. `None` disables it.
    pub stop_loss: Option<f64>,
}

impl Default for RsiStrategyConfig {
    fn default() -> Self {
        Self {
            period: 14,
            oversold: 30.0,
            overbought: 70.0,
            position_size: dec!(10000),
            max_position: dec!(100),
            profit_target: None,
            stop_loss: None,
        }
    }
}

struct SymbolState {
    rsi: Rsi,
    entry_price: Option<Decimal>,
}

/// Buys when RSI exits oversold territory, sells when it exits
/// overbought territory or a configured profit/stop level is crossed.
pub struct RsiStrategy {
    config: RsiStrategyConfig,
    state: HashMap<String, SymbolState>,
}

impl RsiStrategy {
    pub fn new(config: RsiStrategyConfig) -> Self {
        Self {
            config,
            state: HashMap::new(),
        }
    }
}

impl Strategy for RsiStrategy {
    fn name(&self) -> &str {
        "rsi_strategy"
    }

    fn on_tick(&mut self, tick: &Tick, portfolio: &PortfolioSnapshot) -> anyhow::Result<Vec<Order>> {
        let entry = self.state.entry(tick.symbol.clone()).or_insert_with(|| SymbolState {
            rsi: Rsi::new(self.config.period),
            entry_price: None,
        });
        let Some(rsi) = entry.rsi.update(tick.price) else {
            return Ok(Vec::new());
        };

        let qty = portfolio.position_quantity(&tick.symbol);
        let mut orders = Vec::new();

        let mut force_exit = false;
        if exit_allowed(qty) {
            if let Some(entry_price) = entry.entry_price {
                if entry_price > Decimal::ZERO {
                    let change = ((tick.price - entry_price) / entry_price).to_f64().unwrap_or(0.0);
                    if let Some(target) = self.config.profit_target {
                        force_exit |= change >= target;
                    }
                    if let Some(stop) = self.config.stop_loss {
                        force_exit |= change <= -stop;
                    }
                }
            }
        }

        if exit_allowed(qty) && (force_exit || rsi >= self.config.overbought) {
            orders.push(Order::market(self.name(), &tick.symbol, Side::Sell, qty, TimeInForce::Day));
            entry.entry_price = None;
        } else if entry_allowed(qty) && rsi <= self.config.oversold {
            let size = size_order(self.config.position_size, tick.price, self.config.max_position);
            if size > Decimal::ZERO {
                orders.push(Order::market(self.name(), &tick.symbol, Side::Buy, size, TimeInForce::Day));
                entry.entry_price = Some(tick.price);
            }
        }
        Ok(orders)
    }

    fn warmup_done(&self, symbol: &str) -> bool {
        self.state.get(symbol).map(|s| s.rsi.is_ready()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_rsi_thresholds() {
        let config = RsiStrategyConfig::default();
        assert_eq!(config.period, 14);
        assert_eq!(config.oversold, 30.0);
        assert_eq!(config.overbought, 70.0);
    }
}
