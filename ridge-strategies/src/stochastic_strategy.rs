//! Stochastic oscillator oversold/overbought, with the slow-stochastic
//! smoothing pass enabled by default.
//!
//! Grounded on `original_source/.../strategies/stochastic_strategy.py`:
//! `k_period=14`, `d_period=3`, `oversold=20`, `overbought=80`,
//! `use_slow_stoch=true` (a 3-period smoothing pass on %K, matching
//! `Stochastic::new`'s `slow_period` parameter).

use ridge_core::indicators::Stochastic;
use ridge_core::order::{Order, Side, TimeInForce};
use ridge_core::strategy::{size_order, PortfolioSnapshot, Strategy};
use ridge_core::tick::Tick;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use crate::common::{entry_allowed, exit_allowed};

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct StochasticStrategyConfig {
    pub k_period: usize,
    pub d_period: usize,
    pub oversold: f64,
    pub overbought: f64,
    pub use_slow_stoch: bool,
    pub position_size: Decimal,
    pub max_position: Decimal,
}

impl Default for StochasticStrategyConfig {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
            oversold: 20.0,
            overbought: 80.0,
            use_slow_stoch: true,
            position_size: dec!(10000),
            max_position: dec!(100),
        }
    }
}

pub struct StochasticStrategy {
    config: StochasticStrategyConfig,
    state: HashMap<String, Stochastic>,
}

impl StochasticStrategy {
    pub fn new(config: StochasticStrategyConfig) -> Self {
        Self {
            config,
            state: HashMap::new(),
        }
    }

    fn slow_period(&self) -> usize {
        if self.config.use_slow_stoch {
            3
        } else {
            1
        }
    }
}

impl Strategy for StochasticStrategy {
    fn name(&self) -> &str {
        "stochastic_strategy"
    }

    fn on_tick(&mut self, tick: &Tick, portfolio: &PortfolioSnapshot) -> anyhow::Result<Vec<Order>> {
        let slow_period = self.slow_period();
        let indicator = self
            .state
            .entry(tick.symbol.clone())
            .or_insert_with(|| Stochastic::new(self.config.k_period, self.config.d_period, slow_period));
        let Some(value) = indicator.update(tick.price) else {
            return Ok(Vec::new());
        };

        let qty = portfolio.position_quantity(&tick.symbol);
        let mut orders = Vec::new();

        if exit_allowed(qty) && value.percent_k >= self.config.overbought && value.percent_k <= value.percent_d {
            orders.push(Order::market(self.name(), &tick.symbol, Side::Sell, qty, TimeInForce::Day));
        } else if entry_allowed(qty) && value.percent_k <= self.config.oversold && value.percent_k >= value.percent_d {
            let size = size_order(self.config.position_size, tick.price, self.config.max_position);
            if size > Decimal::ZERO {
                orders.push(Order::market(self.name(), &tick.symbol, Side::Buy, size, TimeInForce::Day));
            }
        }
        Ok(orders)
    }

    fn warmup_done(&self, symbol: &str) -> bool {
        self.state.get(symbol).map(|s| s.is_ready()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_stochastic_parameters() {
        let config = StochasticStrategyConfig::default();
        assert_eq!(config.k_period, 14);
        assert_eq!(config.d_period, 3);
        assert!(config.use_slow_stoch);
    }
}
