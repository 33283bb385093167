//! Z-score mean reversion: enter when price is `entry_threshold`
//! standard deviations from its rolling mean, exit when it reverts to
//! within `exit_threshold`.
//!
//! Grounded on `original_source/.../strategies/zscore_mean_reversion.py`:
//! `lookback=20`, `entry_threshold=2.0`, `exit_threshold=0.0`,
//! `enable_shorting=true`.

use ridge_core::indicators::ZScore;
use ridge_core::order::{Order, Side, TimeInForce};
use ridge_core::strategy::{size_order, PortfolioSnapshot, Strategy};
use ridge_core::tick::Tick;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use crate::common::entry_allowed;

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct ZScoreReversionConfig {
    pub lookback: usize,
    pub entry_threshold: f64,
    pub exit_threshold: f64,
    pub enable_shorting: bool,
    pub position_size: Decimal,
    pub max_position: Decimal,
}

impl Default for ZScoreReversionConfig {
    fn default() -> Self {
        Self {
            lookback: 20,
            entry_threshold: 2.0,
            exit_threshold: 0.0,
            enable_shorting: true,
            position_size: dec!(10000),
            max_position: dec!(100),
        }
    }
}

pub struct ZScoreReversion {
    config: ZScoreReversionConfig,
    state: HashMap<String, ZScore>,
}

impl ZScoreReversion {
    pub fn new(config: ZScoreReversionConfig) -> Self {
        Self {
            config,
            state: HashMap::new(),
        }
    }
}

impl Strategy for ZScoreReversion {
    fn name(&self) -> &str {
        "zscore_reversion"
    }

    fn on_tick(&mut self, tick: &Tick, portfolio: &PortfolioSnapshot) -> anyhow::Result<Vec<Order>> {
        let indicator = self
            .state
            .entry(tick.symbol.clone())
            .or_insert_with(|| ZScore::new(self.config.lookback));
        let Some(z) = indicator.update(tick.price) else {
            return Ok(Vec::new());
        };

        let qty = portfolio.position_quantity(&tick.symbol);
        let mut orders = Vec::new();

        if qty > Decimal::ZERO && z.abs() <= self.config.exit_threshold {
            orders.push(Order::market(self.name(), &tick.symbol, Side::Sell, qty, TimeInForce::Day));
        } else if qty < Decimal::ZERO && z.abs() <= self.config.exit_threshold {
            orders.push(Order::market(self.name(), &tick.symbol, Side::Buy, qty.abs(), TimeInForce::Day));
        } else if entry_allowed(qty) && z <= -self.config.entry_threshold {
            let size = size_order(self.config.position_size, tick.price, self.config.max_position);
            if size > Decimal::ZERO {
                orders.push(Order::market(self.name(), &tick.symbol, Side::Buy, size, TimeInForce::Day));
            }
        } else if self.config.enable_shorting && qty >= Decimal::ZERO && z >= self.config.entry_threshold {
            let size = size_order(self.config.position_size, tick.price, self.config.max_position);
            if size > Decimal::ZERO {
                orders.push(Order::market(self.name(), &tick.symbol, Side::Sell, size, TimeInForce::Day));
            }
        }
        Ok(orders)
    }

    fn warmup_done(&self, symbol: &str) -> bool {
        self.state.get(symbol).map(|z| z.is_ready()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_zscore_parameters() {
        let config = ZScoreReversionConfig::default();
        assert_eq!(config.lookback, 20);
        assert_eq!(config.entry_threshold, 2.0);
        assert!(config.enable_shorting);
    }
}
