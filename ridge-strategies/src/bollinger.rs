//! Bollinger Bands in two opposite modes: reversion (fade the bands)
//! or breakout (follow a close outside them).
//!
//! Grounded on `original_source/.../strategies/bollinger_bands.py`:
//! `period=20`, `num_std_dev=2.0`, `mode` of `"breakout"` or
//! `"reversion"`, and a `band_threshold=0.001` tolerance so a price
//! sitting exactly on a band doesn't flicker the signal.

use ridge_core::indicators::Bollinger;
use ridge_core::order::{Order, Side, TimeInForce};
use ridge_core::strategy::{size_order, PortfolioSnapshot, Strategy};
use ridge_core::tick::Tick;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use crate::common::{entry_allowed, exit_allowed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BollingerMode {
    /// Buy a close below the lower band, sell a close back above the
    /// middle band (fading the extreme).
    Reversion,
    /// Buy a close above the upper band, sell a close back below the
    /// middle band (following the breakout).
    Breakout,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct BollingerConfig {
    pub period: usize,
    pub num_std_dev: f64,
    pub mode: BollingerMode,
    pub band_threshold: f64,
    pub position_size: Decimal,
    pub max_position: Decimal,
}

impl Default for BollingerConfig {
    fn default() -> Self {
        Self {
            period: 20,
            num_std_dev: 2.0,
            mode: BollingerMode::Reversion,
            band_threshold: 0.001,
            position_size: dec!(10000),
            max_position: dec!(100),
        }
    }
}

pub struct BollingerStrategy {
    config: BollingerConfig,
    state: HashMap<String, Bollinger>,
}

impl BollingerStrategy {
    pub fn new(config: BollingerConfig) -> Self {
        Self {
            config,
            state: HashMap::new(),
        }
    }
}

impl Strategy for BollingerStrategy {
    fn name(&self) -> &str {
        "bollinger"
    }

    fn on_tick(&mut self, tick: &Tick, portfolio: &PortfolioSnapshot) -> anyhow::Result<Vec<Order>> {
        let indicator = self
            .state
            .entry(tick.symbol.clone())
            .or_insert_with(|| Bollinger::new(self.config.period, self.config.num_std_dev));
        let Some(bands) = indicator.update(tick.price) else {
            return Ok(Vec::new());
        };

        let price = tick.price.to_f64().unwrap_or(0.0);
        let tol = self.config.band_threshold;
        let below_lower = price <= bands.lower * (1.0 + tol);
        let above_upper = price >= bands.upper * (1.0 - tol);
        let back_to_middle_from_below = price >= bands.middle;
        let back_to_middle_from_above = price <= bands.middle;

        let qty = portfolio.position_quantity(&tick.symbol);
        let mut orders = Vec::new();

        let (buy_signal, sell_signal) = match self.config.mode {
            BollingerMode::Reversion => (below_lower, back_to_middle_from_below),
            BollingerMode::Breakout => (above_upper, back_to_middle_from_above),
        };

        if exit_allowed(qty) && sell_signal {
            orders.push(Order::market(self.name(), &tick.symbol, Side::Sell, qty, TimeInForce::Day));
        } else if entry_allowed(qty) && buy_signal {
            let size = size_order(self.config.position_size, tick.price, self.config.max_position);
            if size > Decimal::ZERO {
                orders.push(Order::market(self.name(), &tick.symbol, Side::Buy, size, TimeInForce::Day));
            }
        }
        Ok(orders)
    }

    fn warmup_done(&self, symbol: &str) -> bool {
        self.state.get(symbol).map(|b| b.is_ready()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_bollinger_parameters() {
        let config = BollingerConfig::default();
        assert_eq!(config.period, 20);
        assert_eq!(config.num_std_dev, 2.0);
        assert_eq!(config.mode, BollingerMode::Reversion);
    }
}
