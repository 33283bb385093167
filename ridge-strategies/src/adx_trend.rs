//! ADX/DI trend following: enter long when ADX confirms trend strength
//! and +DI leads -DI by a margin, exit when the trend weakens or DI
//! flips.
//!
//! Grounded on `original_source/.../strategies/adx_trend.py`:
//! `adx_period=14`, `adx_threshold=25`, `di_threshold=5`,
//! `enable_shorting=false`.

use ridge_core::indicators::Adx;
use ridge_core::order::{Order, Side, TimeInForce};
use ridge_core::strategy::{size_order, PortfolioSnapshot, Strategy};
use ridge_core::tick::Tick;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use crate::common::{entry_allowed, exit_allowed};

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct AdxTrendConfig {
    pub adx_period: usize,
    pub adx_threshold: f64,
    pub di_threshold: f64,
    pub enable_shorting: bool,
    pub position_size: Decimal,
    pub max_position: Decimal,
}

impl Default for AdxTrendConfig {
    fn default() -> Self {
        Self {
            adx_period: 14,
            adx_threshold: 25.0,
            di_threshold: 5.0,
            enable_shorting: false,
            position_size: dec!(10000),
            max_position: dec!(100),
        }
    }
}

pub struct AdxTrend {
    config: AdxTrendConfig,
    state: HashMap<String, Adx>,
}

impl AdxTrend {
    pub fn new(config: AdxTrendConfig) -> Self {
        Self {
            config,
            state: HashMap::new(),
        }
    }
}

impl Strategy for AdxTrend {
    fn name(&self) -> &str {
        "adx_trend"
    }

    fn on_tick(&mut self, tick: &Tick, portfolio: &PortfolioSnapshot) -> anyhow::Result<Vec<Order>> {
        let indicator = self
            .state
            .entry(tick.symbol.clone())
            .or_insert_with(|| Adx::new(self.config.adx_period));
        let Some(dm) = indicator.update(tick.price) else {
            return Ok(Vec::new());
        };
        let _ = self.config.enable_shorting;

        let trending = dm.adx >= self.config.adx_threshold;
        let bullish = trending && (dm.plus_di - dm.minus_di) >= self.config.di_threshold;
        let weak_or_flipped = !trending || dm.minus_di >= dm.plus_di;

        let qty = portfolio.position_quantity(&tick.symbol);
        let mut orders = Vec::new();

        if exit_allowed(qty) && weak_or_flipped {
            orders.push(Order::market(self.name(), &tick.symbol, Side::Sell, qty, TimeInForce::Day));
        } else if entry_allowed(qty) && bullish {
            let size = size_order(self.config.position_size, tick.price, self.config.max_position);
            if size > Decimal::ZERO {
                orders.push(Order::market(self.name(), &tick.symbol, Side::Buy, size, TimeInForce::Day));
            }
        }
        Ok(orders)
    }

    fn warmup_done(&self, symbol: &str) -> bool {
        self.state.get(symbol).map(|a| a.is_ready()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_adx_parameters() {
        let config = AdxTrendConfig::default();
        assert_eq!(config.adx_period, 14);
        assert_eq!(config.adx_threshold, 25.0);
        assert_eq!(config.di_threshold, 5.0);
    }
}
