//! Mean reversion against a fixed-percentage band around an SMA —
//! deliberately simpler than [`crate::bollinger`]'s rolling-stddev
//! bands, trading a wider but static deviation instead.

use ridge_core::indicators::Sma;
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
pub struct MeanReversionBandConfig {
    pub period: usize,
    /// Fractional deviation from the SMA that triggers an entry (e.g.
    /// 0.02 for a 2% band).
    pub band_pct: f64,
    pub position_size: Decimal,
    pub max_position: Decimal,
}

impl Default for MeanReversionBandConfig {
    fn default() -> Self {
        Self {
            period: 20,
            band_pct: 0.02,
            position_size: dec!(10000),
            max_position: dec!(100),
        }
    }
}

pub struct MeanReversionBand {
    config: MeanReversionBandConfig,
    state: HashMap<String, Sma>,
}

impl MeanReversionBand {
    pub fn new(config: MeanReversionBandConfig) -> Self {
        Self {
            config,
            state: HashMap::new(),
        }
    }
}

impl Strategy for MeanReversionBand {
    fn name(&self) -> &str {
        "mean_reversion_band"
    }

    fn on_tick(&mut self, tick: &Tick, portfolio: &PortfolioSnapshot) -> anyhow::Result<Vec<Order>> {
        let sma = self
            .state
            .entry(tick.symbol.clone())
            .or_insert_with(|| Sma::new(self.config.period));
        let Some(mean) = sma.update(tick.price) else {
            return Ok(Vec::new());
        };
        if mean == 0.0 {
            return Ok(Vec::new());
        }

        let price = tick.price.to_f64().unwrap_or(0.0);
        let deviation = (price - mean) / mean;

        let qty = portfolio.position_quantity(&tick.symbol);
        let mut orders = Vec::new();

        if exit_allowed(qty) && deviation >= 0.0 {
            orders.push(Order::market(self.name(), &tick.symbol, Side::Sell, qty, TimeInForce::Day));
        } else if entry_allowed(qty) && deviation <= -self.config.band_pct {
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
    fn defaults_use_a_two_percent_band() {
        let config = MeanReversionBandConfig::default();
        assert_eq!(config.band_pct, 0.02);
    }
}
