//! Mean reversion toward the session VWAP: buy when price sits far
//! enough below VWAP, sell on reversion back to it.
//!
//! Grounded on `original_source/.../strategies/vwap_strategy.py`:
//! `deviation_threshold=0.005`, `reset_period=0` (no periodic VWAP
//! reset), `min_samples=10` before trading begins.

use ridge_core::indicators::Vwap;
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
pub struct VwapReversionConfig {
    pub deviation_threshold: f64,
    /// `Some(n)` resets the running VWAP every `n` ticks; `None` keeps
    /// accumulating for the whole session.
    pub reset_period: Option<usize>,
    pub min_samples: usize,
    pub position_size: Decimal,
    pub max_position: Decimal,
}

impl Default for VwapReversionConfig {
    fn default() -> Self {
        Self {
            deviation_threshold: 0.005,
            reset_period: None,
            min_samples: 10,
            position_size: dec!(10000),
            max_position: dec!(100),
        }
    }
}

struct SymbolState {
    vwap: Vwap,
    samples: usize,
}

pub struct VwapReversion {
    config: VwapReversionConfig,
    state: HashMap<String, SymbolState>,
}

impl VwapReversion {
    pub fn new(config: VwapReversionConfig) -> Self {
        Self {
            config,
            state: HashMap::new(),
        }
    }
}

impl Strategy for VwapReversion {
    fn name(&self) -> &str {
        "vwap_reversion"
    }

    fn on_tick(&mut self, tick: &Tick, portfolio: &PortfolioSnapshot) -> anyhow::Result<Vec<Order>> {
        let reset_every = self.config.reset_period;
        let entry = self.state.entry(tick.symbol.clone()).or_insert_with(|| SymbolState {
            vwap: Vwap::new(reset_every),
            samples: 0,
        });
        let Some(vwap) = entry.vwap.update(tick.price, tick.volume) else {
            return Ok(Vec::new());
        };
        entry.samples += 1;
        if entry.samples < self.config.min_samples {
            return Ok(Vec::new());
        }

        let price = tick.price.to_f64().unwrap_or(0.0);
        if vwap == 0.0 {
            return Ok(Vec::new());
        }
        let deviation = (price - vwap) / vwap;

        let qty = portfolio.position_quantity(&tick.symbol);
        let mut orders = Vec::new();

        if exit_allowed(qty) && deviation >= 0.0 {
            orders.push(Order::market(self.name(), &tick.symbol, Side::Sell, qty, TimeInForce::Day));
        } else if entry_allowed(qty) && deviation <= -self.config.deviation_threshold {
            let size = size_order(self.config.position_size, tick.price, self.config.max_position);
            if size > Decimal::ZERO {
                orders.push(Order::market(self.name(), &tick.symbol, Side::Buy, size, TimeInForce::Day));
            }
        }
        Ok(orders)
    }

    fn warmup_done(&self, symbol: &str) -> bool {
        self.state
            .get(symbol)
            .map(|s| s.vwap.is_ready() && s.samples >= self.config.min_samples)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_vwap_parameters() {
        let config = VwapReversionConfig::default();
        assert_eq!(config.deviation_threshold, 0.005);
        assert_eq!(config.min_samples, 10);
    }
}
