//! Volume breakout: a price move coinciding with a volume spike well
//! above its rolling average, held for a fixed number of ticks.
//!
//! Grounded on `original_source/.../strategies/volume_breakout.py`:
//! `volume_period=20`, `volume_multiplier=2.0` (validated `> 1.0` at
//! construction), `price_momentum_period=5`, `min_price_change=0.01`,
//! `hold_periods=50`.

use ridge_core::indicators::Sma;
use ridge_core::order::{Order, Side, TimeInForce};
use ridge_core::strategy::{size_order, PortfolioSnapshot, Strategy};
use ridge_core::tick::Tick;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{HashMap, VecDeque};

use crate::common::{entry_allowed, exit_allowed};

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct VolumeBreakoutConfig {
    pub volume_period: usize,
    pub volume_multiplier: f64,
    pub price_momentum_period: usize,
    pub min_price_change: f64,
    pub hold_periods: u64,
    pub position_size: Decimal,
    pub max_position: Decimal,
}

impl Default for VolumeBreakoutConfig {
    fn default() -> Self {
        Self {
            volume_period: 20,
            volume_multiplier: 2.0,
            price_momentum_period: 5,
            min_price_change: 0.01,
            hold_periods: 50,
            position_size: dec!(10000),
            max_position: dec!(100),
        }
    }
}

struct SymbolState {
    avg_volume: Sma,
    price_window: VecDeque<f64>,
    held_since: Option<u64>,
}

pub struct VolumeBreakout {
    config: VolumeBreakoutConfig,
    state: HashMap<String, SymbolState>,
    tick_count: u64,
}

impl VolumeBreakout {
    pub fn new(config: VolumeBreakoutConfig) -> Self {
        assert!(config.volume_multiplier > 1.0, "volume_multiplier must exceed 1.0");
        Self {
            config,
            state: HashMap::new(),
            tick_count: 0,
        }
    }
}

impl Strategy for VolumeBreakout {
    fn name(&self) -> &str {
        "volume_breakout"
    }

    fn on_tick(&mut self, tick: &Tick, portfolio: &PortfolioSnapshot) -> anyhow::Result<Vec<Order>> {
        self.tick_count += 1;
        let tick_count = self.tick_count;
        let volume_period = self.config.volume_period;
        let momentum_period = self.config.price_momentum_period;
        let entry = self.state.entry(tick.symbol.clone()).or_insert_with(|| SymbolState {
            avg_volume: Sma::new(volume_period),
            price_window: VecDeque::with_capacity(momentum_period + 1),
            held_since: None,
        });

        let avg_volume = entry.avg_volume.update(tick.volume);
        let price = tick.price.to_f64().unwrap_or(0.0);
        entry.price_window.push_back(price);
        if entry.price_window.len() > momentum_period + 1 {
            entry.price_window.pop_front();
        }

        let qty = portfolio.position_quantity(&tick.symbol);
        let mut orders = Vec::new();

        if let Some(since) = entry.held_since {
            if exit_allowed(qty) && tick_count.saturating_sub(since) >= self.config.hold_periods {
                orders.push(Order::market(self.name(), &tick.symbol, Side::Sell, qty, TimeInForce::Day));
                entry.held_since = None;
            }
            return Ok(orders);
        }

        let (Some(avg_volume), Some(&first_price)) = (avg_volume, entry.price_window.front()) else {
            return Ok(orders);
        };
        if entry.price_window.len() <= momentum_period || avg_volume <= 0.0 || first_price == 0.0 {
            return Ok(orders);
        }

        let volume_ratio = tick.volume.to_f64().unwrap_or(0.0) / avg_volume;
        let price_change = (price - first_price) / first_price;

        if entry_allowed(qty)
            && volume_ratio >= self.config.volume_multiplier
            && price_change.abs() >= self.config.min_price_change
        {
            let size = size_order(self.config.position_size, tick.price, self.config.max_position);
            if size > Decimal::ZERO {
                let side = if price_change > 0.0 { Side::Buy } else { Side::Sell };
                if side == Side::Buy {
                    orders.push(Order::market(self.name(), &tick.symbol, side, size, TimeInForce::Day));
                    entry.held_since = Some(tick_count);
                }
            }
        }
        Ok(orders)
    }

    fn warmup_done(&self, symbol: &str) -> bool {
        self.state
            .get(symbol)
            .map(|s| s.avg_volume.is_ready() && s.price_window.len() > self.config.price_momentum_period)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "volume_multiplier")]
    fn rejects_multiplier_at_or_below_one() {
        VolumeBreakout::new(VolumeBreakoutConfig {
            volume_multiplier: 1.0,
            ..VolumeBreakoutConfig::default()
        });
    }

    #[test]
    fn defaults_match_classic_volume_breakout_parameters() {
        let config = VolumeBreakoutConfig::default();
        assert_eq!(config.volume_period, 20);
        assert_eq!(config.hold_periods, 50);
    }
}
