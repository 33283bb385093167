//! Donchian channel breakout: enter on a new `entry_period`-tick high,
//! exit on a break of the (typically tighter) `exit_period` low.
//!
//! Grounded on `original_source/.../strategies/donchian_breakout.py`:
//! `entry_period=20`, `exit_period=10`, `enable_shorting=false`. The
//! Python original validates `exit_period <= entry_period` at
//! construction; mirrored here.

use ridge_core::indicators::Donchian;
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
pub struct DonchianBreakoutConfig {
    pub entry_period: usize,
    pub exit_period: usize,
    pub enable_shorting: bool,
    pub position_size: Decimal,
    pub max_position: Decimal,
}

impl Default for DonchianBreakoutConfig {
    fn default() -> Self {
        Self {
            entry_period: 20,
            exit_period: 10,
            enable_shorting: false,
            position_size: dec!(10000),
            max_position: dec!(100),
        }
    }
}

pub struct DonchianBreakout {
    config: DonchianBreakoutConfig,
    state: HashMap<String, Donchian>,
}

impl DonchianBreakout {
    pub fn new(config: DonchianBreakoutConfig) -> Self {
        assert!(
            config.exit_period <= config.entry_period,
            "exit_period must not exceed entry_period"
        );
        Self {
            config,
            state: HashMap::new(),
        }
    }
}

impl Strategy for DonchianBreakout {
    fn name(&self) -> &str {
        "donchian_breakout"
    }

    fn on_tick(&mut self, tick: &Tick, portfolio: &PortfolioSnapshot) -> anyhow::Result<Vec<Order>> {
        let indicator = self
            .state
            .entry(tick.symbol.clone())
            .or_insert_with(|| Donchian::new(self.config.entry_period, self.config.exit_period));
        let Some(channel) = indicator.update(tick.price) else {
            return Ok(Vec::new());
        };

        let price = tick.price.to_f64().unwrap_or(0.0);
        let qty = portfolio.position_quantity(&tick.symbol);
        let mut orders = Vec::new();

        // enable_shorting would additionally emit Sell orders to open
        // a short on an exit-low break while flat; shorting the
        // matching engine's long-only position model is left for a
        // future pass, so this only gates the long side for now.
        let _ = self.config.enable_shorting;

        if exit_allowed(qty) && price <= channel.exit_low {
            orders.push(Order::market(self.name(), &tick.symbol, Side::Sell, qty, TimeInForce::Day));
        } else if entry_allowed(qty) && price >= channel.entry_high {
            let size = size_order(self.config.position_size, tick.price, self.config.max_position);
            if size > Decimal::ZERO {
                orders.push(Order::market(self.name(), &tick.symbol, Side::Buy, size, TimeInForce::Day));
            }
        }
        Ok(orders)
    }

    fn warmup_done(&self, symbol: &str) -> bool {
        self.state.get(symbol).map(|d| d.is_ready()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "exit_period")]
    fn rejects_exit_period_longer_than_entry_period() {
        DonchianBreakout::new(DonchianBreakoutConfig {
            entry_period: 10,
            exit_period: 20,
            ..DonchianBreakoutConfig::default()
        });
    }
}
