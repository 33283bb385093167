//! Keltner channel: an EMA center line with bands at +/- an ATR
//! multiple, tradable in breakout, reversion, or squeeze mode.
//!
//! Grounded on `original_source/.../strategies/keltner_channel.py`:
//! `ema_period=20`, `atr_period=10`, `atr_multiplier=2.0`, `mode` of
//! `"breakout"`, `"reversion"`, or `"squeeze"` (squeeze buys the first
//! breakout out of a channel that had compressed below a width
//! threshold, signalling a volatility expansion).

use ridge_core::indicators::{Atr, Ema};
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
pub enum KeltnerMode {
    Breakout,
    Reversion,
    /// Requires the channel to have been "squeezed" (width below
    /// `squeeze_width_pct` of the center) before the most recent tick
    /// before a breakout counts as an entry signal.
    Squeeze,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct KeltnerChannelConfig {
    pub ema_period: usize,
    pub atr_period: usize,
    pub atr_multiplier: f64,
    pub mode: KeltnerMode,
    pub squeeze_width_pct: f64,
    pub position_size: Decimal,
    pub max_position: Decimal,
}

impl Default for KeltnerChannelConfig {
    fn default() -> Self {
        Self {
            ema_period: 20,
            atr_period: 10,
            atr_multiplier: 2.0,
            mode: KeltnerMode::Breakout,
            squeeze_width_pct: 0.02,
            position_size: dec!(10000),
            max_position: dec!(100),
        }
    }
}

struct SymbolState {
    ema: Ema,
    atr: Atr,
    was_squeezed: bool,
}

pub struct KeltnerChannel {
    config: KeltnerChannelConfig,
    state: HashMap<String, SymbolState>,
}

impl KeltnerChannel {
    pub fn new(config: KeltnerChannelConfig) -> Self {
        Self {
            config,
            state: HashMap::new(),
        }
    }
}

impl Strategy for KeltnerChannel {
    fn name(&self) -> &str {
        "keltner_channel"
    }

    fn on_tick(&mut self, tick: &Tick, portfolio: &PortfolioSnapshot) -> anyhow::Result<Vec<Order>> {
        let entry = self.state.entry(tick.symbol.clone()).or_insert_with(|| SymbolState {
            ema: Ema::new(self.config.ema_period),
            atr: Atr::new(self.config.atr_period),
            was_squeezed: false,
        });
        let center = entry.ema.update(tick.price);
        let atr = entry.atr.update(tick.price);
        let (Some(center), Some(atr)) = (center, atr) else {
            return Ok(Vec::new());
        };

        let upper = center + self.config.atr_multiplier * atr;
        let lower = center - self.config.atr_multiplier * atr;
        let price = tick.price.to_f64().unwrap_or(0.0);
        let width_pct = if center != 0.0 { (upper - lower) / center } else { 0.0 };
        let squeezed_before = entry.was_squeezed;
        entry.was_squeezed = width_pct < self.config.squeeze_width_pct;

        let (buy_signal, sell_signal) = match self.config.mode {
            KeltnerMode::Breakout => (price >= upper, price <= center),
            KeltnerMode::Reversion => (price <= lower, price >= center),
            KeltnerMode::Squeeze => (squeezed_before && price >= upper, price <= center),
        };

        let qty = portfolio.position_quantity(&tick.symbol);
        let mut orders = Vec::new();

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
        self.state
            .get(symbol)
            .map(|s| s.ema.is_ready() && s.atr.is_ready())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_keltner_parameters() {
        let config = KeltnerChannelConfig::default();
        assert_eq!(config.ema_period, 20);
        assert_eq!(config.atr_period, 10);
        assert_eq!(config.atr_multiplier, 2.0);
    }
}
