//! MACD line/signal-line crossover, with an optional histogram-sign
//! variant.
//!
//! Grounded on `original_source/.../strategies/macd_strategy.py`:
//! `fast=12`, `slow=26`, `signal=9`, `signal_type` of `"crossover"` or
//! `"histogram"`.

use ridge_core::indicators::Macd;
use ridge_core::order::{Order, Side, TimeInForce};
use ridge_core::strategy::{size_order, PortfolioSnapshot, Strategy};
use ridge_core::tick::Tick;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use crate::common::{entry_allowed, exit_allowed, Signal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacdSignalType {
    /// MACD line crossing the signal line.
    Crossover,
    /// Histogram (MACD minus signal) changing sign.
    Histogram,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct MacdStrategyConfig {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
    pub signal_type: MacdSignalType,
    pub position_size: Decimal,
    pub max_position: Decimal,
}

impl Default for MacdStrategyConfig {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
            signal_type: MacdSignalType::Crossover,
            position_size: dec!(10000),
            max_position: dec!(100),
        }
    }
}

struct SymbolState {
    macd: Macd,
    signal: Signal,
}

pub struct MacdStrategy {
    config: MacdStrategyConfig,
    state: HashMap<String, SymbolState>,
}

impl MacdStrategy {
    pub fn new(config: MacdStrategyConfig) -> Self {
        Self {
            config,
            state: HashMap::new(),
        }
    }
}

impl Strategy for MacdStrategy {
    fn name(&self) -> &str {
        "macd_strategy"
    }

    fn on_tick(&mut self, tick: &Tick, portfolio: &PortfolioSnapshot) -> anyhow::Result<Vec<Order>> {
        let entry = self.state.entry(tick.symbol.clone()).or_insert_with(|| SymbolState {
            macd: Macd::new(self.config.fast_period, self.config.slow_period, self.config.signal_period),
            signal: Signal::default(),
        });
        let Some(value) = entry.macd.update(tick.price) else {
            return Ok(Vec::new());
        };

        let (bullish, bearish) = match self.config.signal_type {
            MacdSignalType::Crossover => (value.macd > value.signal, value.macd < value.signal),
            MacdSignalType::Histogram => (value.histogram > 0.0, value.histogram < 0.0),
        };

        let qty = portfolio.position_quantity(&tick.symbol);
        let mut orders = Vec::new();

        if exit_allowed(qty) && entry.signal.edge_bearish(bearish) {
            orders.push(Order::market(self.name(), &tick.symbol, Side::Sell, qty, TimeInForce::Day));
        }
        if entry_allowed(qty) && entry.signal.edge_bullish(bullish) {
            let size = size_order(self.config.position_size, tick.price, self.config.max_position);
            if size > Decimal::ZERO {
                orders.push(Order::market(self.name(), &tick.symbol, Side::Buy, size, TimeInForce::Day));
            }
        }
        Ok(orders)
    }

    fn warmup_done(&self, symbol: &str) -> bool {
        self.state.get(symbol).map(|s| s.macd.is_ready()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_macd_parameters() {
        let config = MacdStrategyConfig::default();
        assert_eq!(config.fast_period, 12);
        assert_eq!(config.slow_period, 26);
        assert_eq!(config.signal_period, 9);
    }
}
