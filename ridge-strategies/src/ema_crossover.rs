//! Exponential moving-average crossover, the EMA-smoothed counterpart
//! to [`crate::sma_crossover`]: reacts faster to recent price because
//! EMA weights decay geometrically rather than over a flat window.

use ridge_core::indicators::Ema;
use ridge_core::order::{Order, Side, TimeInForce};
use ridge_core::strategy::{size_order, PortfolioSnapshot, Strategy};
use ridge_core::tick::Tick;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use crate::common::{entry_allowed, exit_allowed, Signal};

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct EmaCrossoverConfig {
    pub short_period: usize,
    pub long_period: usize,
    pub position_size: Decimal,
    pub max_position: Decimal,
}

impl Default for EmaCrossoverConfig {
    fn default() -> Self {
        Self {
            short_period: 12,
            long_period: 26,
            position_size: dec!(10000),
            max_position: dec!(100),
        }
    }
}

struct SymbolState {
    short: Ema,
    long: Ema,
    signal: Signal,
}

pub struct EmaCrossover {
    config: EmaCrossoverConfig,
    state: HashMap<String, SymbolState>,
}

impl EmaCrossover {
    pub fn new(config: EmaCrossoverConfig) -> Self {
        Self {
            config,
            state: HashMap::new(),
        }
    }
}

impl Strategy for EmaCrossover {
    fn name(&self) -> &str {
        "ema_crossover"
    }

    fn on_tick(&mut self, tick: &Tick, portfolio: &PortfolioSnapshot) -> anyhow::Result<Vec<Order>> {
        let entry = self.state.entry(tick.symbol.clone()).or_insert_with(|| SymbolState {
            short: Ema::new(self.config.short_period),
            long: Ema::new(self.config.long_period),
            signal: Signal::default(),
        });
        let short = entry.short.update(tick.price);
        let long = entry.long.update(tick.price);
        let (Some(short), Some(long)) = (short, long) else {
            return Ok(Vec::new());
        };

        let qty = portfolio.position_quantity(&tick.symbol);
        let mut orders = Vec::new();

        if exit_allowed(qty) && entry.signal.edge_bearish(short < long) {
            orders.push(Order::market(self.name(), &tick.symbol, Side::Sell, qty, TimeInForce::Day));
        }
        if entry_allowed(qty) && entry.signal.edge_bullish(short > long) {
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
            .map(|s| s.short.is_ready() && s.long.is_ready())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_periods_match_classic_macd_legs() {
        let config = EmaCrossoverConfig::default();
        assert_eq!(config.short_period, 12);
        assert_eq!(config.long_period, 26);
    }
}
