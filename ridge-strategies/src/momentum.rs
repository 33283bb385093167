//! Lookback-window percentage-change momentum, folding together the
//! two near-identical strategies found in the original source.
//!
//! Grounded on `original_source/.../strategies/momentum.py`
//! (`lookback=20`, `threshold=0.01`) and `rate_of_change.py`
//! (`lookback=12`, `entry_threshold=2.0`, `exit_threshold=0.0`,
//! `enable_shorting`, optional smoothing) — both compute the same
//! trailing percentage change over a window and trade its crossing of
//! a threshold, differing only in parameter names and units (rate of
//! change expresses its threshold in percentage points rather than a
//! fraction). This strategy exposes both as symmetric entry/exit
//! thresholds in fractional terms.

use ridge_core::indicators::Sma;
use ridge_core::order::{Order, Side, TimeInForce};
use ridge_core::strategy::{size_order, PortfolioSnapshot, Strategy};
use ridge_core::tick::Tick;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{HashMap, VecDeque};

use crate::common::entry_allowed;

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct MomentumConfig {
    pub lookback: usize,
    pub entry_threshold: f64,
    pub exit_threshold: f64,
    pub enable_shorting: bool,
    /// Smooth the raw percentage change with a short SMA before
    /// comparing against thresholds; `None` disables smoothing.
    pub smoothing_period: Option<usize>,
    pub position_size: Decimal,
    pub max_position: Decimal,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            lookback: 20,
            entry_threshold: 0.01,
            exit_threshold: 0.0,
            enable_shorting: false,
            smoothing_period: None,
            position_size: dec!(10000),
            max_position: dec!(100),
        }
    }
}

struct SymbolState {
    window: VecDeque<f64>,
    smoother: Option<Sma>,
}

pub struct Momentum {
    config: MomentumConfig,
    state: HashMap<String, SymbolState>,
}

impl Momentum {
    pub fn new(config: MomentumConfig) -> Self {
        Self {
            config,
            state: HashMap::new(),
        }
    }
}

impl Strategy for Momentum {
    fn name(&self) -> &str {
        "momentum"
    }

    fn on_tick(&mut self, tick: &Tick, portfolio: &PortfolioSnapshot) -> anyhow::Result<Vec<Order>> {
        use rust_decimal::prelude::ToPrimitive;
        let price = tick.price.to_f64().unwrap_or(0.0);
        let lookback = self.config.lookback;
        let smoothing = self.config.smoothing_period;
        let entry = self.state.entry(tick.symbol.clone()).or_insert_with(|| SymbolState {
            window: VecDeque::with_capacity(lookback + 1),
            smoother: smoothing.map(Sma::new),
        });
        entry.window.push_back(price);
        if entry.window.len() > lookback + 1 {
            entry.window.pop_front();
        }
        if entry.window.len() <= lookback {
            return Ok(Vec::new());
        }
        let first = *entry.window.front().unwrap();
        let last = *entry.window.back().unwrap();
        if first == 0.0 {
            return Ok(Vec::new());
        }
        let raw_change = (last - first) / first;
        let change = match &mut entry.smoother {
            Some(sma) => match sma.update(Decimal::try_from(raw_change).unwrap_or(Decimal::ZERO)) {
                Some(smoothed) => smoothed,
                None => return Ok(Vec::new()),
            },
            None => raw_change,
        };

        let qty = portfolio.position_quantity(&tick.symbol);
        let mut orders = Vec::new();

        if qty > Decimal::ZERO && change.abs() <= self.config.exit_threshold {
            orders.push(Order::market(self.name(), &tick.symbol, Side::Sell, qty, TimeInForce::Day));
        } else if qty < Decimal::ZERO && change.abs() <= self.config.exit_threshold {
            orders.push(Order::market(self.name(), &tick.symbol, Side::Buy, qty.abs(), TimeInForce::Day));
        } else if entry_allowed(qty) && change >= self.config.entry_threshold {
            let size = size_order(self.config.position_size, tick.price, self.config.max_position);
            if size > Decimal::ZERO {
                orders.push(Order::market(self.name(), &tick.symbol, Side::Buy, size, TimeInForce::Day));
            }
        } else if self.config.enable_shorting && qty >= Decimal::ZERO && change <= -self.config.entry_threshold {
            let size = size_order(self.config.position_size, tick.price, self.config.max_position);
            if size > Decimal::ZERO {
                orders.push(Order::market(self.name(), &tick.symbol, Side::Sell, size, TimeInForce::Day));
            }
        }
        Ok(orders)
    }

    fn warmup_done(&self, symbol: &str) -> bool {
        self.state
            .get(symbol)
            .map(|s| s.window.len() > self.config.lookback)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_momentum_parameters() {
        let config = MomentumConfig::default();
        assert_eq!(config.lookback, 20);
        assert_eq!(config.entry_threshold, 0.01);
    }
}
