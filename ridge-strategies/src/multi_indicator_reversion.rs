//! Multi-indicator mean reversion: combine RSI and Bollinger %B into a
//! single weighted reversion score and trade its crossing of
//! entry/exit thresholds, rather than trusting either indicator alone.
//!
//! Grounded on `original_source/.../strategies/multi_indicator_reversion.py`:
//! `lookback=20`, `rsi_period=14`, `entry_score=60`, `exit_score=0`. The
//! original weights several indicators into one 0-100 "reversion
//! score"; this keeps the two clearest contributors (RSI distance from
//! 50 and Bollinger %B distance from the middle) with an even 50/50
//! weighting.

use ridge_core::indicators::{Bollinger, Rsi};
use ridge_core::order::{Order, Side, TimeInForce};
use ridge_core::strategy::{size_order, PortfolioSnapshot, Strategy};
use ridge_core::tick::Tick;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use crate::common::{entry_allowed, exit_allowed};

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct MultiIndicatorReversionConfig {
    pub lookback: usize,
    pub rsi_period: usize,
    pub entry_score: f64,
    pub exit_score: f64,
    pub position_size: Decimal,
    pub max_position: Decimal,
}

impl Default for MultiIndicatorReversionConfig {
    fn default() -> Self {
        Self {
            lookback: 20,
            rsi_period: 14,
            entry_score: 60.0,
            exit_score: 0.0,
            position_size: dec!(10000),
            max_position: dec!(100),
        }
    }
}

struct SymbolState {
    rsi: Rsi,
    bollinger: Bollinger,
}

/// A positive score favors a long entry (oversold RSI + price near or
/// below the lower Bollinger band); a low score favors flattening.
pub struct MultiIndicatorReversion {
    config: MultiIndicatorReversionConfig,
    state: HashMap<String, SymbolState>,
}

impl MultiIndicatorReversion {
    pub fn new(config: MultiIndicatorReversionConfig) -> Self {
        Self {
            config,
            state: HashMap::new(),
        }
    }
}

impl Strategy for MultiIndicatorReversion {
    fn name(&self) -> &str {
        "multi_indicator_reversion"
    }

    fn on_tick(&mut self, tick: &Tick, portfolio: &PortfolioSnapshot) -> anyhow::Result<Vec<Order>> {
        let entry = self.state.entry(tick.symbol.clone()).or_insert_with(|| SymbolState {
            rsi: Rsi::new(self.config.rsi_period),
            bollinger: Bollinger::new(self.config.lookback, 2.0),
        });
        let rsi = entry.rsi.update(tick.price);
        let bands = entry.bollinger.update(tick.price);
        let (Some(rsi), Some(bands)) = (rsi, bands) else {
            return Ok(Vec::new());
        };

        // Both sub-scores run 0-50: oversold RSI and a below-middle %B
        // each contribute up to half the combined 0-100 reversion score.
        let rsi_score = (50.0 - rsi).max(0.0);
        let percent_b_score = (0.5 - bands.percent_b).max(0.0) * 100.0;
        let score = rsi_score + percent_b_score;

        let qty = portfolio.position_quantity(&tick.symbol);
        let mut orders = Vec::new();

        if exit_allowed(qty) && score <= self.config.exit_score {
            orders.push(Order::market(self.name(), &tick.symbol, Side::Sell, qty, TimeInForce::Day));
        } else if entry_allowed(qty) && score >= self.config.entry_score {
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
            .map(|s| s.rsi.is_ready() && s.bollinger.is_ready())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_multi_indicator_parameters() {
        let config = MultiIndicatorReversionConfig::default();
        assert_eq!(config.rsi_period, 14);
        assert_eq!(config.entry_score, 60.0);
    }
}
