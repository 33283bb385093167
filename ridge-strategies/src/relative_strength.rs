//! Relative strength rotation: rank the tracked universe by a blended
//! momentum/RSI/inverse-volatility score measured against a benchmark
//! symbol, and hold the top `top_n`.
//!
//! Grounded on `original_source/.../strategies/relative_strength.py`:
//! weighted combination of momentum, RSI, and volatility scores,
//! `rebalance_period=50`, `top_n=3`, `min_stocks=5`.

use ridge_core::indicators::Rsi;
use ridge_core::order::{Order, Side, TimeInForce};
use ridge_core::strategy::{size_order, PortfolioSnapshot, Strategy};
use ridge_core::tick::Tick;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Clone)]
pub struct RelativeStrengthConfig {
    pub benchmark_symbol: String,
    pub lookback: usize,
    pub rsi_period: usize,
    pub rebalance_period: u64,
    pub top_n: usize,
    pub min_stocks: usize,
    pub momentum_weight: f64,
    pub rsi_weight: f64,
    pub volatility_weight: f64,
    pub position_size: Decimal,
    pub max_position: Decimal,
}

impl RelativeStrengthConfig {
    pub fn new(benchmark_symbol: impl Into<String>) -> Self {
        Self {
            benchmark_symbol: benchmark_symbol.into(),
            lookback: 20,
            rsi_period: 14,
            rebalance_period: 50,
            top_n: 3,
            min_stocks: 5,
            momentum_weight: 0.5,
            rsi_weight: 0.3,
            volatility_weight: 0.2,
            position_size: dec!(10000),
            max_position: dec!(100),
        }
    }
}

struct SymbolState {
    prices: VecDeque<f64>,
    rsi: Rsi,
    last_rsi: Option<f64>,
}

pub struct RelativeStrength {
    config: RelativeStrengthConfig,
    state: HashMap<String, SymbolState>,
    benchmark_return: Option<f64>,
    held: HashSet<String>,
    global_ticks: u64,
    warm: bool,
}

impl RelativeStrength {
    pub fn new(config: RelativeStrengthConfig) -> Self {
        Self {
            config,
            state: HashMap::new(),
            benchmark_return: None,
            held: HashSet::new(),
            global_ticks: 0,
            warm: false,
        }
    }

    fn trailing_return(prices: &VecDeque<f64>) -> Option<f64> {
        let first = *prices.front()?;
        let last = *prices.back()?;
        if first == 0.0 {
            return None;
        }
        Some((last - first) / first)
    }

    fn volatility(prices: &VecDeque<f64>) -> Option<f64> {
        if prices.len() < 2 {
            return None;
        }
        let returns: Vec<f64> = prices.iter().zip(prices.iter().skip(1)).map(|(a, b)| (b - a) / a.max(1e-9)).collect();
        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / returns.len() as f64;
        Some(variance.sqrt())
    }
}

impl Strategy for RelativeStrength {
    fn name(&self) -> &str {
        "relative_strength"
    }

    fn on_tick(&mut self, tick: &Tick, portfolio: &PortfolioSnapshot) -> anyhow::Result<Vec<Order>> {
        let price = tick.price.to_f64().unwrap_or(0.0);
        let lookback = self.config.lookback;
        let rsi_period = self.config.rsi_period;
        let symbol_state = self.state.entry(tick.symbol.clone()).or_insert_with(|| SymbolState {
            prices: VecDeque::with_capacity(lookback + 1),
            rsi: Rsi::new(rsi_period),
            last_rsi: None,
        });
        symbol_state.prices.push_back(price);
        if symbol_state.prices.len() > lookback + 1 {
            symbol_state.prices.pop_front();
        }
        if let Some(rsi) = symbol_state.rsi.update(tick.price) {
            symbol_state.last_rsi = Some(rsi);
        }

        if tick.symbol == self.config.benchmark_symbol {
            self.benchmark_return = Self::trailing_return(&symbol_state.prices);
        }

        self.global_ticks += 1;
        let eligible = self.state.len() >= self.config.min_stocks && self.benchmark_return.is_some();
        if !eligible || self.global_ticks % self.config.rebalance_period != 0 {
            return Ok(Vec::new());
        }
        let benchmark_return = self.benchmark_return.unwrap_or(0.0);

        let mut scores: Vec<(String, f64)> = self
            .state
            .iter()
            .filter(|(symbol, _)| symbol.as_str() != self.config.benchmark_symbol)
            .filter_map(|(symbol, s)| {
                let rsi = s.last_rsi?;
                let momentum = Self::trailing_return(&s.prices)? - benchmark_return;
                let volatility = Self::volatility(&s.prices).unwrap_or(0.0);
                let inverse_vol = if volatility > 0.0 { 1.0 / volatility } else { 0.0 };
                // RSI contributes its distance above the neutral midpoint,
                // normalized to roughly the same scale as a momentum return.
                let rsi_strength = (rsi - 50.0) / 50.0;
                let score = self.config.momentum_weight * momentum
                    + self.config.rsi_weight * rsi_strength
                    + self.config.volatility_weight * inverse_vol;
                Some((symbol.clone(), score))
            })
            .collect();
        if scores.len() < self.config.min_stocks {
            return Ok(Vec::new());
        }
        scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        self.warm = true;

        let top: HashSet<String> = scores.iter().take(self.config.top_n).map(|(s, _)| s.clone()).collect();
        let mut orders = Vec::new();

        for symbol in self.held.clone() {
            if !top.contains(&symbol) {
                let qty = portfolio.position_quantity(&symbol);
                if qty > Decimal::ZERO {
                    orders.push(Order::market(self.name(), &symbol, Side::Sell, qty, TimeInForce::Day));
                }
                self.held.remove(&symbol);
            }
        }
        for symbol in &top {
            if self.held.contains(symbol) {
                continue;
            }
            let Some(price) = portfolio.price(symbol) else {
                continue;
            };
            let size = size_order(self.config.position_size, price, self.config.max_position);
            if size > Decimal::ZERO {
                orders.push(Order::market(self.name(), symbol, Side::Buy, size, TimeInForce::Day));
                self.held.insert(symbol.clone());
            }
        }
        Ok(orders)
    }

    fn warmup_done(&self, symbol: &str) -> bool {
        self.warm
            && self
                .state
                .get(symbol)
                .map(|s| s.prices.len() > self.config.lookback)
                .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_relative_strength_parameters() {
        let config = RelativeStrengthConfig::new("SPY");
        assert_eq!(config.rebalance_period, 50);
        assert_eq!(config.top_n, 3);
        assert_eq!(config.min_stocks, 5);
    }
}
