//! Adaptive portfolio meta-strategy: N-way fan-out, per-strategy P&L
//! attribution, periodic performance-weighted rebalancing (spec §4.7).
//!
//! Ported from `original_source/.../strategies/adaptive_portfolio.py`'s
//! `AdaptivePortfolioStrategy` — the rebalance cadence, the three
//! scoring methods, the min/max clamp + renormalize step, and the
//! attribute-on-fill bookkeeping are numerically identical. Implements
//! [`crate::strategy::Strategy`] itself so the driver can treat it as
//! just another strategy.

use crate::order::{Order, Side};
use crate::strategy::{PortfolioSnapshot, Strategy};
use crate::tick::Tick;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationMethod {
    Pnl,
    Sharpe,
    WinRate,
}

impl AllocationMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pnl" => Some(Self::Pnl),
            "sharpe" => Some(Self::Sharpe),
            "win_rate" => Some(Self::WinRate),
            _ => None,
        }
    }
}

/// Per-sub-strategy performance record (spec §3).
#[derive(Debug, Clone)]
struct StrategyPerformance {
    total_pnl: f64,
    recent_pnl: f64,
    trade_count: u64,
    wins: u64,
    losses: u64,
    current_allocation: f64,
    target_allocation: f64,
    entry_prices: HashMap<String, f64>,
    open_qty: HashMap<String, f64>,
    pnl_history: std::collections::VecDeque<f64>,
}

impl StrategyPerformance {
    fn new(initial_allocation: f64, lookback: usize) -> Self {
        Self {
            total_pnl: 0.0,
            recent_pnl: 0.0,
            trade_count: 0,
            wins: 0,
            losses: 0,
            current_allocation: initial_allocation,
            target_allocation: initial_allocation,
            entry_prices: HashMap::new(),
            open_qty: HashMap::new(),
            pnl_history: std::collections::VecDeque::with_capacity(lookback),
        }
    }

    fn win_rate(&self) -> f64 {
        if self.trade_count == 0 {
            0.0
        } else {
            self.wins as f64 / self.trade_count as f64
        }
    }

    fn sharpe(&self) -> f64 {
        if self.pnl_history.len() < 10 {
            return 0.0;
        }
        let n = self.pnl_history.len() as f64;
        let mean = self.pnl_history.iter().sum::<f64>() / n;
        if mean == 0.0 {
            return 0.0;
        }
        let variance = self.pnl_history.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();
        if std_dev == 0.0 {
            0.0
        } else {
            mean / std_dev
        }
    }
}

pub struct AdaptiveConfig {
    pub rebalance_period: u64,
    pub min_allocation: f64,
    pub max_allocation: f64,
    pub performance_lookback: usize,
    pub allocation_method: AllocationMethod,
}

impl From<&crate::config::AdaptiveConfig> for AdaptiveConfig {
    fn from(cfg: &crate::config::AdaptiveConfig) -> Self {
        Self {
            rebalance_period: cfg.rebalance_period,
            min_allocation: cfg.min_allocation,
            max_allocation: cfg.max_allocation,
            performance_lookback: cfg.performance_lookback,
            allocation_method: AllocationMethod::parse(&cfg.allocation_method).unwrap_or(AllocationMethod::Pnl),
        }
    }
}

/// Wraps N sub-strategies, running them against the same tick stream
/// while periodically reallocating capital between them by performance.
pub struct AdaptivePortfolio {
    config: AdaptiveConfig,
    sub_strategies: Vec<Box<dyn Strategy>>,
    performance: Vec<StrategyPerformance>,
    global_ticks: u64,
    last_rebalance_ticks: u64,
    current_prices: HashMap<String, Decimal>,
}

impl AdaptivePortfolio {
    pub fn new(config: AdaptiveConfig, sub_strategies: Vec<Box<dyn Strategy>>) -> Self {
        let n = sub_strategies.len().max(1);
        let equal_weight = 1.0 / n as f64;
        let lookback = config.performance_lookback;
        let performance = sub_strategies
            .iter()
            .map(|_| StrategyPerformance::new(equal_weight, lookback))
            .collect();
        Self {
            config,
            sub_strategies,
            performance,
            global_ticks: 0,
            last_rebalance_ticks: 0,
            current_prices: HashMap::new(),
        }
    }

    fn unrealized_pnl(&self, idx: usize) -> f64 {
        let perf = &self.performance[idx];
        perf.open_qty
            .iter()
            .filter(|(_, &qty)| qty != 0.0)
            .filter_map(|(symbol, &qty)| {
                let entry = *perf.entry_prices.get(symbol)?;
                let current = self
                    .current_prices
                    .get(symbol)
                    .and_then(|d| d.to_f64())
                    .unwrap_or(entry);
                Some((current - entry) * qty)
            })
            .sum()
    }

    fn scores(&self) -> Vec<f64> {
        (0..self.performance.len())
            .map(|i| match self.config.allocation_method {
                AllocationMethod::Pnl => self.performance[i].recent_pnl.max(0.0),
                AllocationMethod::Sharpe => self.performance[i].sharpe().max(0.0),
                AllocationMethod::WinRate => self.performance[i].win_rate(),
            })
            .collect()
    }

    fn compute_allocations(&self) -> Vec<f64> {
        let n = self.performance.len();
        if n == 0 {
            return Vec::new();
        }
        let scores = self.scores();
        let total: f64 = scores.iter().sum();

        if total <= 0.0 {
            return vec![1.0 / n as f64; n];
        }

        let raw: Vec<f64> = scores.iter().map(|s| s / total).collect();
        let clamped: Vec<f64> = raw
            .iter()
            .map(|a| a.max(self.config.min_allocation).min(self.config.max_allocation))
            .collect();
        let clamped_total: f64 = clamped.iter().sum();
        if clamped_total == 0.0 {
            return vec![1.0 / n as f64; n];
        }
        clamped.iter().map(|a| a / clamped_total).collect()
    }

    fn rebalance(&mut self) {
        info!(tick = self.global_ticks, "rebalancing adaptive portfolio");

        for i in 0..self.performance.len() {
            let upnl = self.unrealized_pnl(i);
            self.performance[i].recent_pnl += upnl;
        }

        let new_allocations = self.compute_allocations();

        for (i, perf) in self.performance.iter_mut().enumerate() {
            debug!(
                strategy = self.sub_strategies[i].name(),
                recent_pnl = perf.recent_pnl,
                old_pct = perf.target_allocation * 100.0,
                new_pct = new_allocations[i] * 100.0,
                "strategy reallocated"
            );
            perf.current_allocation = perf.target_allocation;
            perf.target_allocation = new_allocations[i];
            perf.recent_pnl = 0.0;
        }

        self.last_rebalance_ticks = self.global_ticks;
    }

    /// Attribute a (possibly scaled) order's notional to sub-strategy
    /// `idx`'s open-position book, realizing P&L on closing trades.
    fn attribute(&mut self, idx: usize, order: &Order, order_price: Decimal) {
        let price_f = order_price.to_f64().unwrap_or(0.0);
        let qty_f = order.quantity.to_f64().unwrap_or(0.0);
        let perf = &mut self.performance[idx];

        match order.side {
            Side::Buy => {
                perf.entry_prices.insert(order.symbol.clone(), price_f);
                *perf.open_qty.entry(order.symbol.clone()).or_insert(0.0) += qty_f;
            }
            Side::Sell => {
                if let Some(&entry_price) = perf.entry_prices.get(&order.symbol) {
                    let open = perf.open_qty.get(&order.symbol).copied().unwrap_or(0.0);
                    let closing_qty = qty_f.min(open);
                    let pnl = (price_f - entry_price) * closing_qty;

                    perf.total_pnl += pnl;
                    perf.recent_pnl += pnl;
                    perf.trade_count += 1;
                    if pnl > 0.0 {
                        perf.wins += 1;
                    } else {
                        perf.losses += 1;
                    }
                    if perf.pnl_history.len() == perf.pnl_history.capacity().max(1) {
                        perf.pnl_history.pop_front();
                    }
                    perf.pnl_history.push_back(pnl);
                }
                *perf.open_qty.entry(order.symbol.clone()).or_insert(0.0) -= qty_f;
            }
        }
    }
}

impl Strategy for AdaptivePortfolio {
    fn name(&self) -> &str {
        "adaptive_portfolio"
    }

    fn warmup_done(&self, symbol: &str) -> bool {
        self.sub_strategies.iter().any(|s| s.warmup_done(symbol))
    }

    fn on_tick(&mut self, tick: &Tick, portfolio: &PortfolioSnapshot) -> anyhow::Result<Vec<Order>> {
        if tick.price <= Decimal::ZERO {
            return Ok(Vec::new());
        }

        self.current_prices.insert(tick.symbol.clone(), tick.price);
        self.global_ticks += 1;

        if self.global_ticks - self.last_rebalance_ticks >= self.config.rebalance_period {
            self.rebalance();
        }

        let available_capital = portfolio.total_value();
        let mut all_orders = Vec::new();

        for idx in 0..self.sub_strategies.len() {
            let strategy_orders = match self.sub_strategies[idx].on_tick(tick, portfolio) {
                Ok(orders) => orders,
                Err(err) => {
                    warn!(strategy = self.sub_strategies[idx].name(), %err, "sub-strategy on_tick failed");
                    continue;
                }
            };
            if strategy_orders.is_empty() {
                continue;
            }

            let allocation = self.performance[idx].target_allocation;
            let allocation_decimal = Decimal::try_from(allocation).unwrap_or(Decimal::ZERO);
            let strategy_capital = available_capital * allocation_decimal;
            let max_value = strategy_capital * Decimal::new(9, 1);

            for mut order in strategy_orders {
                let order_price = portfolio.price(&order.symbol).unwrap_or(tick.price);
                let order_value = order.quantity * order_price;

                if order_value > max_value {
                    if order_price <= Decimal::ZERO {
                        continue;
                    }
                    let scaled_qty = (max_value / order_price).floor();
                    if scaled_qty <= Decimal::ZERO {
                        warn!(
                            strategy = self.sub_strategies[idx].name(),
                            "order scaled to zero shares, dropped"
                        );
                        continue;
                    }
                    order.quantity = scaled_qty;
                }

                self.attribute(idx, &order, order_price);
                all_orders.push(order);
            }
        }

        Ok(all_orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::TimeInForce;
    use crate::portfolio::Portfolio;
    use rust_decimal_macros::dec;
    use std::time::SystemTime;

    struct AlwaysBuy {
        symbol: String,
        fired: bool,
    }

    impl Strategy for AlwaysBuy {
        fn name(&self) -> &str {
            "always_buy"
        }
        fn warmup_done(&self, _symbol: &str) -> bool {
            true
        }
        fn on_tick(&mut self, tick: &Tick, _portfolio: &PortfolioSnapshot) -> anyhow::Result<Vec<Order>> {
            if self.fired {
                return Ok(Vec::new());
            }
            self.fired = true;
            Ok(vec![Order::market("always_buy", self.symbol.clone(), Side::Buy, dec!(1000), TimeInForce::Day)])
        }
    }

    fn tick(symbol: &str, price: Decimal) -> Tick {
        Tick::new(SystemTime::now(), symbol, price, dec!(100)).unwrap()
    }

    #[test]
    fn orders_are_scaled_down_to_allocation() {
        let config = AdaptiveConfig {
            rebalance_period: 100,
            min_allocation: 0.05,
            max_allocation: 0.40,
            performance_lookback: 50,
            allocation_method: AllocationMethod::Pnl,
        };
        let sub = Box::new(AlwaysBuy { symbol: "AAPL".into(), fired: false });
        let mut meta = AdaptivePortfolio::new(config, vec![sub]);

        let pf = Portfolio::new(dec!(100_000));
        let mut prices = HashMap::new();
        prices.insert("AAPL".to_string(), dec!(100));
        let snapshot = PortfolioSnapshot::new(&pf, &prices);

        let orders = meta.on_tick(&tick("AAPL", dec!(100)), &snapshot).unwrap();
        assert_eq!(orders.len(), 1);
        // single strategy gets 100% allocation, 90% of 100_000 / 100 = 900
        assert_eq!(orders[0].quantity, dec!(900));
    }

    #[test]
    fn degenerate_scores_fall_back_to_equal_weight() {
        let config = AdaptiveConfig {
            rebalance_period: 1,
            min_allocation: 0.05,
            max_allocation: 0.40,
            performance_lookback: 50,
            allocation_method: AllocationMethod::Pnl,
        };
        let subs: Vec<Box<dyn Strategy>> = vec![
            Box::new(AlwaysBuy { symbol: "AAPL".into(), fired: true }),
            Box::new(AlwaysBuy { symbol: "MSFT".into(), fired: true }),
        ];
        let mut meta = AdaptivePortfolio::new(config, subs);
        let pf = Portfolio::new(dec!(100_000));
        let prices = HashMap::new();
        let snapshot = PortfolioSnapshot::new(&pf, &prices);
        meta.on_tick(&tick("AAPL", dec!(100)), &snapshot).unwrap();
        meta.rebalance();
        assert!((meta.performance[0].target_allocation - 0.5).abs() < 1e-9);
        assert!((meta.performance[1].target_allocation - 0.5).abs() < 1e-9);
    }
}
