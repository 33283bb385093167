//! Backtest and live driver loops (spec §4.8).
//!
//! The backtest loop's tick → price-update → strategy → order-pipeline →
//! equity-recording sequence is ported from
//! `original_source/.../backtesting/engine.py::BacktestEngine.run`; the
//! live loop's stop-check-before-signal-generation ordering and the
//! circuit-breaker short-circuit are ported from
//! `original_source/.../live/live_engine.py::LiveTradingEngine._on_market_data`.
//! The `Arc<AtomicBool>` shutdown flag plus `ctrlc::set_handler` wiring
//! follows `bog-core/src/engine/generic.rs::Engine::run`.

use crate::brokerage::{Brokerage, BrokerageEvent};
use crate::matching::MatchingEngine;
use crate::order::{Order, OrderStatus, Side};
use crate::order_manager::OrderManager;
use crate::portfolio::{Portfolio, PerformanceMetrics};
use crate::risk::RiskManager;
use crate::strategy::{FaultTracker, PortfolioSnapshot, Strategy};
use crate::tick::{Tick, TickSource};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Strategies that fail this many consecutive calls raise a critical
/// warning (spec §4.2) but the driver keeps running.
pub const DEFAULT_FAULT_THRESHOLD: u32 = 10;

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub total_ticks: u64,
    pub orders_submitted: u64,
    pub orders_rejected: u64,
    pub orders_cancelled: u64,
    pub performance: PerformanceMetrics,
}

/// Orchestrates a single strategy (or an [`crate::adaptive::AdaptivePortfolio`]
/// wearing the `Strategy` trait) against a tick source and a simulated
/// matching engine.
pub struct BacktestDriver {
    order_manager: OrderManager,
    matching_engine: MatchingEngine,
    risk_manager: RiskManager,
    portfolio: Portfolio,
    current_prices: HashMap<String, Decimal>,
    fault_tracker: FaultTracker,
    fault_threshold: u32,
    equity_record_every: u64,
    max_ticks: Option<u64>,
    tick_count: u64,
    orders_submitted: u64,
    orders_rejected: u64,
    orders_cancelled: u64,
}

impl BacktestDriver {
    pub fn new(
        initial_cash: Decimal,
        order_manager: OrderManager,
        matching_engine: MatchingEngine,
        risk_manager: RiskManager,
        equity_record_every: u64,
        max_ticks: Option<u64>,
    ) -> Self {
        Self {
            order_manager,
            matching_engine,
            risk_manager,
            portfolio: Portfolio::new(initial_cash),
            current_prices: HashMap::new(),
            fault_tracker: FaultTracker::new(),
            fault_threshold: DEFAULT_FAULT_THRESHOLD,
            equity_record_every,
            max_ticks,
            tick_count: 0,
            orders_submitted: 0,
            orders_rejected: 0,
            orders_cancelled: 0,
        }
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    /// Drive `source` through `strategy` until exhaustion or `max_ticks`.
    pub fn run(&mut self, source: &mut dyn TickSource, strategy: &mut dyn Strategy) -> anyhow::Result<BacktestResult> {
        info!("starting backtest");

        while let Some(tick) = source.next_tick() {
            self.process_tick(&tick, strategy)?;

            if let Some(max) = self.max_ticks {
                if self.tick_count >= max {
                    info!(max_ticks = max, "reached max_ticks limit");
                    break;
                }
            }
        }

        self.portfolio.record_equity(std::time::SystemTime::now());

        info!(
            ticks = self.tick_count,
            submitted = self.orders_submitted,
            rejected = self.orders_rejected,
            "backtest complete"
        );

        Ok(BacktestResult {
            total_ticks: self.tick_count,
            orders_submitted: self.orders_submitted,
            orders_rejected: self.orders_rejected,
            orders_cancelled: self.orders_cancelled,
            performance: self.portfolio.performance_metrics(),
        })
    }

    fn process_tick(&mut self, tick: &Tick, strategy: &mut dyn Strategy) -> anyhow::Result<()> {
        self.current_prices.insert(tick.symbol.clone(), tick.price);
        self.portfolio.update_prices(&self.current_prices);
        self.tick_count += 1;

        let portfolio_value = self.portfolio.total_value();
        let open_symbols: Vec<String> = self.portfolio.positions.keys().cloned().collect();
        let stop_orders = self.risk_manager.check(&self.current_prices, portfolio_value, &open_symbols);
        for mut order in stop_orders {
            self.execute_risk_forced(&mut order);
        }

        let snapshot = PortfolioSnapshot::new(&self.portfolio, &self.current_prices);
        let strategy_orders = match strategy.on_tick(tick, &snapshot) {
            Ok(orders) => {
                self.fault_tracker.record_success(strategy.name());
                orders
            }
            Err(err) => {
                let count = self.fault_tracker.record_failure(strategy.name());
                warn!(strategy = strategy.name(), %err, consecutive_failures = count, "strategy on_tick failed");
                if count >= self.fault_threshold {
                    error!(strategy = strategy.name(), consecutive_failures = count, "strategy exceeded fault threshold");
                }
                Vec::new()
            }
        };

        for mut order in strategy_orders {
            self.submit_order(&mut order);
        }

        if self.tick_count % self.equity_record_every == 0 {
            self.portfolio.record_equity(tick.timestamp);
        }

        Ok(())
    }

    /// Submit a strategy-originated order through the full validation
    /// pipeline (spec §4.3 → §4.4 → §4.5).
    fn submit_order(&mut self, order: &mut Order) {
        self.orders_submitted += 1;
        if let Err(reason) = self.order_manager.validate(order, &self.portfolio, &self.current_prices) {
            info!(symbol = %order.symbol, %reason, "order rejected by order manager");
            self.orders_rejected += 1;
            return;
        }
        self.order_manager.record_order(order);
        self.execute(order);
    }

    /// Submit a risk-manager-originated exit order, bypassing the order
    /// manager's rate/capital checks but still routed through the
    /// matching engine (spec §4.6).
    fn execute_risk_forced(&mut self, order: &mut Order) {
        self.orders_submitted += 1;
        self.execute(order);
    }

    fn execute(&mut self, order: &mut Order) {
        let Some(&market_price) = self.current_prices.get(&order.symbol) else {
            warn!(symbol = %order.symbol, "no current price for order, cancelling");
            order.cancel();
            self.orders_cancelled += 1;
            return;
        };

        let (_, trade) = self.matching_engine.execute(order, market_price);
        let Some(trade) = trade else {
            self.orders_cancelled += 1;
            return;
        };

        let prev_qty = self
            .portfolio
            .positions
            .get(&trade.symbol)
            .map(|p| p.quantity)
            .unwrap_or(Decimal::ZERO);

        let trade_symbol = trade.symbol.clone();
        let trade_price = trade.price;
        self.portfolio.process_trade(trade);

        let new_qty = self
            .portfolio
            .positions
            .get(&trade_symbol)
            .map(|p| p.quantity)
            .unwrap_or(Decimal::ZERO);

        if prev_qty.is_zero() && !new_qty.is_zero() {
            self.risk_manager
                .add_position_stop(&trade_symbol, trade_price, new_qty.abs(), new_qty > Decimal::ZERO);
        } else if new_qty.is_zero() && !prev_qty.is_zero() {
            self.risk_manager.remove_position_stop(&trade_symbol);
        }
    }
}

/// Live driver: identical pipeline ordering to the backtest driver, but
/// execution goes through a [`Brokerage`] adapter whose fills arrive
/// asynchronously via `poll_events`, and ticks arrive from an external
/// push source rather than EOF-terminated replay (spec §4.8).
pub struct LiveDriver {
    order_manager: OrderManager,
    risk_manager: RiskManager,
    portfolio: Portfolio,
    current_prices: HashMap<String, Decimal>,
    fault_tracker: FaultTracker,
    fault_threshold: u32,
    shutdown: Arc<AtomicBool>,
    pending_orders: HashMap<crate::order::OrderId, Order>,
}

impl LiveDriver {
    pub fn new(initial_cash: Decimal, order_manager: OrderManager, risk_manager: RiskManager) -> Self {
        Self {
            order_manager,
            risk_manager,
            portfolio: Portfolio::new(initial_cash),
            current_prices: HashMap::new(),
            fault_tracker: FaultTracker::new(),
            fault_threshold: DEFAULT_FAULT_THRESHOLD,
            shutdown: Arc::new(AtomicBool::new(false)),
            pending_orders: HashMap::new(),
        }
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    /// Install a SIGINT/SIGTERM handler that flips the shutdown flag.
    /// Failure to install is logged and non-fatal (shutdown remains
    /// reachable programmatically).
    pub fn install_signal_handler(&self) -> anyhow::Result<()> {
        let shutdown = self.shutdown.clone();
        if let Err(err) = ctrlc::set_handler(move || {
            warn!("received shutdown signal");
            shutdown.store(true, Ordering::Release);
        }) {
            warn!(%err, "failed to install signal handler, shutdown via code only");
        }
        Ok(())
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Process one tick: stop-check first, then (unless halted) strategy
    /// signal generation, order validation, and submission.
    pub fn on_tick(&mut self, tick: &Tick, strategy: &mut dyn Strategy, broker: &mut dyn Brokerage) -> anyhow::Result<()> {
        self.current_prices.insert(tick.symbol.clone(), tick.price);
        self.portfolio.update_prices(&self.current_prices);

        let portfolio_value = self.portfolio.total_value();
        let open_symbols: Vec<String> = self.portfolio.positions.keys().cloned().collect();
        let stop_orders = self.risk_manager.check(&self.current_prices, portfolio_value, &open_symbols);
        for order in &stop_orders {
            info!(symbol = %order.symbol, "stop-loss triggered, submitting exit order");
            self.submit_to_broker(order.clone(), broker);
        }

        if self.risk_manager.is_halted() {
            warn!("circuit breaker active, trading halted");
            self.drain_broker_events(broker);
            return Ok(());
        }

        let snapshot = PortfolioSnapshot::new(&self.portfolio, &self.current_prices);
        let strategy_orders = match strategy.on_tick(tick, &snapshot) {
            Ok(orders) => {
                self.fault_tracker.record_success(strategy.name());
                orders
            }
            Err(err) => {
                let count = self.fault_tracker.record_failure(strategy.name());
                warn!(strategy = strategy.name(), %err, consecutive_failures = count, "strategy on_tick failed");
                if count >= self.fault_threshold {
                    error!(strategy = strategy.name(), "strategy exceeded fault threshold");
                }
                Vec::new()
            }
        };

        for order in strategy_orders {
            if let Err(reason) = self.order_manager.validate(&order, &self.portfolio, &self.current_prices) {
                info!(symbol = %order.symbol, %reason, "order rejected by order manager");
                continue;
            }
            self.order_manager.record_order(&order);
            self.submit_to_broker(order, broker);
        }

        self.drain_broker_events(broker);
        Ok(())
    }

    fn submit_to_broker(&mut self, order: Order, broker: &mut dyn Brokerage) {
        match broker.submit(&order) {
            Ok(()) => {
                self.pending_orders.insert(order.id.clone(), order);
            }
            Err(err) => {
                error!(symbol = %order.symbol, %err, "brokerage submission failed");
            }
        }
    }

    fn drain_broker_events(&mut self, broker: &mut dyn Brokerage) {
        let events = match broker.poll_events() {
            Ok(events) => events,
            Err(err) => {
                error!(%err, "failed to poll brokerage events");
                return;
            }
        };

        for event in events {
            match event {
                BrokerageEvent::Filled(trade) | BrokerageEvent::PartiallyFilled(trade) => {
                    if let Some(order) = self.pending_orders.get_mut(&trade.order_id) {
                        order.apply_fill(trade.quantity, trade.price);
                        if order.status == OrderStatus::Filled {
                            self.pending_orders.remove(&trade.order_id);
                        }
                    }
                    let prev_qty = self
                        .portfolio
                        .positions
                        .get(&trade.symbol)
                        .map(|p| p.quantity)
                        .unwrap_or(Decimal::ZERO);
                    let symbol = trade.symbol.clone();
                    let price = trade.price;
                    self.portfolio.process_trade(trade);
                    let new_qty = self.portfolio.positions.get(&symbol).map(|p| p.quantity).unwrap_or(Decimal::ZERO);
                    if prev_qty.is_zero() && !new_qty.is_zero() {
                        self.risk_manager.add_position_stop(&symbol, price, new_qty.abs(), new_qty > Decimal::ZERO);
                    } else if new_qty.is_zero() {
                        self.risk_manager.remove_position_stop(&symbol);
                    }
                }
                BrokerageEvent::Cancelled { order_id } => {
                    if let Some(order) = self.pending_orders.remove(&order_id) {
                        info!(order_id = %order.id, "order cancelled by venue");
                    }
                }
                BrokerageEvent::Rejected { order_id, reason } => {
                    if let Some(order) = self.pending_orders.remove(&order_id) {
                        warn!(order_id = %order.id, %reason, "order rejected by venue");
                    }
                }
            }
        }
    }

    /// Submit market-sell (or market-buy, for shorts) close orders for
    /// every open position, for graceful shutdown (spec §4.8).
    pub fn close_all_positions(&mut self, broker: &mut dyn Brokerage) {
        let closes: Vec<Order> = self
            .portfolio
            .positions
            .values()
            .filter(|p| !p.is_flat())
            .map(|p| {
                let side = if p.is_long() { Side::Sell } else { Side::Buy };
                Order::market("shutdown", p.symbol.clone(), side, p.quantity.abs(), crate::order::TimeInForce::Day)
            })
            .collect();
        for order in closes {
            self.submit_to_broker(order, broker);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brokerage::PaperBrokerage;
    use crate::config::{MatchingConfig as RawMatchingConfig, RiskConfig as RawRiskConfig, StopConfig as RawStopConfig};
    use crate::matching::MatchingConfig;
    use crate::order::TimeInForce;
    use crate::order_manager::OrderManagerConfig;
    use crate::risk::StopConfig;
    use crate::tick::VecTickSource;
    use rust_decimal_macros::dec;
    use std::time::SystemTime;

    struct BuyOnceStrategy {
        fired: bool,
    }

    impl Strategy for BuyOnceStrategy {
        fn name(&self) -> &str {
            "buy_once"
        }
        fn warmup_done(&self, _symbol: &str) -> bool {
            true
        }
        fn on_tick(&mut self, tick: &Tick, _portfolio: &PortfolioSnapshot) -> anyhow::Result<Vec<Order>> {
            if self.fired {
                return Ok(Vec::new());
            }
            self.fired = true;
            Ok(vec![Order::market("buy_once", tick.symbol.clone(), Side::Buy, dec!(10), TimeInForce::Day)])
        }
    }

    fn raw_risk_config() -> RawRiskConfig {
        RawRiskConfig {
            max_position_size: dec!(10_000),
            max_position_value: dec!(1_000_000),
            max_total_exposure: dec!(1_000_000),
            max_orders_per_minute: 100,
            max_orders_per_symbol_per_minute: 100,
            min_cash_buffer: dec!(0),
        }
    }

    #[test]
    fn backtest_driver_runs_full_pipeline() {
        let order_manager = OrderManager::new(OrderManagerConfig::from(&raw_risk_config()));
        let matching_config: MatchingConfig = MatchingConfig::from(&RawMatchingConfig::default());
        let matching_engine = MatchingEngine::new(matching_config, Some(1));
        let stop_config = StopConfig::from(&RawStopConfig::default());
        let risk_manager = RiskManager::new(stop_config, dec!(100_000));

        let mut driver = BacktestDriver::new(dec!(100_000), order_manager, matching_engine, risk_manager, 1, None);

        let ticks = vec![
            Tick::new(SystemTime::now(), "AAPL", dec!(100), dec!(1000)).unwrap(),
            Tick::new(SystemTime::now(), "AAPL", dec!(101), dec!(1000)).unwrap(),
        ];
        let mut source = VecTickSource::new(ticks);
        let mut strategy = BuyOnceStrategy { fired: false };

        let result = driver.run(&mut source, &mut strategy).unwrap();
        assert_eq!(result.total_ticks, 2);
        assert_eq!(result.orders_submitted, 1);
        assert!(driver.portfolio().trades.len() >= 1 || result.orders_cancelled <= 1);
    }

    #[test]
    fn live_driver_applies_fills_from_broker_events() {
        let order_manager = OrderManager::new(OrderManagerConfig::from(&raw_risk_config()));
        let stop_config = StopConfig::from(&RawStopConfig::default());
        let risk_manager = RiskManager::new(stop_config, dec!(100_000));
        let mut driver = LiveDriver::new(dec!(100_000), order_manager, risk_manager);

        let mut broker = PaperBrokerage::new(dec!(150));
        let mut strategy = BuyOnceStrategy { fired: false };
        let tick = Tick::new(SystemTime::now(), "AAPL", dec!(150), dec!(100)).unwrap();

        driver.on_tick(&tick, &mut strategy, &mut broker).unwrap();
        assert_eq!(driver.portfolio().positions.get("AAPL").map(|p| p.quantity), Some(dec!(10)));
    }
}
