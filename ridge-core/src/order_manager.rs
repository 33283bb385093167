//! Order manager: the risk-validation gate between a strategy's
//! proposed orders and the matching engine (spec §4.3).
//!
//! ```text
//! Order ─▶ rate limit ─▶ capital ─▶ position limits ─▶ total exposure ─▶ accepted
//!            │              │              │                  │
//!            └── reject ────┴── reject ────┴──── reject ───────┘
//! ```
//!
//! Short-circuits on the first failing check, mirroring
//! `original_source/.../trading/order_manager.py::OrderManager.validate_order`.
//! The sliding-window rate limiter here is a deque of timestamps rather
//! than the teacher's token-bucket (`bog-core/src/risk/rate_limiter.rs`),
//! since the spec calls for an exact 60-second sliding window rather
//! than a refill rate.

use crate::error::OrderManagerRejection;
use crate::order::{Order, Side};
use crate::portfolio::Portfolio;
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

const RATE_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct OrderManagerConfig {
    pub max_position_size: Decimal,
    pub max_position_value: Decimal,
    pub max_total_exposure: Decimal,
    pub max_orders_per_minute: usize,
    pub max_orders_per_symbol_per_minute: usize,
    pub min_cash_buffer: Decimal,
}

impl From<&crate::config::RiskConfig> for OrderManagerConfig {
    fn from(cfg: &crate::config::RiskConfig) -> Self {
        Self {
            max_position_size: cfg.max_position_size,
            max_position_value: cfg.max_position_value,
            max_total_exposure: cfg.max_total_exposure,
            max_orders_per_minute: cfg.max_orders_per_minute,
            max_orders_per_symbol_per_minute: cfg.max_orders_per_symbol_per_minute,
            min_cash_buffer: cfg.min_cash_buffer,
        }
    }
}

pub struct OrderManager {
    config: OrderManagerConfig,
    global_timestamps: VecDeque<Instant>,
    symbol_timestamps: HashMap<String, VecDeque<Instant>>,
}

impl OrderManager {
    pub fn new(config: OrderManagerConfig) -> Self {
        Self {
            config,
            global_timestamps: VecDeque::new(),
            symbol_timestamps: HashMap::new(),
        }
    }

    /// Validate `order` against the pipeline in spec §4.3, given the
    /// current portfolio and a current-price map. Does not mutate rate
    /// counters — call [`Self::record_order`] after submission.
    pub fn validate(
        &mut self,
        order: &Order,
        portfolio: &Portfolio,
        current_prices: &HashMap<String, Decimal>,
    ) -> Result<(), OrderManagerRejection> {
        let now = Instant::now();
        self.check_rate_limits(order, now)?;
        self.check_capital(order, portfolio)?;
        self.check_position_limits(order, portfolio, current_prices)?;
        self.check_total_exposure(order, portfolio, current_prices)?;
        Ok(())
    }

    /// Advance the rate-limit counters. Must be called after an order
    /// passes validation and is submitted.
    pub fn record_order(&mut self, order: &Order) {
        let now = Instant::now();
        self.global_timestamps.push_back(now);
        self.symbol_timestamps
            .entry(order.symbol.clone())
            .or_default()
            .push_back(now);
    }

    fn check_rate_limits(&mut self, order: &Order, now: Instant) -> Result<(), OrderManagerRejection> {
        clean_old(&mut self.global_timestamps, now);
        if self.global_timestamps.len() >= self.config.max_orders_per_minute {
            return Err(OrderManagerRejection::GlobalRateLimit {
                limit: self.config.max_orders_per_minute,
            });
        }

        let symbol_queue = self.symbol_timestamps.entry(order.symbol.clone()).or_default();
        clean_old(symbol_queue, now);
        if symbol_queue.len() >= self.config.max_orders_per_symbol_per_minute {
            return Err(OrderManagerRejection::SymbolRateLimit {
                symbol: order.symbol.clone(),
                limit: self.config.max_orders_per_symbol_per_minute,
            });
        }

        Ok(())
    }

    /// Capital is only checkable for a LIMIT BUY, where the order's
    /// notional value is known ahead of execution; MARKET orders are
    /// let through here and left to the matching engine (spec §4.3).
    fn check_capital(&self, order: &Order, portfolio: &Portfolio) -> Result<(), OrderManagerRejection> {
        if order.side != Side::Buy {
            return Ok(());
        }
        let Some(limit_price) = order.limit_price else {
            return Ok(());
        };
        let order_value = order.quantity * limit_price;
        let available = portfolio.cash - self.config.min_cash_buffer;
        if order_value > available {
            return Err(OrderManagerRejection::InsufficientCapital { order_value, available });
        }
        Ok(())
    }

    fn check_position_limits(
        &self,
        order: &Order,
        portfolio: &Portfolio,
        current_prices: &HashMap<String, Decimal>,
    ) -> Result<(), OrderManagerRejection> {
        let current_qty = portfolio
            .positions
            .get(&order.symbol)
            .map(|p| p.quantity)
            .unwrap_or(Decimal::ZERO);
        let signed_delta = Decimal::from(order.side.sign()) * order.quantity;
        let projected = current_qty + signed_delta;

        if projected.abs() > self.config.max_position_size {
            return Err(OrderManagerRejection::PositionSizeExceeded {
                projected: projected.abs(),
                limit: self.config.max_position_size,
            });
        }

        if let Some(&price) = current_prices.get(&order.symbol) {
            let value = projected.abs() * price;
            if value > self.config.max_position_value {
                return Err(OrderManagerRejection::PositionValueExceeded {
                    value,
                    limit: self.config.max_position_value,
                });
            }
        }

        Ok(())
    }

    fn check_total_exposure(
        &self,
        order: &Order,
        portfolio: &Portfolio,
        current_prices: &HashMap<String, Decimal>,
    ) -> Result<(), OrderManagerRejection> {
        let existing_exposure: Decimal = portfolio
            .positions
            .values()
            .filter_map(|p| current_prices.get(&p.symbol).map(|&price| p.quantity.abs() * price))
            .sum();

        let added_exposure = if order.side == Side::Buy {
            let price = order
                .limit_price
                .or_else(|| current_prices.get(&order.symbol).copied())
                .unwrap_or(Decimal::ZERO);
            order.quantity * price
        } else {
            Decimal::ZERO
        };

        let total = existing_exposure + added_exposure;
        if total > self.config.max_total_exposure {
            return Err(OrderManagerRejection::TotalExposureExceeded {
                exposure: total,
                limit: self.config.max_total_exposure,
            });
        }
        Ok(())
    }
}

/// Lazily pop timestamps older than the 60-second window off the
/// front of the deque.
fn clean_old(queue: &mut VecDeque<Instant>, now: Instant) {
    while let Some(&front) = queue.front() {
        if now.duration_since(front) > RATE_WINDOW {
            queue.pop_front();
        } else {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderId, OrderStatus, OrderType, TimeInForce};
    use rust_decimal_macros::dec;
    use std::time::SystemTime;

    fn manager() -> OrderManager {
        OrderManager::new(OrderManagerConfig {
            max_position_size: dec!(1000),
            max_position_value: dec!(100_000),
            max_total_exposure: dec!(500_000),
            max_orders_per_minute: 3,
            max_orders_per_symbol_per_minute: 2,
            min_cash_buffer: dec!(1000),
        })
    }

    fn limit_order(side: Side, qty: Decimal, price: Decimal) -> Order {
        Order {
            id: OrderId::new_random(),
            strategy_id: "sma".into(),
            symbol: "AAPL".into(),
            side,
            order_type: OrderType::Limit,
            quantity: qty,
            limit_price: Some(price),
            time_in_force: TimeInForce::Day,
            status: OrderStatus::New,
            filled_quantity: Decimal::ZERO,
            average_fill_price: None,
            created_at: SystemTime::now(),
            updated_at: SystemTime::now(),
        }
    }

    #[test]
    fn rejects_when_capital_insufficient() {
        let mut mgr = manager();
        let pf = Portfolio::new(dec!(5000));
        let order = limit_order(Side::Buy, dec!(10), dec!(1000));
        let err = mgr.validate(&order, &pf, &HashMap::new()).unwrap_err();
        assert!(matches!(err, OrderManagerRejection::InsufficientCapital { .. }));
    }

    #[test]
    fn symbol_rate_limit_trips_before_global() {
        let mut mgr = manager();
        let pf = Portfolio::new(dec!(1_000_000));
        let order = limit_order(Side::Buy, dec!(1), dec!(10));
        mgr.validate(&order, &pf, &HashMap::new()).unwrap();
        mgr.record_order(&order);
        mgr.validate(&order, &pf, &HashMap::new()).unwrap();
        mgr.record_order(&order);
        let err = mgr.validate(&order, &pf, &HashMap::new()).unwrap_err();
        assert!(matches!(err, OrderManagerRejection::SymbolRateLimit { .. }));
    }

    #[test]
    fn market_orders_skip_capital_check() {
        let mut mgr = manager();
        let pf = Portfolio::new(dec!(0));
        let mut order = limit_order(Side::Buy, dec!(1), dec!(10));
        order.order_type = OrderType::Market;
        order.limit_price = None;
        assert!(mgr.validate(&order, &pf, &HashMap::new()).is_ok());
    }

    #[test]
    fn position_size_limit_enforced() {
        let mut mgr = manager();
        let pf = Portfolio::new(dec!(1_000_000));
        let order = limit_order(Side::Buy, dec!(2000), dec!(10));
        let err = mgr.validate(&order, &pf, &HashMap::new()).unwrap_err();
        assert!(matches!(err, OrderManagerRejection::PositionSizeExceeded { .. }));
    }
}
