//! Order, trade, and order-identity types (spec §3).
//!
//! Grounded on `bog-core/src/execution/types.rs`'s `OrderId`/`Side`/
//! `Order`/`Fill` shape, adapted to the spec's order-state machine
//! (`NEW -> PARTIAL -> FILLED`, `NEW -> CANCELLED`, `NEW -> REJECTED`)
//! and its `Trade` being an immutable fact rather than a mutable fill.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn new_random() -> Self {
        use rand::Rng;
        let id: u128 = rand::thread_rng().gen();
        Self(format!("{:032x}", id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// +1 for Buy, -1 for Sell — the sign convention used throughout
    /// the position update law (spec §3).
    pub fn sign(self) -> i8 {
        match self {
            Side::Buy => 1,
            Side::Sell => -1,
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Market,
    Limit,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Limit => write!(f, "LIMIT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good-til-cancelled — default for crypto pairs (spec §6).
    Gtc,
    /// Expires at end of trading day — default for equities.
    Day,
    /// Immediate-or-cancel.
    Ioc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    New,
    Partial,
    Filled,
    Cancelled,
    Rejected,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::New => "NEW",
            OrderStatus::Partial => "PARTIAL",
            OrderStatus::Filled => "FILLED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Rejected => "REJECTED",
        };
        write!(f, "{}", s)
    }
}

/// An order in flight through the risk-validation and matching
/// pipeline. `quantity` is always positive; direction lives in `side`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// The strategy (or sub-strategy, under the adaptive meta) that
    /// emitted this order. Empty string for risk-manager-generated
    /// exit orders.
    pub strategy_id: String,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub limit_price: Option<Decimal>,
    pub time_in_force: TimeInForce,
    pub status: OrderStatus,
    pub filled_quantity: Decimal,
    pub average_fill_price: Option<Decimal>,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl Order {
    pub fn market(strategy_id: impl Into<String>, symbol: impl Into<String>, side: Side, quantity: Decimal, tif: TimeInForce) -> Self {
        let now = SystemTime::now();
        Self {
            id: OrderId::new_random(),
            strategy_id: strategy_id.into(),
            symbol: symbol.into(),
            side,
            order_type: OrderType::Market,
            quantity,
            limit_price: None,
            time_in_force: tif,
            status: OrderStatus::New,
            filled_quantity: Decimal::ZERO,
            average_fill_price: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn limit(
        strategy_id: impl Into<String>,
        symbol: impl Into<String>,
        side: Side,
        quantity: Decimal,
        limit_price: Decimal,
        tif: TimeInForce,
    ) -> Self {
        let now = SystemTime::now();
        Self {
            id: OrderId::new_random(),
            strategy_id: strategy_id.into(),
            symbol: symbol.into(),
            side,
            order_type: OrderType::Limit,
            quantity,
            limit_price: Some(limit_price),
            time_in_force: tif,
            status: OrderStatus::New,
            filled_quantity: Decimal::ZERO,
            average_fill_price: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn remaining_quantity(&self) -> Decimal {
        self.quantity - self.filled_quantity
    }

    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Apply a fill, updating cumulative filled quantity and the
    /// quantity-weighted average fill price, and transitioning status.
    pub fn apply_fill(&mut self, fill_qty: Decimal, fill_price: Decimal) {
        let prior_notional = self.filled_quantity * self.average_fill_price.unwrap_or(Decimal::ZERO);
        self.filled_quantity += fill_qty;
        self.average_fill_price = Some((prior_notional + fill_qty * fill_price) / self.filled_quantity);
        self.status = if self.filled_quantity >= self.quantity {
            OrderStatus::Filled
        } else {
            OrderStatus::Partial
        };
        self.updated_at = SystemTime::now();
    }

    pub fn cancel(&mut self) {
        self.status = OrderStatus::Cancelled;
        self.updated_at = SystemTime::now();
    }

    pub fn reject(&mut self) {
        self.status = OrderStatus::Rejected;
        self.updated_at = SystemTime::now();
    }
}

/// An immutable execution fact (spec §3): `(trade_id, order_id,
/// timestamp, symbol, side, quantity, price)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: String,
    pub order_id: OrderId,
    pub strategy_id: String,
    pub timestamp: SystemTime,
    pub symbol: String,
    pub side: Side,
    pub quantity: Decimal,
    pub price: Decimal,
}

impl Trade {
    pub fn new(
        order_id: OrderId,
        strategy_id: impl Into<String>,
        symbol: impl Into<String>,
        side: Side,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            trade_id: OrderId::new_random().to_string(),
            order_id,
            strategy_id: strategy_id.into(),
            timestamp: SystemTime::now(),
            symbol: symbol.into(),
            side,
            quantity,
            price,
        }
    }

    pub fn notional(&self) -> Decimal {
        self.quantity * self.price
    }

    /// Cash delta for this trade: negative for buys, positive for
    /// sells. Transaction costs are already baked into `price` by the
    /// matching engine (spec §3).
    pub fn cash_flow(&self) -> Decimal {
        match self.side {
            Side::Buy => -self.notional(),
            Side::Sell => self.notional(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn partial_then_full_fill_transitions_status() {
        let mut order = Order::limit("sma", "AAPL", Side::Buy, dec!(10), dec!(100), TimeInForce::Day);
        order.apply_fill(dec!(4), dec!(100));
        assert_eq!(order.status, OrderStatus::Partial);
        order.apply_fill(dec!(6), dec!(102));
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.filled_quantity, dec!(10));
        let avg = order.average_fill_price.unwrap();
        let expected = (dec!(4) * dec!(100) + dec!(6) * dec!(102)) / dec!(10);
        assert_eq!(avg, expected);
    }

    #[test]
    fn remaining_quantity_tracks_fills() {
        let mut order = Order::limit("sma", "AAPL", Side::Buy, dec!(10), dec!(100), TimeInForce::Day);
        order.apply_fill(dec!(3), dec!(100));
        assert_eq!(order.remaining_quantity(), dec!(7));
    }

    #[test]
    fn trade_cash_flow_sign() {
        let buy = Trade::new(OrderId::new_random(), "sma", "AAPL", Side::Buy, dec!(10), dec!(100));
        assert_eq!(buy.cash_flow(), dec!(-1000));
        let sell = Trade::new(OrderId::new_random(), "sma", "AAPL", Side::Sell, dec!(10), dec!(100));
        assert_eq!(sell.cash_flow(), dec!(1000));
    }
}
