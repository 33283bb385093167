//! Live brokerage adapter trait (spec §4.8, §6 "external collaborator").
//!
//! The concrete HTTP/WebSocket transport is out of scope (spec §1); this
//! module defines only the seam the live driver submits orders through
//! and receives asynchronous fill events back on, grounded on
//! `bog-core/src/execution/mod.rs`'s `Executor` trait (submit + drain-fills
//! shape) generalized from the teacher's in-process simulated/live split
//! to an async-boundary-safe channel-backed adapter.

use crate::order::{Order, Trade};
use anyhow::Result;

/// An asynchronous fill or order-status event delivered by a brokerage
/// after submission (spec §4.8: "fill events come back asynchronously").
#[derive(Debug, Clone)]
pub enum BrokerageEvent {
    Filled(Trade),
    PartiallyFilled(Trade),
    Cancelled { order_id: crate::order::OrderId },
    Rejected { order_id: crate::order::OrderId, reason: String },
}

/// Submits orders to a live venue and surfaces asynchronous fill events.
///
/// Implementations must not lose orders across the async boundary: a
/// successful `submit` return guarantees the order reached the venue's
/// acknowledgement queue, even if its terminal status arrives later via
/// `poll_events`.
pub trait Brokerage: Send {
    /// Submit `order` for execution. Returns once the venue has
    /// acknowledged receipt (not necessarily filled).
    fn submit(&mut self, order: &Order) -> Result<()>;

    /// Request cancellation of a previously submitted order.
    fn cancel(&mut self, order_id: &crate::order::OrderId) -> Result<()>;

    /// Drain any fill/cancel/reject events received since the last poll.
    /// Non-blocking: returns an empty vec if nothing has arrived.
    fn poll_events(&mut self) -> Result<Vec<BrokerageEvent>>;

    /// Current buying power, if the venue reports one distinct from the
    /// locally tracked portfolio cash (spec §4.7 `buying_power`).
    fn buying_power(&self) -> Option<rust_decimal::Decimal> {
        None
    }
}

/// In-memory brokerage used by tests and paper-trading dry runs: every
/// submitted order is immediately and fully filled at a caller-supplied
/// price, with no simulated cost model (unlike [`crate::matching::MatchingEngine`]).
pub struct PaperBrokerage {
    events: std::collections::VecDeque<BrokerageEvent>,
    fill_price: rust_decimal::Decimal,
}

impl PaperBrokerage {
    pub fn new(fill_price: rust_decimal::Decimal) -> Self {
        Self {
            events: std::collections::VecDeque::new(),
            fill_price,
        }
    }

    pub fn set_fill_price(&mut self, price: rust_decimal::Decimal) {
        self.fill_price = price;
    }
}

impl Brokerage for PaperBrokerage {
    fn submit(&mut self, order: &Order) -> Result<()> {
        let trade = Trade::new(
            order.id.clone(),
            order.strategy_id.clone(),
            order.symbol.clone(),
            order.side,
            order.quantity,
            self.fill_price,
        );
        self.events.push_back(BrokerageEvent::Filled(trade));
        Ok(())
    }

    fn cancel(&mut self, order_id: &crate::order::OrderId) -> Result<()> {
        self.events.push_back(BrokerageEvent::Cancelled { order_id: order_id.clone() });
        Ok(())
    }

    fn poll_events(&mut self) -> Result<Vec<BrokerageEvent>> {
        Ok(self.events.drain(..).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{Side, TimeInForce};
    use rust_decimal_macros::dec;

    #[test]
    fn paper_brokerage_fills_immediately() {
        let mut broker = PaperBrokerage::new(dec!(150));
        let order = Order::market("sma", "AAPL", Side::Buy, dec!(10), TimeInForce::Day);
        broker.submit(&order).unwrap();
        let events = broker.poll_events().unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], BrokerageEvent::Filled(_)));
    }

    #[test]
    fn poll_events_drains_and_empties() {
        let mut broker = PaperBrokerage::new(dec!(150));
        let order = Order::market("sma", "AAPL", Side::Buy, dec!(10), TimeInForce::Day);
        broker.submit(&order).unwrap();
        assert_eq!(broker.poll_events().unwrap().len(), 1);
        assert!(broker.poll_events().unwrap().is_empty());
    }
}
