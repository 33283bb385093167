//! Test helpers and mocks for downstream integration tests.
//!
//! Grounded on `bog-core/src/testing/{mod,helpers,mock_huginn}.rs`'s
//! role for `bog-strategies`' tests: a scripted tick source, a
//! programmable mock brokerage that records every submitted order, and
//! small builder functions so `ridge-strategies` and `ridge-bins` can
//! write integration tests without constructing the whole pipeline by
//! hand.

use crate::order::{Order, OrderId, Side, TimeInForce, Trade};
use crate::tick::{Tick, TickSource};
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::time::SystemTime;

/// Build a valid tick, panicking on invalid input — tests only.
pub fn tick(symbol: &str, price: Decimal, volume: Decimal) -> Tick {
    Tick::new(SystemTime::now(), symbol, price, volume).expect("test tick must be valid")
}

/// Build a flat price series for `symbol` at `volume`, one tick apart
/// in construction order (timestamps are not meaningfully ordered
/// beyond `SystemTime::now()` monotonicity on most platforms).
pub fn price_series(symbol: &str, prices: &[Decimal], volume: Decimal) -> Vec<Tick> {
    prices.iter().map(|&p| tick(symbol, p, volume)).collect()
}

/// A [`TickSource`] that can be replenished mid-test, unlike
/// [`crate::tick::VecTickSource`] which is consumed once at construction.
#[derive(Default)]
pub struct ScriptedTickSource {
    queue: VecDeque<Tick>,
}

impl ScriptedTickSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tick: Tick) -> &mut Self {
        self.queue.push_back(tick);
        self
    }

    pub fn push_all(&mut self, ticks: impl IntoIterator<Item = Tick>) -> &mut Self {
        self.queue.extend(ticks);
        self
    }
}

impl TickSource for ScriptedTickSource {
    fn next_tick(&mut self) -> Option<Tick> {
        self.queue.pop_front()
    }
}

/// A [`crate::brokerage::Brokerage`] that records every submitted order
/// and fills it immediately and fully at a programmable price,
/// mirroring `MockHuginnFeed`'s role of a scriptable collaborator that
/// needs no live connection.
pub struct MockBrokerage {
    pub submitted: Vec<Order>,
    pub cancelled: Vec<OrderId>,
    fill_price: Decimal,
    events: VecDeque<crate::brokerage::BrokerageEvent>,
    fail_next_submit: bool,
}

impl MockBrokerage {
    pub fn new(fill_price: Decimal) -> Self {
        Self {
            submitted: Vec::new(),
            cancelled: Vec::new(),
            fill_price,
            events: VecDeque::new(),
            fail_next_submit: false,
        }
    }

    pub fn set_fill_price(&mut self, price: Decimal) {
        self.fill_price = price;
    }

    /// Make the next `submit` call return an error, simulating a
    /// `BrokerageError::SubmissionFailed` (spec §7).
    pub fn fail_next_submit(&mut self) {
        self.fail_next_submit = true;
    }
}

impl crate::brokerage::Brokerage for MockBrokerage {
    fn submit(&mut self, order: &Order) -> anyhow::Result<()> {
        if self.fail_next_submit {
            self.fail_next_submit = false;
            anyhow::bail!("mock brokerage: submission rejected");
        }
        self.submitted.push(order.clone());
        let trade = Trade::new(
            order.id.clone(),
            order.strategy_id.clone(),
            order.symbol.clone(),
            order.side,
            order.quantity,
            self.fill_price,
        );
        self.events.push_back(crate::brokerage::BrokerageEvent::Filled(trade));
        Ok(())
    }

    fn cancel(&mut self, order_id: &OrderId) -> anyhow::Result<()> {
        self.cancelled.push(order_id.clone());
        self.events.push_back(crate::brokerage::BrokerageEvent::Cancelled { order_id: order_id.clone() });
        Ok(())
    }

    fn poll_events(&mut self) -> anyhow::Result<Vec<crate::brokerage::BrokerageEvent>> {
        Ok(self.events.drain(..).collect())
    }
}

/// Build a market order with sane defaults for tests that don't care
/// about time-in-force or strategy attribution.
pub fn market_order(symbol: &str, side: Side, quantity: Decimal) -> Order {
    Order::market("test", symbol, side, quantity, TimeInForce::Day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brokerage::Brokerage;
    use rust_decimal_macros::dec;

    #[test]
    fn scripted_tick_source_drains_in_order() {
        let mut source = ScriptedTickSource::new();
        source.push(tick("AAPL", dec!(100), dec!(10)));
        source.push(tick("AAPL", dec!(101), dec!(10)));
        assert!(source.next_tick().is_some());
        assert!(source.next_tick().is_some());
        assert!(source.next_tick().is_none());
    }

    #[test]
    fn mock_brokerage_records_and_fills() {
        let mut broker = MockBrokerage::new(dec!(150));
        let order = market_order("AAPL", Side::Buy, dec!(10));
        broker.submit(&order).unwrap();
        assert_eq!(broker.submitted.len(), 1);
        let events = broker.poll_events().unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn mock_brokerage_can_be_made_to_fail_once() {
        let mut broker = MockBrokerage::new(dec!(150));
        broker.fail_next_submit();
        let order = market_order("AAPL", Side::Buy, dec!(10));
        assert!(broker.submit(&order).is_err());
        assert!(broker.submit(&order).is_ok());
        assert_eq!(broker.submitted.len(), 1);
    }
}
