//! The `Strategy` trait and the read-only portfolio view strategies see
//! (spec §4.2).
//!
//! Grounded on `bog-core/src/strategy/mod.rs`'s legacy `Strategy` trait
//! shape (`on_update` taking a borrowed snapshot, `name()`, per-strategy
//! stats) generalized from market-making quoting to the spec's
//! tick-in/orders-out contract. `on_tick` returns `anyhow::Result` rather
//! than panicking so the driver can trap a faulty strategy instead of
//! aborting the whole run, per the "must not raise" contract in spec §4.2.

use crate::order::Order;
use crate::portfolio::Portfolio;
use crate::tick::Tick;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// A read-only view of portfolio state passed to strategies. Strategies
/// must not mutate the portfolio directly; they only emit orders.
pub struct PortfolioSnapshot<'a> {
    portfolio: &'a Portfolio,
    prices: &'a HashMap<String, Decimal>,
}

impl<'a> PortfolioSnapshot<'a> {
    pub fn new(portfolio: &'a Portfolio, prices: &'a HashMap<String, Decimal>) -> Self {
        Self { portfolio, prices }
    }

    pub fn cash(&self) -> Decimal {
        self.portfolio.cash
    }

    pub fn total_value(&self) -> Decimal {
        self.portfolio.total_value()
    }

    /// Signed quantity held in `symbol`, zero if no position exists.
    pub fn position_quantity(&self, symbol: &str) -> Decimal {
        self.portfolio
            .positions
            .get(symbol)
            .map(|p| p.quantity)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn average_cost(&self, symbol: &str) -> Decimal {
        self.portfolio
            .positions
            .get(symbol)
            .map(|p| p.average_cost)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn price(&self, symbol: &str) -> Option<Decimal> {
        self.prices.get(symbol).copied()
    }
}

/// Consume a tick plus a read-only portfolio snapshot and emit zero or
/// more orders. Implementations own their per-symbol indicator state.
///
/// Contract (spec §4.2): must be deterministic given its own state and
/// inputs; must not mutate the portfolio; when both a close-existing and
/// open-opposite condition hold in the same tick, the close order must
/// be returned before the open order.
pub trait Strategy: Send {
    /// Stable identifier used for order attribution, logging, and
    /// per-strategy fault counting.
    fn name(&self) -> &str;

    fn on_tick(&mut self, tick: &Tick, portfolio: &PortfolioSnapshot) -> anyhow::Result<Vec<Order>>;

    /// Whether this strategy's indicator state for `symbol` has enough
    /// history to emit a non-exit order (spec §3: "a strategy never
    /// emits a non-exit order for a symbol whose state block is not
    /// yet warmed").
    fn warmup_done(&self, symbol: &str) -> bool;
}

/// Shared order-sizing rule (spec §4.2): a configured dollar
/// `position_size` divided by the current price, floored to a whole
/// share count and capped at `max_position` shares. Returns zero if
/// `price` is non-positive.
pub fn size_order(position_size: Decimal, price: Decimal, max_position: Decimal) -> Decimal {
    if price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (position_size / price).floor().min(max_position).max(Decimal::ZERO)
}

/// Tracks consecutive `on_tick` failures per strategy so the driver can
/// emit a critical warning once a strategy crosses the fault threshold
/// (default 10, spec §4.8) without halting the run.
#[derive(Debug, Default)]
pub struct FaultTracker {
    counts: HashMap<String, u32>,
}

impl FaultTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `strategy`, returning the new consecutive
    /// count.
    pub fn record_failure(&mut self, strategy: &str) -> u32 {
        let counter = self.counts.entry(strategy.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Reset the consecutive-failure count on a successful call.
    pub fn record_success(&mut self, strategy: &str) {
        self.counts.remove(strategy);
    }

    pub fn consecutive_failures(&self, strategy: &str) -> u32 {
        self.counts.get(strategy).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn size_order_divides_and_caps() {
        assert_eq!(size_order(dec!(10_000), dec!(100), dec!(1000)), dec!(100));
        assert_eq!(size_order(dec!(1_000_000), dec!(100), dec!(500)), dec!(500));
    }

    #[test]
    fn size_order_floors_fractional_shares() {
        assert_eq!(size_order(dec!(500), dec!(105), dec!(1000)), dec!(4));
    }

    #[test]
    fn size_order_zero_price_yields_zero() {
        assert_eq!(size_order(dec!(10_000), dec!(0), dec!(1000)), Decimal::ZERO);
    }

    #[test]
    fn fault_tracker_counts_and_resets() {
        let mut tracker = FaultTracker::new();
        assert_eq!(tracker.record_failure("sma"), 1);
        assert_eq!(tracker.record_failure("sma"), 2);
        tracker.record_success("sma");
        assert_eq!(tracker.consecutive_failures("sma"), 0);
    }

    #[test]
    fn fault_tracker_threshold_crossing() {
        let mut tracker = FaultTracker::new();
        for _ in 0..9 {
            tracker.record_failure("rsi");
        }
        assert!(tracker.consecutive_failures("rsi") < 10);
        tracker.record_failure("rsi");
        assert!(tracker.consecutive_failures("rsi") >= 10);
    }
}
