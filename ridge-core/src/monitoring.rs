//! Read-only engine metrics snapshot.
//!
//! Grounded on the field selection (not the Prometheus/HTTP wiring) of
//! `bog-core/src/monitoring/metrics.rs`'s `TradingMetrics` /
//! `PerformanceMetrics` / `RiskMetrics` structs. This engine has no
//! metrics server: a driver builds a [`MetricsSnapshot`] on demand
//! (e.g. once per `equity_record_every` ticks) and logs it as a
//! structured `tracing` event or appends it to the JSONL path named by
//! `MetricsConfig::metrics_log_path`.

use crate::portfolio::{PerformanceMetrics, Portfolio};
use rust_decimal::Decimal;
use serde::Serialize;

/// Counters for order events observed by a driver, independent of the
/// portfolio's own trade ledger.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderEventCounts {
    pub submitted: u64,
    pub filled: u64,
    pub partially_filled: u64,
    pub cancelled: u64,
    pub rejected: u64,
}

impl OrderEventCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_submitted(&mut self) {
        self.submitted += 1;
    }

    pub fn record_filled(&mut self) {
        self.filled += 1;
    }

    pub fn record_partial(&mut self) {
        self.partially_filled += 1;
    }

    pub fn record_cancelled(&mut self) {
        self.cancelled += 1;
    }

    pub fn record_rejected(&mut self) {
        self.rejected += 1;
    }
}

/// A point-in-time view of the engine suitable for logging or writing
/// to `metrics_log_path`. Carries no wall-clock timestamp of its own —
/// callers stamp one on when they emit it.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub cash: Decimal,
    pub total_value: Decimal,
    pub gross_exposure: Decimal,
    pub open_positions: usize,
    pub performance: PerformanceMetrics,
    pub orders: OrderEventCounts,
}

impl MetricsSnapshot {
    pub fn capture(
        portfolio: &Portfolio,
        prices: &std::collections::HashMap<String, Decimal>,
        orders: OrderEventCounts,
    ) -> Self {
        Self {
            cash: portfolio.cash,
            total_value: portfolio.total_value(),
            gross_exposure: portfolio.gross_exposure(prices),
            open_positions: portfolio
                .positions
                .values()
                .filter(|p| !p.is_flat())
                .count(),
            performance: portfolio.performance_metrics(),
            orders,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    #[test]
    fn snapshot_captures_flat_portfolio() {
        let portfolio = Portfolio::new(dec!(10000));
        let prices = HashMap::new();
        let snapshot = MetricsSnapshot::capture(&portfolio, &prices, OrderEventCounts::new());
        assert_eq!(snapshot.cash, dec!(10000));
        assert_eq!(snapshot.open_positions, 0);
        assert_eq!(snapshot.orders.submitted, 0);
    }

    #[test]
    fn order_event_counts_tally_independently() {
        let mut counts = OrderEventCounts::new();
        counts.record_submitted();
        counts.record_filled();
        counts.record_rejected();
        assert_eq!(counts.submitted, 1);
        assert_eq!(counts.filled, 1);
        assert_eq!(counts.rejected, 1);
        assert_eq!(counts.cancelled, 0);
    }
}
