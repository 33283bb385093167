//! Ridge Core — multi-strategy algorithmic trading engine.
//!
//! Ridge ingests a stream of per-symbol market ticks, evaluates a
//! library of technical trading strategies (see the sibling
//! `ridge-strategies` crate), validates resulting orders against a
//! risk-control layer, executes them against either a simulated
//! matching engine (backtest) or a live brokerage adapter, and
//! continuously tracks portfolio state, P&L, drawdown, and
//! per-strategy performance attribution.
//!
//! ## Core modules
//! - `tick`: market-data ticks and the tick-source trait.
//! - `indicators`: streaming indicator state machines.
//! - `strategy`: the `Strategy` trait and the read-only portfolio
//!   snapshot strategies consume (concrete strategies live in
//!   `ridge-strategies`).
//! - `order`: order, trade, and order-identity types.
//! - `order_manager`: rate/capital/position/exposure validation.
//! - `matching`: probabilistic backtest fill simulation.
//! - `portfolio`: position accounting and performance metrics.
//! - `risk`: per-position stops and the portfolio circuit breaker.
//! - `adaptive`: the adaptive meta-strategy.
//! - `driver`: backtest and live orchestration loops.
//! - `brokerage`: the live brokerage adapter seam.
//! - `symbol`: symbol interning for the hot tick-dispatch path.
//! - `config`: runtime configuration and validation.
//! - `error`: the error taxonomy.
//! - `logging`: `tracing` subscriber bootstrap.
//! - `monitoring`: read-only engine metrics snapshot.
//! - `testing`: mocks and builders for downstream integration tests.

pub mod adaptive;
pub mod brokerage;
pub mod config;
pub mod driver;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod matching;
pub mod monitoring;
pub mod order;
pub mod order_manager;
pub mod portfolio;
pub mod risk;
pub mod strategy;
pub mod symbol;
pub mod tick;

pub mod testing;

pub use anyhow::{Error, Result};

/// Convenience re-exports for downstream strategy and binary crates.
pub mod prelude {
    pub use crate::order::{Order, OrderId, OrderStatus, OrderType, Side, TimeInForce, Trade};
    pub use crate::portfolio::{PerformanceMetrics, Portfolio, Position};
    pub use crate::strategy::{size_order, FaultTracker, PortfolioSnapshot, Strategy};
    pub use crate::tick::{Tick, TickSource};
    pub use crate::{Error, Result};
}
