//! Market-data ticks and the trait that feeds them to the driver.

use crate::error::TickError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// A single market observation: `(timestamp, symbol, price, volume)`.
///
/// Immutable once constructed. `Tick::new` is the only entry point and
/// enforces the validity invariant from the data model: a non-positive
/// price is rejected before it can reach any strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub timestamp: SystemTime,
    pub symbol: String,
    pub price: Decimal,
    pub volume: Decimal,
}

impl Tick {
    /// Construct a tick, rejecting non-positive price or negative volume.
    ///
    /// This is the strategy boundary referred to throughout the spec:
    /// callers that skip this constructor (e.g. tests building a `Tick`
    /// literal) are responsible for the same invariant themselves.
    pub fn new(
        timestamp: SystemTime,
        symbol: impl Into<String>,
        price: Decimal,
        volume: Decimal,
    ) -> Result<Self, TickError> {
        if price <= Decimal::ZERO {
            return Err(TickError::NonPositivePrice { price });
        }
        if volume < Decimal::ZERO {
            return Err(TickError::NegativeVolume { volume });
        }
        Ok(Self {
            timestamp,
            symbol: symbol.into(),
            price,
            volume,
        })
    }

    /// Whether this ticker denotes a crypto pair (contains `/`, e.g. `BTC/USD`).
    ///
    /// Per spec §6, this selects the default time-in-force (GTC for crypto,
    /// Day for equities) and gates the live-session asset-class mix check.
    pub fn is_crypto_symbol(symbol: &str) -> bool {
        symbol.contains('/')
    }
}

/// A lazy, ordered (non-decreasing timestamp) source of ticks.
///
/// Implementations may be backed by a CSV replay or a live feed; both
/// present the same iterator-like contract to the driver (§6).
pub trait TickSource {
    /// Pull the next tick, or `None` on exhaustion (backtest EOF).
    fn next_tick(&mut self) -> Option<Tick>;
}

/// In-memory tick source backed by a `Vec`, used by CSV replay loaders
/// and by tests.
pub struct VecTickSource {
    ticks: std::vec::IntoIter<Tick>,
}

impl VecTickSource {
    pub fn new(ticks: Vec<Tick>) -> Self {
        Self {
            ticks: ticks.into_iter(),
        }
    }
}

impl TickSource for VecTickSource {
    fn next_tick(&mut self) -> Option<Tick> {
        self.ticks.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rejects_non_positive_price() {
        let err = Tick::new(SystemTime::now(), "AAPL", dec!(0), dec!(100)).unwrap_err();
        assert!(matches!(err, TickError::NonPositivePrice { .. }));
    }

    #[test]
    fn rejects_negative_volume() {
        let err = Tick::new(SystemTime::now(), "AAPL", dec!(100), dec!(-1)).unwrap_err();
        assert!(matches!(err, TickError::NegativeVolume { .. }));
    }

    #[test]
    fn accepts_valid_tick() {
        let tick = Tick::new(SystemTime::now(), "AAPL", dec!(100.5), dec!(10)).unwrap();
        assert_eq!(tick.symbol, "AAPL");
    }

    #[test]
    fn crypto_symbol_detection() {
        assert!(Tick::is_crypto_symbol("BTC/USD"));
        assert!(!Tick::is_crypto_symbol("AAPL"));
    }

    #[test]
    fn vec_tick_source_exhausts() {
        let t = Tick::new(SystemTime::now(), "AAPL", dec!(1), dec!(1)).unwrap();
        let mut src = VecTickSource::new(vec![t.clone(), t]);
        assert!(src.next_tick().is_some());
        assert!(src.next_tick().is_some());
        assert!(src.next_tick().is_none());
    }
}
