//! Streaming indicator state machines (spec §4.1).
//!
//! Every indicator here is a small struct that owns its own rolling
//! state and exposes `update(price) -> Option<Value>`: `None` while the
//! indicator is still warming up, `Some` once it has enough history to
//! produce a value. This mirrors the batch `calculate_*` functions in
//! the pack's technical-indicator modules (e.g.
//! `orc2626-tech-sBot9999/backend/src/indicators/{ema,rsi,bollinger,atr,adx}.rs`)
//! but turns each into an O(1)-per-tick incremental update instead of a
//! whole-slice recomputation, since the driver calls these once per
//! tick rather than replaying history.
//!
//! Indicator math is carried out in `f64`. Prices and volumes enter the
//! engine as `Decimal` (so cash accounting never touches floating
//! point), but indicator values are dimensionless signal levels —
//! oscillators, ratios, z-scores — not money, and the square roots and
//! divisions they require are the ordinary floating-point kind the
//! original Python strategies used.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod donchian;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod vwap;
pub mod zscore;

pub use adx::Adx;
pub use atr::Atr;
pub use bollinger::{Bollinger, BollingerBands};
pub use donchian::{Donchian, DonchianChannel};
pub use ema::Ema;
pub use macd::{Macd, MacdValue};
pub use rsi::Rsi;
pub use sma::Sma;
pub use stochastic::{Stochastic, StochasticValue};
pub use vwap::Vwap;
pub use zscore::ZScore;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Convert a `Decimal` price into the `f64` domain indicators operate in.
pub(crate) fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}
