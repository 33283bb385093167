//! Risk manager / stop-loss engine: per-position stops and a
//! portfolio-level circuit breaker (spec §4.6).
//!
//! Ported from `original_source/.../trading/risk_manager.py`'s
//! `RiskManager` — in particular the check order (circuit breaker
//! before per-position stops, daily-loss before drawdown within the
//! breaker) and the monotone trailing-stop update. The halted/armed
//! latch and its manual-reset-only semantics borrow the enum +
//! `Display` + no-auto-rearm idiom from
//! `bog-core/src/risk/circuit_breaker.rs::CircuitBreaker`.

use crate::order::{Order, Side, TimeInForce};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopKind {
    FixedPct,
    TrailingPct,
    Absolute,
}

/// A registered exit level for one open position (spec §3).
#[derive(Debug, Clone)]
pub struct PositionStop {
    pub symbol: String,
    pub entry_price: Decimal,
    pub stop_price: Decimal,
    pub highest_price_seen: Decimal,
    pub kind: StopKind,
    pub is_long: bool,
    pub quantity: Decimal,
}

impl PositionStop {
    /// Advance a trailing stop monotonically in the favorable
    /// direction; fixed and absolute stops never move once armed.
    fn update_trailing(&mut self, current_price: Decimal, trailing_pct: Decimal) {
        if self.kind != StopKind::TrailingPct {
            return;
        }
        if self.is_long {
            if current_price > self.highest_price_seen {
                self.highest_price_seen = current_price;
            }
            let candidate = self.highest_price_seen * (Decimal::ONE - trailing_pct);
            if candidate > self.stop_price {
                self.stop_price = candidate;
            }
        } else {
            if current_price < self.highest_price_seen {
                self.highest_price_seen = current_price;
            }
            let candidate = self.highest_price_seen * (Decimal::ONE + trailing_pct);
            if candidate < self.stop_price {
                self.stop_price = candidate;
            }
        }
    }

    fn is_triggered(&self, current_price: Decimal) -> bool {
        if self.is_long {
            current_price <= self.stop_price
        } else {
            current_price >= self.stop_price
        }
    }
}

#[derive(Debug, Clone)]
pub struct StopConfig {
    pub position_stop_pct: Decimal,
    pub trailing_stop_pct: Decimal,
    pub portfolio_stop_pct: Decimal,
    pub max_drawdown_pct: Decimal,
    pub use_trailing_stops: bool,
    pub enable_circuit_breaker: bool,
}

impl From<&crate::config::StopConfig> for StopConfig {
    fn from(cfg: &crate::config::StopConfig) -> Self {
        Self {
            position_stop_pct: Decimal::try_from(cfg.position_stop_pct / 100.0).unwrap_or(Decimal::ZERO),
            trailing_stop_pct: Decimal::try_from(cfg.trailing_stop_pct / 100.0).unwrap_or(Decimal::ZERO),
            portfolio_stop_pct: Decimal::try_from(cfg.portfolio_stop_pct / 100.0).unwrap_or(Decimal::ZERO),
            max_drawdown_pct: Decimal::try_from(cfg.max_drawdown_pct / 100.0).unwrap_or(Decimal::ZERO),
            use_trailing_stops: cfg.use_trailing_stops,
            enable_circuit_breaker: cfg.enable_circuit_breaker,
        }
    }
}

/// `armed -> tripped`, manual reset only — no automatic re-arm within a
/// session (spec §4.8 state machine).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakerState {
    Armed,
    Tripped,
}

pub struct RiskManager {
    config: StopConfig,
    stops: HashMap<String, PositionStop>,
    breaker: BreakerState,
    daily_start_value: Decimal,
    high_water_mark: Decimal,
}

impl RiskManager {
    pub fn new(config: StopConfig, initial_portfolio_value: Decimal) -> Self {
        Self {
            config,
            stops: HashMap::new(),
            breaker: BreakerState::Armed,
            daily_start_value: initial_portfolio_value,
            high_water_mark: initial_portfolio_value,
        }
    }

    pub fn is_halted(&self) -> bool {
        self.breaker == BreakerState::Tripped
    }

    /// Manual reset of the circuit breaker. Flagged at the call site
    /// (spec §4.8: "manual reset permitted but flagged").
    pub fn reset_breaker(&mut self) {
        if self.breaker == BreakerState::Tripped {
            warn!("circuit breaker manually reset");
            self.breaker = BreakerState::Armed;
        }
    }

    pub fn add_position_stop(&mut self, symbol: &str, entry_price: Decimal, quantity: Decimal, is_long: bool) {
        let kind = if self.config.use_trailing_stops {
            StopKind::TrailingPct
        } else {
            StopKind::FixedPct
        };
        let pct = if kind == StopKind::TrailingPct {
            self.config.trailing_stop_pct
        } else {
            self.config.position_stop_pct
        };
        let stop_price = if is_long {
            entry_price * (Decimal::ONE - pct)
        } else {
            entry_price * (Decimal::ONE + pct)
        };
        self.stops.insert(
            symbol.to_string(),
            PositionStop {
                symbol: symbol.to_string(),
                entry_price,
                stop_price,
                highest_price_seen: entry_price,
                kind,
                is_long,
                quantity,
            },
        );
    }

    pub fn remove_position_stop(&mut self, symbol: &str) {
        self.stops.remove(symbol);
    }

    /// Per-tick protocol (spec §4.6): circuit breaker first (stops and
    /// returns exit-everything if it trips or is already tripped),
    /// then per-position stop evaluation.
    pub fn check(
        &mut self,
        prices: &HashMap<String, Decimal>,
        portfolio_value: Decimal,
        open_symbols: &[String],
    ) -> Vec<Order> {
        if self.is_halted() {
            return self.exit_all_orders(open_symbols);
        }

        if self.config.enable_circuit_breaker {
            if portfolio_value > self.high_water_mark {
                self.high_water_mark = portfolio_value;
            }

            let daily_loss = if self.daily_start_value > Decimal::ZERO {
                (self.daily_start_value - portfolio_value) / self.daily_start_value
            } else {
                Decimal::ZERO
            };
            let drawdown = if self.high_water_mark > Decimal::ZERO {
                (self.high_water_mark - portfolio_value) / self.high_water_mark
            } else {
                Decimal::ZERO
            };

            if daily_loss >= self.config.portfolio_stop_pct || drawdown >= self.config.max_drawdown_pct {
                error!(%daily_loss, %drawdown, "circuit breaker tripped, liquidating all positions");
                self.breaker = BreakerState::Tripped;
                return self.exit_all_orders(open_symbols);
            }
        }

        let mut orders = Vec::new();
        let mut triggered_symbols = Vec::new();

        for (symbol, stop) in self.stops.iter_mut() {
            let Some(&price) = prices.get(symbol) else { continue };
            stop.update_trailing(price, self.config.trailing_stop_pct);
            if stop.is_triggered(price) {
                let side = if stop.is_long { Side::Sell } else { Side::Buy };
                orders.push(Order::market("risk_manager", symbol.clone(), side, stop.quantity, TimeInForce::Day));
                triggered_symbols.push(symbol.clone());
            }
        }

        for symbol in triggered_symbols {
            self.stops.remove(&symbol);
        }

        orders
    }

    fn exit_all_orders(&self, open_symbols: &[String]) -> Vec<Order> {
        open_symbols
            .iter()
            .filter_map(|symbol| {
                self.stops.get(symbol).map(|stop| {
                    let side = if stop.is_long { Side::Sell } else { Side::Buy };
                    Order::market("risk_manager", symbol.clone(), side, stop.quantity, TimeInForce::Day)
                })
            })
            .collect()
    }

    /// Reset the daily-loss baseline at the start of a new trading day.
    pub fn start_new_day(&mut self, portfolio_value: Decimal) {
        self.daily_start_value = portfolio_value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn config() -> StopConfig {
        StopConfig {
            position_stop_pct: dec!(0.05),
            trailing_stop_pct: dec!(0.07),
            portfolio_stop_pct: dec!(0.05),
            max_drawdown_pct: dec!(0.10),
            use_trailing_stops: false,
            enable_circuit_breaker: true,
        }
    }

    #[test]
    fn fixed_stop_triggers_at_threshold() {
        let mut rm = RiskManager::new(config(), dec!(100_000));
        rm.add_position_stop("X", dec!(150), dec!(100), true);
        assert_eq!(rm.stops["X"].stop_price, dec!(142.5));

        let mut prices = HashMap::new();
        prices.insert("X".to_string(), dec!(143));
        let orders = rm.check(&prices, dec!(100_000), &["X".to_string()]);
        assert!(orders.is_empty());

        prices.insert("X".to_string(), dec!(142));
        let orders = rm.check(&prices, dec!(100_000), &["X".to_string()]);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].side, Side::Sell);
        assert!(!rm.stops.contains_key("X"));
    }

    #[test]
    fn trailing_stop_is_monotonic() {
        let mut cfg = config();
        cfg.use_trailing_stops = true;
        let mut rm = RiskManager::new(cfg, dec!(100_000));
        rm.add_position_stop("X", dec!(200), dec!(50), true);
        assert_eq!(rm.stops["X"].stop_price, dec!(186)); // 200 * 0.93

        let mut prices = HashMap::new();
        for p in [dec!(210), dec!(220), dec!(230)] {
            prices.insert("X".to_string(), p);
            rm.check(&prices, dec!(100_000), &["X".to_string()]);
        }
        assert_eq!(rm.stops["X"].stop_price, dec!(213.9)); // 230 * 0.93

        prices.insert("X".to_string(), dec!(213));
        let orders = rm.check(&prices, dec!(100_000), &["X".to_string()]);
        assert_eq!(orders.len(), 1);
    }

    #[test]
    fn circuit_breaker_trips_on_drawdown() {
        let mut rm = RiskManager::new(config(), dec!(100_000));
        rm.add_position_stop("A", dec!(100), dec!(10), true);
        rm.add_position_stop("B", dec!(50), dec!(10), true);
        rm.add_position_stop("C", dec!(75), dec!(10), true);

        let prices = HashMap::new();
        let symbols = vec!["A".to_string(), "B".to_string(), "C".to_string()];

        assert!(rm.check(&prices, dec!(98_000), &symbols).is_empty());
        assert!(rm.check(&prices, dec!(96_000), &symbols).is_empty());
        let orders = rm.check(&prices, dec!(94_000), &symbols);
        assert_eq!(orders.len(), 3);
        assert!(rm.is_halted());
    }

    #[test]
    fn halted_breaker_requires_manual_reset() {
        let mut rm = RiskManager::new(config(), dec!(100_000));
        rm.breaker = BreakerState::Tripped;
        assert!(rm.is_halted());
        rm.reset_breaker();
        assert!(!rm.is_halted());
    }
}
