//! Opening range breakout: mark the high/low of the first
//! `range_minutes` of each trading day, buy a breakout above it, and
//! force-flatten the position at a fixed time of day.
//!
//! Grounded on `original_source/.../strategies/opening_range_breakout.py`:
//! `range_minutes=30`, `breakout_buffer=0.001`,
//! `min_range_pct=0.003`/`max_range_pct=0.03` (a too-tight or too-wide
//! opening range aborts the day rather than trading it),
//! `exit_hour=15`, `exit_minute=45` (UTC wall clock, matching the
//! `chrono::Utc` timestamps ticks carry through the engine).

use chrono::{DateTime, Datelike, Timelike, Utc};
use ridge_core::order::{Order, Side, TimeInForce};
use ridge_core::strategy::{size_order, PortfolioSnapshot, Strategy};
use ridge_core::tick::Tick;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use crate::common::exit_allowed;

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct OpeningRangeConfig {
    pub range_minutes: i64,
    pub breakout_buffer: f64,
    pub min_range_pct: f64,
    pub max_range_pct: f64,
    pub exit_hour: u32,
    pub exit_minute: u32,
    pub position_size: Decimal,
    pub max_position: Decimal,
}

impl Default for OpeningRangeConfig {
    fn default() -> Self {
        Self {
            range_minutes: 30,
            breakout_buffer: 0.001,
            min_range_pct: 0.003,
            max_range_pct: 0.03,
            exit_hour: 15,
            exit_minute: 45,
            position_size: dec!(10000),
            max_position: dec!(100),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DayPhase {
    BuildingRange,
    /// The range was outside `[min_range_pct, max_range_pct]`; skip
    /// the rest of the day.
    Aborted,
    Trading,
    Done,
}

struct SymbolState {
    day: Option<chrono::NaiveDate>,
    phase: DayPhase,
    range_start: Option<DateTime<Utc>>,
    high: f64,
    low: f64,
    entered: bool,
}

impl SymbolState {
    fn new() -> Self {
        Self {
            day: None,
            phase: DayPhase::BuildingRange,
            range_start: None,
            high: f64::MIN,
            low: f64::MAX,
            entered: false,
        }
    }
}

/// Per-symbol, per-day opening-range breakout. Ticks must carry a
/// UTC-comparable `SystemTime`; this strategy converts each to
/// [`chrono::DateTime<Utc>`] to determine the calendar day and minute.
pub struct OpeningRangeBreakout {
    config: OpeningRangeConfig,
    state: HashMap<String, SymbolState>,
}

impl OpeningRangeBreakout {
    pub fn new(config: OpeningRangeConfig) -> Self {
        Self {
            config,
            state: HashMap::new(),
        }
    }
}

impl Strategy for OpeningRangeBreakout {
    fn name(&self) -> &str {
        "opening_range_breakout"
    }

    fn on_tick(&mut self, tick: &Tick, portfolio: &PortfolioSnapshot) -> anyhow::Result<Vec<Order>> {
        let now: DateTime<Utc> = tick.timestamp.into();
        let price = tick.price.to_f64().unwrap_or(0.0);
        let state = self.state.entry(tick.symbol.clone()).or_insert_with(SymbolState::new);

        if state.day != Some(now.date_naive()) {
            *state = SymbolState::new();
            state.day = Some(now.date_naive());
            state.range_start = Some(now);
        }

        let qty = portfolio.position_quantity(&tick.symbol);
        let mut orders = Vec::new();
        let is_exit_time = now.hour() > self.config.exit_hour
            || (now.hour() == self.config.exit_hour && now.minute() >= self.config.exit_minute);

        if is_exit_time && state.phase != DayPhase::Done {
            state.phase = DayPhase::Done;
            if exit_allowed(qty) {
                orders.push(Order::market(self.name(), &tick.symbol, Side::Sell, qty, TimeInForce::Day));
            }
            return Ok(orders);
        }

        match state.phase {
            DayPhase::Done | DayPhase::Aborted => {}
            DayPhase::BuildingRange => {
                state.high = state.high.max(price);
                state.low = state.low.min(price);
                let elapsed = now - state.range_start.unwrap_or(now);
                if elapsed.num_minutes() >= self.config.range_minutes {
                    let range_pct = if state.low > 0.0 {
                        (state.high - state.low) / state.low
                    } else {
                        0.0
                    };
                    if range_pct < self.config.min_range_pct || range_pct > self.config.max_range_pct {
                        state.phase = DayPhase::Aborted;
                    } else {
                        state.phase = DayPhase::Trading;
                    }
                }
            }
            DayPhase::Trading => {
                let breakout_level = state.high * (1.0 + self.config.breakout_buffer);
                if !state.entered && price >= breakout_level {
                    let size = size_order(self.config.position_size, tick.price, self.config.max_position);
                    if size > Decimal::ZERO {
                        orders.push(Order::market(self.name(), &tick.symbol, Side::Buy, size, TimeInForce::Day));
                        state.entered = true;
                    }
                } else if state.entered && exit_allowed(qty) && price <= state.low {
                    orders.push(Order::market(self.name(), &tick.symbol, Side::Sell, qty, TimeInForce::Day));
                    state.entered = false;
                }
            }
        }
        Ok(orders)
    }

    fn warmup_done(&self, symbol: &str) -> bool {
        self.state
            .get(symbol)
            .map(|s| matches!(s.phase, DayPhase::Trading | DayPhase::Done))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_opening_range_parameters() {
        let config = OpeningRangeConfig::default();
        assert_eq!(config.range_minutes, 30);
        assert_eq!(config.exit_hour, 15);
        assert_eq!(config.exit_minute, 45);
    }
}
