//! Shared helpers used across the concrete strategy implementations:
//! the long-only entry/exit gate (spec §9 Open Question 3) and a small
//! crossover-edge tracker so each strategy only fires once on the tick
//! a signal transitions, not on every tick the condition continues to
//! hold.

use rust_decimal::Decimal;

/// A strategy only opens a long position when flat or short-covering
/// isn't held — i.e. `current_qty <= 0`. Preserves the teacher-era
/// long-only quirk documented in the spec rather than "fixing" it.
pub fn entry_allowed(current_qty: Decimal) -> bool {
    current_qty <= Decimal::ZERO
}

/// A strategy only emits an exit when it is actually holding a long.
pub fn exit_allowed(current_qty: Decimal) -> bool {
    current_qty > Decimal::ZERO
}

/// Three-state signal used to detect the tick a crossover condition
/// first becomes true, distinguishing "just crossed" from "still
/// crossed from three ticks ago".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Signal {
    #[default]
    Neutral,
    Bullish,
    Bearish,
}

impl Signal {
    /// Returns `true` exactly once per transition into `Bullish`.
    pub fn edge_bullish(&mut self, condition: bool) -> bool {
        let fired = condition && *self != Signal::Bullish;
        if condition {
            *self = Signal::Bullish;
        } else if *self == Signal::Bullish {
            *self = Signal::Neutral;
        }
        fired
    }

    /// Returns `true` exactly once per transition into `Bearish`.
    pub fn edge_bearish(&mut self, condition: bool) -> bool {
        let fired = condition && *self != Signal::Bearish;
        if condition {
            *self = Signal::Bearish;
        } else if *self == Signal::Bearish {
            *self = Signal::Neutral;
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn entry_exit_gates_are_long_only() {
        assert!(entry_allowed(dec!(0)));
        assert!(entry_allowed(dec!(-5)));
        assert!(!entry_allowed(dec!(5)));
        assert!(exit_allowed(dec!(5)));
        assert!(!exit_allowed(dec!(0)));
    }

    #[test]
    fn signal_fires_once_per_crossing() {
        let mut signal = Signal::default();
        assert!(signal.edge_bullish(true));
        assert!(!signal.edge_bullish(true));
        assert!(!signal.edge_bullish(false));
        assert!(signal.edge_bullish(true));
    }
}
