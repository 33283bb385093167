//! MACD: fast EMA minus slow EMA, with an EMA-of-the-difference signal
//! line and the resulting histogram.

use super::ema::Ema;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdValue {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        assert!(fast_period < slow_period, "MACD fast period must be shorter than slow period");
        Self {
            fast: Ema::new(fast_period),
            slow: Ema::new(slow_period),
            signal: Ema::new(signal_period),
        }
    }

    pub fn update(&mut self, price: Decimal) -> Option<MacdValue> {
        let fast = self.fast.update(price);
        let slow = self.slow.update(price);
        let (fast, slow) = (fast?, slow?);
        let macd_line = fast - slow;

        let signal = self.signal.update(Decimal::try_from(macd_line).unwrap_or(Decimal::ZERO))?;
        Some(MacdValue {
            macd: macd_line,
            signal,
            histogram: macd_line - signal,
        })
    }

    pub fn is_ready(&self) -> bool {
        self.signal.is_ready()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn warms_up_through_all_three_emas() {
        let mut macd = Macd::new(3, 6, 4);
        let mut last = None;
        for i in 1..=20 {
            last = macd.update(Decimal::from(i));
        }
        assert!(last.is_some());
    }

    #[test]
    fn uptrend_has_positive_macd() {
        let mut macd = Macd::new(3, 6, 4);
        let mut last = None;
        for i in 1..=30 {
            last = macd.update(Decimal::from(i));
        }
        assert!(last.unwrap().macd > 0.0);
    }
}
