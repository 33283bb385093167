//! Simple moving average over a fixed-size rolling window.

use super::to_f64;
use rust_decimal::Decimal;
use std::collections::VecDeque;

/// Simple moving average of the last `period` prices.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    window: VecDeque<f64>,
    sum: f64,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "SMA period must be positive");
        Self {
            period,
            window: VecDeque::with_capacity(period),
            sum: 0.0,
        }
    }

    /// Feed the next price. Returns `None` until `period` prices have
    /// been observed.
    pub fn update(&mut self, price: Decimal) -> Option<f64> {
        let price = to_f64(price);
        self.window.push_back(price);
        self.sum += price;
        if self.window.len() > self.period {
            self.sum -= self.window.pop_front().unwrap();
        }
        self.value()
    }

    /// Current average, if warmed up.
    pub fn value(&self) -> Option<f64> {
        if self.window.len() < self.period {
            None
        } else {
            Some(self.sum / self.period as f64)
        }
    }

    pub fn is_ready(&self) -> bool {
        self.window.len() >= self.period
    }

    pub fn window(&self) -> &VecDeque<f64> {
        &self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn warms_up_before_producing_a_value() {
        let mut sma = Sma::new(3);
        assert_eq!(sma.update(dec!(1)), None);
        assert_eq!(sma.update(dec!(2)), None);
        assert_eq!(sma.update(dec!(3)), Some(2.0));
    }

    #[test]
    fn slides_the_window() {
        let mut sma = Sma::new(2);
        sma.update(dec!(10));
        assert_eq!(sma.update(dec!(20)), Some(15.0));
        assert_eq!(sma.update(dec!(30)), Some(25.0));
    }
}
