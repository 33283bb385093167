//! Stochastic oscillator: %K over a lookback window, %D as its SMA,
//! with an optional slow-stochastic smoothing pass on %K before %D.

use super::to_f64;
use rust_decimal::Decimal;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochasticValue {
    pub percent_k: f64,
    pub percent_d: f64,
}

#[derive(Debug, Clone)]
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
    slow_period: usize,
    window: VecDeque<f64>,
    raw_k_history: VecDeque<f64>,
    slow_k_history: VecDeque<f64>,
}

impl Stochastic {
    /// `slow_period == 1` yields the fast stochastic (raw %K feeds %D
    /// directly); `slow_period > 1` smooths %K before it feeds %D,
    /// i.e. the "slow stochastic".
    pub fn new(k_period: usize, d_period: usize, slow_period: usize) -> Self {
        assert!(k_period > 0 && d_period > 0 && slow_period > 0);
        Self {
            k_period,
            d_period,
            slow_period,
            window: VecDeque::with_capacity(k_period),
            raw_k_history: VecDeque::with_capacity(slow_period),
            slow_k_history: VecDeque::with_capacity(d_period),
        }
    }

    pub fn update(&mut self, price: Decimal) -> Option<StochasticValue> {
        let price = to_f64(price);
        self.window.push_back(price);
        if self.window.len() > self.k_period {
            self.window.pop_front();
        }
        if self.window.len() < self.k_period {
            return None;
        }

        let lo = self.window.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = self.window.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let raw_k = if hi > lo { 100.0 * (price - lo) / (hi - lo) } else { 50.0 };

        self.raw_k_history.push_back(raw_k);
        if self.raw_k_history.len() > self.slow_period {
            self.raw_k_history.pop_front();
        }
        if self.raw_k_history.len() < self.slow_period {
            return None;
        }
        let smoothed_k =
            self.raw_k_history.iter().sum::<f64>() / self.raw_k_history.len() as f64;

        self.slow_k_history.push_back(smoothed_k);
        if self.slow_k_history.len() > self.d_period {
            self.slow_k_history.pop_front();
        }
        if self.slow_k_history.len() < self.d_period {
            return None;
        }
        let percent_d =
            self.slow_k_history.iter().sum::<f64>() / self.slow_k_history.len() as f64;

        Some(StochasticValue { percent_k: smoothed_k, percent_d })
    }

    pub fn is_ready(&self) -> bool {
        self.slow_k_history.len() >= self.d_period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn price_at_window_high_gives_k_100() {
        let mut s = Stochastic::new(3, 2, 1);
        s.update(dec!(10));
        s.update(dec!(5));
        let v = s.update(dec!(20)).unwrap();
        assert!((v.percent_k - 100.0).abs() < 1e-9);
    }

    #[test]
    fn price_at_window_low_gives_k_0() {
        let mut s = Stochastic::new(3, 2, 1);
        s.update(dec!(10));
        s.update(dec!(20));
        let v = s.update(dec!(5)).unwrap();
        assert!(v.percent_k.abs() < 1e-9);
    }

    #[test]
    fn range_bound() {
        let mut s = Stochastic::new(5, 3, 3);
        let prices = [10, 15, 12, 18, 20, 9, 14, 22, 8, 16];
        for p in prices {
            if let Some(v) = s.update(Decimal::from(p)) {
                assert!((0.0..=100.0).contains(&v.percent_k));
                assert!((0.0..=100.0).contains(&v.percent_d));
            }
        }
    }
}
