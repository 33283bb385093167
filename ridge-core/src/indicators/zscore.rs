//! Rolling z-score: `(price - mean) / sigma` over a fixed window.

use super::to_f64;
use rust_decimal::Decimal;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct ZScore {
    period: usize,
    window: VecDeque<f64>,
}

impl ZScore {
    pub fn new(period: usize) -> Self {
        assert!(period > 1, "z-score window must be at least 2");
        Self {
            period,
            window: VecDeque::with_capacity(period),
        }
    }

    pub fn update(&mut self, price: Decimal) -> Option<f64> {
        let price = to_f64(price);
        self.window.push_back(price);
        if self.window.len() > self.period {
            self.window.pop_front();
        }
        self.value()
    }

    pub fn value(&self) -> Option<f64> {
        if self.window.len() < self.period {
            return None;
        }
        let n = self.period as f64;
        let mean = self.window.iter().sum::<f64>() / n;
        let variance = self.window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let sigma = variance.sqrt();
        let last = *self.window.back().unwrap();
        if sigma == 0.0 {
            Some(0.0)
        } else {
            Some((last - mean) / sigma)
        }
    }

    pub fn is_ready(&self) -> bool {
        self.window.len() >= self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn flat_series_has_zero_score() {
        let mut z = ZScore::new(4);
        let mut last = None;
        for _ in 0..4 {
            last = z.update(dec!(100));
        }
        assert_eq!(last, Some(0.0));
    }

    #[test]
    fn extreme_price_scores_far_from_zero() {
        let mut z = ZScore::new(4);
        z.update(dec!(10));
        z.update(dec!(10));
        z.update(dec!(10));
        let v = z.update(dec!(1000)).unwrap();
        assert!(v > 1.0);
    }
}
