//! Exponential moving average, seeded with the SMA of the first window.

use super::to_f64;
use rust_decimal::Decimal;
use std::collections::VecDeque;

/// EMA(period): seeded with the SMA of the first `period` prices, then
/// `ema <- ema + alpha * (price - ema)` with `alpha = 2 / (period + 1)`.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    alpha: f64,
    seed_window: VecDeque<f64>,
    seed_sum: f64,
    value: Option<f64>,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "EMA period must be positive");
        Self {
            period,
            alpha: 2.0 / (period as f64 + 1.0),
            seed_window: VecDeque::with_capacity(period),
            seed_sum: 0.0,
            value: None,
        }
    }

    pub fn update(&mut self, price: Decimal) -> Option<f64> {
        let price = to_f64(price);

        if let Some(ema) = self.value {
            let ema = ema + self.alpha * (price - ema);
            self.value = Some(ema);
            return Some(ema);
        }

        self.seed_window.push_back(price);
        self.seed_sum += price;
        if self.seed_window.len() == self.period {
            let seed = self.seed_sum / self.period as f64;
            self.value = Some(seed);
            return Some(seed);
        }
        None
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn is_ready(&self) -> bool {
        self.value.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn seeds_with_sma_then_smooths() {
        let mut ema = Ema::new(3);
        assert_eq!(ema.update(dec!(2)), None);
        assert_eq!(ema.update(dec!(4)), None);
        assert_eq!(ema.update(dec!(6)), Some(4.0));

        let alpha = 2.0 / 4.0;
        let expected = 8.0 * alpha + 4.0 * (1.0 - alpha);
        let got = ema.update(dec!(8)).unwrap();
        assert!((got - expected).abs() < 1e-12);
    }

    #[test]
    fn not_ready_until_seeded() {
        let mut ema = Ema::new(5);
        for _ in 0..4 {
            ema.update(dec!(1));
        }
        assert!(!ema.is_ready());
    }
}
