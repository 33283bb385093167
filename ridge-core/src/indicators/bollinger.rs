//! Bollinger Bands: SMA(W) with bands at +/- k rolling sample standard
//! deviations.

use super::to_f64;
use rust_decimal::Decimal;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// Fraction of the band the last price sits at: 0.0 at the lower
    /// band, 1.0 at the upper band. Used by %B-style mean-reversion
    /// strategies.
    pub percent_b: f64,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    k: f64,
    window: VecDeque<f64>,
}

impl Bollinger {
    pub fn new(period: usize, k: f64) -> Self {
        assert!(period > 0, "Bollinger period must be positive");
        Self {
            period,
            k,
            window: VecDeque::with_capacity(period),
        }
    }

    pub fn update(&mut self, price: Decimal) -> Option<BollingerBands> {
        let price = to_f64(price);
        self.window.push_back(price);
        if self.window.len() > self.period {
            self.window.pop_front();
        }
        self.value()
    }

    pub fn value(&self) -> Option<BollingerBands> {
        if self.window.len() < self.period {
            return None;
        }
        let n = self.period as f64;
        let middle = self.window.iter().sum::<f64>() / n;
        let variance = self.window.iter().map(|x| (x - middle).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();
        let upper = middle + self.k * std_dev;
        let lower = middle - self.k * std_dev;
        let last = *self.window.back().unwrap();
        let percent_b = if upper > lower { (last - lower) / (upper - lower) } else { 0.5 };
        Some(BollingerBands { upper, middle, lower, percent_b })
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
    fn flat_series_has_zero_width() {
        let mut bb = Bollinger::new(5, 2.0);
        let mut last = None;
        for _ in 0..5 {
            last = bb.update(dec!(100));
        }
        let bands = last.unwrap();
        assert!((bands.upper - bands.lower).abs() < 1e-9);
        assert!((bands.middle - 100.0).abs() < 1e-9);
    }

    #[test]
    fn bands_widen_with_volatility() {
        let mut bb = Bollinger::new(4, 2.0);
        let mut last = None;
        for p in [dec!(10), dec!(90), dec!(10), dec!(90)] {
            last = bb.update(p);
        }
        let bands = last.unwrap();
        assert!(bands.upper > bands.middle);
        assert!(bands.lower < bands.middle);
    }

    #[test]
    fn percent_b_at_upper_band_is_one() {
        let mut bb = Bollinger::new(3, 1.0);
        bb.update(dec!(10));
        bb.update(dec!(10));
        let bands = bb.update(dec!(20)).unwrap();
        assert!(bands.percent_b > 0.5);
    }
}
