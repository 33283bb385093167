//! Wilder's RSI: tracks two smoothed averages (avg_gain, avg_loss) over
//! consecutive price deltas.

use super::to_f64;
use rust_decimal::Decimal;

/// Relative Strength Index with Wilder smoothing (spec §4.1).
///
/// `RSI = 100 - 100 / (1 + avg_gain / avg_loss)`. If `avg_loss == 0`,
/// RSI is 100 when there have been gains, or 50 if the market has been
/// perfectly flat.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    prev_price: Option<f64>,
    seed_gains: Vec<f64>,
    seed_losses: Vec<f64>,
    avg_gain: f64,
    avg_loss: f64,
    seeded: bool,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "RSI period must be positive");
        Self {
            period,
            prev_price: None,
            seed_gains: Vec::with_capacity(period),
            seed_losses: Vec::with_capacity(period),
            avg_gain: 0.0,
            avg_loss: 0.0,
            seeded: false,
        }
    }

    pub fn update(&mut self, price: Decimal) -> Option<f64> {
        let price = to_f64(price);

        let prev = match self.prev_price.replace(price) {
            Some(p) => p,
            None => return None,
        };

        let delta = price - prev;
        let gain = delta.max(0.0);
        let loss = (-delta).max(0.0);

        if !self.seeded {
            self.seed_gains.push(gain);
            self.seed_losses.push(loss);
            if self.seed_gains.len() < self.period {
                return None;
            }
            self.avg_gain = self.seed_gains.iter().sum::<f64>() / self.period as f64;
            self.avg_loss = self.seed_losses.iter().sum::<f64>() / self.period as f64;
            self.seeded = true;
        } else {
            let period_f = self.period as f64;
            self.avg_gain = (self.avg_gain * (period_f - 1.0) + gain) / period_f;
            self.avg_loss = (self.avg_loss * (period_f - 1.0) + loss) / period_f;
        }

        Some(self.rsi())
    }

    fn rsi(&self) -> f64 {
        if self.avg_loss == 0.0 {
            if self.avg_gain == 0.0 {
                50.0
            } else {
                100.0
            }
        } else {
            let rs = self.avg_gain / self.avg_loss;
            100.0 - 100.0 / (1.0 + rs)
        }
    }

    pub fn is_ready(&self) -> bool {
        self.seeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn all_gains_saturates_at_100() {
        let mut rsi = Rsi::new(3);
        let mut last = None;
        for p in [dec!(1), dec!(2), dec!(3), dec!(4), dec!(5)] {
            last = rsi.update(p);
        }
        assert_eq!(last, Some(100.0));
    }

    #[test]
    fn flat_market_is_neutral() {
        let mut rsi = Rsi::new(3);
        let mut last = None;
        for _ in 0..6 {
            last = rsi.update(dec!(100));
        }
        assert_eq!(last, Some(50.0));
    }

    #[test]
    fn warmup_requires_period_deltas() {
        let mut rsi = Rsi::new(14);
        for i in 0..14 {
            assert_eq!(rsi.update(Decimal::from(100 + i)), None);
        }
        assert!(rsi.update(Decimal::from(115)).is_some());
    }

    #[test]
    fn range_bound() {
        let mut rsi = Rsi::new(5);
        let prices = [44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42];
        for p in prices {
            if let Some(v) = rsi.update(Decimal::try_from(p).unwrap()) {
                assert!((0.0..=100.0).contains(&v));
            }
        }
    }
}
