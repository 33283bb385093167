//! Volume-weighted average price, with an optional periodic reset.

use super::to_f64;
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct Vwap {
    reset_every: Option<usize>,
    count: usize,
    cum_price_volume: f64,
    cum_volume: f64,
}

impl Vwap {
    pub fn new(reset_every: Option<usize>) -> Self {
        Self {
            reset_every,
            count: 0,
            cum_price_volume: 0.0,
            cum_volume: 0.0,
        }
    }

    pub fn update(&mut self, price: Decimal, volume: Decimal) -> Option<f64> {
        if let Some(n) = self.reset_every {
            if self.count >= n {
                self.cum_price_volume = 0.0;
                self.cum_volume = 0.0;
                self.count = 0;
            }
        }

        let price = to_f64(price);
        let volume = to_f64(volume);
        self.cum_price_volume += price * volume;
        self.cum_volume += volume;
        self.count += 1;

        self.value()
    }

    pub fn value(&self) -> Option<f64> {
        if self.cum_volume > 0.0 {
            Some(self.cum_price_volume / self.cum_volume)
        } else {
            None
        }
    }

    pub fn is_ready(&self) -> bool {
        self.cum_volume > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn weights_by_volume() {
        let mut vwap = Vwap::new(None);
        vwap.update(dec!(10), dec!(100));
        let v = vwap.update(dec!(20), dec!(100)).unwrap();
        assert!((v - 15.0).abs() < 1e-9);
    }

    #[test]
    fn zero_volume_yields_no_value() {
        let mut vwap = Vwap::new(None);
        assert_eq!(vwap.update(dec!(10), dec!(0)), None);
    }

    #[test]
    fn resets_after_n_observations() {
        let mut vwap = Vwap::new(Some(2));
        vwap.update(dec!(10), dec!(1));
        vwap.update(dec!(10), dec!(1));
        let v = vwap.update(dec!(50), dec!(1)).unwrap();
        assert!((v - 50.0).abs() < 1e-9);
    }
}
