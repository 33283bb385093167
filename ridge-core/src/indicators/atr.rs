//! Average True Range, Wilder-smoothed.
//!
//! This engine only ever sees trade ticks `(timestamp, symbol, price,
//! volume)`, never OHLC bars, so there is no high/low/close triple to
//! compute a textbook True Range from. Per the documented open question
//! in DESIGN.md, true range is simplified to the absolute price delta
//! between consecutive ticks: `TR_t = |price_t - price_{t-1}|`. Wilder
//! smoothing is then applied exactly as it would be to a bar-based TR
//! series.

use super::to_f64;
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    prev_price: Option<f64>,
    seed: Vec<f64>,
    value: Option<f64>,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "ATR period must be positive");
        Self {
            period,
            prev_price: None,
            seed: Vec::with_capacity(period),
            value: None,
        }
    }

    pub fn update(&mut self, price: Decimal) -> Option<f64> {
        let price = to_f64(price);
        let prev = match self.prev_price.replace(price) {
            Some(p) => p,
            None => return None,
        };
        let tr = (price - prev).abs();

        match self.value {
            Some(atr) => {
                let period_f = self.period as f64;
                let atr = (atr * (period_f - 1.0) + tr) / period_f;
                self.value = Some(atr);
                Some(atr)
            }
            None => {
                self.seed.push(tr);
                if self.seed.len() < self.period {
                    return None;
                }
                let seed = self.seed.iter().sum::<f64>() / self.period as f64;
                self.value = Some(seed);
                Some(seed)
            }
        }
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
    fn constant_deltas_converge_to_that_delta() {
        let mut atr = Atr::new(3);
        let prices = [dec!(100), dec!(105), dec!(110), dec!(115), dec!(120), dec!(125)];
        let mut last = None;
        for p in prices {
            last = atr.update(p);
        }
        assert!((last.unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn zero_on_first_tick() {
        let mut atr = Atr::new(3);
        assert_eq!(atr.update(dec!(100)), None);
    }
}
