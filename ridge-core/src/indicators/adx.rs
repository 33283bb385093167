//! Average Directional Index / Directional Indicators.
//!
//! Textbook ADX derives +DM/-DM from bar highs and lows. This engine
//! only sees trade ticks, so +DM/-DM collapse to the up- and down-move
//! of consecutive prices (mirroring the tick-only true-range
//! simplification documented for [`super::atr`]): `+DM = max(price -
//! prev, 0)`, `-DM = max(prev - price, 0)`, `TR = |price - prev|`.
//! Wilder smoothing, DI, DX and ADX are then textbook from there.

use super::to_f64;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalMovement {
    pub plus_di: f64,
    pub minus_di: f64,
    pub adx: f64,
}

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    prev_price: Option<f64>,
    seed_plus_dm: Vec<f64>,
    seed_minus_dm: Vec<f64>,
    seed_tr: Vec<f64>,
    smooth_plus_dm: f64,
    smooth_minus_dm: f64,
    smooth_tr: f64,
    dm_seeded: bool,
    dx_seed: Vec<f64>,
    adx: Option<f64>,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "ADX period must be positive");
        Self {
            period,
            prev_price: None,
            seed_plus_dm: Vec::with_capacity(period),
            seed_minus_dm: Vec::with_capacity(period),
            seed_tr: Vec::with_capacity(period),
            smooth_plus_dm: 0.0,
            smooth_minus_dm: 0.0,
            smooth_tr: 0.0,
            dm_seeded: false,
            dx_seed: Vec::with_capacity(period),
            adx: None,
        }
    }

    pub fn update(&mut self, price: Decimal) -> Option<DirectionalMovement> {
        let price = to_f64(price);
        let prev = match self.prev_price.replace(price) {
            Some(p) => p,
            None => return None,
        };

        let delta = price - prev;
        let plus_dm = delta.max(0.0);
        let minus_dm = (-delta).max(0.0);
        let tr = delta.abs();

        if !self.dm_seeded {
            self.seed_plus_dm.push(plus_dm);
            self.seed_minus_dm.push(minus_dm);
            self.seed_tr.push(tr);
            if self.seed_plus_dm.len() < self.period {
                return None;
            }
            self.smooth_plus_dm = self.seed_plus_dm.iter().sum();
            self.smooth_minus_dm = self.seed_minus_dm.iter().sum();
            self.smooth_tr = self.seed_tr.iter().sum();
            self.dm_seeded = true;
        } else {
            let period_f = self.period as f64;
            self.smooth_plus_dm = self.smooth_plus_dm - self.smooth_plus_dm / period_f + plus_dm;
            self.smooth_minus_dm = self.smooth_minus_dm - self.smooth_minus_dm / period_f + minus_dm;
            self.smooth_tr = self.smooth_tr - self.smooth_tr / period_f + tr;
        }

        let (plus_di, minus_di) = self.di();
        let dx = dx_from_di(plus_di, minus_di);

        match self.adx {
            Some(adx) => {
                let period_f = self.period as f64;
                let adx = (adx * (period_f - 1.0) + dx) / period_f;
                self.adx = Some(adx);
            }
            None => {
                self.dx_seed.push(dx);
                if self.dx_seed.len() < self.period {
                    return None;
                }
                self.adx = Some(self.dx_seed.iter().sum::<f64>() / self.period as f64);
            }
        }

        Some(DirectionalMovement { plus_di, minus_di, adx: self.adx.unwrap() })
    }

    fn di(&self) -> (f64, f64) {
        if self.smooth_tr == 0.0 {
            (0.0, 0.0)
        } else {
            (
                100.0 * self.smooth_plus_dm / self.smooth_tr,
                100.0 * self.smooth_minus_dm / self.smooth_tr,
            )
        }
    }

    pub fn is_ready(&self) -> bool {
        self.adx.is_some()
    }
}

fn dx_from_di(plus_di: f64, minus_di: f64) -> f64 {
    let sum = plus_di + minus_di;
    if sum == 0.0 {
        0.0
    } else {
        100.0 * (plus_di - minus_di).abs() / sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn strong_uptrend_has_adx_above_25() {
        let mut adx = Adx::new(5);
        let mut last = None;
        let mut price = 100i64;
        for _ in 0..40 {
            price += 3;
            last = adx.update(Decimal::from(price));
        }
        assert!(last.unwrap().adx > 25.0);
    }

    #[test]
    fn flat_market_has_adx_near_zero() {
        let mut adx = Adx::new(5);
        let mut last = None;
        for _ in 0..40 {
            last = adx.update(dec!(100));
        }
        assert!(last.unwrap().adx < 1.0);
    }
}
