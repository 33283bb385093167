//! Donchian channel: rolling max/min over two independent lookback
//! horizons, one for entries and one for (typically tighter) exits.

use super::to_f64;
use rust_decimal::Decimal;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DonchianChannel {
    pub entry_high: f64,
    pub entry_low: f64,
    pub exit_high: f64,
    pub exit_low: f64,
}

#[derive(Debug, Clone)]
pub struct Donchian {
    entry_period: usize,
    exit_period: usize,
    window: VecDeque<f64>,
}

impl Donchian {
    pub fn new(entry_period: usize, exit_period: usize) -> Self {
        assert!(entry_period > 0 && exit_period > 0);
        let capacity = entry_period.max(exit_period);
        Self {
            entry_period,
            exit_period,
            window: VecDeque::with_capacity(capacity),
        }
    }

    pub fn update(&mut self, price: Decimal) -> Option<DonchianChannel> {
        let price = to_f64(price);
        let capacity = self.entry_period.max(self.exit_period);
        self.window.push_back(price);
        if self.window.len() > capacity {
            self.window.pop_front();
        }
        self.value()
    }

    pub fn value(&self) -> Option<DonchianChannel> {
        if self.window.len() < self.entry_period.min(self.exit_period) {
            return None;
        }
        let len = self.window.len();

        let entry_slice_start = len.saturating_sub(self.entry_period);
        let exit_slice_start = len.saturating_sub(self.exit_period);

        let (entry_high, entry_low) = min_max(self.window.iter().skip(entry_slice_start));
        let (exit_high, exit_low) = min_max(self.window.iter().skip(exit_slice_start));

        Some(DonchianChannel { entry_high, entry_low, exit_high, exit_low })
    }

    pub fn is_ready(&self) -> bool {
        self.window.len() >= self.entry_period.min(self.exit_period)
    }
}

fn min_max<'a>(iter: impl Iterator<Item = &'a f64>) -> (f64, f64) {
    let mut hi = f64::NEG_INFINITY;
    let mut lo = f64::INFINITY;
    for &v in iter {
        hi = hi.max(v);
        lo = lo.min(v);
    }
    (hi, lo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn tracks_rolling_high_low() {
        let mut d = Donchian::new(3, 2);
        d.update(dec!(10));
        d.update(dec!(30));
        let c = d.update(dec!(20)).unwrap();
        assert_eq!(c.entry_high, 30.0);
        assert_eq!(c.entry_low, 10.0);
        assert_eq!(c.exit_high, 30.0);
        assert_eq!(c.exit_low, 20.0);
    }

    #[test]
    fn exit_window_can_be_tighter_than_entry() {
        let mut d = Donchian::new(5, 1);
        for p in [dec!(1), dec!(2), dec!(3), dec!(4)] {
            d.update(p);
        }
        let c = d.update(dec!(99)).unwrap();
        assert_eq!(c.exit_high, 99.0);
        assert_eq!(c.exit_low, 99.0);
        assert_eq!(c.entry_high, 99.0);
        assert_eq!(c.entry_low, 1.0);
    }
}
