//! Benchmark: streaming indicator update overhead.
//!
//! What's measured:
//! - `Sma`/`Ema`/`Rsi`/`Bollinger`/`Macd` `observe`/`update` cost on a
//!   warmed-up state block (the steady-state tick path, spec §9).
//!
//! Why this matters: every sub-strategy runs its own indicator stack on
//! every tick; warmed-up updates must stay O(1) ring-buffer arithmetic,
//! never a rescan of history.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ridge_core::indicators::{Bollinger, Ema, Macd, Rsi, Sma};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn warm_sma() -> Sma {
    let mut sma = Sma::new(20);
    for i in 0..20 {
        sma.update(dec!(100) + Decimal::from(i));
    }
    sma
}

fn warm_ema() -> Ema {
    let mut ema = Ema::new(20);
    for i in 0..20 {
        ema.update(dec!(100) + Decimal::from(i));
    }
    ema
}

fn warm_rsi() -> Rsi {
    let mut rsi = Rsi::new(14);
    for i in 0..30 {
        rsi.update(dec!(100) + Decimal::from(i % 5));
    }
    rsi
}

fn warm_bollinger() -> Bollinger {
    let mut b = Bollinger::new(20, 2.0);
    for i in 0..20 {
        b.update(dec!(100) + Decimal::from(i));
    }
    b
}

fn warm_macd() -> Macd {
    let mut m = Macd::new(12, 26, 9);
    for i in 0..40 {
        m.update(dec!(100) + Decimal::from(i % 7));
    }
    m
}

fn bench_sma_update(c: &mut Criterion) {
    let mut sma = warm_sma();
    c.bench_function("sma_update_warmed", |b| {
        b.iter(|| black_box(sma.update(black_box(dec!(101)))));
    });
}

fn bench_ema_update(c: &mut Criterion) {
    let mut ema = warm_ema();
    c.bench_function("ema_update_warmed", |b| {
        b.iter(|| black_box(ema.update(black_box(dec!(101)))));
    });
}

fn bench_rsi_update(c: &mut Criterion) {
    let mut rsi = warm_rsi();
    c.bench_function("rsi_update_warmed", |b| {
        b.iter(|| black_box(rsi.update(black_box(dec!(102)))));
    });
}

fn bench_bollinger_update(c: &mut Criterion) {
    let mut b = warm_bollinger();
    c.bench_function("bollinger_update_warmed", |bench| {
        bench.iter(|| black_box(b.update(black_box(dec!(101)))));
    });
}

fn bench_macd_update(c: &mut Criterion) {
    let mut m = warm_macd();
    c.bench_function("macd_update_warmed", |b| {
        b.iter(|| black_box(m.update(black_box(dec!(103)))));
    });
}

criterion_group!(
    benches,
    bench_sma_update,
    bench_ema_update,
    bench_rsi_update,
    bench_bollinger_update,
    bench_macd_update,
);
criterion_main!(benches);
