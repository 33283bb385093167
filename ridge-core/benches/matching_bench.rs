//! Benchmark: probabilistic matching-engine throughput (spec §4.4).
//!
//! What's measured: `MatchingEngine::execute` end to end — the
//! fill/partial/cancel draw, cost-model arithmetic, and `Order`/`Trade`
//! construction — for both order types, since every accepted order in
//! a backtest passes through this exactly once.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ridge_core::matching::{MatchingConfig, MatchingEngine};
use ridge_core::order::{Order, Side, TimeInForce};
use rust_decimal_macros::dec;

fn realistic_config() -> MatchingConfig {
    MatchingConfig {
        fill_probability: 0.85,
        partial_fill_probability: 0.10,
        cancel_probability: 0.05,
        market_impact: 0.0002,
        commission_per_share: dec!(0.005),
        commission_min: dec!(1.0),
        bid_ask_spread_bps: 5.0,
        sec_fee_rate: 0.0000278,
        liquidity_impact_factor: 0.0001,
    }
}

fn bench_market_order_execute(c: &mut Criterion) {
    let mut engine = MatchingEngine::new(realistic_config(), Some(42));
    c.bench_function("matching_engine_market_order", |b| {
        b.iter(|| {
            let mut order = Order::market("sma_crossover", "AAPL", Side::Buy, dec!(100), TimeInForce::Day);
            black_box(engine.execute(black_box(&mut order), black_box(dec!(150.25))));
        });
    });
}

fn bench_limit_order_execute(c: &mut Criterion) {
    let mut engine = MatchingEngine::new(realistic_config(), Some(42));
    c.bench_function("matching_engine_limit_order", |b| {
        b.iter(|| {
            let mut order = Order::limit("sma_crossover", "AAPL", Side::Sell, dec!(100), dec!(150.00), TimeInForce::Day);
            black_box(engine.execute(black_box(&mut order), black_box(dec!(150.25))));
        });
    });
}

criterion_group!(benches, bench_market_order_execute, bench_limit_order_execute);
criterion_main!(benches);
