//! Backtest runner: replay a CSV tick file through the configured
//! strategy (or strategies, fanned out under the adaptive
//! meta-strategy) against the probabilistic matching engine.
//!
//! Grounded on `bog-bins/src/bin/inventory_simulated.rs`'s
//! clap-args + logging-init + engine-run + print-stats bootstrap
//! shape, with the synthetic feed closure replaced by a real CSV
//! reader (grounded on `Verdenroz-finance-query/src/fred/treasury.rs`'s
//! `csv::ReaderBuilder` usage) since this engine replays historical
//! ticks rather than generating synthetic ones.

use anyhow::{Context, Result};
use clap::Parser;
use ridge_bins::common::{init_logging, load_config, load_ticks_csv, print_summary, CommonArgs};
use ridge_core::adaptive::{AdaptiveConfig, AdaptivePortfolio};
use ridge_core::config::Config;
use ridge_core::driver::BacktestDriver;
use ridge_core::matching::MatchingEngine;
use ridge_core::order_manager::{OrderManager, OrderManagerConfig};
use ridge_core::risk::RiskManager;
use ridge_core::strategy::Strategy;
use ridge_core::tick::VecTickSource;

#[derive(Parser, Debug)]
#[command(author, version, about = "Replay a tick file through the Ridge backtest engine")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Path to a CSV tick file with `timestamp,symbol,price` columns
    /// and an optional fourth `volume` column.
    #[arg(short, long)]
    ticks: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args.common)?;
    init_logging(&config);

    tracing::info!(ticks = %args.ticks, "=== Ridge Backtest ===");

    let ticks = load_ticks_csv(&args.ticks)?;
    tracing::info!(count = ticks.len(), "loaded ticks");
    let mut source = VecTickSource::new(ticks);

    let mut strategy = build_strategy(&config)?;

    let order_manager = OrderManager::new(OrderManagerConfig::from(&config.risk));
    let matching_engine = MatchingEngine::new((&config.matching).into(), config.matching.seed);
    let risk_manager = RiskManager::new((&config.stops).into(), config.execution.initial_cash);

    let mut driver = BacktestDriver::new(
        config.execution.initial_cash,
        order_manager,
        matching_engine,
        risk_manager,
        config.execution.equity_record_every,
        config.execution.max_ticks,
    );

    let result = driver.run(&mut source, strategy.as_mut())?;

    tracing::info!(
        total_ticks = result.total_ticks,
        submitted = result.orders_submitted,
        rejected = result.orders_rejected,
        cancelled = result.orders_cancelled,
        "backtest finished"
    );
    print_summary(&result.performance);

    Ok(())
}

/// Build the configured strategy. A single `active` entry runs
/// directly; more than one is fanned out under the adaptive
/// meta-strategy (spec §4.8), which requires `[adaptive]` in config.
fn build_strategy(config: &Config) -> Result<Box<dyn Strategy>> {
    let names = &config.strategy.active;
    anyhow::ensure!(!names.is_empty(), "strategy.active must name at least one strategy");

    if names.len() == 1 {
        return resolve_strategy(config, &names[0]);
    }

    let sub_strategies: Vec<Box<dyn Strategy>> = names
        .iter()
        .map(|name| resolve_strategy(config, name))
        .collect::<Result<_>>()?;

    let adaptive_config = config
        .adaptive
        .as_ref()
        .context("strategy.active names more than one strategy but [adaptive] is missing from config")?;
    Ok(Box::new(AdaptivePortfolio::new(
        AdaptiveConfig::from(adaptive_config),
        sub_strategies,
    )))
}

/// Resolve one strategy by name, applying its parameter bundle from
/// `[strategy.params.<name>]` if one is configured (spec §6).
fn resolve_strategy(config: &Config, name: &str) -> Result<Box<dyn Strategy>> {
    let params = config.strategy.params.get(name);
    ridge_strategies::by_name(name, params)
        .with_context(|| format!("unknown strategy '{name}'"))?
        .with_context(|| format!("invalid params for strategy '{name}'"))
}
