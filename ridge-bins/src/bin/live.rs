//! Live runner: push ticks from a feed file through the configured
//! strategy against a paper brokerage, honoring graceful shutdown.
//!
//! The live venue transport itself (HTTP/WebSocket) is out of scope
//! (spec §1); this binary drives [`ridge_core::driver::LiveDriver`]
//! with [`ridge_core::brokerage::PaperBrokerage`] standing in for a
//! real venue, fed from the same tick-file format `ridge-backtest`
//! reads, so the driver's asynchronous fill-event and shutdown-signal
//! plumbing can be exercised end to end without a real brokerage
//! connection. Swapping in a real venue means implementing
//! `ridge_core::brokerage::Brokerage` and handing it to `LiveDriver`
//! in its place — this binary's loop does not change.
//!
//! Bootstrap shape grounded on `bog-bins/src/bin/inventory_simulated.rs`.

use anyhow::{Context, Result};
use clap::Parser;
use ridge_bins::common::{init_logging, load_config, load_ticks_csv, print_summary, CommonArgs};
use ridge_core::adaptive::{AdaptiveConfig, AdaptivePortfolio};
use ridge_core::brokerage::PaperBrokerage;
use ridge_core::config::Config;
use ridge_core::driver::LiveDriver;
use ridge_core::order_manager::{OrderManager, OrderManagerConfig};
use ridge_core::risk::RiskManager;
use ridge_core::strategy::Strategy;

#[derive(Parser, Debug)]
#[command(author, version, about = "Drive the Ridge live engine against a paper brokerage")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Path to a CSV tick file with `timestamp,symbol,price` columns
    /// and an optional fourth `volume` column, standing in for a live feed.
    #[arg(short, long)]
    ticks: String,

    /// Close all open positions before exiting on shutdown.
    #[arg(long, default_value_t = true)]
    close_on_shutdown: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args.common)?;
    init_logging(&config);

    tracing::info!(ticks = %args.ticks, "=== Ridge Live ===");

    let ticks = load_ticks_csv(&args.ticks)?;
    tracing::info!(count = ticks.len(), "loaded feed ticks");

    let mut strategy = build_strategy(&config)?;
    let order_manager = OrderManager::new(OrderManagerConfig::from(&config.risk));
    let risk_manager = RiskManager::new((&config.stops).into(), config.execution.initial_cash);
    let mut driver = LiveDriver::new(config.execution.initial_cash, order_manager, risk_manager);
    driver.install_signal_handler()?;

    // Fill price is overwritten per-tick below before every submission.
    let mut broker = PaperBrokerage::new(rust_decimal::Decimal::ZERO);

    for tick in &ticks {
        if driver.is_shutting_down() {
            tracing::warn!("shutdown requested, stopping feed replay");
            break;
        }
        broker.set_fill_price(tick.price);
        driver.on_tick(tick, strategy.as_mut(), &mut broker)?;
    }

    if args.close_on_shutdown {
        tracing::info!("closing all open positions");
        driver.close_all_positions(&mut broker);
    }

    print_summary(&driver.portfolio().performance_metrics());
    Ok(())
}

/// Build the configured strategy, identical selection logic to
/// `ridge-backtest` (spec §4.8: single strategy or adaptive fan-out).
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
