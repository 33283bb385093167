//! Shared CLI scaffolding for both binaries.
//!
//! Grounded on `bog-bins/src/common.rs`'s `CommonArgs` derive +
//! `init_logging` + `print_stats` shape, dropping the HFT-specific
//! `cpu_core`/`realtime` performance-tuning fields (this engine has no
//! equivalent of CPU pinning) and replacing `market_id` with a config
//! file path and a tick-data file path.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use clap::Parser;
use ridge_core::config::Config;
use ridge_core::portfolio::PerformanceMetrics;
use ridge_core::tick::Tick;
use rust_decimal::Decimal;
use std::time::SystemTime;

/// CLI arguments shared by `ridge-backtest` and `ridge-live`.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CommonArgs {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Override `metrics.log_level` from the config file.
    #[arg(short, long)]
    pub log_level: Option<String>,
}

/// Load and validate configuration, applying any CLI overrides.
pub fn load_config(args: &CommonArgs) -> Result<Config> {
    let mut config = Config::load(&args.config)?;
    if let Some(level) = &args.log_level {
        config.metrics.log_level = level.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Initialize the `tracing` subscriber from config, per
/// `ridge_core::logging::init`.
pub fn init_logging(config: &Config) {
    ridge_core::logging::init(&config.metrics.log_level, config.metrics.json_logs);
}

/// Print a final performance summary, mirroring `print_stats`'s
/// end-of-run log block.
pub fn print_summary(metrics: &PerformanceMetrics) {
    tracing::info!("=== Final Performance ===");
    tracing::info!("Total return: {:.2}%", metrics.total_return_pct);
    tracing::info!("Realized P&L: {:.2}", metrics.realized_pnl);
    tracing::info!("Unrealized P&L: {:.2}", metrics.unrealized_pnl);
    tracing::info!("Total P&L: {:.2}", metrics.total_pnl);
    tracing::info!(
        "Trades: {} ({} winning, {} losing, {:.1}% win rate)",
        metrics.num_trades,
        metrics.winning_trades,
        metrics.losing_trades,
        metrics.win_rate * 100.0
    );
    tracing::info!("Max drawdown: {:.2}%", metrics.max_drawdown_pct);
    tracing::info!("Sharpe ratio: {:.2}", metrics.sharpe_ratio);
}

/// Load ticks from a CSV file with `timestamp,symbol,price[,volume]`
/// columns, per `original_source/src/data_loader.py`'s `DictReader`
/// shape. Rows with a missing volume column default to a volume of
/// one share/unit, since the canonical CSV format this engine was
/// distilled from carries no volume field at all. Shared by both
/// binaries: the backtest replay and the live-feed stand-in alike.
pub fn load_ticks_csv(path: &str) -> Result<Vec<Tick>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("failed to open tick file {path}"))?;

    let mut ticks = Vec::new();
    for result in reader.records() {
        let record = result.with_context(|| format!("failed to parse a record in {path}"))?;
        let timestamp_str = record.get(0).unwrap_or("").trim();
        let symbol = record.get(1).unwrap_or("").trim();
        let price_str = record.get(2).unwrap_or("").trim();
        if timestamp_str.is_empty() || symbol.is_empty() {
            continue;
        }

        let timestamp = parse_timestamp(timestamp_str)
            .with_context(|| format!("invalid timestamp '{timestamp_str}' in {path}"))?;
        let price: Decimal = price_str
            .parse()
            .with_context(|| format!("invalid price '{price_str}' in {path}"))?;
        let volume: Decimal = record
            .get(3)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(|v| v.parse())
            .transpose()
            .with_context(|| format!("invalid volume in {path}"))?
            .unwrap_or(Decimal::ONE);

        let tick = Tick::new(timestamp, symbol, price, volume)
            .with_context(|| format!("invalid tick for symbol {symbol} in {path}"))?;
        ticks.push(tick);
    }

    ticks.sort_by_key(|t| t.timestamp);
    Ok(ticks)
}

/// Parse an ISO-8601 timestamp, accepting either an RFC3339 string
/// with an offset or a bare `YYYY-MM-DDTHH:MM:SS` local timestamp
/// (treated as UTC), matching `datetime.fromisoformat`'s looser
/// acceptance in the original source.
fn parse_timestamp(raw: &str) -> Result<SystemTime> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc).into());
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .with_context(|| format!("unrecognized timestamp format '{raw}'"))?;
    Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_ticks_with_and_without_volume_column() {
        let path = std::env::temp_dir().join("ridge-bins-test-ticks.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "timestamp,symbol,price,volume").unwrap();
        writeln!(file, "2024-01-02T09:30:00,AAPL,150.25,200").unwrap();
        writeln!(file, "2024-01-02T09:30:01,AAPL,150.50,").unwrap();
        drop(file);

        let ticks = load_ticks_csv(path.to_str().unwrap()).unwrap();
        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[0].volume, Decimal::from(200));
        assert_eq!(ticks[1].volume, Decimal::ONE);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn rejects_unrecognized_timestamp_format() {
        assert!(parse_timestamp("not-a-timestamp").is_err());
    }

    #[test]
    fn accepts_rfc3339_and_bare_iso_timestamps() {
        assert!(parse_timestamp("2024-01-02T09:30:00Z").is_ok());
        assert!(parse_timestamp("2024-01-02T09:30:00").is_ok());
    }
}
