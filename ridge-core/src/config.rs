//! Runtime configuration.
//!
//! Grounded on the shape of `bog-core/src/config/{mod,types}.rs`: a
//! `serde`-derived `Config` aggregate broken into per-concern sections,
//! `#[serde(default = "...")]` value functions for optional fields, and a
//! `Config::validate()` that `anyhow::bail!`s on the invariants spec §7
//! calls fatal at construction. Unlike the teacher, this is a single
//! runtime-only module: the teacher's separate compile-time
//! Cargo-feature risk-profile layer has no counterpart in an engine whose
//! risk limits are read from a TOML file per strategy run, and is
//! dropped (see DESIGN.md).

use crate::error::ConfigError;
use anyhow::{bail, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub execution: ExecutionConfig,
    pub strategy: StrategyConfig,
    pub risk: RiskConfig,
    pub matching: MatchingConfig,
    pub stops: StopConfig,
    #[serde(default)]
    pub adaptive: Option<AdaptiveConfig>,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Execution mode and asset-class selection (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// "backtest" or "live"
    pub mode: String,
    /// Paper vs live brokerage submission (live mode only).
    #[serde(default)]
    pub paper: bool,
    pub initial_cash: Decimal,
    #[serde(default)]
    pub max_ticks: Option<u64>,
    #[serde(default = "default_equity_record_every")]
    pub equity_record_every: u64,
}

fn default_equity_record_every() -> u64 {
    1
}

/// Which strategy (or strategies, for the adaptive meta) to run, and
/// their parameter bundles. Each concrete strategy owns its own
/// parameter struct and deserializes its bundle out of `params` lazily;
/// the engine treats the bundle as opaque JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Strategy names to instantiate, in deterministic order. A single
    /// entry runs that strategy directly; more than one runs the
    /// adaptive meta-strategy fanning out across all of them.
    pub active: Vec<String>,
    /// Per-strategy-name parameter bundle.
    #[serde(default)]
    pub params: HashMap<String, serde_json::Value>,
}

/// Order-manager limits (spec §4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    pub max_position_size: Decimal,
    pub max_position_value: Decimal,
    pub max_total_exposure: Decimal,
    #[serde(default = "default_max_orders_per_minute")]
    pub max_orders_per_minute: usize,
    #[serde(default = "default_max_orders_per_symbol_per_minute")]
    pub max_orders_per_symbol_per_minute: usize,
    #[serde(default)]
    pub min_cash_buffer: Decimal,
}

fn default_max_orders_per_minute() -> usize {
    100
}

fn default_max_orders_per_symbol_per_minute() -> usize {
    20
}

/// Matching-engine cost model and outcome probabilities (spec §4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    #[serde(default = "default_fill_probability")]
    pub fill_probability: f64,
    #[serde(default = "default_partial_fill_probability")]
    pub partial_fill_probability: f64,
    #[serde(default = "default_cancel_probability")]
    pub cancel_probability: f64,
    #[serde(default = "default_market_impact")]
    pub market_impact: f64,
    #[serde(default)]
    pub commission_per_share: Decimal,
    #[serde(default)]
    pub commission_min: Decimal,
    #[serde(default = "default_bid_ask_spread_bps")]
    pub bid_ask_spread_bps: f64,
    #[serde(default = "default_sec_fee_rate")]
    pub sec_fee_rate: f64,
    #[serde(default = "default_liquidity_impact_factor")]
    pub liquidity_impact_factor: f64,
    /// Deterministic seed for reproducible backtests (spec §4.4, §8).
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_fill_probability() -> f64 {
    0.85
}
fn default_partial_fill_probability() -> f64 {
    0.10
}
fn default_cancel_probability() -> f64 {
    0.05
}
fn default_market_impact() -> f64 {
    0.0002
}
fn default_bid_ask_spread_bps() -> f64 {
    5.0
}
fn default_sec_fee_rate() -> f64 {
    0.0000278
}
fn default_liquidity_impact_factor() -> f64 {
    0.0001
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            fill_probability: default_fill_probability(),
            partial_fill_probability: default_partial_fill_probability(),
            cancel_probability: default_cancel_probability(),
            market_impact: default_market_impact(),
            commission_per_share: Decimal::ZERO,
            commission_min: Decimal::ZERO,
            bid_ask_spread_bps: default_bid_ask_spread_bps(),
            sec_fee_rate: default_sec_fee_rate(),
            liquidity_impact_factor: default_liquidity_impact_factor(),
            seed: None,
        }
    }
}

/// Per-position stop and portfolio circuit-breaker configuration (spec §4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopConfig {
    #[serde(default = "default_position_stop_pct")]
    pub position_stop_pct: f64,
    #[serde(default = "default_trailing_stop_pct")]
    pub trailing_stop_pct: f64,
    #[serde(default = "default_portfolio_stop_pct")]
    pub portfolio_stop_pct: f64,
    #[serde(default = "default_max_drawdown_pct")]
    pub max_drawdown_pct: f64,
    #[serde(default)]
    pub use_trailing_stops: bool,
    #[serde(default = "default_true")]
    pub enable_circuit_breaker: bool,
}

fn default_position_stop_pct() -> f64 {
    2.0
}
fn default_trailing_stop_pct() -> f64 {
    3.0
}
fn default_portfolio_stop_pct() -> f64 {
    5.0
}
fn default_max_drawdown_pct() -> f64 {
    10.0
}
fn default_true() -> bool {
    true
}

impl Default for StopConfig {
    fn default() -> Self {
        Self {
            position_stop_pct: default_position_stop_pct(),
            trailing_stop_pct: default_trailing_stop_pct(),
            portfolio_stop_pct: default_portfolio_stop_pct(),
            max_drawdown_pct: default_max_drawdown_pct(),
            use_trailing_stops: false,
            enable_circuit_breaker: true,
        }
    }
}

/// Adaptive meta-strategy configuration (spec §4.7), present only when
/// `strategy.active` names more than one strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveConfig {
    #[serde(default = "default_rebalance_period")]
    pub rebalance_period: u64,
    #[serde(default = "default_min_allocation")]
    pub min_allocation: f64,
    #[serde(default = "default_max_allocation")]
    pub max_allocation: f64,
    #[serde(default = "default_performance_lookback")]
    pub performance_lookback: usize,
    #[serde(default = "default_allocation_method")]
    pub allocation_method: String,
}

fn default_rebalance_period() -> u64 {
    360
}
fn default_min_allocation() -> f64 {
    0.05
}
fn default_max_allocation() -> f64 {
    0.40
}
fn default_performance_lookback() -> usize {
    360
}
fn default_allocation_method() -> String {
    "pnl".to_string()
}

/// Logging and event/metrics log destinations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub json_logs: bool,
    #[serde(default = "default_event_log_path")]
    pub event_log_path: PathBuf,
    #[serde(default = "default_metrics_log_path")]
    pub metrics_log_path: PathBuf,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_event_log_path() -> PathBuf {
    PathBuf::from("data/order_events.jsonl")
}
fn default_metrics_log_path() -> PathBuf {
    PathBuf::from("data/portfolio_metrics.jsonl")
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            event_log_path: default_event_log_path(),
            metrics_log_path: default_metrics_log_path(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to read config {}: {}", path.as_ref().display(), e))?;
        let cfg: Config = toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("failed to parse config {}: {}", path.as_ref().display(), e))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_default() -> Result<Self> {
        Self::load("config/default.toml")
    }

    /// Validate the fatal-at-construction invariants named in spec §7.
    pub fn validate(&self) -> Result<()> {
        if self.execution.mode != "backtest" && self.execution.mode != "live" {
            bail!(ConfigError::InvalidValue {
                field: "execution.mode",
                reason: format!("must be 'backtest' or 'live', got '{}'", self.execution.mode),
            });
        }

        if self.execution.initial_cash <= Decimal::ZERO {
            bail!(ConfigError::InvalidValue {
                field: "execution.initial_cash",
                reason: "must be positive".to_string(),
            });
        }

        if self.strategy.active.is_empty() {
            bail!(ConfigError::Missing {
                field: "strategy.active"
            });
        }

        let prob_sum = self.matching.fill_probability
            + self.matching.partial_fill_probability
            + self.matching.cancel_probability;
        if (prob_sum - 1.0).abs() > 0.01 {
            bail!(ConfigError::ProbabilitiesDoNotSumToOne { sum: prob_sum });
        }

        if self.risk.max_position_size <= Decimal::ZERO {
            bail!(ConfigError::InvalidValue {
                field: "risk.max_position_size",
                reason: "must be positive".to_string(),
            });
        }

        if self.risk.max_position_value <= Decimal::ZERO {
            bail!(ConfigError::InvalidValue {
                field: "risk.max_position_value",
                reason: "must be positive".to_string(),
            });
        }

        if let Some(adaptive) = &self.adaptive {
            if !(0.0 < adaptive.min_allocation && adaptive.min_allocation < 1.0) {
                bail!(ConfigError::InvalidValue {
                    field: "adaptive.min_allocation",
                    reason: "must be in (0, 1)".to_string(),
                });
            }
            if !(0.0 < adaptive.max_allocation && adaptive.max_allocation <= 1.0) {
                bail!(ConfigError::InvalidValue {
                    field: "adaptive.max_allocation",
                    reason: "must be in (0, 1]".to_string(),
                });
            }
            if adaptive.min_allocation >= adaptive.max_allocation {
                bail!(ConfigError::MinExceedsMax {
                    field: "adaptive.min_allocation/max_allocation"
                });
            }
            if !matches!(adaptive.allocation_method.as_str(), "pnl" | "sharpe" | "win_rate") {
                bail!(ConfigError::InvalidValue {
                    field: "adaptive.allocation_method",
                    reason: "must be 'pnl', 'sharpe', or 'win_rate'".to_string(),
                });
            }
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.metrics.log_level.as_str()) {
            bail!(ConfigError::InvalidValue {
                field: "metrics.log_level",
                reason: format!("must be one of {:?}", valid_log_levels),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn valid_config() -> Config {
        Config {
            execution: ExecutionConfig {
                mode: "backtest".to_string(),
                paper: false,
                initial_cash: dec!(100_000),
                max_ticks: None,
                equity_record_every: 1,
            },
            strategy: StrategyConfig {
                active: vec!["sma_crossover".to_string()],
                params: HashMap::new(),
            },
            risk: RiskConfig {
                max_position_size: dec!(1000),
                max_position_value: dec!(100_000),
                max_total_exposure: dec!(500_000),
                max_orders_per_minute: 100,
                max_orders_per_symbol_per_minute: 20,
                min_cash_buffer: dec!(1000),
            },
            matching: MatchingConfig::default(),
            stops: StopConfig::default(),
            adaptive: None,
            metrics: MetricsConfig::default(),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn bad_execution_mode_rejected() {
        let mut cfg = valid_config();
        cfg.execution.mode = "nonsense".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn probabilities_must_sum_to_one() {
        let mut cfg = valid_config();
        cfg.matching.fill_probability = 0.5;
        cfg.matching.partial_fill_probability = 0.3;
        cfg.matching.cancel_probability = 0.3;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn adaptive_allocation_ordering_enforced() {
        let mut cfg = valid_config();
        cfg.adaptive = Some(AdaptiveConfig {
            rebalance_period: 10,
            min_allocation: 0.5,
            max_allocation: 0.4,
            performance_lookback: 10,
            allocation_method: "pnl".to_string(),
        });
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn empty_strategy_list_rejected() {
        let mut cfg = valid_config();
        cfg.strategy.active.clear();
        assert!(cfg.validate().is_err());
    }
}
