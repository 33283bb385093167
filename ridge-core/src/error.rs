//! Error taxonomy.
//!
//! Mirrors the teacher's hand-rolled `enum` + manual `Display` pattern
//! (`risk/types.rs::RiskViolation`, `core/errors.rs`) rather than reaching
//! for `thiserror`: every error here is a small, fully-owned enum with a
//! `Display` impl, and fallible call sites return `anyhow::Result` via `?`
//! or `anyhow!(err.to_string())`.
//!
//! Each variant below corresponds one-to-one with a class named in spec
//! §7. `EngineError` is the top-level distinction the driver uses to
//! decide whether a failure is recoverable (contained within the tick
//! loop, logged, order discarded) or fatal (terminates the process).

use rust_decimal::Decimal;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TickError {
    NonPositivePrice { price: Decimal },
    NegativeVolume { volume: Decimal },
}

impl fmt::Display for TickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TickError::NonPositivePrice { price } => {
                write!(f, "tick price {} is not positive", price)
            }
            TickError::NegativeVolume { volume } => {
                write!(f, "tick volume {} is negative", volume)
            }
        }
    }
}

impl std::error::Error for TickError {}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    ProbabilitiesDoNotSumToOne { sum: f64 },
    WindowOrderingViolation { field: &'static str },
    MinExceedsMax { field: &'static str },
    Missing { field: &'static str },
    InvalidValue { field: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ProbabilitiesDoNotSumToOne { sum } => {
                write!(f, "fill/partial/cancel probabilities sum to {} (expected 1.0)", sum)
            }
            ConfigError::WindowOrderingViolation { field } => {
                write!(f, "window ordering violated for {}", field)
            }
            ConfigError::MinExceedsMax { field } => {
                write!(f, "min exceeds max for {}", field)
            }
            ConfigError::Missing { field } => write!(f, "missing required config field {}", field),
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for {}: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderManagerRejection {
    GlobalRateLimit { limit: usize },
    SymbolRateLimit { symbol: String, limit: usize },
    InsufficientCapital { order_value: Decimal, available: Decimal },
    PositionSizeExceeded { projected: Decimal, limit: Decimal },
    PositionValueExceeded { value: Decimal, limit: Decimal },
    TotalExposureExceeded { exposure: Decimal, limit: Decimal },
}

impl fmt::Display for OrderManagerRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderManagerRejection::GlobalRateLimit { limit } => {
                write!(f, "global order rate limit of {}/min exceeded", limit)
            }
            OrderManagerRejection::SymbolRateLimit { symbol, limit } => {
                write!(f, "per-symbol order rate limit of {}/min exceeded for {}", limit, symbol)
            }
            OrderManagerRejection::InsufficientCapital { order_value, available } => write!(
                f,
                "order value {} exceeds available cash {}",
                order_value, available
            ),
            OrderManagerRejection::PositionSizeExceeded { projected, limit } => write!(
                f,
                "projected position size {} exceeds limit {}",
                projected, limit
            ),
            OrderManagerRejection::PositionValueExceeded { value, limit } => {
                write!(f, "projected position value {} exceeds limit {}", value, limit)
            }
            OrderManagerRejection::TotalExposureExceeded { exposure, limit } => write!(
                f,
                "total exposure {} would exceed limit {}",
                exposure, limit
            ),
        }
    }
}

impl std::error::Error for OrderManagerRejection {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillOutcome {
    Filled,
    Partial,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskViolation {
    pub kind: RiskViolationKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RiskViolationKind {
    CircuitBreakerTripped,
}

impl fmt::Display for RiskViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            RiskViolationKind::CircuitBreakerTripped => {
                write!(f, "circuit breaker is tripped, strategy orders suppressed")
            }
        }
    }
}

impl std::error::Error for RiskViolation {}

#[derive(Debug, Clone, PartialEq)]
pub enum BrokerageError {
    SubmissionFailed { reason: String },
    Timeout { seconds: u64 },
    Rejected { reason: String },
}

impl fmt::Display for BrokerageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrokerageError::SubmissionFailed { reason } => {
                write!(f, "brokerage submission failed: {}", reason)
            }
            BrokerageError::Timeout { seconds } => {
                write!(f, "brokerage call timed out after {}s", seconds)
            }
            BrokerageError::Rejected { reason } => write!(f, "brokerage rejected order: {}", reason),
        }
    }
}

impl std::error::Error for BrokerageError {}

/// Top-level classification the driver uses to decide whether to contain
/// a failure within the tick loop or terminate the process (spec §7).
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    InvalidTick(TickError),
    InvalidConfig(ConfigError),
    StrategyFault { strategy: String, message: String },
    OrderRejected(OrderManagerRejection),
    OrderCancelled { order_id: String },
    Brokerage(BrokerageError),
    CircuitBreaker(RiskViolation),
    ShutdownRequested,
    PortfolioInvariantBreach { message: String },
}

impl EngineError {
    /// Fatal classes terminate the process; everything else is contained
    /// within the tick loop per spec §7's propagation policy.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidConfig(_) | EngineError::PortfolioInvariantBreach { .. }
        )
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidTick(e) => write!(f, "invalid tick: {}", e),
            EngineError::InvalidConfig(e) => write!(f, "invalid config: {}", e),
            EngineError::StrategyFault { strategy, message } => {
                write!(f, "strategy fault in {}: {}", strategy, message)
            }
            EngineError::OrderRejected(e) => write!(f, "order rejected: {}", e),
            EngineError::OrderCancelled { order_id } => {
                write!(f, "order {} cancelled by matching engine", order_id)
            }
            EngineError::Brokerage(e) => write!(f, "{}", e),
            EngineError::CircuitBreaker(e) => write!(f, "{}", e),
            EngineError::ShutdownRequested => write!(f, "shutdown requested"),
            EngineError::PortfolioInvariantBreach { message } => {
                write!(f, "portfolio invariant breach: {}", message)
            }
        }
    }
}

impl std::error::Error for EngineError {}

impl From<TickError> for EngineError {
    fn from(e: TickError) -> Self {
        EngineError::InvalidTick(e)
    }
}

impl From<ConfigError> for EngineError {
    fn from(e: ConfigError) -> Self {
        EngineError::InvalidConfig(e)
    }
}

impl From<OrderManagerRejection> for EngineError {
    fn from(e: OrderManagerRejection) -> Self {
        EngineError::OrderRejected(e)
    }
}

impl From<BrokerageError> for EngineError {
    fn from(e: BrokerageError) -> Self {
        EngineError::Brokerage(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_classification() {
        assert!(EngineError::InvalidConfig(ConfigError::Missing { field: "x" }).is_fatal());
        assert!(!EngineError::ShutdownRequested.is_fatal());
        assert!(!EngineError::OrderCancelled { order_id: "1".into() }.is_fatal());
    }

    #[test]
    fn display_is_human_readable() {
        let e = EngineError::from(OrderManagerRejection::GlobalRateLimit { limit: 100 });
        assert!(e.to_string().contains("100"));
    }
}
