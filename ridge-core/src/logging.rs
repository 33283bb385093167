//! Structured logging bootstrap.
//!
//! Grounded verbatim on `bog-core/src/utils/logger.rs::init_logger`: an
//! `EnvFilter` seeded from the environment (here `RIDGE_LOG`/`RUST_LOG`)
//! with an optional JSON layer for machine-readable log shipping.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global `tracing` subscriber.
///
/// `log_level` is the fallback filter directive used when neither
/// `RIDGE_LOG` nor `RUST_LOG` is set in the environment.
pub fn init(log_level: &str, json_logs: bool) {
    let env_filter = EnvFilter::try_from_env("RIDGE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init();
    }
}
