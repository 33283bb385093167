//! Shared scaffolding for the `ridge-backtest` and `ridge-live` binaries.

pub mod common;
