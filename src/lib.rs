#![doc(test(attr(deny(warnings))))]

//! Payoff Core estimates credit-card debt payoff timelines and total
//! interest under avalanche, snowball, and proportional repayment
//! strategies, and powers the interactive `payoff_cli` binary.

pub mod cli;
pub mod config;
pub mod errors;
pub mod money;
pub mod registry;
pub mod simulation;
pub mod storage;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        init_tracing();
        tracing::info!("Payoff Core tracing initialized.");
    });
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::from_default_env().add_directive("payoff_core=info".parse().unwrap());

    fmt().with_env_filter(filter).init();
}
