//! Structured logging initialisation, shared by every binary or test harness built on top of
//! Candela.
//!
//! ```rust,ignore
//! candela_core::logging::init_logging();
//! tracing::info!("backtest started");
//! ```
//!
//! Level is controlled by `RUST_LOG` (eg/ `RUST_LOG=candela_execution=debug,candela_engine=info`),
//! defaulting to `INFO` when unset.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn env_filter() -> tracing_subscriber::filter::EnvFilter {
    tracing_subscriber::filter::EnvFilter::builder()
        .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        .from_env_lossy()
}

/// Human-readable logging to stdout.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer())
        .init()
}

/// Newline-delimited JSON logging, for shipping to a log aggregator.
pub fn init_json_logging() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
        .init()
}
