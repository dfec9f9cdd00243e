#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    clippy::unused_self,
    clippy::useless_let_if_seq,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::type_complexity, clippy::too_many_arguments)]

//! # Candela Engine
//!
//! Top-level crate wiring the backtesting and live-trading engine together: the [`Strategy`]
//! contract a trading system implements, the [`Equity`] timeline it produces, and the two
//! driver loops that call it — [`Backtester`]/[`StepByStep`] for historical runs,
//! [`Executor`] for live ones.
//!
//! Re-exports every other workspace crate under its own name, so a consumer only needs this one
//! dependency.

pub use candela_core as core;
pub use candela_data as data;
pub use candela_events as events;
pub use candela_execution as execution;
pub use candela_grid as grid;

/// The driver-loop-facing backtest runner and its step-by-step variant. See
/// [`backtester::Backtester`].
pub mod backtester;

/// The equity timeline produced by a backtest or live run. See [`equity::Equity`].
pub mod equity;

/// The realtime driver loop. See [`executor::Executor`].
pub mod executor;

/// The trading system interface. See [`strategy::Strategy`].
pub mod strategy;

pub use backtester::{Backtester, StepByStep};
pub use equity::Equity;
pub use executor::Executor;
pub use strategy::{Strategy, VectorizedStrategy};
