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

//! # Candela Execution
//!
//! The [`Connector`] trait is the surface a strategy sees to place and cancel orders, inspect
//! its portfolio, and read prices. [`Simulator`] is the only implementation in this workspace: a
//! backtest exchange that matches resting limit orders against incoming candles. A live
//! deployment implements [`Connector`] against a real exchange client instead; this crate
//! deliberately carries no such client.

/// Admission-mode and commission configuration for a [`simulator::Simulator`]. See
/// [`config::SimulatorConfig`].
pub mod config;

/// The capability surface strategies and the driver loop see. See [`connector::Connector`].
pub mod connector;

/// The backtest exchange. See [`simulator::Simulator`].
pub mod simulator;

pub use config::{SimulatorConfig, SimulatorMode};
pub use connector::Connector;
pub use simulator::Simulator;
