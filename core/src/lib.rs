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

//! # Candela Core
//!
//! Leaf-level time, market-identity, portfolio and order primitives shared by every other crate
//! in the Candela backtesting and live-trading engine.
//!
//! Nothing in this crate depends on async runtimes, I/O, or any notion of a live exchange —
//! those concerns live in `candela-data`, `candela-execution` and `candela-engine`. Candela Core
//! is the part of the system that is pure value types and pure functions over them.

/// Resting-order collection with O(1) removal. See [`book::OrderBook`].
pub mod book;

/// A single OHLCV bar and its instrument-tagged variant. See [`candle::Candle`].
pub mod candle;

/// Parallel OHLCV arrays with binary-search slicing. See [`chart::Chart`].
pub mod chart;

/// The workspace-wide error enum. See [`error::EngineError`].
pub mod error;

/// Currency, Symbol and Instrument identity types. See [`market::Symbol`].
pub mod market;

/// Tracing subscriber initialisation shared by every binary built on Candela. See
/// [`logging::init_logging`].
pub mod logging;

/// Orders: construction, validation, and the crossing predicate. See [`order::Order`].
pub mod order;

/// Holdings across currencies. See [`portfolio::Portfolio`].
pub mod portfolio;

/// Timeframes, periods and timestamp series. See [`time::TimeFrame`].
pub mod time;

pub use book::OrderBook;
pub use candle::{Candle, InstrumentCandle};
pub use chart::Chart;
pub use error::{EngineError, EngineResult, Id};
pub use market::{Currency, Instrument, Symbol};
pub use order::{Order, OrderType, Side};
pub use portfolio::Portfolio;
pub use time::{Period, TimeFrame, TimeStamp};
