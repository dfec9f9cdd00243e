#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    clippy::unused_self,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::type_complexity, clippy::too_many_arguments)]

//! # Candela Data
//!
//! Candle ingest (§6) and the multi-instrument chart merger (§4.1): collates several
//! per-instrument ordered candle streams into a single strictly time-ordered stream for the
//! backtest driver to consume.

/// [`ChartContainer`] and the time-ordered multi-instrument merge.
pub mod container;

/// CSV-backed candle ingest.
pub mod csv;

/// Ingest-side interfaces ([`BacktestMarketData`], [`RealtimeMarketData`]) and [`Durations`].
pub mod market_data;

pub use container::ChartContainer;
pub use csv::{CsvChartReader, IndexColumn};
pub use market_data::{BacktestMarketData, CancelToken, Durations, InMemoryMarketData, RealtimeMarketData};
