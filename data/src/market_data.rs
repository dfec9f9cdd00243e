//! Ingest-side interfaces: [`BacktestMarketData`] for historical runs, [`RealtimeMarketData`]
//! for live ones. Neither trait is implemented by a concrete live connector in this crate — a
//! live data supplier is an external collaborator specified only by this interface.

use crate::container::ChartContainer;
use candela_core::{EngineError, Instrument, InstrumentCandle};
use chrono::TimeDelta;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Per-instrument minimum warmup duration, as returned by a strategy's `MinDurations`.
#[derive(Debug, Clone, Default)]
pub struct Durations(HashMap<Instrument, TimeDelta>);

impl Durations {
    pub fn new(map: HashMap<Instrument, TimeDelta>) -> Self {
        Self(map)
    }

    pub fn get(&self, instrument: &Instrument) -> TimeDelta {
        self.0.get(instrument).copied().unwrap_or_else(TimeDelta::zero)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Instrument, &TimeDelta)> {
        self.0.iter()
    }

    /// The largest duration across every instrument, or zero for an empty map (§4.6).
    pub fn max(&self) -> TimeDelta {
        self.0.values().copied().max().unwrap_or_else(TimeDelta::zero)
    }
}

/// A source of historical candle data for a backtest: an in-memory [`ChartContainer`] already
/// covering the full run, typically built once from CSV files.
pub trait BacktestMarketData {
    fn charts(&self) -> &ChartContainer;
}

/// An in-memory [`BacktestMarketData`] built directly from a [`ChartContainer`], eg/ one
/// populated via [`crate::csv::CsvChartReader`].
#[derive(Debug, Clone)]
pub struct InMemoryMarketData {
    charts: ChartContainer,
}

impl InMemoryMarketData {
    pub fn new(charts: ChartContainer) -> Self {
        Self { charts }
    }
}

impl BacktestMarketData for InMemoryMarketData {
    fn charts(&self) -> &ChartContainer {
        &self.charts
    }
}

/// A cooperative cancellation signal for the realtime candle stream and executor loop (§5).
/// A lightweight `Arc<AtomicBool>` wrapper, avoiding a dependency on an external cancellation
/// token crate for this one flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(std::sync::Arc<std::sync::atomic::AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(std::sync::atomic::Ordering::SeqCst)
    }
}

/// A live (or otherwise streaming) supplier of candle data, specified only by this interface —
/// no concrete connector ships in this workspace.
pub trait RealtimeMarketData {
    /// Fetches warmup [`ChartContainer`]s covering at least `durations` of leading history per
    /// instrument.
    fn get_charts(
        &self,
        durations: &Durations,
    ) -> impl std::future::Future<Output = Result<ChartContainer, EngineError>> + Send;

    /// Streams [`InstrumentCandle`]s for `instruments` until `cancel` is triggered, delivering
    /// them over the returned channel.
    fn stream_candles(
        &self,
        cancel: CancelToken,
        instruments: Vec<Instrument>,
    ) -> mpsc::UnboundedReceiver<InstrumentCandle>;
}
