//! [`Backtester`] and [`StepByStep`]: drive a [`Strategy`] over historical candles against a
//! [`Simulator`], producing an [`Equity`] timeline.

use crate::{equity::Equity, strategy::Strategy, strategy::VectorizedStrategy};
use candela_core::{EngineError, InstrumentCandle};
use candela_data::ChartContainer;
use candela_execution::{Connector, Simulator};
use chrono::TimeDelta;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{instrument, warn};

fn max_timeframe_duration(charts: &ChartContainer) -> TimeDelta {
    charts
        .instruments()
        .map(|instrument| instrument.timeframe.duration())
        .max()
        .unwrap_or_else(TimeDelta::zero)
}

fn equity_capacity(period_duration: TimeDelta, max_timeframe: TimeDelta) -> usize {
    if max_timeframe.is_zero() {
        return 0;
    }
    let steps = period_duration.num_milliseconds() / max_timeframe.num_milliseconds();
    steps.max(0) as usize + 1
}

/// Runs a full backtest in one call: setup, then the per-candle inner loop (§4.8).
pub struct Backtester;

impl Backtester {
    #[instrument(skip(strategy, simulator, charts))]
    pub async fn run<S: Strategy>(
        strategy: &mut S,
        simulator: Arc<Mutex<Simulator>>,
        charts: &ChartContainer,
    ) -> Result<Equity, EngineError> {
        simulator
            .lock()
            .await
            .cleanup()
            .map_err(|error| error.context("error during backtest setup"))?;

        let durations = strategy.min_durations();
        let max_duration = durations.max();

        let equity_period = charts
            .covering_period()
            .map_err(|error| error.context("error during backtest setup"))?;
        let widened = equity_period.shift_start(max_duration);
        let capacity = equity_capacity(widened.duration(), max_timeframe_duration(charts));

        let warmup_period =
            candela_core::Period::new(equity_period.start, equity_period.start + max_duration);
        let warmup_charts = charts.slice(warmup_period);
        strategy
            .start(&warmup_charts)
            .map_err(|error| error.context("error during backtest setup"))?;

        let mut equity = Equity::with_capacity(capacity, true);

        for (instrument, candle) in charts.merged_candles() {
            let instrument_candle = InstrumentCandle::new(instrument.symbol.clone(), candle);
            step(strategy, &simulator, &mut equity, &instrument_candle).await?;
        }

        Ok(equity)
    }

    /// The vectorized fast path (§4.8): delegates entirely to `strategy.backtest` and returns
    /// its equity unchanged, bypassing the per-candle loop `run` drives. Callers choose this
    /// entry point themselves where `run` dispatches `S: Strategy` generically and Rust has no
    /// runtime way to detect whether an arbitrary `S` also implements `VectorizedStrategy`.
    #[instrument(skip(strategy, simulator, charts))]
    pub async fn run_vectorized<S: VectorizedStrategy>(
        strategy: &mut S,
        simulator: Arc<Mutex<Simulator>>,
        charts: &ChartContainer,
    ) -> Result<Equity, EngineError> {
        simulator
            .lock()
            .await
            .cleanup()
            .map_err(|error| error.context("error during backtest setup"))?;

        let mut sim = simulator.lock().await;
        strategy
            .backtest(&mut sim, charts)
            .map_err(|error| error.context("error during backtest"))
    }
}

/// The single per-candle step shared by [`Backtester::run`] and [`StepByStep::next`] (§4.8 inner
/// loop steps 1-5).
async fn step<S: Strategy>(
    strategy: &mut S,
    simulator: &Arc<Mutex<Simulator>>,
    equity: &mut Equity,
    candle: &InstrumentCandle,
) -> Result<(), EngineError> {
    {
        let mut sim = simulator.lock().await;
        sim.update_price(candle)
            .map_err(|error| error.context("error during backtest"))?;
        let (total, missing) = sim.total();
        if let Some(error) = missing {
            warn!(%error, "missing currency while valuing portfolio");
        }
        let snapshot = sim.portfolio().assets().clone();
        equity
            .add(total, candle.candle.close_time, Some(snapshot))
            .map_err(|error| error.context("error during backtest"))?;
    }

    let event = strategy
        .next(candle)
        .map_err(|error| error.context("error during backtest"))?;
    if let Some(event) = event {
        event
            .apply(Arc::clone(simulator))
            .await
            .map_err(|error| error.context("error during backtest"))?;
    }
    Ok(())
}

/// Exposes the backtest's per-candle step as an externally driven operation: `start`, `next`,
/// `equity` (§4.8 "step-by-step variant").
pub struct StepByStep<S: Strategy> {
    strategy: S,
    simulator: Arc<Mutex<Simulator>>,
    equity: Equity,
}

impl<S: Strategy> StepByStep<S> {
    pub fn new(strategy: S, simulator: Arc<Mutex<Simulator>>, capacity: usize) -> Self {
        Self {
            strategy,
            simulator,
            equity: Equity::with_capacity(capacity, true),
        }
    }

    pub async fn start(&mut self, warmup: &ChartContainer) -> Result<(), EngineError> {
        self.simulator
            .lock()
            .await
            .cleanup()
            .map_err(|error| error.context("error during backtest setup"))?;
        self.strategy
            .start(warmup)
            .map_err(|error| error.context("error during backtest setup"))
    }

    pub async fn next(&mut self, candle: &InstrumentCandle) -> Result<(), EngineError> {
        step(&mut self.strategy, &self.simulator, &mut self.equity, candle).await
    }

    pub fn equity(&self) -> &Equity {
        &self.equity
    }
}
