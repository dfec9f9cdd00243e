//! [`Strategy`]: the capability set a trading system implements, consumed by the driver loop but
//! never implemented inside this workspace.

use candela_core::{EngineError, InstrumentCandle};
use candela_data::{ChartContainer, Durations};
use candela_events::Event;
use candela_execution::Simulator;

/// A trading system driven one candle at a time by [`crate::backtester::Backtester`],
/// [`crate::backtester::StepByStep`] or [`crate::executor::Executor`] (§4.6).
pub trait Strategy {
    /// Called once before the main loop with charts covering the warmup period. Used to prime
    /// any internal indicator state.
    fn start(&mut self, warmup: &ChartContainer) -> Result<(), EngineError>;

    /// Called once per merged candle. Returns `None` when no order-management action is needed
    /// this step.
    fn next(&mut self, candle: &InstrumentCandle) -> Result<Option<Event>, EngineError>;

    /// The minimum leading history required per instrument before `next` is first called.
    fn min_durations(&self) -> Durations;
}

/// An optional sub-capability for strategies whose logic is array-oriented or closed-form and
/// can bypass the per-candle loop entirely (§4.6, §4.8 "Vectorized fast path").
pub trait VectorizedStrategy: Strategy {
    fn backtest(
        &mut self,
        simulator: &mut Simulator,
        charts: &ChartContainer,
    ) -> Result<crate::equity::Equity, EngineError>;
}
