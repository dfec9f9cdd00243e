//! [`Executor`]: the realtime counterpart to [`crate::backtester::Backtester`], driving a
//! [`Strategy`] from a live candle stream until cancelled (§5).

use crate::strategy::Strategy;
use candela_core::{EngineError, InstrumentCandle};
use candela_data::CancelToken;
use candela_execution::{Connector, Simulator};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{info, instrument, warn};

/// Consumes candles from `candles` and calls `strategy.next` on each, applying the returned
/// event against `simulator`, until `cancel` fires. On exit, cancels every resting order then
/// liquidates every position, reporting whichever of those two steps fails first (§4.5, §5).
///
/// Bound directly on [`Simulator`] rather than the `Connector` trait so each candle's price can
/// be fed in via `update_price` before the strategy reacts to it, matching `Backtester`'s inner
/// loop (§4.5, §6 "Simulator extensions beyond Connector").
pub struct Executor;

impl Executor {
    #[instrument(skip(strategy, simulator, candles))]
    pub async fn run<S>(
        strategy: &mut S,
        simulator: Arc<Mutex<Simulator>>,
        mut candles: mpsc::UnboundedReceiver<InstrumentCandle>,
        cancel: CancelToken,
    ) -> Result<(), EngineError>
    where
        S: Strategy,
    {
        loop {
            if cancel.is_cancelled() {
                break;
            }

            let candle = tokio::select! {
                received = candles.recv() => received,
                _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => continue,
            };

            let Some(candle) = candle else {
                break;
            };

            simulator
                .lock()
                .await
                .update_price(&candle)
                .map_err(|error| error.context("error during live trading"))?;

            let event = strategy
                .next(&candle)
                .map_err(|error| error.context("error during live trading"))?;

            if let Some(event) = event {
                event
                    .apply(Arc::clone(&simulator))
                    .await
                    .map_err(|error| error.context("error during live trading"))?;
            }
        }

        info!("executor stopping, winding down open positions");
        shutdown(simulator).await
    }
}

/// Cancels every resting order, then liquidates every position. Runs both steps even if the
/// first fails, reporting whichever failed first (§4.5 shutdown sequence).
async fn shutdown(simulator: Arc<Mutex<Simulator>>) -> Result<(), EngineError> {
    let mut guard = simulator.lock().await;
    let cancel_result = guard.cancel_all_orders();
    if let Err(error) = &cancel_result {
        warn!(%error, "failed to cancel open orders during shutdown");
    }
    let sell_result = guard.sell_all();
    if let Err(error) = &sell_result {
        warn!(%error, "failed to liquidate positions during shutdown");
    }
    cancel_result.and(sell_result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candela_core::{Candle, Currency, OrderType, Side, Symbol};
    use candela_events::Event;
    use candela_execution::{Simulator, SimulatorConfig, SimulatorMode};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn usd() -> Currency {
        Currency::new("BINANCE", "USD")
    }

    fn btc() -> Currency {
        Currency::new("BINANCE", "BTC")
    }

    fn symbol() -> Symbol {
        Symbol::new(btc(), usd()).unwrap()
    }

    fn simulator() -> Arc<Mutex<Simulator>> {
        let mut balances = HashMap::new();
        balances.insert(usd(), dec!(10000));
        let config = SimulatorConfig::new(SimulatorMode::Margin, dec!(0), usd(), balances).unwrap();
        Arc::new(Mutex::new(Simulator::new(config)))
    }

    fn candle_at(close: rust_decimal::Decimal) -> InstrumentCandle {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        InstrumentCandle::new(
            symbol(),
            Candle::new(close, close, close, close, dec!(1), t).unwrap(),
        )
    }

    struct BuyOnceThenStop {
        bought: bool,
        cancel: CancelToken,
    }

    impl Strategy for BuyOnceThenStop {
        fn start(&mut self, _warmup: &candela_data::ChartContainer) -> Result<(), EngineError> {
            Ok(())
        }

        fn next(&mut self, candle: &InstrumentCandle) -> Result<Option<Event>, EngineError> {
            if self.bought {
                self.cancel.cancel();
                return Ok(None);
            }
            self.bought = true;
            let order = candela_core::Order::new(
                candle.symbol.clone(),
                OrderType::Market,
                Side::Buy,
                candle.candle.close,
                dec!(0.1),
            )?;
            Ok(Some(Event::open_order(order)))
        }

        fn min_durations(&self) -> candela_data::Durations {
            candela_data::Durations::default()
        }
    }

    #[tokio::test]
    async fn executor_buys_then_liquidates_on_cancellation() {
        let sim = simulator();
        let cancel = CancelToken::new();
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(candle_at(dec!(100))).unwrap();
        tx.send(candle_at(dec!(100))).unwrap();
        drop(tx);

        let mut strategy = BuyOnceThenStop {
            bought: false,
            cancel: cancel.clone(),
        };

        Executor::run(&mut strategy, Arc::clone(&sim), rx, cancel).await.unwrap();

        assert_eq!(sim.lock().await.portfolio().balance(&btc()), dec!(0));
    }

    #[tokio::test]
    async fn executor_stops_immediately_on_pre_cancelled_token() {
        let sim = simulator();
        let cancel = CancelToken::new();
        cancel.cancel();
        let (_tx, rx) = mpsc::unbounded_channel();
        let mut strategy = BuyOnceThenStop {
            bought: false,
            cancel: cancel.clone(),
        };

        Executor::run(&mut strategy, Arc::clone(&sim), rx, cancel).await.unwrap();
        assert_eq!(sim.lock().await.portfolio().balance(&btc()), dec!(0));
    }
}
