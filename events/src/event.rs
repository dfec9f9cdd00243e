//! [`Event`]: a composable instruction tree applied against a [`Connector`].

use candela_core::{EngineError, Id, Order};
use candela_execution::Connector;
use futures::future::{join_all, BoxFuture};
use std::sync::Arc;
use tokio::sync::Mutex;

/// An order-management instruction, possibly a composite of others.
///
/// A strategy's `next` step returns a single `Event`, which may itself be a `Sequential` or
/// `Parallel` tree of further events (§4.7).
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    OpenOrder { order: Order },
    CancelOrder { id: Id },
    EditOrder { cancel_id: Id, new_order: Order },
    Sequential(Vec<Event>),
    Parallel(Vec<Event>),
}

impl Event {
    pub fn open_order(order: Order) -> Self {
        Event::OpenOrder { order }
    }

    pub fn cancel_order(id: Id) -> Self {
        Event::CancelOrder { id }
    }

    pub fn edit_order(cancel_id: Id, new_order: Order) -> Self {
        Event::EditOrder { cancel_id, new_order }
    }

    pub fn sequential(children: Vec<Event>) -> Self {
        Event::Sequential(children)
    }

    pub fn parallel(children: Vec<Event>) -> Self {
        Event::Parallel(children)
    }

    /// Applies this event tree against `connector`.
    ///
    /// `EditOrder` is not atomic: a cancel failure aborts before placing `new_order`, but a
    /// placement failure after a successful cancel leaves the book without either order.
    /// `Sequential` aborts on the first child failure. `Parallel` spawns one task per child,
    /// awaits all of them regardless of individual outcome, and aggregates every failure into a
    /// single [`EngineError::ParallelExecution`] joined by `"; "`.
    pub fn apply<C>(self, connector: Arc<Mutex<C>>) -> BoxFuture<'static, Result<(), EngineError>>
    where
        C: Connector + Send + 'static,
    {
        Box::pin(async move {
            match self {
                Event::OpenOrder { order } => connector.lock().await.place_order(order),
                Event::CancelOrder { id } => connector.lock().await.cancel_order(id),
                Event::EditOrder { cancel_id, new_order } => {
                    connector
                        .lock()
                        .await
                        .cancel_order(cancel_id)
                        .map_err(|error| error.context("error canceling order"))?;
                    connector
                        .lock()
                        .await
                        .place_order(new_order)
                        .map_err(|error| error.context("error placing order"))
                }
                Event::Sequential(children) => {
                    for child in children {
                        child.apply(Arc::clone(&connector)).await?;
                    }
                    Ok(())
                }
                Event::Parallel(children) => {
                    let handles: Vec<_> = children
                        .into_iter()
                        .map(|child| tokio::spawn(child.apply(Arc::clone(&connector))))
                        .collect();

                    let mut errors = Vec::new();
                    for result in join_all(handles).await {
                        match result {
                            Ok(Ok(())) => {}
                            Ok(Err(error)) => errors.push(error.to_string()),
                            Err(join_error) => errors.push(join_error.to_string()),
                        }
                    }
                    if errors.is_empty() {
                        Ok(())
                    } else {
                        Err(EngineError::ParallelExecution(errors))
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candela_core::{Currency, OrderType, Side};
    use candela_execution::{SimulatorConfig, SimulatorMode};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn usd() -> Currency {
        Currency::new("BINANCE", "USD")
    }

    fn btc() -> Currency {
        Currency::new("BINANCE", "BTC")
    }

    fn symbol() -> candela_core::Symbol {
        candela_core::Symbol::new(btc(), usd()).unwrap()
    }

    fn simulator() -> Arc<Mutex<candela_execution::Simulator>> {
        let mut balances = HashMap::new();
        balances.insert(usd(), dec!(10000));
        let config = SimulatorConfig::new(SimulatorMode::Margin, dec!(0), usd(), balances).unwrap();
        Arc::new(Mutex::new(candela_execution::Simulator::new(config)))
    }

    #[tokio::test]
    async fn open_order_places_into_book() {
        let sim = simulator();
        let order = Order::new(symbol(), OrderType::Limit, Side::Buy, dec!(100), dec!(1)).unwrap();
        Event::open_order(order).apply(Arc::clone(&sim)).await.unwrap();
        assert_eq!(sim.lock().await.open_orders().len(), 1);
    }

    #[tokio::test]
    async fn edit_order_cancels_then_places() {
        let sim = simulator();
        let order = Order::new(symbol(), OrderType::Limit, Side::Buy, dec!(100), dec!(1)).unwrap();
        let id = order.id();
        Event::open_order(order).apply(Arc::clone(&sim)).await.unwrap();

        let replacement = Order::new(symbol(), OrderType::Limit, Side::Buy, dec!(200), dec!(2)).unwrap();
        Event::edit_order(id, replacement.clone())
            .apply(Arc::clone(&sim))
            .await
            .unwrap();

        let book = sim.lock().await;
        assert_eq!(book.open_orders().len(), 1);
        assert_eq!(book.open_orders().iter().next().unwrap().price, dec!(200));
    }

    #[tokio::test]
    async fn edit_order_fails_fast_on_unknown_cancel_id() {
        let sim = simulator();
        let replacement = Order::new(symbol(), OrderType::Limit, Side::Buy, dec!(200), dec!(2)).unwrap();
        let result = Event::edit_order(999, replacement).apply(sim).await;
        assert!(matches!(result, Err(EngineError::Context { .. })));
    }

    #[tokio::test]
    async fn sequential_aborts_on_first_failure() {
        let sim = simulator();
        let bad_cancel = Event::cancel_order(42);
        let order = Order::new(symbol(), OrderType::Limit, Side::Buy, dec!(100), dec!(1)).unwrap();
        let open = Event::open_order(order);

        let result = Event::sequential(vec![bad_cancel, open]).apply(Arc::clone(&sim)).await;
        assert!(result.is_err());
        assert!(sim.lock().await.open_orders().is_empty());
    }

    #[tokio::test]
    async fn parallel_runs_every_child_and_aggregates_errors() {
        let sim = simulator();
        let good = Event::open_order(
            Order::new(symbol(), OrderType::Limit, Side::Buy, dec!(100), dec!(1)).unwrap(),
        );
        let bad_one = Event::cancel_order(1);
        let bad_two = Event::cancel_order(2);

        let result = Event::parallel(vec![good, bad_one, bad_two]).apply(Arc::clone(&sim)).await;

        assert_eq!(sim.lock().await.open_orders().len(), 1);
        match result {
            Err(EngineError::ParallelExecution(messages)) => assert_eq!(messages.len(), 2),
            other => panic!("expected ParallelExecution, got {other:?}"),
        }
    }
}
