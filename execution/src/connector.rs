//! [`Connector`]: the surface strategies see, implemented by [`crate::simulator::Simulator`] in
//! this workspace and, in a live deployment, by a real exchange client.

use candela_core::{EngineError, Id, Order, Portfolio, Symbol};
use rust_decimal::Decimal;
use tokio::sync::{mpsc, oneshot};

/// The operations a strategy may perform against an exchange, real or simulated (§6).
pub trait Connector {
    fn place_order(&mut self, order: Order) -> Result<(), EngineError>;
    fn cancel_order(&mut self, id: Id) -> Result<(), EngineError>;
    fn cancel_all_orders(&mut self) -> Result<(), EngineError>;
    fn transfer(
        &mut self,
        quantity: Decimal,
        currency: candela_core::Currency,
        target_exchange: smol_str::SmolStr,
    ) -> Result<(), EngineError>;

    /// A deep copy of the current portfolio; safe to inspect without affecting the connector.
    fn portfolio(&self) -> Portfolio;

    /// Closes every nonzero position at the last known price (§4.5). Accumulates the first
    /// error encountered and keeps going; does not short-circuit.
    fn sell_all(&mut self) -> Result<(), EngineError>;

    /// Produces a finite sequence of `(symbol, price)` pairs for `symbols` whose quote is the
    /// main currency. A non-main-quote symbol terminates the sequence with an error on the
    /// error channel; both channels close once the sequence ends (§4.5, §5).
    fn get_prices(
        &self,
        symbols: Vec<Symbol>,
    ) -> (
        mpsc::UnboundedReceiver<(Symbol, Decimal)>,
        oneshot::Receiver<EngineError>,
    );
}
