//! [`Simulator`]: the exchange. Maintains a portfolio, last-known prices and an open-orders
//! book; matches resting limit orders against incoming candles; implements [`Connector`] (§4.5).

use crate::{
    config::{SimulatorConfig, SimulatorMode},
    connector::Connector,
};
use candela_core::{
    Currency, EngineError, Id, InstrumentCandle, Order, OrderBook, OrderType, Portfolio, Side,
    Symbol,
};
use rust_decimal::Decimal;
use smol_str::SmolStr;
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument, warn};

/// The exchange simulator shared by the margin and spot variants (selected via
/// [`SimulatorConfig::mode`]); maintains state and applies identical matching logic, differing
/// only in whether [`Simulator::place_order`] pre-checks balances.
#[derive(Debug, Clone)]
pub struct Simulator {
    prices: HashMap<Currency, Decimal>,
    portfolio: Portfolio,
    start_portfolio: Portfolio,
    open_orders: OrderBook,
    commission: Decimal,
    mode: SimulatorMode,
}

impl Simulator {
    pub fn new(config: SimulatorConfig) -> Self {
        let portfolio = config.starting_portfolio();
        Self {
            prices: HashMap::new(),
            start_portfolio: portfolio.clone(),
            portfolio,
            open_orders: OrderBook::new(),
            commission: config.commission,
            mode: config.mode,
        }
    }

    pub fn open_orders(&self) -> &OrderBook {
        &self.open_orders
    }

    pub fn prices(&self) -> &HashMap<Currency, Decimal> {
        &self.prices
    }

    /// Delegates to [`Portfolio::total`] (§4.5 `Total`).
    pub fn total(&self) -> (Decimal, Option<EngineError>) {
        self.portfolio.total(&self.prices)
    }

    /// Records the last-seen close price for `candle.symbol.base` when its quote is the main
    /// currency, then runs the limit-matching pass over the open-orders book (§4.4, §4.5).
    #[instrument(skip(self), fields(symbol = %candle.symbol))]
    pub fn update_price(&mut self, candle: &InstrumentCandle) -> Result<(), EngineError> {
        if &candle.symbol.quote == self.portfolio.main_currency() {
            self.prices.insert(candle.symbol.base.clone(), candle.candle.close);
        }
        self.match_limit_orders(&candle.symbol, candle.candle.high, candle.candle.low)
    }

    /// Matches every resting order for `symbol` that crosses `[low, high]`, executing each as an
    /// immediate market order at its own limit price (not the candle price). At most one pass is
    /// made; the first execution failure encountered is returned after the full pass (§4.4).
    fn match_limit_orders(
        &mut self,
        symbol: &Symbol,
        high: Decimal,
        low: Decimal,
    ) -> Result<(), EngineError> {
        let crossed = self
            .open_orders
            .take_matching(|order| &order.symbol == symbol && order.crosses_price(high, low));

        let mut first_error = None;
        for order in crossed {
            if let Err(error) = self.execute_market(&order) {
                warn!(?error, order_id = order.id(), "limit order fill failed");
                first_error.get_or_insert(error);
            } else {
                debug!(order_id = order.id(), price = %order.price, "limit order filled");
            }
        }
        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// `baseQty = order.amount`, `quoteQty = baseQty * order.price`; charges
    /// `commission * quoteQty` from quote; margin mode allows the resulting balances to go
    /// negative, spot mode is checked by the caller before this is invoked (§4.5).
    fn execute_market(&mut self, order: &Order) -> Result<(), EngineError> {
        let base_qty = order.amount;
        let quote_qty = base_qty * order.price;
        let fee = self.commission * quote_qty;

        let base = order.symbol.base.clone();
        let quote = order.symbol.quote.clone();

        match order.side {
            Side::Buy => {
                self.portfolio.increase(base, base_qty);
                self.portfolio.decrease(quote, quote_qty + fee);
            }
            Side::Sell => {
                self.portfolio.decrease(base, base_qty);
                self.portfolio.increase(quote, quote_qty - fee);
            }
        }
        Ok(())
    }

    /// Spot-mode pre-admission check: Buy requires `amount * price <= balance(quote)`; Sell
    /// requires `amount <= balance(base)` (§4.5).
    fn check_spot_admission(&self, order: &Order) -> Result<(), EngineError> {
        match order.side {
            Side::Buy => {
                let required = order.amount * order.price;
                let available = self.portfolio.balance(&order.symbol.quote);
                if required > available {
                    return Err(EngineError::NotEnoughFunds {
                        currency: order.symbol.quote.to_string().into(),
                        qty: required,
                    });
                }
            }
            Side::Sell => {
                let available = self.portfolio.balance(&order.symbol.base);
                if order.amount > available {
                    return Err(EngineError::NotEnoughFunds {
                        currency: order.symbol.base.to_string().into(),
                        qty: order.amount,
                    });
                }
            }
        }
        Ok(())
    }

    /// Cancels all orders and restores the portfolio snapshot taken at construction (§4.5, §9
    /// "Cleanup semantics" — resolved in favor of determinism across repeated runs).
    pub fn cleanup(&mut self) -> Result<(), EngineError> {
        self.open_orders.clear();
        self.portfolio = self.start_portfolio.clone();
        Ok(())
    }
}

impl Connector for Simulator {
    #[instrument(skip(self, order), fields(side = %order.side, price = %order.price, amount = %order.amount))]
    fn place_order(&mut self, order: Order) -> Result<(), EngineError> {
        if self.mode == SimulatorMode::Spot {
            self.check_spot_admission(&order)?;
        }
        match order.order_type {
            OrderType::Market => self.execute_market(&order),
            OrderType::Limit => {
                self.open_orders.add(order);
                Ok(())
            }
        }
    }

    fn cancel_order(&mut self, id: Id) -> Result<(), EngineError> {
        self.open_orders.remove_by_id(id).map(|_| ())
    }

    fn cancel_all_orders(&mut self) -> Result<(), EngineError> {
        self.open_orders.clear();
        Ok(())
    }

    fn transfer(
        &mut self,
        quantity: Decimal,
        currency: Currency,
        target_exchange: SmolStr,
    ) -> Result<(), EngineError> {
        if self.portfolio.balance(&currency) < quantity {
            return Err(EngineError::NotEnoughFunds {
                currency: currency.to_string().into(),
                qty: quantity,
            });
        }
        self.portfolio.decrease(currency.clone(), quantity);
        self.portfolio.increase(currency.on_exchange(target_exchange), quantity);
        Ok(())
    }

    fn portfolio(&self) -> Portfolio {
        self.portfolio.copy()
    }

    /// Emits a market order per nonzero, priced balance and executes it immediately.
    /// Accumulates the first failure and keeps going rather than short-circuiting (§4.5).
    fn sell_all(&mut self) -> Result<(), EngineError> {
        let main = self.portfolio.main_currency().clone();
        let mut first_error = None;

        let positions: Vec<_> = self
            .portfolio
            .assets()
            .iter()
            .filter(|(currency, balance)| **currency != main && !balance.is_zero())
            .map(|(currency, balance)| (currency.clone(), *balance))
            .collect();

        for (currency, balance) in positions {
            let Some(price) = self.prices.get(&currency).copied() else {
                first_error.get_or_insert(EngineError::NoPrice(currency.to_string().into()));
                continue;
            };
            let symbol = match Symbol::new(currency.clone(), main.clone()) {
                Ok(symbol) => symbol,
                Err(error) => {
                    first_error.get_or_insert(error);
                    continue;
                }
            };
            let side = if balance > Decimal::ZERO { Side::Sell } else { Side::Buy };
            let amount = balance.abs();
            let order = match Order::new(symbol, OrderType::Market, side, price, amount) {
                Ok(order) => order,
                Err(error) => {
                    first_error.get_or_insert(error);
                    continue;
                }
            };
            if let Err(error) = self.execute_market(&order) {
                first_error.get_or_insert(error);
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn get_prices(
        &self,
        symbols: Vec<Symbol>,
    ) -> (
        mpsc::UnboundedReceiver<(Symbol, Decimal)>,
        oneshot::Receiver<EngineError>,
    ) {
        let (value_tx, value_rx) = mpsc::unbounded_channel();
        let (error_tx, error_rx) = oneshot::channel();
        let main = self.portfolio.main_currency().clone();

        for symbol in symbols {
            if symbol.quote != main {
                let _ = error_tx.send(EngineError::InvalidSymbol {
                    base: symbol.base.asset,
                    quote: symbol.quote.asset,
                });
                break;
            }
            match self.prices.get(&symbol.base).copied() {
                Some(price) => {
                    if value_tx.send((symbol, price)).is_err() {
                        break;
                    }
                }
                None => {
                    let _ = error_tx.send(EngineError::NoPrice(symbol.base.to_string().into()));
                    break;
                }
            }
        }

        (value_rx, error_rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candela_core::{Candle, OrderType};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn usd() -> Currency {
        Currency::new("BINANCE", "USD")
    }

    fn btc() -> Currency {
        Currency::new("BINANCE", "BTC")
    }

    fn symbol() -> Symbol {
        Symbol::new(btc(), usd()).unwrap()
    }

    fn simulator(mode: SimulatorMode, usd_balance: Decimal) -> Simulator {
        let mut balances = HashMap::new();
        balances.insert(usd(), usd_balance);
        let config = SimulatorConfig::new(mode, Decimal::ZERO, usd(), balances).unwrap();
        Simulator::new(config)
    }

    fn candle_at(
        high: Decimal,
        low: Decimal,
        close: Decimal,
        open: Decimal,
    ) -> InstrumentCandle {
        let time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        InstrumentCandle::new(symbol(), Candle::new(open, high, low, close, dec!(1), time).unwrap())
    }

    #[test]
    fn immediate_limit_fill_scenario() {
        let mut sim = simulator(SimulatorMode::Margin, dec!(5000));
        sim.place_order(Order::new(symbol(), OrderType::Limit, Side::Buy, dec!(50000), dec!(0.1)).unwrap())
            .unwrap();
        sim.update_price(&candle_at(dec!(50200), dec!(48800), dec!(49900), dec!(49000)))
            .unwrap();
        assert_eq!(sim.portfolio.balance(&usd()), dec!(0));
        assert_eq!(sim.portfolio.balance(&btc()), dec!(0.1));
        assert!(sim.open_orders.is_empty());
    }

    #[test]
    fn delayed_limit_fill_scenario() {
        let mut sim = simulator(SimulatorMode::Margin, dec!(5000));
        sim.place_order(Order::new(symbol(), OrderType::Limit, Side::Buy, dec!(50000), dec!(0.1)).unwrap())
            .unwrap();
        sim.update_price(&candle_at(dec!(51124), dec!(50950), dec!(51000), dec!(51001)))
            .unwrap();
        assert!(!sim.open_orders.is_empty());
        sim.update_price(&candle_at(dec!(50400), dec!(48650), dec!(49100), dec!(50000)))
            .unwrap();
        assert_eq!(sim.portfolio.balance(&usd()), dec!(0));
        assert_eq!(sim.portfolio.balance(&btc()), dec!(0.1));
    }

    #[test]
    fn margin_mode_allows_negative_balance_after_fill() {
        let mut sim = simulator(SimulatorMode::Margin, dec!(5000));
        sim.place_order(Order::new(symbol(), OrderType::Limit, Side::Buy, dec!(50000), dec!(0.1)).unwrap())
            .unwrap();
        sim.place_order(Order::new(symbol(), OrderType::Limit, Side::Buy, dec!(51000), dec!(0.2)).unwrap())
            .unwrap();
        sim.update_price(&candle_at(dec!(54000), dec!(49000), dec!(52000), dec!(53000)))
            .unwrap();
        assert_eq!(sim.portfolio.balance(&btc()), dec!(0.3));
        assert_eq!(
            sim.portfolio.balance(&usd()),
            dec!(5000) - dec!(50000) * dec!(0.1) - dec!(51000) * dec!(0.2)
        );
    }

    #[test]
    fn spot_mode_rejects_buy_exceeding_balance() {
        let mut sim = simulator(SimulatorMode::Spot, dec!(100));
        let order = Order::new(symbol(), OrderType::Market, Side::Buy, dec!(50000), dec!(1)).unwrap();
        assert!(matches!(
            sim.place_order(order),
            Err(EngineError::NotEnoughFunds { .. })
        ));
    }

    #[test]
    fn market_buy_charges_commission_on_quote() {
        let mut balances = HashMap::new();
        balances.insert(usd(), dec!(10000));
        let config = SimulatorConfig::new(SimulatorMode::Margin, dec!(0.01), usd(), balances).unwrap();
        let mut sim = Simulator::new(config);
        sim.place_order(Order::new(symbol(), OrderType::Market, Side::Buy, dec!(100), dec!(1)).unwrap())
            .unwrap();
        assert_eq!(sim.portfolio.balance(&btc()), dec!(1));
        assert_eq!(sim.portfolio.balance(&usd()), dec!(10000) - dec!(100) - dec!(1));
    }

    #[test]
    fn sell_all_liquidates_every_position() {
        let mut balances = HashMap::new();
        balances.insert(usd(), dec!(1000));
        balances.insert(btc(), dec!(2));
        let eth = Currency::new("BINANCE", "ETH");
        balances.insert(eth.clone(), dec!(20));
        let config = SimulatorConfig::new(SimulatorMode::Margin, dec!(0), usd(), balances).unwrap();
        let mut sim = Simulator::new(config);
        sim.prices.insert(btc(), dec!(50000));
        sim.prices.insert(eth, dec!(4000));

        sim.sell_all().unwrap();

        assert_eq!(sim.portfolio.balance(&usd()), dec!(181000));
        assert_eq!(sim.portfolio.balance(&btc()), dec!(0));
    }

    #[test]
    fn cleanup_cancels_orders_and_restores_starting_portfolio() {
        let mut sim = simulator(SimulatorMode::Margin, dec!(5000));
        sim.place_order(Order::new(symbol(), OrderType::Limit, Side::Buy, dec!(50000), dec!(0.1)).unwrap())
            .unwrap();
        sim.portfolio.increase(btc(), dec!(99));
        sim.cleanup().unwrap();
        assert!(sim.open_orders.is_empty());
        assert_eq!(sim.portfolio.balance(&usd()), dec!(5000));
        assert_eq!(sim.portfolio.balance(&btc()), dec!(0));
    }

    #[test]
    fn cancel_unknown_order_fails() {
        let mut sim = simulator(SimulatorMode::Margin, dec!(5000));
        assert!(matches!(sim.cancel_order(999), Err(EngineError::NoLimitOrder(999))));
    }

    #[test]
    fn transfer_moves_balance_to_target_exchange() {
        let mut sim = simulator(SimulatorMode::Margin, dec!(1000));
        sim.transfer(dec!(200), usd(), "KRAKEN".into()).unwrap();
        assert_eq!(sim.portfolio.balance(&usd()), dec!(800));
        assert_eq!(sim.portfolio.balance(&Currency::new("KRAKEN", "USD")), dec!(200));
    }

    #[test]
    fn transfer_insufficient_balance_fails() {
        let mut sim = simulator(SimulatorMode::Margin, dec!(100));
        assert!(matches!(
            sim.transfer(dec!(200), usd(), "KRAKEN".into()),
            Err(EngineError::NotEnoughFunds { .. })
        ));
    }
}
