//! [`Portfolio`]: a mapping from [`Currency`] to signed quantity, denominated in a main currency.

use crate::{error::EngineError, market::Currency};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Holdings across currencies, with one designated main/quote currency.
///
/// Balances may go negative only when the owning simulator is running in margin mode — the
/// `Portfolio` type itself places no restriction on sign; admission checks live in
/// `candela-execution`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Portfolio {
    balances: HashMap<Currency, Decimal>,
    main_currency: Currency,
}

impl Portfolio {
    pub fn new(main_currency: Currency) -> Self {
        Self {
            balances: HashMap::new(),
            main_currency,
        }
    }

    pub fn main_currency(&self) -> &Currency {
        &self.main_currency
    }

    pub fn set(&mut self, currency: Currency, quantity: Decimal) {
        self.balances.insert(currency, quantity);
    }

    pub fn increase(&mut self, currency: Currency, quantity: Decimal) {
        *self.balances.entry(currency).or_insert(Decimal::ZERO) += quantity;
    }

    pub fn decrease(&mut self, currency: Currency, quantity: Decimal) {
        *self.balances.entry(currency).or_insert(Decimal::ZERO) -= quantity;
    }

    /// Returns `0` for a currency that has never been touched.
    pub fn balance(&self, currency: &Currency) -> Decimal {
        self.balances.get(currency).copied().unwrap_or(Decimal::ZERO)
    }

    /// Read-only view of every held currency. Mutating through the returned reference is not
    /// possible (see [`Portfolio::assets_mut`] for the documented-hazard variant).
    pub fn assets(&self) -> &HashMap<Currency, Decimal> {
        &self.balances
    }

    /// Exposes the internal map by mutable reference. Callers that mutate through this escape
    /// the Portfolio's own accounting methods (no corresponding audit trail); use
    /// [`Portfolio::copy`] instead whenever safe, read-only observation is all that's needed.
    pub fn assets_mut(&mut self) -> &mut HashMap<Currency, Decimal> {
        &mut self.balances
    }

    /// An independent deep copy: mutating the clone never affects `self`.
    pub fn copy(&self) -> Portfolio {
        self.clone()
    }

    /// Sums `quantity * price` over every held currency.
    ///
    /// A currency whose asset matches the main currency's asset is valued at `1.0` implicitly
    /// (it needs no price lookup). Currencies with no entry in `prices` are aggregated into a
    /// single [`EngineError::MissingCurrency`] that is returned *alongside* the partial sum
    /// computed from the currencies that did have a price, so the caller can choose to use
    /// either.
    pub fn total(&self, prices: &HashMap<Currency, Decimal>) -> (Decimal, Option<EngineError>) {
        let mut sum = Decimal::ZERO;
        let mut missing = Vec::new();

        for (currency, quantity) in &self.balances {
            if quantity.is_zero() {
                continue;
            }
            if currency.asset == self.main_currency.asset {
                sum += quantity;
                continue;
            }
            match prices.get(currency) {
                Some(price) => sum += quantity * price,
                None => missing.push(currency.to_string().into()),
            }
        }

        let error = if missing.is_empty() {
            None
        } else {
            Some(EngineError::MissingCurrency(missing))
        };
        (sum, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd() -> Currency {
        Currency::new("BINANCE", "USD")
    }

    fn btc() -> Currency {
        Currency::new("BINANCE", "BTC")
    }

    #[test]
    fn set_then_balance_round_trips() {
        let mut p = Portfolio::new(usd());
        p.set(btc(), dec!(2));
        assert_eq!(p.balance(&btc()), dec!(2));
    }

    #[test]
    fn copy_is_independent() {
        let mut p = Portfolio::new(usd());
        p.set(btc(), dec!(2));
        let snapshot = p.copy();
        p.set(btc(), dec!(99));
        assert_eq!(snapshot.balance(&btc()), dec!(2));
    }

    #[test]
    fn total_with_only_main_currency_ignores_prices() {
        let mut p = Portfolio::new(usd());
        p.set(usd(), dec!(1000));
        let (total, error) = p.total(&HashMap::new());
        assert_eq!(total, dec!(1000));
        assert!(error.is_none());
    }

    #[test]
    fn total_aggregates_missing_currencies_but_returns_partial_sum() {
        let mut p = Portfolio::new(usd());
        p.set(usd(), dec!(100));
        p.set(btc(), dec!(2));
        let eth = Currency::new("BINANCE", "ETH");
        p.set(eth, dec!(3));

        let (total, error) = p.total(&HashMap::new());
        assert_eq!(total, dec!(100));
        match error {
            Some(EngineError::MissingCurrency(missing)) => assert_eq!(missing.len(), 2),
            other => panic!("expected MissingCurrency, got {other:?}"),
        }
    }

    #[test]
    fn absent_currency_balances_zero() {
        let p = Portfolio::new(usd());
        assert_eq!(p.balance(&btc()), Decimal::ZERO);
    }
}
