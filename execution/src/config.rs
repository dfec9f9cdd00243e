//! [`SimulatorConfig`]: commission, admission-mode and starting-balance configuration for a
//! [`crate::simulator::Simulator`], deserializable from TOML/JSON.

use candela_core::{Currency, EngineError, Portfolio};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Whether the simulator admits negative balances (margin) or pre-checks them (spot) (§4.5).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum SimulatorMode {
    Margin,
    Spot,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulatorConfig {
    pub mode: SimulatorMode,
    pub commission: Decimal,
    pub main_currency: Currency,
    pub starting_balances: HashMap<Currency, Decimal>,
}

impl SimulatorConfig {
    pub fn new(
        mode: SimulatorMode,
        commission: Decimal,
        main_currency: Currency,
        starting_balances: HashMap<Currency, Decimal>,
    ) -> Result<Self, EngineError> {
        if commission < Decimal::ZERO || commission >= Decimal::ONE {
            return Err(EngineError::InvalidCommission(commission));
        }
        Ok(Self {
            mode,
            commission,
            main_currency,
            starting_balances,
        })
    }

    pub fn starting_portfolio(&self) -> Portfolio {
        let mut portfolio = Portfolio::new(self.main_currency.clone());
        for (currency, amount) in &self.starting_balances {
            portfolio.set(currency.clone(), *amount);
        }
        portfolio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rejects_commission_outside_unit_interval() {
        let main = Currency::new("BINANCE", "USD");
        assert!(SimulatorConfig::new(SimulatorMode::Margin, dec!(1), main.clone(), HashMap::new()).is_err());
        assert!(SimulatorConfig::new(SimulatorMode::Margin, dec!(-0.1), main, HashMap::new()).is_err());
    }
}
