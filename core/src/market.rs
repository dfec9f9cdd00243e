//! Market identity primitives: [`Currency`], [`Symbol`] and [`Instrument`].

use crate::{error::EngineError, time::TimeFrame};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// An asset on a specific exchange, eg/ `BINANCE:BTC`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub struct Currency {
    pub exchange: SmolStr,
    pub asset: SmolStr,
}

impl Currency {
    pub fn new(exchange: impl Into<SmolStr>, asset: impl Into<SmolStr>) -> Self {
        Self {
            exchange: exchange.into(),
            asset: asset.into(),
        }
    }

    /// A copy of `self` denominated on a different `exchange`, used by a simulator's `transfer`
    /// operation to move balances between venues.
    pub fn on_exchange(&self, exchange: impl Into<SmolStr>) -> Self {
        Self {
            exchange: exchange.into(),
            asset: self.asset.clone(),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.exchange, self.asset)
    }
}

/// A tradable base/quote pair on a single exchange.
///
/// `base` and `quote` must share an exchange and must name distinct assets; both are enforced by
/// [`Symbol::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Symbol {
    pub base: Currency,
    pub quote: Currency,
}

impl Symbol {
    pub fn new(base: Currency, quote: Currency) -> Result<Self, EngineError> {
        if base.asset == quote.asset || base.exchange != quote.exchange {
            return Err(EngineError::InvalidSymbol {
                base: base.asset,
                quote: quote.asset,
            });
        }
        Ok(Self { base, quote })
    }

    pub fn exchange(&self) -> &str {
        &self.base.exchange
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}/{}",
            self.base.exchange, self.base.asset, self.quote.asset
        )
    }
}

/// A tradable `(symbol, timeframe)` pair; usable as a map key identifying one candle stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Instrument {
    pub symbol: Symbol,
    pub timeframe: TimeFrame,
}

impl Instrument {
    pub fn new(symbol: Symbol, timeframe: TimeFrame) -> Self {
        Self { symbol, timeframe }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.symbol, self.timeframe.name())
    }
}

/// Deterministic tie-break ordering over instruments used by the chart merger (§4.1): ascending
/// timeframe duration, then by symbol string.
impl PartialOrd for Instrument {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Instrument {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.timeframe
            .cmp(&other.timeframe)
            .then_with(|| self.symbol.to_string().cmp(&other.symbol.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn usd() -> Currency {
        Currency::new("BINANCE", "USD")
    }

    fn btc() -> Currency {
        Currency::new("BINANCE", "BTC")
    }

    #[test]
    fn symbol_rejects_equal_base_and_quote() {
        assert!(Symbol::new(usd(), usd()).is_err());
    }

    #[test]
    fn symbol_rejects_mismatched_exchanges() {
        let other = Currency::new("KRAKEN", "USD");
        assert!(Symbol::new(btc(), other).is_err());
    }

    #[test]
    fn symbol_display_format() {
        let symbol = Symbol::new(btc(), usd()).unwrap();
        assert_eq!(symbol.to_string(), "BINANCE:BTC/USD");
    }

    #[test]
    fn currency_display_format() {
        assert_eq!(btc().to_string(), "BINANCE:BTC");
    }

    #[test]
    fn instrument_ordering_by_timeframe_then_symbol() {
        let minute = TimeFrame::new("1m", TimeDelta::minutes(1)).unwrap();
        let hour = TimeFrame::new("1h", TimeDelta::hours(1)).unwrap();
        let symbol = Symbol::new(btc(), usd()).unwrap();

        let a = Instrument::new(symbol.clone(), minute);
        let b = Instrument::new(symbol, hour);
        assert!(a < b);
    }
}
