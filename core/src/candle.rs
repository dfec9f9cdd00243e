//! [`Candle`]: a single OHLCV bar.

use crate::{error::EngineError, market::Symbol};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A summary of trading activity over one fixed interval.
///
/// `low <= min(open, close) <= max(open, close) <= high` and `volume >= 0` are enforced at
/// construction by [`Candle::new`].
#[derive(Debug, Copy, Clone, PartialEq, Deserialize, Serialize)]
pub struct Candle {
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub close_time: DateTime<Utc>,
}

impl Candle {
    pub fn new(
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
        close_time: DateTime<Utc>,
    ) -> Result<Self, EngineError> {
        let body_low = open.min(close);
        let body_high = open.max(close);
        if low > body_low || body_high > high || volume < Decimal::ZERO {
            return Err(EngineError::InvalidCandle {
                open,
                high,
                low,
                close,
                volume,
            });
        }
        Ok(Self {
            open,
            high,
            low,
            close,
            volume,
            close_time,
        })
    }
}

/// A [`Candle`] tagged with the instrument's [`Symbol`] it belongs to, as produced by the chart
/// merger and consumed by the simulator and strategy driver.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InstrumentCandle {
    pub symbol: Symbol,
    pub candle: Candle,
}

impl InstrumentCandle {
    pub fn new(symbol: Symbol, candle: Candle) -> Self {
        Self { symbol, candle }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn candle_rejects_high_below_body() {
        assert!(Candle::new(dec!(10), dec!(9), dec!(1), dec!(8), dec!(1), now()).is_err());
    }

    #[test]
    fn candle_rejects_low_above_body() {
        assert!(Candle::new(dec!(10), dec!(12), dec!(11), dec!(11), dec!(1), now()).is_err());
    }

    #[test]
    fn candle_rejects_negative_volume() {
        assert!(Candle::new(dec!(10), dec!(12), dec!(9), dec!(11), dec!(-1), now()).is_err());
    }

    #[test]
    fn candle_accepts_valid_bar() {
        let candle = Candle::new(dec!(10), dec!(12), dec!(9), dec!(11), dec!(1), now()).unwrap();
        assert_eq!(candle.close, dec!(11));
    }
}
