//! # Engine Error
//!
//! Single error enum shared by every crate in the workspace. Each fallible operation in
//! `candela-*` returns `Result<T, EngineError>` so that driver-loop callers can match on a
//! closed set of failure kinds rather than threading per-crate error types through generic
//! bounds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

/// Unique identifier assigned to a resting limit order or a grid level.
pub type Id = u64;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Error)]
pub enum EngineError {
    /// A series that is required to be non-empty was empty (eg/ a [`Chart`](crate::chart::Chart)
    /// with zero candles).
    #[error("required series was empty")]
    ZeroLength,

    /// An index fell outside the bounds of the collection it indexed into.
    #[error("index {index} out of bounds (length {length})")]
    OutOfIndex { index: usize, length: usize },

    /// A binary search for a moment preceding the first timestamp in a series.
    #[error("value not found")]
    ValueNotFound,

    /// A sequence required to be non-decreasing (eg/ an `Equity` timeline's timestamps)
    /// received a value that would violate that ordering.
    #[error("value out of order")]
    OutOfOrder,

    /// A [`TimeFrame`](crate::time::TimeFrame) was constructed with a non-positive duration.
    #[error("incorrect duration: must be positive, got {0}ms")]
    IncorrectDuration(i64),

    /// One or more currencies had no known price when a valuation was requested. Aggregable:
    /// every missing currency encountered during a single `total`/`synchronize` call is
    /// collected into one report.
    #[error("missing price for currencies: {0:?}")]
    MissingCurrency(Vec<SmolStr>),

    /// Insufficient balance of `currency` to cover a requested quantity `qty`.
    #[error("not enough funds: need {qty} {currency}")]
    NotEnoughFunds { currency: SmolStr, qty: Decimal },

    /// No resting limit order exists for the given id.
    #[error("no limit order with id {0}")]
    NoLimitOrder(Id),

    /// An [`Order`](crate::order::Order) was constructed with a non-positive price or amount.
    #[error("invalid order amount: {0} (must be > 0)")]
    InvalidOrderAmount(Decimal),

    /// A [`Symbol`](crate::market::Symbol) was constructed with `base == quote` or mismatched
    /// exchanges.
    #[error("invalid symbol: base={base} quote={quote}")]
    InvalidSymbol { base: SmolStr, quote: SmolStr },

    /// No known price for a currency was found where one was required.
    #[error("no price known for currency {0}")]
    NoPrice(SmolStr),

    /// `PortfolioWeights` whose absolute values do not sum to 1 within tolerance.
    #[error("invalid portfolio weights: sum of |weights| = {0}")]
    InvalidWeights(Decimal),

    /// A grid level was constructed with a non-positive amount.
    #[error("invalid grid level amount: {0} (must be > 0)")]
    InvalidGridLevelAmount(Decimal),

    /// A grid level was constructed with a non-positive price.
    #[error("invalid grid level price: {0} (must be > 0)")]
    InvalidGridLevelPrice(Decimal),

    /// A [`Candle`](crate::candle::Candle) was constructed violating
    /// `low <= min(open, close) <= max(open, close) <= high` or with negative volume.
    #[error(
        "invalid candle: open={open} high={high} low={low} close={close} volume={volume}"
    )]
    InvalidCandle {
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    },

    /// A `SimulatorConfig` was constructed with a commission outside `[0, 1)`.
    #[error("invalid commission: {0} (must be in [0, 1))")]
    InvalidCommission(Decimal),

    /// A CSV/IO failure while reading or writing candle or equity data; `detail` names the
    /// offending field or operation.
    #[error("io error: {detail}")]
    Io { detail: String },

    /// A CSV field failed to parse into its expected type; `field` names the column, `value`
    /// is the offending raw text.
    #[error("failed to parse {field} field: {value:?}")]
    ParseField { field: String, value: String },

    /// A `Parallel` composite event in which one or more children failed. Message is the
    /// concatenation of child error messages, separated by "; ".
    #[error("{}", .0.join("; "))]
    ParallelExecution(Vec<String>),

    /// Wraps a lower-level error with extra context, mirroring the driver loop's
    /// "error during backtest setup: ..." / "error during backtest: ..." wrapping policy.
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<EngineError>,
    },
}

impl EngineError {
    /// Wraps `self` with additional context, matching the driver loop's error-wrapping policy
    /// (§7 propagation policy).
    pub fn context(self, context: impl Into<String>) -> Self {
        EngineError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type EngineResult<T> = Result<T, EngineError>;
