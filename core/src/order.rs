//! [`Order`]: an immutable instruction to trade, plus its crossing predicate.

use crate::{error::EngineError, error::Id, market::Symbol};
use rand::random;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum OrderType {
    Market,
    Limit,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "Buy"),
            Side::Sell => write!(f, "Sell"),
        }
    }
}

/// An instruction to trade `amount` of `symbol.base` at `price`, immutable after construction.
///
/// `id` is assigned randomly at construction (a deterministic engine may substitute a monotonic
/// counter; uniqueness within a run is the only requirement) and participates only in identity
/// and lookup, never in [`Order`]'s value equality.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Order {
    pub symbol: Symbol,
    pub order_type: OrderType,
    pub side: Side,
    pub price: Decimal,
    pub amount: Decimal,
    id: Id,
}

impl Order {
    pub fn new(
        symbol: Symbol,
        order_type: OrderType,
        side: Side,
        price: Decimal,
        amount: Decimal,
    ) -> Result<Self, EngineError> {
        if price <= Decimal::ZERO {
            return Err(EngineError::InvalidOrderAmount(price));
        }
        if amount <= Decimal::ZERO {
            return Err(EngineError::InvalidOrderAmount(amount));
        }
        Ok(Self {
            symbol,
            order_type,
            side,
            price,
            amount,
            id: random(),
        })
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// True for a Buy when `low <= self.price`; true for a Sell when `high >= self.price`
    /// (§4.4 crossing predicate / GLOSSARY "Crossing").
    pub fn crosses_price(&self, high: Decimal, low: Decimal) -> bool {
        match self.side {
            Side::Buy => low <= self.price,
            Side::Sell => high >= self.price,
        }
    }
}

/// Two orders are equal iff `(symbol, order_type, side, price, amount)` all match; `id` is
/// excluded, matching the §4.4 contract that ids exist only for identity/lookup.
impl PartialEq for Order {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
            && self.order_type == other.order_type
            && self.side == other.side
            && self.price == other.price
            && self.amount == other.amount
    }
}
