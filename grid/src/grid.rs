//! [`Grid`]: a ladder of resting orders around a single symbol, re-anchored as its levels change.

use candela_core::{Candle, EngineError, Id, Order, OrderType, Side, Symbol};
use candela_events::Event;
use rand::random;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// One rung of a [`Grid`]: the price it rests at, the amount traded there, and an id stable
/// across `SetLevels` calls so a strategy can recognize "this is the same level as last time".
#[derive(Debug, Clone, PartialEq)]
pub struct GridLevel {
    pub price: Decimal,
    pub amount: Decimal,
    pub id: Id,
}

impl GridLevel {
    pub fn new(price: Decimal, amount: Decimal) -> Result<Self, EngineError> {
        if price <= Decimal::ZERO {
            return Err(EngineError::InvalidGridLevelPrice(price));
        }
        if amount <= Decimal::ZERO {
            return Err(EngineError::InvalidGridLevelAmount(amount));
        }
        Ok(Self {
            price,
            amount,
            id: random(),
        })
    }
}

/// Side for a level resting at `price` given the current close: below close rests as a Buy,
/// at-or-above close rests as a Sell (§4.9 `orderByLevel`).
fn side_for(price: Decimal, close: Decimal) -> Side {
    if price < close {
        Side::Buy
    } else {
        Side::Sell
    }
}

/// A ladder of resting limit orders bound to a single symbol.
///
/// Tracks the currently installed [`GridLevel`]s, the resting [`Order`] (if any) at each level
/// id, the id of the most recently executed level, and a signed `spent` scalar accumulating
/// inventory acquired by executed levels (positive: net bought; negative: net sold).
#[derive(Debug, Clone)]
pub struct Grid {
    symbol: Symbol,
    levels: Vec<GridLevel>,
    resting: HashMap<Id, Order>,
    last_executed: Option<Id>,
    spent: Decimal,
}

impl Grid {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            levels: Vec::new(),
            resting: HashMap::new(),
            last_executed: None,
            spent: Decimal::ZERO,
        }
    }

    pub fn levels(&self) -> &[GridLevel] {
        &self.levels
    }

    pub fn spent(&self) -> Decimal {
        self.spent
    }

    pub fn last_executed(&self) -> Option<Id> {
        self.last_executed
    }

    /// Replaces the installed levels if `new_levels` names a different set of ids than the
    /// current one. On replacement: every resting order for a previously-held level is canceled,
    /// any nonzero `spent` inventory is unwound with a market order at `candle.close`, and the
    /// new levels are installed with a clean (empty) order map (§4.9 `SetLevels`).
    pub fn set_levels(
        &mut self,
        new_levels: Vec<GridLevel>,
        candle: &Candle,
    ) -> Result<Vec<Event>, EngineError> {
        let unchanged = new_levels.len() == self.levels.len()
            && new_levels
                .iter()
                .all(|level| self.levels.iter().any(|current| current.id == level.id));
        if unchanged {
            return Ok(Vec::new());
        }

        let mut events = Vec::new();
        for (_, order) in self.resting.drain() {
            events.push(Event::cancel_order(order.id()));
        }

        if !self.spent.is_zero() {
            let side = if self.spent > Decimal::ZERO { Side::Sell } else { Side::Buy };
            let amount = self.spent.abs();
            let unwind = Order::new(self.symbol.clone(), OrderType::Market, side, candle.close, amount)?;
            events.push(Event::open_order(unwind));
        }

        self.levels = new_levels;
        self.spent = Decimal::ZERO;
        Ok(events)
    }

    /// For every current level: if its resting order crosses `candle`, marks it executed and
    /// folds its amount into `spent`. Otherwise reconciles the resting order with the level's
    /// desired order, emitting `EditOrder`/`OpenOrder` only when something actually needs to
    /// change (§4.9 `UpdateOrders`).
    pub fn update_orders(&mut self, candle: &Candle) -> Result<Vec<Event>, EngineError> {
        let mut events = Vec::new();
        let level_ids: Vec<Id> = self.levels.iter().map(|level| level.id).collect();

        for level_id in level_ids {
            let level = self
                .levels
                .iter()
                .find(|level| level.id == level_id)
                .expect("level id taken from self.levels")
                .clone();

            if let Some(resting) = self.resting.get(&level_id) {
                if resting.crosses_price(candle.high, candle.low) {
                    let executed = self.resting.remove(&level_id).expect("checked above");
                    self.spent += match executed.side {
                        Side::Buy => executed.amount,
                        Side::Sell => -executed.amount,
                    };
                    self.last_executed = Some(level_id);
                    continue;
                }
            }

            let side = side_for(level.price, candle.close);
            let desired = Order::new(self.symbol.clone(), OrderType::Limit, side, level.price, level.amount)?;

            match self.resting.get(&level_id) {
                Some(existing) if *existing == desired => {}
                Some(existing) => {
                    events.push(Event::edit_order(existing.id(), desired.clone()));
                    self.resting.insert(level_id, desired);
                }
                None => {
                    events.push(Event::open_order(desired.clone()));
                    self.resting.insert(level_id, desired);
                }
            }
        }

        Ok(events)
    }

    /// Convenience combining `SetLevels` (when `new_levels` is given) and `UpdateOrders`,
    /// wrapped in a single `Sequential` event (§4.9 "Per-candle output").
    pub fn on_candle(
        &mut self,
        new_levels: Option<Vec<GridLevel>>,
        candle: &Candle,
    ) -> Result<Event, EngineError> {
        let mut events = Vec::new();
        if let Some(new_levels) = new_levels {
            events.extend(self.set_levels(new_levels, candle)?);
        }
        events.extend(self.update_orders(candle)?);
        Ok(Event::sequential(events))
    }
}
