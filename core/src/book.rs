//! [`OrderBook`]: an unordered collection of resting [`Order`]s ("heap" in the reference
//! implementation) with O(1) removal and no ordering guarantees.

use crate::{
    error::{EngineError, Id},
    order::Order,
};

/// Unordered collection of resting limit orders.
///
/// `remove_at` reorders the collection via swap-with-last-and-truncate; no consumer may rely on
/// iteration order (§DESIGN NOTES "Swap-remove heap").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderBook {
    orders: Vec<Order>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self { orders: Vec::new() }
    }

    pub fn add(&mut self, order: Order) {
        self.orders.push(order);
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    /// Removes the order at `index` in O(1) by swapping it with the last element and truncating.
    pub fn remove_at(&mut self, index: usize) -> Result<Order, EngineError> {
        if index >= self.orders.len() {
            return Err(EngineError::OutOfIndex {
                index,
                length: self.orders.len(),
            });
        }
        Ok(self.orders.swap_remove(index))
    }

    pub fn index_by_id(&self, id: Id) -> Result<usize, EngineError> {
        self.orders
            .iter()
            .position(|order| order.id() == id)
            .ok_or(EngineError::NoLimitOrder(id))
    }

    pub fn remove_by_id(&mut self, id: Id) -> Result<Order, EngineError> {
        let index = self.index_by_id(id)?;
        self.remove_at(index)
    }

    pub fn clear(&mut self) {
        self.orders.clear();
    }

    /// Removes every order for which `predicate` returns `false`, iterating back-to-front so
    /// that swap-removal never skips an element.
    pub fn filter_in_place(&mut self, predicate: impl Fn(&Order) -> bool) {
        for i in (0..self.orders.len()).rev() {
            if !predicate(&self.orders[i]) {
                self.orders.swap_remove(i);
            }
        }
    }

    /// Removes and returns every order matching `predicate`, in a single back-to-front pass
    /// (safe under swap-removal, like [`OrderBook::filter_in_place`]).
    pub fn take_matching(&mut self, predicate: impl Fn(&Order) -> bool) -> Vec<Order> {
        let mut taken = Vec::new();
        for i in (0..self.orders.len()).rev() {
            if predicate(&self.orders[i]) {
                taken.push(self.orders.swap_remove(i));
            }
        }
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{Currency, Symbol};
    use crate::order::{OrderType, Side};
    use rust_decimal_macros::dec;

    fn symbol() -> Symbol {
        Symbol::new(Currency::new("BINANCE", "BTC"), Currency::new("BINANCE", "USD")).unwrap()
    }

    fn order(price: rust_decimal::Decimal) -> Order {
        Order::new(symbol(), OrderType::Limit, Side::Buy, price, dec!(1)).unwrap()
    }

    #[test]
    fn remove_at_is_o1_swap_remove() {
        let mut book = OrderBook::new();
        book.add(order(dec!(1)));
        book.add(order(dec!(2)));
        book.add(order(dec!(3)));
        let removed = book.remove_at(0).unwrap();
        assert_eq!(removed.price, dec!(1));
        assert_eq!(book.len(), 2);
        // Don't assert order: swap-remove reorders the remaining elements.
    }

    #[test]
    fn index_by_id_then_remove_by_id() {
        let mut book = OrderBook::new();
        let a = order(dec!(1));
        let id = a.id();
        book.add(a);
        book.add(order(dec!(2)));
        assert!(book.index_by_id(id).is_ok());
        let removed = book.remove_by_id(id).unwrap();
        assert_eq!(removed.price, dec!(1));
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn remove_by_unknown_id_fails() {
        let mut book = OrderBook::new();
        assert!(matches!(
            book.remove_by_id(12345),
            Err(EngineError::NoLimitOrder(12345))
        ));
    }

    #[test]
    fn filter_in_place_keeps_only_matching_orders_regardless_of_position() {
        let mut book = OrderBook::new();
        book.add(order(dec!(1)));
        book.add(order(dec!(2)));
        book.add(order(dec!(3)));
        book.add(order(dec!(4)));
        book.filter_in_place(|o| o.price >= dec!(3));
        let mut prices: Vec<_> = book.iter().map(|o| o.price).collect();
        prices.sort();
        assert_eq!(prices, vec![dec!(3), dec!(4)]);
    }

    #[test]
    fn take_matching_removes_and_returns_matches_only() {
        let mut book = OrderBook::new();
        book.add(order(dec!(1)));
        book.add(order(dec!(2)));
        book.add(order(dec!(3)));
        let taken = book.take_matching(|o| o.price >= dec!(2));
        assert_eq!(taken.len(), 2);
        assert_eq!(book.len(), 1);
        assert_eq!(book.iter().next().unwrap().price, dec!(1));
    }

    #[test]
    fn at_most_one_entry_per_id() {
        let mut book = OrderBook::new();
        let a = order(dec!(1));
        let id = a.id();
        book.add(a);
        assert_eq!(book.iter().filter(|o| o.id() == id).count(), 1);
    }
}
