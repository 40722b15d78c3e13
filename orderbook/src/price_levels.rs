use crate::types::{Order, OrderId, Side};
use std::collections::{BTreeMap, VecDeque};

/// All resting orders at one price on one side.
///
/// The queue holds ids only; the book's arena owns the orders. `total_qty`
/// tracks the sum of the queued orders' remaining quantity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriceLevel {
    px_ticks: u32,
    total_qty: u64,
    orders: VecDeque<OrderId>,
}

impl PriceLevel {
    pub fn new(px_ticks: u32) -> Self {
        Self {
            px_ticks,
            total_qty: 0,
            orders: VecDeque::new(),
        }
    }

    pub fn px_ticks(&self) -> u32 {
        self.px_ticks
    }

    /// Remaining lots across the whole queue.
    pub fn total_qty(&self) -> u64 {
        self.total_qty
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Oldest order at this price, next in line to trade.
    pub fn front(&self) -> Option<OrderId> {
        self.orders.front().copied()
    }

    /// Queue contents in time priority.
    pub fn order_ids(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.orders.iter().copied()
    }

    /// Appends at the back of the queue, keeping FIFO intact.
    pub fn add_order(&mut self, order: &Order) {
        self.orders.push_back(order.id);
        self.total_qty += u64::from(order.remaining_qty());
    }

    /// Removes `order` wherever it sits in the queue.
    /// Returns false if the order was not queued here.
    pub fn remove_order(&mut self, order: &Order) -> bool {
        let Some(pos) = self.orders.iter().position(|id| *id == order.id) else {
            return false;
        };
        self.orders.remove(pos);
        self.total_qty -= u64::from(order.remaining_qty());
        true
    }

    /// Books a fill against one of the queued orders.
    pub fn apply_fill(&mut self, qty: u32) {
        self.total_qty -= u64::from(qty);
    }

    /// Drops the head of the queue once it is fully filled.
    pub fn pop_front(&mut self) -> Option<OrderId> {
        self.orders.pop_front()
    }

    /// Swaps one order's remaining quantity for another in the aggregate.
    pub fn resize(&mut self, old_remaining: u32, new_remaining: u32) {
        self.total_qty = self.total_qty - u64::from(old_remaining) + u64::from(new_remaining);
    }
}

// Structured price levels based on a BTreeMap keyed by price ticks.
// side determines which end of the map is the best
// - Sells: lowest price is best (front of map)
// - Buys: highest price is best (back of map)
pub struct PriceLevels {
    side: Side,
    levels: BTreeMap<u32, PriceLevel>,
}

impl PriceLevels {
    /// Creates empty price levels for given side
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Returns the best price for the side without removing anything.
    /// None if no price levels currently exist.
    pub fn best_price(&self) -> Option<u32> {
        match self.side {
            Side::Sell => self.levels.first_key_value().map(|(px, _)| *px),
            Side::Buy => self.levels.last_key_value().map(|(px, _)| *px),
        }
    }

    pub fn best_level_mut(&mut self) -> Option<&mut PriceLevel> {
        let px = self.best_price()?;
        self.levels.get_mut(&px)
    }

    /// Oldest order at the best price.
    pub fn peek_best(&self) -> Option<OrderId> {
        let px = self.best_price()?;
        self.levels.get(&px).and_then(PriceLevel::front)
    }

    /// Returns how many orders are waiting at best price, 0 on an empty side.
    pub fn best_level_size(&self) -> usize {
        self.best_price()
            .and_then(|px| self.levels.get(&px))
            .map_or(0, PriceLevel::len)
    }

    pub fn level(&self, px_ticks: u32) -> Option<&PriceLevel> {
        self.levels.get(&px_ticks)
    }

    pub fn level_mut(&mut self, px_ticks: u32) -> Option<&mut PriceLevel> {
        self.levels.get_mut(&px_ticks)
    }

    /// Level at the price, created empty if missing. The caller must queue
    /// an order on it before returning control.
    pub fn level_or_insert(&mut self, px_ticks: u32) -> &mut PriceLevel {
        self.levels
            .entry(px_ticks)
            .or_insert_with(|| PriceLevel::new(px_ticks))
    }

    /// Removes the level only if its queue is empty.
    pub fn remove_level_if_empty(&mut self, px_ticks: u32) -> bool {
        if self.levels.get(&px_ticks).is_some_and(PriceLevel::is_empty) {
            self.levels.remove(&px_ticks);
            return true;
        }
        false
    }

    /// Number of distinct prices on this side.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Number of resting orders across all levels.
    pub fn total_len(&self) -> usize {
        self.levels.values().map(PriceLevel::len).sum()
    }

    pub fn qty_at_price(&self, px_ticks: u32) -> u64 {
        self.levels.get(&px_ticks).map_or(0, PriceLevel::total_qty)
    }

    /// Levels in priority order, best price first.
    pub fn levels_best_first(&self) -> Box<dyn Iterator<Item = &PriceLevel> + '_> {
        match self.side {
            Side::Sell => Box::new(self.levels.values()),
            Side::Buy => Box::new(self.levels.values().rev()),
        }
    }

    /// `(price, aggregate quantity)` pairs, best price first.
    pub fn iter_levels_best_first(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.levels_best_first()
            .map(|level| (level.px_ticks(), level.total_qty()))
    }
}
