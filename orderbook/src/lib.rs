//! Limit order book with price-time priority matching.
//!
//! Core features:
//! - Price-time priority matching (best price first, then FIFO)
//! - Partial fills and immediate execution at the resting order's price
//! - Cancel and in-place quantity modification of resting orders
//! - Market data: best prices, spread, level depth, append-only trade log
//!
//! Every order lives in a single arena keyed by [`OrderId`]; price levels
//! only queue ids, so the index and the queues cannot disagree about an
//! order's state.

pub mod types;

pub use types::{Order, OrderId, OrderStatus, Side, Trade};
pub mod price_levels;
pub use price_levels::{PriceLevel, PriceLevels};
pub mod depth;
pub use depth::{LevelSummary, MarketDepth};
pub mod display;
pub use display::BookView;
pub mod clock;
pub use clock::MonotonicClock;

use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// Best price reported for a side with no levels.
pub const EMPTY_PRICE: u32 = 0;
/// Spread reported while either side is empty.
pub const NO_SPREAD: i64 = -1;

/// Central limit order book with separate bid/ask sides.
///
/// Uses price-time priority: better prices match first, then earliest orders.
/// Not thread-safe - wrap in a lock or give it a single owning thread.
pub struct OrderBook {
    /// Buy orders, highest price first
    bids: PriceLevels,
    /// Sell orders, lowest price first
    asks: PriceLevels,
    /// Every resting order, keyed by id. Sole owner of order state.
    orders: HashMap<OrderId, Order>,
    /// Executions in match order
    trades: Vec<Trade>,
    next_id: u64,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    /// Creates empty order book. The first order gets id 1.
    pub fn new() -> Self {
        Self {
            bids: PriceLevels::new(Side::Buy),
            asks: PriceLevels::new(Side::Sell),
            orders: HashMap::new(),
            trades: Vec::new(),
            next_id: 1,
        }
    }

    /// Submits a limit order and returns its id.
    ///
    /// The order first trades against the opposite side while it crosses;
    /// whatever is left rests at the back of its own price level. Trades
    /// execute at the maker's price and are appended to [`trades`](Self::trades).
    pub fn add_order(&mut self, px_ticks: u32, qty: u32, side: Side, ts_ns: u64) -> OrderId {
        let id = OrderId(self.next_id);
        self.next_id += 1;

        let mut taker = Order::new(id, ts_ns, px_ticks, qty, side);
        debug!(%id, %side, px_ticks, qty, "order accepted");

        self.match_incoming(&mut taker);

        if !taker.is_filled() {
            debug!(%id, px_ticks, remaining = taker.remaining_qty(), "order resting");
            self.side_mut(side)
                .level_or_insert(px_ticks)
                .add_order(&taker);
            self.orders.insert(id, taker);
        }

        id
    }

    /// Cancels a resting order. False for unknown, filled or cancelled ids.
    pub fn cancel_order(&mut self, id: OrderId) -> bool {
        self.cancel(id).is_some()
    }

    /// Cancels a resting order and hands back its final state.
    pub fn cancel(&mut self, id: OrderId) -> Option<Order> {
        if !self.orders.get(&id).is_some_and(Order::is_active) {
            debug!(%id, "cancel rejected: no active order");
            return None;
        }
        let mut order = self.orders.remove(&id)?;

        let book_side = self.side_mut(order.side);
        if let Some(level) = book_side.level_mut(order.px_ticks) {
            level.remove_order(&order);
        }
        book_side.remove_level_if_empty(order.px_ticks);

        order.status = OrderStatus::Cancelled;
        debug!(%id, remaining = order.remaining_qty(), "order cancelled");
        Some(order)
    }

    /// Changes a resting order's quantity in place.
    ///
    /// The order keeps its queue position even when it grows, and no matching
    /// is attempted. Fails for unknown ids and for quantities that would not
    /// leave anything open (`new_qty <= filled`).
    pub fn modify_order(&mut self, id: OrderId, new_qty: u32) -> bool {
        let Self {
            bids, asks, orders, ..
        } = self;

        let Some(order) = orders.get_mut(&id) else {
            debug!(%id, "modify rejected: unknown order");
            return false;
        };
        if new_qty <= order.filled_qty {
            debug!(%id, new_qty, filled = order.filled_qty, "modify rejected: at or below filled");
            return false;
        }

        let old_remaining = order.remaining_qty();
        order.qty = new_qty;

        let book_side = match order.side {
            Side::Buy => bids,
            Side::Sell => asks,
        };
        if let Some(level) = book_side.level_mut(order.px_ticks) {
            level.resize(old_remaining, order.remaining_qty());
        }
        debug!(%id, new_qty, "order modified");
        true
    }

    /// Returns current best bid price (highest buy price), or 0.
    pub fn best_bid(&self) -> u32 {
        self.bids.best_price().unwrap_or(EMPTY_PRICE)
    }

    /// Returns current best ask price (lowest sell price), or 0.
    pub fn best_ask(&self) -> u32 {
        self.asks.best_price().unwrap_or(EMPTY_PRICE)
    }

    /// Best bid and ask without sentinels.
    pub fn bbo(&self) -> (Option<u32>, Option<u32>) {
        (self.bids.best_price(), self.asks.best_price())
    }

    /// Ask minus bid in ticks, or -1 while either side is empty.
    pub fn spread(&self) -> i64 {
        match self.bbo() {
            (Some(bid), Some(ask)) => i64::from(ask) - i64::from(bid),
            _ => NO_SPREAD,
        }
    }

    /// Number of bid price levels.
    pub fn bid_depth(&self) -> usize {
        self.bids.depth()
    }

    /// Number of ask price levels.
    pub fn ask_depth(&self) -> usize {
        self.asks.depth()
    }

    /// Every execution so far, in match order.
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Looks up a resting order.
    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    /// Number of resting orders on both sides.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn bids(&self) -> &PriceLevels {
        &self.bids
    }

    pub fn asks(&self) -> &PriceLevels {
        &self.asks
    }

    fn side_mut(&mut self, side: Side) -> &mut PriceLevels {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// Walks the opposite side level by level while `taker` still crosses.
    ///
    /// Each level is consumed first; only then is it dropped (if empty) and
    /// the next best price looked at.
    fn match_incoming(&mut self, taker: &mut Order) {
        let contra = taker.side.opposite();
        while !taker.is_filled() {
            let Some(best_px) = self.side_mut(contra).best_price() else {
                break; // Nothing to trade against
            };
            if !taker.crosses(best_px) {
                break;
            }

            self.match_level(taker, best_px);
            self.side_mut(contra).remove_level_if_empty(best_px);
        }
    }

    /// Fills `taker` against the FIFO queue at `px_ticks` until one of them runs out.
    fn match_level(&mut self, taker: &mut Order, px_ticks: u32) {
        let Self {
            bids,
            asks,
            orders,
            trades,
            ..
        } = self;
        let book_side = match taker.side {
            Side::Buy => asks,
            Side::Sell => bids,
        };
        let Some(level) = book_side.level_mut(px_ticks) else {
            return;
        };

        while !taker.is_filled() {
            let Some(maker_id) = level.front() else {
                break;
            };
            let Some(maker) = orders.get_mut(&maker_id) else {
                warn!(%maker_id, px_ticks, "queued id missing from index, dropping");
                level.pop_front();
                continue;
            };

            let fill = taker.remaining_qty().min(maker.remaining_qty());
            taker.fill(fill);
            maker.fill(fill);
            level.apply_fill(fill);

            let trade = Trade::between(taker, maker, fill);
            trace!(
                buy = %trade.buy_order(),
                sell = %trade.sell_order(),
                px_ticks,
                qty = fill,
                "fill"
            );
            trades.push(trade);

            if maker.is_filled() {
                level.pop_front();
                orders.remove(&maker_id);
            }
        }
    }
}
