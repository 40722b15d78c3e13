// Plain value types shared by the book, the price levels and every caller.
// Prices are integer ticks (u32), quantities are integer lots (u32),
// timestamps are caller-supplied nanoseconds (u64).
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side an incoming order of this side matches against.
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("BUY"),
            Side::Sell => f.write_str("SELL"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    PartialFill,
    Filled,
    Cancelled,
    /// Never produced by the book; kept so callers can report their own rejections.
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub ts_ns: u64,     // arrival time in ns, opaque ordering key
    pub px_ticks: u32,  // integer price ticks
    pub qty: u32,       // original lots
    pub filled_qty: u32,
    pub side: Side,
    pub status: OrderStatus,
}

impl Order {
    /// Creates a fresh, unfilled limit order.
    pub fn new(id: OrderId, ts_ns: u64, px_ticks: u32, qty: u32, side: Side) -> Self {
        Self {
            id,
            ts_ns,
            px_ticks,
            qty,
            filled_qty: 0,
            side,
            status: OrderStatus::New,
        }
    }

    pub fn remaining_qty(&self) -> u32 {
        self.qty - self.filled_qty
    }

    pub fn is_filled(&self) -> bool {
        self.filled_qty >= self.qty
    }

    /// True while the order may still rest in the book.
    pub fn is_active(&self) -> bool {
        matches!(self.status, OrderStatus::New | OrderStatus::PartialFill)
    }

    /// Whether this order can trade against a resting level at `px_ticks`.
    pub fn crosses(&self, px_ticks: u32) -> bool {
        match self.side {
            Side::Buy => self.px_ticks >= px_ticks,
            Side::Sell => self.px_ticks <= px_ticks,
        }
    }

    /// Applies an execution of `qty` lots.
    ///
    /// The matcher never asks for more than `remaining_qty()`; this is not
    /// clamped here.
    pub fn fill(&mut self, qty: u32) {
        debug_assert!(qty <= self.remaining_qty(), "overfill of order {}", self.id);
        self.filled_qty += qty;
        self.status = if self.is_filled() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartialFill
        };
    }
}

/// One execution between an incoming order and one resting order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    buy_order: OrderId,
    sell_order: OrderId,
    px_ticks: u32, // maker's price
    qty: u32,
    ts_ns: u64,    // taker's timestamp
}

impl Trade {
    /// Records `qty` lots between `taker` and `maker` at the maker's price.
    pub fn between(taker: &Order, maker: &Order, qty: u32) -> Self {
        let (buy_order, sell_order) = match taker.side {
            Side::Buy => (taker.id, maker.id),
            Side::Sell => (maker.id, taker.id),
        };
        Self {
            buy_order,
            sell_order,
            px_ticks: maker.px_ticks,
            qty,
            ts_ns: taker.ts_ns,
        }
    }

    pub fn buy_order(&self) -> OrderId {
        self.buy_order
    }

    pub fn sell_order(&self) -> OrderId {
        self.sell_order
    }

    pub fn px_ticks(&self) -> u32 {
        self.px_ticks
    }

    pub fn qty(&self) -> u32 {
        self.qty
    }

    pub fn ts_ns(&self) -> u64 {
        self.ts_ns
    }
}
