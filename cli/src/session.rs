//! Applies parsed script commands to one in-memory book and reports results.

use crate::script::Command;
use orderbook::{MarketDepth, MonotonicClock, OrderBook, OrderId, OrderStatus, Side, Trade};
use serde::Serialize;
use std::io::{self, Write};

/// One line of JSON output per command (`--json`).
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event<'a> {
    Accepted {
        order_id: OrderId,
        side: Side,
        price: u32,
        quantity: u32,
        status: OrderStatus,
        resting: u32,
        trades: &'a [Trade],
    },
    Cancelled {
        order_id: OrderId,
        ok: bool,
    },
    Modified {
        order_id: OrderId,
        quantity: u32,
        ok: bool,
    },
    Depth(MarketDepth),
    Stats {
        best_bid: u32,
        best_ask: u32,
        spread: i64,
        bid_depth: usize,
        ask_depth: usize,
        resting_orders: usize,
        trades: usize,
    },
    Trades {
        trades: &'a [Trade],
    },
    Error {
        message: String,
    },
}

pub struct Session<W: Write> {
    book: OrderBook,
    clock: MonotonicClock,
    json: bool,
    out: W,
}

impl<W: Write> Session<W> {
    pub fn new(out: W, json: bool) -> Self {
        Self {
            book: OrderBook::new(),
            clock: MonotonicClock::new(),
            json,
            out,
        }
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Reports a script problem on the output stream in the active format.
    pub fn report_error(&mut self, message: String) -> io::Result<()> {
        if self.json {
            return self.emit(&Event::Error { message });
        }
        writeln!(self.out, "error: {message}")
    }

    pub fn execute(&mut self, cmd: Command) -> io::Result<()> {
        match cmd {
            Command::Add {
                side,
                price,
                quantity,
            } => self.add(side, price, quantity),
            Command::Cancel(order_id) => {
                let ok = self.book.cancel_order(order_id);
                if self.json {
                    return self.emit(&Event::Cancelled { order_id, ok });
                }
                if ok {
                    writeln!(self.out, "Order {order_id} cancelled")
                } else {
                    writeln!(self.out, "Order {order_id} not cancelled (unknown or inactive)")
                }
            }
            Command::Modify { order_id, quantity } => {
                let ok = self.book.modify_order(order_id, quantity);
                if self.json {
                    return self.emit(&Event::Modified {
                        order_id,
                        quantity,
                        ok,
                    });
                }
                if ok {
                    writeln!(self.out, "Order {order_id} modified to {quantity}")
                } else {
                    writeln!(self.out, "Order {order_id} not modified")
                }
            }
            Command::Book(levels) if !self.json => {
                writeln!(self.out, "{}", self.book.display(levels))
            }
            Command::Book(levels) | Command::Depth(levels) => {
                let depth = self.book.market_depth(levels);
                if self.json {
                    return self.emit(&Event::Depth(depth));
                }
                writeln!(self.out, "Asks:")?;
                for (i, level) in depth.asks.iter().enumerate() {
                    writeln!(
                        self.out,
                        "  {}: {} @ {} ({} orders)",
                        i + 1,
                        level.quantity,
                        level.price,
                        level.orders
                    )?;
                }
                writeln!(self.out, "Bids:")?;
                for (i, level) in depth.bids.iter().enumerate() {
                    writeln!(
                        self.out,
                        "  {}: {} @ {} ({} orders)",
                        i + 1,
                        level.quantity,
                        level.price,
                        level.orders
                    )?;
                }
                Ok(())
            }
            Command::Stats => self.stats(),
            Command::Trades => {
                if self.json {
                    let event = Event::Trades {
                        trades: self.book.trades(),
                    };
                    return write_json(&mut self.out, &event);
                }
                for trade in self.book.trades() {
                    write_trade(&mut self.out, trade)?;
                }
                Ok(())
            }
        }
    }

    fn add(&mut self, side: Side, price: u32, quantity: u32) -> io::Result<()> {
        let before = self.book.trades().len();
        let order_id = self.book.add_order(price, quantity, side, self.clock.now_ns());
        let trades = &self.book.trades()[before..];

        let (status, resting) = match self.book.order(order_id) {
            Some(order) => (order.status, order.remaining_qty()),
            None => (OrderStatus::Filled, 0),
        };

        if self.json {
            let event = Event::Accepted {
                order_id,
                side,
                price,
                quantity,
                status,
                resting,
                trades,
            };
            return write_json(&mut self.out, &event);
        }

        writeln!(self.out, "Order {order_id} accepted: {side} {quantity} @ {price}")?;
        for trade in trades {
            write_trade(&mut self.out, trade)?;
        }
        if resting > 0 {
            writeln!(self.out, "  Resting: {resting}")
        } else {
            writeln!(self.out, "  Filled")
        }
    }

    fn stats(&mut self) -> io::Result<()> {
        let ob = &self.book;
        let event = Event::Stats {
            best_bid: ob.best_bid(),
            best_ask: ob.best_ask(),
            spread: ob.spread(),
            bid_depth: ob.bid_depth(),
            ask_depth: ob.ask_depth(),
            resting_orders: ob.len(),
            trades: ob.trades().len(),
        };
        if self.json {
            return write_json(&mut self.out, &event);
        }
        writeln!(self.out, "Best Bid: {}", ob.best_bid())?;
        writeln!(self.out, "Best Ask: {}", ob.best_ask())?;
        writeln!(self.out, "Spread: {} ticks", ob.spread())?;
        writeln!(self.out, "Bid Depth: {} levels", ob.bid_depth())?;
        writeln!(self.out, "Ask Depth: {} levels", ob.ask_depth())?;
        writeln!(self.out, "Resting Orders: {}", ob.len())?;
        writeln!(self.out, "Total Trades: {}", ob.trades().len())
    }

    fn emit(&mut self, event: &Event<'_>) -> io::Result<()> {
        write_json(&mut self.out, event)
    }
}

fn write_json<W: Write>(out: &mut W, event: &Event<'_>) -> io::Result<()> {
    serde_json::to_writer(&mut *out, event)?;
    writeln!(out)
}

fn write_trade<W: Write>(out: &mut W, trade: &Trade) -> io::Result<()> {
    writeln!(
        out,
        "  Trade: Buy {} x Sell {} | {} @ {}",
        trade.buy_order(),
        trade.sell_order(),
        trade.qty(),
        trade.px_ticks()
    )
}
