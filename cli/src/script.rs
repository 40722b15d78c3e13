//! Line-oriented order script format.
//!
//! ```text
//! # comment
//! add buy 10050 100
//! add sell 10055 120
//! cancel 3
//! modify 1 250
//! book 5
//! depth 10
//! stats
//! trades
//! ```

use orderbook::{OrderId, Side};
use std::str::{FromStr, SplitWhitespace};
use thiserror::Error;

const DEFAULT_BOOK_LEVELS: usize = 5;
const DEFAULT_DEPTH_LEVELS: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Add { side: Side, price: u32, quantity: u32 },
    Cancel(OrderId),
    Modify { order_id: OrderId, quantity: u32 },
    Book(usize),
    Depth(usize),
    Stats,
    Trades,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("line {line}: unknown command `{command}`")]
    UnknownCommand { line: usize, command: String },
    #[error("line {line}: missing {what}")]
    MissingArgument { line: usize, what: &'static str },
    #[error("line {line}: invalid {what} `{value}`")]
    InvalidNumber {
        line: usize,
        what: &'static str,
        value: String,
    },
    #[error("line {line}: invalid side `{value}`, use buy or sell")]
    InvalidSide { line: usize, value: String },
    #[error("line {line}: unexpected argument `{value}`")]
    TrailingArgument { line: usize, value: String },
}

fn parse_side(line: usize, s: &str) -> Result<Side, ScriptError> {
    match s.to_lowercase().as_str() {
        "bid" | "buy" => Ok(Side::Buy),
        "ask" | "sell" => Ok(Side::Sell),
        _ => Err(ScriptError::InvalidSide {
            line,
            value: s.to_string(),
        }),
    }
}

/// Pulls whitespace-separated arguments off one line, tagging errors with its number.
struct Args<'a> {
    line: usize,
    tokens: SplitWhitespace<'a>,
}

impl<'a> Args<'a> {
    fn required(&mut self, what: &'static str) -> Result<&'a str, ScriptError> {
        self.tokens.next().ok_or(ScriptError::MissingArgument {
            line: self.line,
            what,
        })
    }

    fn number<T: FromStr>(&mut self, what: &'static str) -> Result<T, ScriptError> {
        let raw = self.required(what)?;
        self.parse(what, raw)
    }

    fn optional_number<T: FromStr>(
        &mut self,
        what: &'static str,
        default: T,
    ) -> Result<T, ScriptError> {
        match self.tokens.next() {
            Some(raw) => self.parse(what, raw),
            None => Ok(default),
        }
    }

    fn parse<T: FromStr>(&self, what: &'static str, raw: &str) -> Result<T, ScriptError> {
        raw.parse().map_err(|_| ScriptError::InvalidNumber {
            line: self.line,
            what,
            value: raw.to_string(),
        })
    }

    fn finish(mut self) -> Result<(), ScriptError> {
        match self.tokens.next() {
            Some(extra) => Err(ScriptError::TrailingArgument {
                line: self.line,
                value: extra.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Parses one script line. Blank lines and comments yield `Ok(None)`.
pub fn parse_line(line: usize, text: &str) -> Result<Option<Command>, ScriptError> {
    let text = text.split('#').next().unwrap_or_default();
    let mut tokens = text.split_whitespace();
    let Some(command) = tokens.next() else {
        return Ok(None);
    };
    let mut args = Args { line, tokens };

    let cmd = match command.to_lowercase().as_str() {
        "add" => {
            let side = parse_side(line, args.required("side")?)?;
            let price = args.number("price")?;
            let quantity = args.number("quantity")?;
            Command::Add {
                side,
                price,
                quantity,
            }
        }
        "cancel" => Command::Cancel(OrderId(args.number("order id")?)),
        "modify" => Command::Modify {
            order_id: OrderId(args.number("order id")?),
            quantity: args.number("quantity")?,
        },
        "book" => Command::Book(args.optional_number("levels", DEFAULT_BOOK_LEVELS)?),
        "depth" => Command::Depth(args.optional_number("levels", DEFAULT_DEPTH_LEVELS)?),
        "stats" => Command::Stats,
        "trades" => Command::Trades,
        other => {
            return Err(ScriptError::UnknownCommand {
                line,
                command: other.to_string(),
            })
        }
    };

    args.finish()?;
    Ok(Some(cmd))
}
