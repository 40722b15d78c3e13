use crate::OrderBook;
use std::fmt;

/// Console ladder of the top levels: asks above the spread, bids below.
pub struct BookView<'a> {
    book: &'a OrderBook,
    levels: usize,
}

impl OrderBook {
    /// Renders up to `levels` price levels per side via `Display`.
    pub fn display(&self, levels: usize) -> BookView<'_> {
        BookView { book: self, levels }
    }
}

impl fmt::Display for BookView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "========== ORDER BOOK ==========")?;
        writeln!(f, "   ASKS (Sell Orders)")?;
        writeln!(f, "{:<12}{:>12}", "Price", "Quantity")?;

        // Worst shown ask on top so the touch sits next to the spread line
        let asks: Vec<(u32, u64)> = self
            .book
            .asks()
            .iter_levels_best_first()
            .take(self.levels)
            .collect();
        for (px, qty) in asks.iter().rev() {
            writeln!(f, "{px:<12}{qty:>12}")?;
        }

        writeln!(f)?;
        writeln!(f, "Spread: {}", self.book.spread())?;
        writeln!(f)?;

        for (px, qty) in self.book.bids().iter_levels_best_first().take(self.levels) {
            writeln!(f, "{px:<12}{qty:>12}")?;
        }
        writeln!(f, "   BIDS (Buy Orders)")?;
        write!(f, "================================")
    }
}
