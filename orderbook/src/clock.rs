//! Timestamp source for callers of the book.
//!
//! The book never reads the clock itself; submitters stamp orders with
//! whatever ordering key they like. This is the one the bundled tools use.

use std::time::Instant;

/// Nanoseconds since the clock was created, strictly increasing per call.
pub struct MonotonicClock {
    origin: Instant,
    last: u64,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            last: 0,
        }
    }

    /// Next timestamp. Two calls inside the same nanosecond still differ by one.
    pub fn now_ns(&mut self) -> u64 {
        let elapsed = u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.last = elapsed.max(self.last + 1);
        self.last
    }
}
