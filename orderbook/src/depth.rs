//! Serializable market-depth snapshots for reporting layers.

use crate::price_levels::{PriceLevel, PriceLevels};
use crate::OrderBook;
use serde::{Deserialize, Serialize};

/// Aggregated orders at a specific price level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSummary {
    pub price: u32,
    pub quantity: u64, // Total remaining quantity at this price
    pub orders: usize, // Number of individual orders
}

impl From<&PriceLevel> for LevelSummary {
    fn from(level: &PriceLevel) -> Self {
        Self {
            price: level.px_ticks(),
            quantity: level.total_qty(),
            orders: level.len(),
        }
    }
}

/// Top of book down to a fixed number of levels per side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketDepth {
    pub bids: Vec<LevelSummary>, // Highest to lowest price
    pub asks: Vec<LevelSummary>, // Lowest to highest price
}

fn summarize(side: &PriceLevels, levels: usize) -> Vec<LevelSummary> {
    side.levels_best_first()
        .take(levels)
        .map(LevelSummary::from)
        .collect()
}

impl OrderBook {
    /// Returns up to `levels` price levels per side, best first.
    pub fn market_depth(&self, levels: usize) -> MarketDepth {
        MarketDepth {
            bids: summarize(self.bids(), levels),
            asks: summarize(self.asks(), levels),
        }
    }
}
