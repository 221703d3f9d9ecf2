//! The canonical top-of-book value emitted to consumers.
//!
//! Exchange-specific adapters reduce their wire frames into [`TopOfBook`];
//! consumers never see venue message shapes. A `TopOfBook` is only
//! constructed once both sides are known, so every emitted value is fully
//! populated.

use serde::{Deserialize, Serialize};

use super::market::{Exchange, Pair};
use super::price::Price;
use super::quantity::Quantity;
use super::timestamp::Timestamp;

/// A single price level: price and the size resting at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLevel {
    /// Price at this level.
    pub price: Price,
    /// Size at this level, in base-asset units.
    pub size: Quantity,
}

impl BookLevel {
    /// Create a level from price and size.
    pub const fn new(price: Price, size: Quantity) -> Self {
        Self { price, size }
    }
}

/// Best bid and best ask for one pair on one venue.
///
/// Immutable snapshot, produced fresh on every accepted frame that carries
/// usable data and handed to the consumer by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopOfBook {
    /// Source exchange.
    pub exchange: Exchange,
    /// Trading pair in the venue's native spelling.
    pub pair: Pair,
    /// Best bid level.
    pub bid: BookLevel,
    /// Best ask level.
    pub ask: BookLevel,
    /// Receive timestamp of the frame this value was derived from.
    pub timestamp: Timestamp,
}

impl TopOfBook {
    /// Mid-price as `(bid + ask) / 2` (truncating).
    pub fn mid_price(&self) -> Price {
        (self.bid.price + self.ask.price) / 2
    }

    /// Spread as `ask - bid`.
    pub fn spread(&self) -> Price {
        self.ask.price - self.bid.price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TopOfBook {
        TopOfBook {
            exchange: Exchange::Coinbase,
            pair: Pair::new("BTC-USD"),
            bid: BookLevel::new(Price::new(5000000, 2), Quantity::new(100000, 8)),
            ask: BookLevel::new(Price::new(5000100, 2), Quantity::new(200000, 8)),
            timestamp: Timestamp::from_millis(1706000000000),
        }
    }

    #[test]
    fn test_mid_price() {
        assert_eq!(sample().mid_price(), Price::new(5000050, 2));
    }

    #[test]
    fn test_spread() {
        assert_eq!(sample().spread(), Price::new(100, 2));
    }

    #[test]
    fn test_value_semantics() {
        let a = sample();
        let b = a.clone();
        assert_eq!(a, b);
    }
}
