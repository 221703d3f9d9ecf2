//! Market identifiers: venues, book sides, and trading pairs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported exchanges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exchange {
    /// Bitstamp full-book channel.
    Bitstamp,
    /// BitMEX quote channel (notionally-quoted sizes).
    Bitmex,
    /// FTX ticker channel.
    Ftx,
    /// Binance book-ticker stream.
    Binance,
    /// Coinbase level-2 book channel.
    Coinbase,
    /// Kraken ticker channel (array-positional payload).
    Kraken,
    /// Bitfinex ticker channel (channel-id handshake).
    Bitfinex,
    /// Bybit trade/quote stream.
    Bybit,
}

impl Exchange {
    /// All supported venues, in a stable order.
    pub const ALL: [Exchange; 8] = [
        Exchange::Bitstamp,
        Exchange::Bitmex,
        Exchange::Ftx,
        Exchange::Binance,
        Exchange::Coinbase,
        Exchange::Kraken,
        Exchange::Bitfinex,
        Exchange::Bybit,
    ];
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Exchange::Bitstamp => "Bitstamp",
            Exchange::Bitmex => "BitMEX",
            Exchange::Ftx => "FTX",
            Exchange::Binance => "Binance",
            Exchange::Coinbase => "Coinbase",
            Exchange::Kraken => "Kraken",
            Exchange::Bitfinex => "Bitfinex",
            Exchange::Bybit => "Bybit",
        };
        write!(f, "{name}")
    }
}

/// Side of the order book an incremental change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Buy side (bids).
    Bid,
    /// Sell side (asks).
    Ask,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Bid => write!(f, "Bid"),
            Side::Ask => write!(f, "Ask"),
        }
    }
}

/// Trading pair in a venue's native spelling (e.g., "btcusd", "XBT/USD").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair(pub String);

impl Pair {
    /// Create a new pair.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The pair as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
