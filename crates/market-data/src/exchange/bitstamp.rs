//! Bitstamp order-book channel adapter.
//!
//! Subscribes to `order_book_<pair>` via Bitstamp's `bts:` event envelope.
//! Each data event carries a full book snapshot; the head of each side feeds
//! the canonical top of book verbatim.

use serde::Deserialize;
use serde_json::{json, Value};

use tob_core::types::{Exchange, Pair, TopOfBook};

use super::{parse_str_level, top_of_book, ProtocolAdapter};

/// Book payload of a `data` event. Non-data events (subscription acks,
/// errors) deserialize with empty sides via `#[serde(default)]`.
#[derive(Debug, Default, Deserialize)]
struct BitstampBook {
    #[serde(default)]
    bids: Vec<[String; 2]>,
    #[serde(default)]
    asks: Vec<[String; 2]>,
}

/// Bitstamp order-book channel adapter.
pub struct BitstampAdapter {
    pair: Pair,
    channel: String,
}

impl BitstampAdapter {
    /// Create an adapter for `pair` (Bitstamp spelling, e.g. `btcusd`).
    pub fn new(pair: Pair) -> Self {
        let channel = format!("order_book_{pair}");
        Self { pair, channel }
    }
}

impl ProtocolAdapter for BitstampAdapter {
    fn exchange(&self) -> Exchange {
        Exchange::Bitstamp
    }

    fn subscribe_request(&self) -> Value {
        json!({
            "event": "bts:subscribe",
            "data": { "channel": self.channel }
        })
    }

    fn unsubscribe_request(&self) -> Value {
        json!({
            "event": "bts:unsubscribe",
            "data": { "channel": self.channel }
        })
    }

    fn accepts(&mut self, frame: &Value) -> bool {
        frame.get("channel").and_then(Value::as_str) == Some(self.channel.as_str())
    }

    fn fold(&mut self, frame: &Value) -> Option<TopOfBook> {
        let book: BitstampBook = serde_json::from_value(frame.get("data")?.clone()).ok()?;
        let bid = parse_str_level(book.bids.first()?)?;
        let ask = parse_str_level(book.asks.first()?)?;
        Some(top_of_book(Exchange::Bitstamp, &self.pair, bid, ask))
    }
}
