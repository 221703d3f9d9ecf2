//! Kraken ticker channel adapter.
//!
//! Kraken data frames are positional arrays:
//! `[channelID, payload, "ticker", pair]`. The pair name in slot 3 is the
//! matching key; the payload's `b`/`a` entries are
//! `[price, wholeLotVolume, lotVolume]` with the leading two elements
//! feeding the canonical level.

use serde_json::{json, Value};

use tob_core::types::{Exchange, Pair, TopOfBook};

use super::{parse_level, top_of_book, ProtocolAdapter};

/// Kraken ticker channel adapter.
pub struct KrakenAdapter {
    pair: Pair,
}

impl KrakenAdapter {
    /// Create an adapter for `pair` (Kraken spelling, e.g. `XBT/USD`).
    pub fn new(pair: Pair) -> Self {
        Self { pair }
    }
}

impl ProtocolAdapter for KrakenAdapter {
    fn exchange(&self) -> Exchange {
        Exchange::Kraken
    }

    fn subscribe_request(&self) -> Value {
        json!({
            "event": "subscribe",
            "pair": [self.pair.as_str()],
            "subscription": { "name": "ticker" }
        })
    }

    fn unsubscribe_request(&self) -> Value {
        json!({
            "event": "unsubscribe",
            "pair": [self.pair.as_str()],
            "subscription": { "name": "ticker" }
        })
    }

    fn accepts(&mut self, frame: &Value) -> bool {
        // Event frames (acks, heartbeats) are objects; data frames are
        // arrays with the pair in slot 3.
        frame
            .as_array()
            .and_then(|arr| arr.get(3))
            .and_then(Value::as_str)
            == Some(self.pair.as_str())
    }

    fn fold(&mut self, frame: &Value) -> Option<TopOfBook> {
        let payload = frame.as_array()?.get(1)?;
        let bid = parse_level(payload.get("b")?)?;
        let ask = parse_level(payload.get("a")?)?;
        Some(top_of_book(Exchange::Kraken, &self.pair, bid, ask))
    }
}
