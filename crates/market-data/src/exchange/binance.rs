//! Binance book-ticker stream adapter.
//!
//! Subscribes to `<pair>@bookTicker` on the combined-stream endpoint.
//! Binance requires a client-chosen correlation id on subscribe requests;
//! each adapter instance draws one from a process-wide counter.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Deserialize;
use serde_json::{json, Value};

use tob_core::types::{BookLevel, Exchange, Pair, Price, Quantity, TopOfBook};

use super::{top_of_book, ProtocolAdapter};

/// Source of client-chosen subscribe request ids.
static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Payload of a combined-stream book-ticker frame.
#[derive(Debug, Deserialize)]
struct BookTicker {
    /// Best bid price.
    #[serde(rename = "b")]
    bid_price: String,
    /// Best bid quantity.
    #[serde(rename = "B")]
    bid_size: String,
    /// Best ask price.
    #[serde(rename = "a")]
    ask_price: String,
    /// Best ask quantity.
    #[serde(rename = "A")]
    ask_size: String,
}

/// Binance book-ticker stream adapter.
pub struct BinanceAdapter {
    pair: Pair,
    stream: String,
    request_id: u64,
}

impl BinanceAdapter {
    /// Create an adapter for `pair` (Binance spelling, e.g. `btcusdt`).
    pub fn new(pair: Pair) -> Self {
        let stream = format!("{pair}@bookTicker");
        Self {
            pair,
            stream,
            request_id: NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// The correlation id carried on this subscription's requests.
    pub fn request_id(&self) -> u64 {
        self.request_id
    }
}

impl ProtocolAdapter for BinanceAdapter {
    fn exchange(&self) -> Exchange {
        Exchange::Binance
    }

    fn subscribe_request(&self) -> Value {
        json!({
            "method": "SUBSCRIBE",
            "params": [self.stream],
            "id": self.request_id
        })
    }

    fn unsubscribe_request(&self) -> Value {
        json!({
            "method": "UNSUBSCRIBE",
            "params": [self.stream],
            "id": self.request_id
        })
    }

    fn accepts(&mut self, frame: &Value) -> bool {
        frame.get("stream").and_then(Value::as_str) == Some(self.stream.as_str())
    }

    fn fold(&mut self, frame: &Value) -> Option<TopOfBook> {
        let ticker: BookTicker = serde_json::from_value(frame.get("data")?.clone()).ok()?;
        let bid = BookLevel::new(
            Price::parse(&ticker.bid_price)?,
            Quantity::parse(&ticker.bid_size)?,
        );
        let ask = BookLevel::new(
            Price::parse(&ticker.ask_price)?,
            Quantity::parse(&ticker.ask_size)?,
        );
        Some(top_of_book(Exchange::Binance, &self.pair, bid, ask))
    }
}
