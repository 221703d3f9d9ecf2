//! BitMEX quote channel adapter.
//!
//! Subscribes to `quote:<pair>`. Quote sizes are transmitted as contract
//! notional (1 contract = 1 USD), so each size is divided by its price to
//! recover the base-asset quantity before emission.

use serde::Deserialize;
use serde_json::{json, Value};

use tob_core::types::{BookLevel, Exchange, Pair, Price, Quantity, TopOfBook};

use super::{top_of_book, ProtocolAdapter};

/// One entry of a quote message's `data` array.
#[derive(Debug, Deserialize)]
struct BitmexQuote {
    #[serde(rename = "bidPrice")]
    bid_price: f64,
    #[serde(rename = "bidSize")]
    bid_size: f64,
    #[serde(rename = "askPrice")]
    ask_price: f64,
    #[serde(rename = "askSize")]
    ask_size: f64,
}

/// BitMEX quote channel adapter.
pub struct BitmexAdapter {
    pair: Pair,
}

impl BitmexAdapter {
    /// Create an adapter for `pair` (BitMEX spelling, e.g. `XBTUSD`).
    pub fn new(pair: Pair) -> Self {
        Self { pair }
    }
}

impl ProtocolAdapter for BitmexAdapter {
    fn exchange(&self) -> Exchange {
        Exchange::Bitmex
    }

    fn subscribe_request(&self) -> Value {
        json!({
            "op": "subscribe",
            "args": [format!("quote:{}", self.pair)]
        })
    }

    fn unsubscribe_request(&self) -> Value {
        json!({
            "op": "unsubscribe",
            "args": [format!("quote:{}", self.pair)]
        })
    }

    fn accepts(&mut self, frame: &Value) -> bool {
        frame
            .get("data")
            .and_then(Value::as_array)
            .and_then(|data| data.first())
            .and_then(|quote| quote.get("symbol"))
            .and_then(Value::as_str)
            == Some(self.pair.as_str())
    }

    fn fold(&mut self, frame: &Value) -> Option<TopOfBook> {
        let entry = frame.get("data")?.as_array()?.first()?;
        let quote: BitmexQuote = serde_json::from_value(entry.clone()).ok()?;
        if quote.bid_price == 0.0 || quote.ask_price == 0.0 {
            return None;
        }

        let bid = BookLevel::new(
            Price::from(quote.bid_price),
            Quantity::from(quote.bid_size / quote.bid_price),
        );
        let ask = BookLevel::new(
            Price::from(quote.ask_price),
            Quantity::from(quote.ask_size / quote.ask_price),
        );
        Some(top_of_book(Exchange::Bitmex, &self.pair, bid, ask))
    }
}
