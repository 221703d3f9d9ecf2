//! Bybit trade/quote stream adapter.
//!
//! Subscribes to `trade.<pair>`. Frames are matched by the nested channel
//! descriptor (`channels[0].product_ids[0]`); the payload in slot 1 carries
//! `b`/`a` entries as `[price, size]` pairs.

use serde_json::{json, Value};

use tob_core::types::{Exchange, Pair, TopOfBook};

use super::{parse_level, top_of_book, ProtocolAdapter};

/// Bybit trade/quote stream adapter.
pub struct BybitAdapter {
    pair: Pair,
}

impl BybitAdapter {
    /// Create an adapter for `pair` (Bybit spelling, e.g. `BTCUSD`).
    pub fn new(pair: Pair) -> Self {
        Self { pair }
    }
}

impl ProtocolAdapter for BybitAdapter {
    fn exchange(&self) -> Exchange {
        Exchange::Bybit
    }

    fn subscribe_request(&self) -> Value {
        json!({
            "op": "subscribe",
            "args": [format!("trade.{}", self.pair)]
        })
    }

    fn unsubscribe_request(&self) -> Value {
        json!({
            "op": "unsubscribe",
            "args": [format!("trade.{}", self.pair)]
        })
    }

    fn accepts(&mut self, frame: &Value) -> bool {
        frame
            .get("channels")
            .and_then(|channels| channels.get(0))
            .and_then(|channel| channel.get("product_ids"))
            .and_then(|ids| ids.get(0))
            .and_then(Value::as_str)
            == Some(self.pair.as_str())
    }

    fn fold(&mut self, frame: &Value) -> Option<TopOfBook> {
        let payload = frame.get(1)?;
        let bid = parse_level(payload.get("b")?)?;
        let ask = parse_level(payload.get("a")?)?;
        Some(top_of_book(Exchange::Bybit, &self.pair, bid, ask))
    }
}
