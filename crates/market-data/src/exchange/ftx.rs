//! FTX ticker channel adapter.
//!
//! Subscribes to the `ticker` channel for one market. Ticker frames carry
//! best bid/ask with sizes directly; values copy through.

use serde::Deserialize;
use serde_json::{json, Value};

use tob_core::types::{BookLevel, Exchange, Pair, Price, Quantity, TopOfBook};

use super::{top_of_book, ProtocolAdapter};

/// Payload of a ticker `update` frame.
#[derive(Debug, Deserialize)]
struct FtxTicker {
    bid: f64,
    ask: f64,
    #[serde(rename = "bidSize")]
    bid_size: f64,
    #[serde(rename = "askSize")]
    ask_size: f64,
}

/// FTX ticker channel adapter.
pub struct FtxAdapter {
    pair: Pair,
}

impl FtxAdapter {
    /// Create an adapter for `pair` (FTX market name, e.g. `BTC/USD`).
    pub fn new(pair: Pair) -> Self {
        Self { pair }
    }
}

impl ProtocolAdapter for FtxAdapter {
    fn exchange(&self) -> Exchange {
        Exchange::Ftx
    }

    fn subscribe_request(&self) -> Value {
        json!({
            "op": "subscribe",
            "channel": "ticker",
            "market": self.pair.as_str()
        })
    }

    fn unsubscribe_request(&self) -> Value {
        json!({
            "op": "unsubscribe",
            "channel": "ticker",
            "market": self.pair.as_str()
        })
    }

    fn accepts(&mut self, frame: &Value) -> bool {
        frame.get("market").and_then(Value::as_str) == Some(self.pair.as_str())
            && frame.get("data").is_some()
    }

    fn fold(&mut self, frame: &Value) -> Option<TopOfBook> {
        let ticker: FtxTicker = serde_json::from_value(frame.get("data")?.clone()).ok()?;
        let bid = BookLevel::new(Price::from(ticker.bid), Quantity::from(ticker.bid_size));
        let ask = BookLevel::new(Price::from(ticker.ask), Quantity::from(ticker.ask_size));
        Some(top_of_book(Exchange::Ftx, &self.pair, bid, ask))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> FtxAdapter {
        FtxAdapter::new(Pair::new("BTC/USD"))
    }

    fn ticker_frame() -> Value {
        json!({
            "channel": "ticker",
            "market": "BTC/USD",
            "type": "update",
            "data": {
                "bid": 50000.5,
                "ask": 50001.0,
                "bidSize": 1.5,
                "askSize": 0.8,
                "last": 50000.75,
                "time": 1706000000.123
            }
        })
    }

    #[test]
    fn test_subscribe_request_shape() {
        let req = adapter().subscribe_request();
        assert_eq!(req["op"], "subscribe");
        assert_eq!(req["channel"], "ticker");
        assert_eq!(req["market"], "BTC/USD");
    }

    #[test]
    fn test_unsubscribe_request_shape() {
        let req = adapter().unsubscribe_request();
        assert_eq!(req["op"], "unsubscribe");
        assert_eq!(req["market"], "BTC/USD");
    }

    #[test]
    fn test_accepts_requires_market_and_data() {
        let mut a = adapter();
        assert!(a.accepts(&ticker_frame()));
        assert!(!a.accepts(&json!({"market": "ETH/USD", "data": {}})));
        // Subscription ack carries the market but no data object.
        assert!(!a.accepts(&json!({"type": "subscribed", "market": "BTC/USD"})));
    }

    #[test]
    fn test_fold_copies_fields_through() {
        let tick = adapter().fold(&ticker_frame()).unwrap();
        assert!((tick.bid.price.to_f64() - 50000.5).abs() < 1e-6);
        assert!((tick.bid.size.to_f64() - 1.5).abs() < 1e-9);
        assert!((tick.ask.price.to_f64() - 50001.0).abs() < 1e-6);
        assert!((tick.ask.size.to_f64() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_fold_empty_data_emits_nothing() {
        let mut a = adapter();
        assert!(a.fold(&json!({"market": "BTC/USD", "data": {}})).is_none());
    }
}
