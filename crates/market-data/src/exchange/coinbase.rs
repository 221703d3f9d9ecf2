//! Coinbase level-2 book adapter.
//!
//! Coinbase's ticker channel carries no size at the best price, so this
//! adapter subscribes to the `level2` channel and reduces it instead: an
//! initial `snapshot` frame seeds two ladders, each `l2update` frame applies
//! one `(side, price, size)` change, and the ladder heads feed the canonical
//! top of book. The ladders live in a [`Book`] owned by this adapter and are
//! cleared on every resubscription.

use serde::Deserialize;
use serde_json::{json, Value};

use tob_core::types::{Exchange, Pair, Price, Quantity, Side, TopOfBook};

use crate::ladder::Book;

use super::{parse_str_level, top_of_book, ProtocolAdapter};

/// A `snapshot` frame: full book, best-first per side.
#[derive(Debug, Deserialize)]
struct CoinbaseSnapshot {
    bids: Vec<[String; 2]>,
    asks: Vec<[String; 2]>,
}

/// An `l2update` frame: `changes` holds `[side, price, size]` triples.
#[derive(Debug, Deserialize)]
struct CoinbaseL2Update {
    changes: Vec<[String; 3]>,
}

/// Coinbase level-2 book adapter.
pub struct CoinbaseAdapter {
    pair: Pair,
    book: Book,
}

impl CoinbaseAdapter {
    /// Create an adapter for `pair` (Coinbase product id, e.g. `BTC-USD`),
    /// keeping `depth` ladder levels per side.
    pub fn new(pair: Pair, depth: usize) -> Self {
        Self {
            pair,
            book: Book::new(depth),
        }
    }

    fn apply_snapshot(&mut self, frame: &Value) -> Option<()> {
        let snapshot: CoinbaseSnapshot = serde_json::from_value(frame.clone()).ok()?;
        let bids = snapshot
            .bids
            .iter()
            .filter_map(parse_str_level)
            .collect::<Vec<_>>();
        let asks = snapshot
            .asks
            .iter()
            .filter_map(parse_str_level)
            .collect::<Vec<_>>();
        self.book.apply_snapshot(bids, asks);
        Some(())
    }

    fn apply_update(&mut self, frame: &Value) -> Option<()> {
        let update: CoinbaseL2Update = serde_json::from_value(frame.clone()).ok()?;
        let [side, price, size] = update.changes.first()?;
        let side = match side.as_str() {
            "buy" => Side::Bid,
            "sell" => Side::Ask,
            _ => return None,
        };
        self.book
            .apply_change(side, Price::parse(price)?, Quantity::parse(size)?);
        Some(())
    }
}

impl ProtocolAdapter for CoinbaseAdapter {
    fn exchange(&self) -> Exchange {
        Exchange::Coinbase
    }

    fn subscribe_request(&self) -> Value {
        json!({
            "type": "subscribe",
            "product_ids": [self.pair.as_str()],
            "channels": ["level2"]
        })
    }

    fn unsubscribe_request(&self) -> Value {
        json!({
            "type": "unsubscribe",
            "product_ids": [self.pair.as_str()],
            "channels": ["ticker"]
        })
    }

    fn accepts(&mut self, frame: &Value) -> bool {
        frame.get("product_id").and_then(Value::as_str) == Some(self.pair.as_str())
    }

    fn fold(&mut self, frame: &Value) -> Option<TopOfBook> {
        match frame.get("type").and_then(Value::as_str)? {
            "snapshot" => self.apply_snapshot(frame)?,
            "l2update" => self.apply_update(frame)?,
            _ => return None,
        }
        let (bid, ask) = self.book.top()?;
        Some(top_of_book(Exchange::Coinbase, &self.pair, bid, ask))
    }

    fn reset(&mut self) {
        self.book.clear();
    }
}
