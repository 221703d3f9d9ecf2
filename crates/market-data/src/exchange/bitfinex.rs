//! Bitfinex ticker channel adapter.
//!
//! Bitfinex runs a two-phase handshake. The subscribe ack carries a numeric
//! `chanId`; that frame is captured into adapter state and never folded.
//! From then on only two-element array frames led by the captured id belong
//! to this subscription: `[chanId, [BID, BID_SIZE, ASK, ASK_SIZE, ...]]`.
//! Resubscribing forgets the id and waits for a fresh ack.

use serde_json::{json, Value};

use tob_core::types::{BookLevel, Exchange, Pair, TopOfBook};

use super::{parse_price, parse_size, top_of_book, ProtocolAdapter};

/// Bitfinex ticker channel adapter.
pub struct BitfinexAdapter {
    pair: Pair,
    /// Channel id captured from the subscribe ack; `None` until bound.
    chan_id: Option<i64>,
}

impl BitfinexAdapter {
    /// Create an adapter for `pair` (Bitfinex spelling, e.g. `BTCUSD`).
    pub fn new(pair: Pair) -> Self {
        Self {
            pair,
            chan_id: None,
        }
    }
}

impl ProtocolAdapter for BitfinexAdapter {
    fn exchange(&self) -> Exchange {
        Exchange::Bitfinex
    }

    fn subscribe_request(&self) -> Value {
        json!({
            "event": "subscribe",
            "channel": "ticker",
            "pair": self.pair.as_str()
        })
    }

    fn unsubscribe_request(&self) -> Value {
        json!({
            "event": "unsubscribe",
            "channel": "ticker",
            "pair": self.pair.as_str()
        })
    }

    fn accepts(&mut self, frame: &Value) -> bool {
        // Phase 1: capture the channel id; the ack itself is not data.
        if let Some(id) = frame.get("chanId").and_then(Value::as_i64) {
            self.chan_id = Some(id);
            return false;
        }

        // Phase 2: only array frames led by the captured id.
        match (frame.as_array(), self.chan_id) {
            (Some(arr), Some(id)) => {
                arr.len() == 2 && arr.first().and_then(Value::as_i64) == Some(id)
            }
            _ => false,
        }
    }

    fn fold(&mut self, frame: &Value) -> Option<TopOfBook> {
        let fields = frame.as_array()?.get(1)?.as_array()?;
        let bid = BookLevel::new(parse_price(fields.first()?)?, parse_size(fields.get(1)?)?);
        let ask = BookLevel::new(parse_price(fields.get(2)?)?, parse_size(fields.get(3)?)?);
        Some(top_of_book(Exchange::Bitfinex, &self.pair, bid, ask))
    }

    fn reset(&mut self) {
        self.chan_id = None;
    }
}
