//! Exchange protocol adapters.
//!
//! Each venue speaks its own websocket dialect: different subscribe
//! requests, different frame envelopes, different payload layouts. One
//! adapter per venue implements [`ProtocolAdapter`], reducing the dialect
//! to the canonical [`TopOfBook`] value. The set of venues is closed;
//! [`adapter_for`] selects the implementation statically.
//!
//! Shared contract, relied on by the orchestrator and the tests:
//! - a frame that fails [`ProtocolAdapter::accepts`] is dropped without
//!   touching fold state;
//! - an accepted frame with no usable payload folds to `None` and leaves the
//!   running value unchanged;
//! - field access never panics; missing or mistyped fields degrade to the
//!   two cases above.

pub mod binance;
pub mod bitfinex;
pub mod bitmex;
pub mod bitstamp;
pub mod bybit;
pub mod coinbase;
pub mod ftx;
pub mod kraken;

use serde_json::Value;

use tob_core::types::{BookLevel, Exchange, Pair, Price, Quantity, Timestamp, TopOfBook};

/// One venue's protocol: request builders, frame matching, and the fold
/// from raw frames to the canonical top of book.
///
/// An adapter instance owns all per-subscription state (ladders, captured
/// channel ids). The orchestrator calls [`reset`](Self::reset) before every
/// (re)subscribe so a fresh attach never sees stale state.
pub trait ProtocolAdapter: Send {
    /// Venue this adapter speaks for.
    fn exchange(&self) -> Exchange;

    /// Subscribe request sent on every (re)attach.
    fn subscribe_request(&self) -> Value;

    /// Unsubscribe request sent on consumer detach.
    fn unsubscribe_request(&self) -> Value;

    /// Whether `frame` belongs to this subscription.
    ///
    /// Stateful for venues with a handshake (Bitfinex captures its channel
    /// id here); a pure field match everywhere else.
    fn accepts(&mut self, frame: &Value) -> bool;

    /// Fold an accepted frame into the running top of book.
    ///
    /// Returns `None` when the frame carries nothing usable; the previously
    /// emitted value stands.
    fn fold(&mut self, frame: &Value) -> Option<TopOfBook>;

    /// Clear per-subscription state. Default: nothing to clear.
    fn reset(&mut self) {}
}

impl<T: ProtocolAdapter + ?Sized> ProtocolAdapter for Box<T> {
    fn exchange(&self) -> Exchange {
        (**self).exchange()
    }

    fn subscribe_request(&self) -> Value {
        (**self).subscribe_request()
    }

    fn unsubscribe_request(&self) -> Value {
        (**self).unsubscribe_request()
    }

    fn accepts(&mut self, frame: &Value) -> bool {
        (**self).accepts(frame)
    }

    fn fold(&mut self, frame: &Value) -> Option<TopOfBook> {
        (**self).fold(frame)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Build the adapter for a venue.
///
/// `depth` is the ladder depth for venues that reduce a level-2 book
/// (Coinbase); the ticker-style venues ignore it.
pub fn adapter_for(exchange: Exchange, pair: Pair, depth: usize) -> Box<dyn ProtocolAdapter> {
    match exchange {
        Exchange::Bitstamp => Box::new(bitstamp::BitstampAdapter::new(pair)),
        Exchange::Bitmex => Box::new(bitmex::BitmexAdapter::new(pair)),
        Exchange::Ftx => Box::new(ftx::FtxAdapter::new(pair)),
        Exchange::Binance => Box::new(binance::BinanceAdapter::new(pair)),
        Exchange::Coinbase => Box::new(coinbase::CoinbaseAdapter::new(pair, depth)),
        Exchange::Kraken => Box::new(kraken::KrakenAdapter::new(pair)),
        Exchange::Bitfinex => Box::new(bitfinex::BitfinexAdapter::new(pair)),
        Exchange::Bybit => Box::new(bybit::BybitAdapter::new(pair)),
    }
}

// ── Shared wire parsing ────────────────────────────────────────────────

/// Parse a price from a JSON value: decimal strings exactly, numbers via
/// `f64`.
pub(crate) fn parse_price(v: &Value) -> Option<Price> {
    match v {
        Value::String(s) => Price::parse(s),
        Value::Number(_) => v.as_f64().map(Price::from),
        _ => None,
    }
}

/// Parse a size from a JSON value: decimal strings exactly, numbers via
/// `f64`.
pub(crate) fn parse_size(v: &Value) -> Option<Quantity> {
    match v {
        Value::String(s) => Quantity::parse(s),
        Value::Number(_) => v.as_f64().map(Quantity::from),
        _ => None,
    }
}

/// Parse a `[price, size, ...]` array value into a level. Trailing elements
/// (Kraken appends lot volumes) are ignored.
pub(crate) fn parse_level(v: &Value) -> Option<BookLevel> {
    let entry = v.as_array()?;
    Some(BookLevel::new(
        parse_price(entry.first()?)?,
        parse_size(entry.get(1)?)?,
    ))
}

/// Parse a `[price, size]` string pair into a level.
pub(crate) fn parse_str_level(pair: &[String; 2]) -> Option<BookLevel> {
    Some(BookLevel::new(
        Price::parse(&pair[0])?,
        Quantity::parse(&pair[1])?,
    ))
}

/// Assemble a canonical tick stamped with the receive time.
pub(crate) fn top_of_book(
    exchange: Exchange,
    pair: &Pair,
    bid: BookLevel,
    ask: BookLevel,
) -> TopOfBook {
    TopOfBook {
        exchange,
        pair: pair.clone(),
        bid,
        ask,
        timestamp: Timestamp::now(),
    }
}
