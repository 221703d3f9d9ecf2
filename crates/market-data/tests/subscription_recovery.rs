//! Recovery-behavior tests for the subscription orchestrator.
//!
//! Runs [`run_feed`] against scripted in-memory channels and connectivity
//! sources under a paused tokio clock, asserting the reconnect policy's
//! observable behavior: fixed-delay resubscribe while online, suspension
//! while offline, state reset across attaches, and detach semantics.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Notify};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use tob_core::types::{Pair, TopOfBook};
use tob_market_data::channel::{ChannelError, MarketChannel};
use tob_market_data::exchange::binance::BinanceAdapter;
use tob_market_data::exchange::bitfinex::BitfinexAdapter;
use tob_market_data::subscription::run_feed;
use tob_market_data::ws::{AlwaysOnline, Connectivity, ReconnectPolicy};

// ── Scripted fakes ─────────────────────────────────────────────────────

/// In-memory channel that replays scripted frames, then either hangs
/// (healthy idle connection) or reports the stream as ended.
struct FakeChannel {
    frames: VecDeque<Result<Value, ChannelError>>,
    sent: Arc<Mutex<Vec<Value>>>,
    hang_when_drained: bool,
}

impl FakeChannel {
    fn new(
        frames: Vec<Result<Value, ChannelError>>,
        sent: Arc<Mutex<Vec<Value>>>,
        hang_when_drained: bool,
    ) -> Self {
        Self {
            frames: frames.into(),
            sent,
            hang_when_drained,
        }
    }
}

#[async_trait]
impl MarketChannel for FakeChannel {
    async fn send(&mut self, msg: Value) -> Result<(), ChannelError> {
        self.sent.lock().unwrap().push(msg);
        Ok(())
    }

    async fn next_frame(&mut self) -> Option<Result<Value, ChannelError>> {
        match self.frames.pop_front() {
            Some(frame) => Some(frame),
            None if self.hang_when_drained => std::future::pending().await,
            None => None,
        }
    }
}

/// Channel factory: pops one scripted channel per connect attempt and
/// counts the attempts. Hangs once the script is exhausted.
struct Script {
    channels: Arc<Mutex<VecDeque<FakeChannel>>>,
    connects: Arc<AtomicUsize>,
}

impl Script {
    fn new(channels: Vec<FakeChannel>) -> Self {
        Self {
            channels: Arc::new(Mutex::new(channels.into())),
            connects: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    fn connector(
        &self,
    ) -> impl FnMut() -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<FakeChannel, ChannelError>> + Send>,
    > {
        let channels = self.channels.clone();
        let connects = self.connects.clone();
        move || {
            let channels = channels.clone();
            let connects = connects.clone();
            Box::pin(async move {
                connects.fetch_add(1, Ordering::SeqCst);
                let next = channels.lock().unwrap().pop_front();
                match next {
                    Some(channel) => Ok(channel),
                    None => std::future::pending().await,
                }
            })
        }
    }
}

/// Connectivity source whose online flag and restored event are scripted.
struct FakeConnectivity {
    online: AtomicBool,
    restored: Notify,
}

impl FakeConnectivity {
    fn offline() -> SharedConnectivity {
        SharedConnectivity(Arc::new(Self {
            online: AtomicBool::new(false),
            restored: Notify::new(),
        }))
    }
}

/// Shareable handle over [`FakeConnectivity`]: one clone is moved into
/// `run_feed`, the other is retained by the test to flip the online flag.
///
/// A local newtype is required because the orphan rule forbids
/// implementing the foreign `Connectivity` trait directly for
/// `Arc<FakeConnectivity>`.
#[derive(Clone)]
struct SharedConnectivity(Arc<FakeConnectivity>);

impl SharedConnectivity {
    fn go_online(&self) {
        self.0.online.store(true, Ordering::SeqCst);
        self.0.restored.notify_waiters();
    }
}

#[async_trait]
impl Connectivity for SharedConnectivity {
    fn is_online(&self) -> bool {
        self.0.online.load(Ordering::SeqCst)
    }

    async fn wait_online(&self) {
        self.0.restored.notified().await;
    }
}

// ── Frame builders ─────────────────────────────────────────────────────

fn binance_tick(bid: &str, ask: &str) -> Value {
    json!({
        "stream": "btcusdt@bookTicker",
        "data": { "b": bid, "B": "1.0", "a": ask, "A": "2.0" }
    })
}

fn bitfinex_ack(id: i64) -> Value {
    json!({ "event": "subscribed", "channel": "ticker", "chanId": id, "pair": "BTCUSD" })
}

fn bitfinex_tick(id: i64, bid: f64, ask: f64) -> Value {
    json!([id, [bid, 1.0, ask, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]])
}

// ── Tests ──────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn online_error_resubscribes_once_after_the_fixed_delay() {
    let sent_1 = Arc::new(Mutex::new(Vec::new()));
    let sent_2 = Arc::new(Mutex::new(Vec::new()));
    let script = Script::new(vec![
        FakeChannel::new(
            vec![
                Ok(binance_tick("100.0", "101.0")),
                Err(ChannelError::Closed),
            ],
            sent_1.clone(),
            false,
        ),
        FakeChannel::new(vec![Ok(binance_tick("200.0", "201.0"))], sent_2.clone(), true),
    ]);

    let (tx, mut rx) = mpsc::channel::<TopOfBook>(8);
    let cancel = CancellationToken::new();
    let started = Instant::now();

    tokio::spawn(run_feed(
        BinanceAdapter::new(Pair::new("btcusdt")),
        script.connector(),
        AlwaysOnline,
        ReconnectPolicy::new(Duration::from_secs(10)),
        tx,
        cancel.clone(),
    ));

    let first = rx.recv().await.unwrap();
    assert_eq!(first.bid.price.to_f64(), 100.0);

    // The second tick only exists on the post-reconnect channel, and the
    // policy holds the feed for exactly the fixed delay first.
    let second = rx.recv().await.unwrap();
    assert_eq!(second.bid.price.to_f64(), 200.0);
    assert_eq!(started.elapsed(), Duration::from_secs(10));
    assert_eq!(script.connects(), 2);

    // Each attach re-sent the subscribe request from scratch.
    for sent in [&sent_1, &sent_2] {
        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["method"], "SUBSCRIBE");
    }

    cancel.cancel();
}

#[tokio::test(start_paused = true)]
async fn offline_error_suspends_until_connectivity_returns() {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let script = Script::new(vec![
        FakeChannel::new(vec![Err(ChannelError::Closed)], sent.clone(), false),
        FakeChannel::new(vec![Ok(binance_tick("300.0", "301.0"))], sent.clone(), true),
    ]);
    let connectivity = FakeConnectivity::offline();

    let (tx, mut rx) = mpsc::channel::<TopOfBook>(8);
    let cancel = CancellationToken::new();

    tokio::spawn(run_feed(
        BinanceAdapter::new(Pair::new("btcusdt")),
        script.connector(),
        connectivity.clone(),
        ReconnectPolicy::new(Duration::from_secs(10)),
        tx,
        cancel.clone(),
    ));

    // Far past the fixed delay, still no resubscribe: the policy is parked
    // on the connectivity event, not a timer.
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(script.connects(), 1);
    assert!(rx.try_recv().is_err());

    connectivity.go_online();
    let tick = rx.recv().await.unwrap();
    assert_eq!(tick.bid.price.to_f64(), 300.0);
    assert_eq!(script.connects(), 2);

    cancel.cancel();
}

#[tokio::test(start_paused = true)]
async fn detach_cancels_a_pending_reconnect_wait() {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let script = Script::new(vec![FakeChannel::new(
        vec![
            Ok(binance_tick("100.0", "101.0")),
            Err(ChannelError::Closed),
        ],
        sent.clone(),
        false,
    )]);

    let (tx, mut rx) = mpsc::channel::<TopOfBook>(8);
    let cancel = CancellationToken::new();

    let feed = tokio::spawn(run_feed(
        BinanceAdapter::new(Pair::new("btcusdt")),
        script.connector(),
        AlwaysOnline,
        ReconnectPolicy::new(Duration::from_secs(10)),
        tx,
        cancel.clone(),
    ));

    rx.recv().await.unwrap();

    // The channel has failed; the policy is two seconds into its ten-second
    // pause when the consumer detaches.
    tokio::time::sleep(Duration::from_secs(2)).await;
    cancel.cancel();
    feed.await.unwrap();

    // Long after the pause would have elapsed, no resubscribe happened.
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(script.connects(), 1);
}

#[tokio::test(start_paused = true)]
async fn detach_from_a_live_feed_sends_the_unsubscribe_request() {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let script = Script::new(vec![FakeChannel::new(
        vec![Ok(binance_tick("100.0", "101.0"))],
        sent.clone(),
        true,
    )]);

    let (tx, mut rx) = mpsc::channel::<TopOfBook>(8);
    let cancel = CancellationToken::new();

    let feed = tokio::spawn(run_feed(
        BinanceAdapter::new(Pair::new("btcusdt")),
        script.connector(),
        AlwaysOnline,
        ReconnectPolicy::new(Duration::from_secs(10)),
        tx,
        cancel.clone(),
    ));

    rx.recv().await.unwrap();
    cancel.cancel();
    feed.await.unwrap();

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0]["method"], "SUBSCRIBE");
    assert_eq!(sent[1]["method"], "UNSUBSCRIBE");
    assert_eq!(sent[0]["id"], sent[1]["id"]);
}

#[tokio::test(start_paused = true)]
async fn resubscription_resets_the_captured_channel_id() {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let script = Script::new(vec![
        FakeChannel::new(
            vec![
                Ok(bitfinex_ack(17)),
                Ok(bitfinex_tick(17, 100.0, 101.0)),
                Err(ChannelError::Closed),
            ],
            sent.clone(),
            false,
        ),
        FakeChannel::new(
            vec![
                // Stale frame bearing the pre-reconnect id: must be dropped.
                Ok(bitfinex_tick(17, 999.0, 999.5)),
                Ok(bitfinex_ack(42)),
                Ok(bitfinex_tick(42, 200.0, 201.0)),
            ],
            sent.clone(),
            true,
        ),
    ]);

    let (tx, mut rx) = mpsc::channel::<TopOfBook>(8);
    let cancel = CancellationToken::new();

    tokio::spawn(run_feed(
        BitfinexAdapter::new(Pair::new("BTCUSD")),
        script.connector(),
        AlwaysOnline,
        ReconnectPolicy::new(Duration::from_secs(10)),
        tx,
        cancel.clone(),
    ));

    let first = rx.recv().await.unwrap();
    assert_eq!(first.bid.price.to_f64(), 100.0);

    // The next emission comes from the re-bound id 42, never from the
    // stale id 17 frame.
    let second = rx.recv().await.unwrap();
    assert_eq!(second.bid.price.to_f64(), 200.0);

    cancel.cancel();
}
