//! Subscription orchestration.
//!
//! [`run_feed`] composes one adapter with one channel: it sends the
//! subscribe request on attach, routes every inbound frame through
//! `accepts` then `fold`, forwards emitted ticks to the consumer, and hands
//! control to the reconnect policy on any channel failure. Adapter state is
//! rebuilt from scratch on every (re)attach.
//!
//! [`subscribe`] is the consumer-facing entry point: it spawns the feed
//! task and returns a [`TopOfBookStream`] whose `Drop` detaches the
//! subscription (stops folding, cancels pending reconnect waits, and sends
//! the unsubscribe request).

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use tob_core::config::AppConfig;
use tob_core::types::{Exchange, Pair, TopOfBook};

use crate::channel::{ChannelError, MarketChannel, WsChannel};
use crate::exchange::{adapter_for, ProtocolAdapter};
use crate::ws::{AlwaysOnline, ConnectionState, Connectivity, ReconnectPolicy};

/// Why the read loop stopped.
enum Exit {
    /// Consumer detached (cancellation or receiver dropped).
    Detached,
    /// Channel failed or ended; the reconnect policy decides what happens.
    Disconnected(String),
}

/// Lazy stream of canonical ticks for one `(exchange, pair)` subscription.
///
/// Dropping the stream detaches the subscription.
pub struct TopOfBookStream {
    rx: mpsc::Receiver<TopOfBook>,
    cancel: CancellationToken,
}

impl TopOfBookStream {
    /// Receive the next tick. `None` only after the stream is detached.
    pub async fn recv(&mut self) -> Option<TopOfBook> {
        self.rx.recv().await
    }
}

impl Drop for TopOfBookStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Start a subscription for one venue and return its tick stream.
///
/// Uses the production websocket channel and [`AlwaysOnline`] connectivity.
pub fn subscribe(exchange: Exchange, config: &AppConfig) -> TopOfBookStream {
    let venue = config.venue(exchange);
    let adapter = adapter_for(exchange, Pair::new(venue.pair.as_str()), config.feed.depth_levels);
    let url = venue.ws_url.clone();
    let policy = ReconnectPolicy::new(Duration::from_millis(config.feed.reconnect.delay_ms));
    let (tx, rx) = mpsc::channel(config.feed.channel_capacity);
    let cancel = CancellationToken::new();

    let task_cancel = cancel.clone();
    tokio::spawn(async move {
        let connect = move || {
            let url = url.clone();
            async move { WsChannel::connect(&url).await }
        };
        run_feed(adapter, connect, AlwaysOnline, policy, tx, task_cancel).await;
    });

    TopOfBookStream { rx, cancel }
}

/// Drive one subscription until its consumer detaches.
///
/// Attach, subscribe, fold in arrival order, recover on failure, repeat.
/// The consumer never sees a transport error: failures end in a policy
/// pause and a fresh attach with reset adapter state.
pub async fn run_feed<A, F, Fut, C, N>(
    mut adapter: A,
    mut connect: F,
    connectivity: N,
    policy: ReconnectPolicy,
    tx: mpsc::Sender<TopOfBook>,
    cancel: CancellationToken,
) where
    A: ProtocolAdapter,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<C, ChannelError>>,
    C: MarketChannel,
    N: Connectivity,
{
    let exchange = adapter.exchange();

    loop {
        if cancel.is_cancelled() {
            return;
        }

        // Fresh attach: ladders and channel handles from previous attempts
        // must not leak into this one.
        adapter.reset();

        let mut channel = tokio::select! {
            _ = cancel.cancelled() => return,
            result = connect() => match result {
                Ok(channel) => channel,
                Err(e) => {
                    tracing::error!(exchange = %exchange, error = %e, "connect failed");
                    if policy.pause(&connectivity, &cancel).await.is_none() {
                        return;
                    }
                    continue;
                }
            }
        };

        if let Err(e) = channel.send(adapter.subscribe_request()).await {
            tracing::error!(exchange = %exchange, error = %e, "subscribe failed");
            if policy.pause(&connectivity, &cancel).await.is_none() {
                return;
            }
            continue;
        }
        tracing::info!(exchange = %exchange, state = ?ConnectionState::Connected, "subscribed");

        let exit = loop {
            tokio::select! {
                _ = cancel.cancelled() => break Exit::Detached,
                frame = channel.next_frame() => match frame {
                    Some(Ok(frame)) => {
                        if !adapter.accepts(&frame) {
                            continue;
                        }
                        let Some(tick) = adapter.fold(&frame) else {
                            continue;
                        };
                        if tx.send(tick).await.is_err() {
                            break Exit::Detached;
                        }
                    }
                    Some(Err(e)) => break Exit::Disconnected(e.to_string()),
                    None => break Exit::Disconnected("stream ended".to_string()),
                }
            }
        };

        match exit {
            Exit::Detached => {
                let _ = channel.send(adapter.unsubscribe_request()).await;
                tracing::info!(exchange = %exchange, "detached, unsubscribe sent");
                return;
            }
            Exit::Disconnected(reason) => {
                tracing::warn!(
                    exchange = %exchange,
                    state = ?ConnectionState::Disconnected { reason: reason.clone() },
                    "feed disconnected"
                );
                if policy.pause(&connectivity, &cancel).await.is_none() {
                    return;
                }
            }
        }
    }
}
